use crate::OutputFormat;
use crate::commands::template::CommandTemplate;
use crate::display::print_info;
use crate::types::RegionsOutput;
use async_trait::async_trait;
use credkit::CredkitError;
use credkit::region::known_regions;

pub struct RegionsCommand;

#[async_trait]
impl CommandTemplate for RegionsCommand {
    type Args = ();
    type Output = RegionsOutput;

    async fn execute_operation(&self, _args: Self::Args) -> Result<Self::Output, CredkitError> {
        Ok(RegionsOutput {
            regions: known_regions().iter().map(|r| r.to_string()).collect(),
        })
    }

    fn format_table(&self, output: &Self::Output) {
        print_info(&format!("{} supported region(s):", output.regions.len()));
        for (i, region) in output.regions.iter().enumerate() {
            let prefix = if i == output.regions.len() - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, region);
        }
    }
}

pub async fn regions(format: &OutputFormat) -> Result<(), CredkitError> {
    RegionsCommand.execute(format, ()).await
}

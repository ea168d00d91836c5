use crate::OutputFormat;
use crate::commands::check::credential_summary;
use crate::commands::template::CommandTemplate;
use crate::display::{print_info, print_pairs_table};
use crate::types::ResolveOutput;
use async_trait::async_trait;
use credkit::{Bootstrap, Config, CredkitError};

#[derive(Debug)]
pub struct ResolveArgs {
    pub config: Config,
}

/// Region check and credential chain only; no client is built and no AWS API is called.
pub struct ResolveCommand;

#[async_trait]
impl CommandTemplate for ResolveCommand {
    type Args = ResolveArgs;
    type Output = ResolveOutput;

    async fn execute_operation(&self, args: Self::Args) -> Result<Self::Output, CredkitError> {
        let region = args.config.region.clone();
        let resolved = Bootstrap::new(args.config).resolve_credentials().await?;

        Ok(ResolveOutput {
            region,
            credential: credential_summary(&resolved.credential),
            chain: resolved.sources,
        })
    }

    fn format_table(&self, output: &Self::Output) {
        print_info(&format!(
            "Credentials resolved from the {} source",
            output.credential.source
        ));
        println!();

        let chain: Vec<String> = output.chain.iter().map(|s| s.to_string()).collect();
        let rows = vec![
            ("Region".to_string(), output.region.clone()),
            ("Source".to_string(), output.credential.source.to_string()),
            ("Access key".to_string(), output.credential.access_key.clone()),
            (
                "Session token".to_string(),
                if output.credential.has_session_token { "yes" } else { "no" }.to_string(),
            ),
            ("Chain".to_string(), chain.join(" -> ")),
        ];
        print_pairs_table(("Field", "Value"), &rows);
    }
}

pub async fn resolve(config: Config, format: &OutputFormat) -> Result<(), CredkitError> {
    ResolveCommand.execute(format, ResolveArgs { config }).await
}

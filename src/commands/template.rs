use crate::OutputFormat;
use crate::display::format_json_output;
use async_trait::async_trait;
use credkit::CredkitError;
use serde::Serialize;

/// Template method trait for CREDKIT commands
#[async_trait]
pub trait CommandTemplate: Sync {
    /// Input arguments type for this command
    type Args: Send;
    /// Output result type for this command
    type Output: Serialize + Send;

    fn validate_args(&self, _args: &Self::Args) -> Result<(), CredkitError> {
        Ok(())
    }

    async fn execute_operation(&self, args: Self::Args) -> Result<Self::Output, CredkitError>;

    fn format_table(&self, output: &Self::Output);

    async fn execute(&self, format: &OutputFormat, args: Self::Args) -> Result<(), CredkitError> {
        self.validate_args(&args)?;

        let output = self.execute_operation(args).await?;

        match format {
            OutputFormat::Json => println!("{}", format_json_output(&output)?),
            OutputFormat::Table => self.format_table(&output),
        }

        Ok(())
    }
}

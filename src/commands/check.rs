use crate::OutputFormat;
use crate::commands::template::CommandTemplate;
use crate::display::{print_pairs_table, print_success, print_warning, status_label};
use crate::types::{CheckOutput, CredentialSummary, ServiceEndpoint};
use async_trait::async_trait;
use credkit::{AwsClient, Bootstrap, Config, CredkitError, ResolvedCredential, Verdict};

#[derive(Debug)]
pub struct CheckArgs {
    pub config: Config,
}

/// Runs the full bootstrap, including the IAM identity call.
pub struct CheckCommand;

#[async_trait]
impl CommandTemplate for CheckCommand {
    type Args = CheckArgs;
    type Output = CheckOutput;

    async fn execute_operation(&self, args: Self::Args) -> Result<Self::Output, CredkitError> {
        let client = Bootstrap::new(args.config).connect().await?;
        Ok(summarize(&client))
    }

    fn format_table(&self, output: &Self::Output) {
        match output.verdict {
            Verdict::AssumedRole => {
                print_warning("Connected, but the caller could not describe itself")
            }
            _ => print_success(&format!("Connected to AWS in {}", output.region)),
        }
        println!();

        let credential = &output.credential;
        let rows = vec![
            ("Region".to_string(), output.region.clone()),
            ("Source".to_string(), credential.source.to_string()),
            ("Access key".to_string(), credential.access_key.clone()),
            (
                "Session token".to_string(),
                yes_no(credential.has_session_token).to_string(),
            ),
            (
                "Expires".to_string(),
                credential
                    .expires_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string()),
            ),
            ("Max attempts".to_string(), output.max_attempts.to_string()),
            (
                "TLS verification".to_string(),
                status_label(
                    output.verifies_certificates,
                    if output.verifies_certificates { "on" } else { "OFF" },
                ),
            ),
            ("Request hooks".to_string(), output.request_hooks.join(", ")),
            (
                "Validation".to_string(),
                status_label(!output.verdict.is_fatal(), output.verdict.describe()),
            ),
        ];
        print_pairs_table(("Field", "Value"), &rows);
        println!();

        let services: Vec<(String, String)> = output
            .services
            .iter()
            .map(|s| {
                (
                    s.service.to_string(),
                    s.endpoint.clone().unwrap_or_else(|| "default".to_string()),
                )
            })
            .collect();
        print_pairs_table(("Service", "Endpoint"), &services);
    }
}

pub(crate) fn credential_summary(credential: &ResolvedCredential) -> CredentialSummary {
    CredentialSummary {
        source: credential.source(),
        access_key: credential.masked_access_key(),
        has_session_token: credential.session_token().is_some(),
        expires_at: credential.expires_at(),
    }
}

fn summarize(client: &AwsClient) -> CheckOutput {
    let context = client.context();
    CheckOutput {
        region: client.region().to_string(),
        credential: credential_summary(context.credential()),
        max_attempts: context.retry().max_attempts(),
        verifies_certificates: context.transport().verifies_certificates(),
        request_hooks: context
            .hooks()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        verdict: client.verdict(),
        services: client
            .services()
            .into_iter()
            .map(|(service, endpoint)| ServiceEndpoint {
                service,
                endpoint: endpoint.map(str::to_string),
            })
            .collect(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub async fn check(config: Config, format: &OutputFormat) -> Result<(), CredkitError> {
    CheckCommand.execute(format, CheckArgs { config }).await
}

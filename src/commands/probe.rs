use crate::OutputFormat;
use crate::commands::template::CommandTemplate;
use crate::display::{print_info, status_label};
use crate::types::ProbeOutput;
use async_trait::async_trait;
use credkit::metadata::{HttpMetadataProbe, MetadataProbe};
use credkit::{CredkitError, Env};
use std::time::Duration;

#[derive(Debug)]
pub struct ProbeArgs {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
}

pub struct ProbeCommand;

#[async_trait]
impl CommandTemplate for ProbeCommand {
    type Args = ProbeArgs;
    type Output = ProbeOutput;

    async fn execute_operation(&self, args: Self::Args) -> Result<Self::Output, CredkitError> {
        let mut probe = match args.url {
            Some(url) => HttpMetadataProbe::new(url),
            None => HttpMetadataProbe::from_env(&Env::real()),
        };
        if let Some(ms) = args.timeout_ms {
            probe = probe.with_timeout(Duration::from_millis(ms));
        }

        let eligible = probe.is_eligible().await;
        Ok(ProbeOutput {
            url: probe.base_url().to_string(),
            eligible,
        })
    }

    fn format_table(&self, output: &Self::Output) {
        let verdict = if output.eligible {
            status_label(true, "EC2 metadata service found")
        } else {
            status_label(false, "no EC2 metadata service")
        };
        print_info(&format!("{}: {}", output.url, verdict));
    }
}

pub async fn probe(
    url: Option<String>,
    timeout_ms: Option<u64>,
    format: &OutputFormat,
) -> Result<(), CredkitError> {
    ProbeCommand
        .execute(format, ProbeArgs { url, timeout_ms })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_reports_eligibility() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).insert_header("Server", "EC2ws"))
            .mount(&server)
            .await;

        let output = ProbeCommand
            .execute_operation(ProbeArgs {
                url: Some(format!("{}/latest", server.uri())),
                timeout_ms: Some(1000),
            })
            .await
            .unwrap();

        assert!(output.eligible);
        assert!(output.url.ends_with("/latest"));
    }
}

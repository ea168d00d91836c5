//! Detection of an EC2 instance metadata service.
//!
//! The probe only decides whether the instance-role credential source is worth adding to
//! the chain. It is a heuristic, not a security boundary: any failure is a negative signal.

use crate::env::Env;
use async_trait::async_trait;
use reqwest::header::SERVER;
use std::time::Duration;

pub const METADATA_URL_ENV: &str = "AWS_METADATA_URL";
pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254:80/latest";
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

#[async_trait]
pub trait MetadataProbe: Send + Sync {
    /// Base URL of the metadata service (e.g. `http://169.254.169.254:80/latest`).
    fn base_url(&self) -> &str;

    /// Whether the environment looks like it runs inside EC2.
    async fn is_eligible(&self) -> bool;
}

/// Returns the metadata base URL, honouring the `AWS_METADATA_URL` override.
pub fn metadata_base_url(env: &Env) -> String {
    env.get(METADATA_URL_ENV)
        .unwrap_or_else(|| DEFAULT_METADATA_URL.to_string())
}

/// EC2 answers metadata requests with a `Server: EC2ws` header; anything else listening
/// on the link-local address is ignored.
pub fn is_provider_server(server_header: &str) -> bool {
    server_header.contains("EC2")
}

/// Single short-timeout GET against the metadata base URL.
#[derive(Debug, Clone)]
pub struct HttpMetadataProbe {
    base_url: String,
    timeout: Duration,
}

impl HttpMetadataProbe {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn from_env(env: &Env) -> Self {
        Self::new(metadata_base_url(env))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MetadataProbe for HttpMetadataProbe {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn is_eligible(&self) -> bool {
        let client = match reqwest::Client::builder().timeout(self.timeout).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::debug!("Could not build metadata probe client: {}", e);
                return false;
            }
        };

        match client.get(&self.base_url).send().await {
            Ok(response) => response
                .headers()
                .get(SERVER)
                .and_then(|value| value.to_str().ok())
                .is_some_and(is_provider_server),
            Err(e) => {
                tracing::trace!("Metadata probe to {} failed: {}", self.base_url, e);
                false
            }
        }
    }
}

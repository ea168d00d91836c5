//! Shared connection context backing every service client.

mod hooks;
mod transport;

pub use hooks::{
    ProductUserAgent, RequestHooks, RequestLog, SDK_LOG_TAG, SdkLogger, append_product_token,
};
pub use transport::Transport;

use crate::config::Config;
use crate::credentials::ResolvedCredential;
use crate::error::BootstrapError;
use crate::services::Service;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_smithy_types::retry::RetryConfig;
use aws_types::SdkConfig;
use aws_types::region::Region;
use std::collections::BTreeMap;
use std::fmt;

pub const PRODUCT_NAME: &str = "credkit";

/// `name/version` token identifying this tool in request user agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductToken {
    name: String,
    version: String,
}

impl ProductToken {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for ProductToken {
    fn default() -> Self {
        Self::new(PRODUCT_NAME, env!("CREDKIT_VERSION"))
    }
}

impl fmt::Display for ProductToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Diagnostic and identification settings handed to the [`ClientFactory`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub debug_logging: bool,
    pub product: ProductToken,
}

impl SessionOptions {
    /// Samples the active log level once.
    pub fn current() -> Self {
        Self {
            debug_logging: crate::logging::debug_enabled(),
            product: ProductToken::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// The initial request plus every retry.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::standard().with_max_attempts(self.max_attempts())
    }
}

/// Credential, region, retry policy, transport and request hooks shared by all clients.
pub struct ConnectionContext {
    credential: ResolvedCredential,
    region: String,
    retry: RetryPolicy,
    transport: Transport,
    hooks: RequestHooks,
    endpoints: BTreeMap<Service, String>,
    sdk_config: SdkConfig,
}

impl ConnectionContext {
    pub fn credential(&self) -> &ResolvedCredential {
        &self.credential
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn hooks(&self) -> &RequestHooks {
        &self.hooks
    }

    pub fn endpoint_for(&self, service: Service) -> Option<&str> {
        self.endpoints.get(&service).map(String::as_str)
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("credential", &self.credential)
            .field("region", &self.region)
            .field("retry", &self.retry)
            .field("transport", &self.transport)
            .field("hooks", &self.hooks.names())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

pub struct ClientFactory {
    options: SessionOptions,
}

impl ClientFactory {
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }

    /// Assembles the session every service client is derived from.
    pub fn build(
        &self,
        config: &Config,
        credential: ResolvedCredential,
    ) -> Result<ConnectionContext, BootstrapError> {
        for (service, endpoint) in &config.endpoints {
            reqwest::Url::parse(endpoint).map_err(|e| {
                BootstrapError::Build(format!(
                    "invalid endpoint override for {}: {} ({})",
                    service, endpoint, e
                ))
            })?;
        }

        let retry = RetryPolicy::new(config.max_retries);
        let transport = Transport::new(config.insecure);

        let mut hooks = RequestHooks::new();
        if self.options.debug_logging {
            hooks.push_back(RequestLog::new(SdkLogger::new()));
        }
        hooks.push_front(ProductUserAgent::new(self.options.product.to_string()));

        let mut builder = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(
                credential.to_sdk_credentials(),
            ))
            .retry_config(retry.to_retry_config());
        if let Some(http_client) = transport.http_client() {
            builder = builder.http_client(http_client);
        }

        Ok(ConnectionContext {
            credential,
            region: config.region.clone(),
            retry,
            transport,
            hooks,
            endpoints: config.endpoints.clone(),
            sdk_config: builder.build(),
        })
    }
}

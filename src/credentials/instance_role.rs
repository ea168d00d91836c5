use super::{ResolvedCredential, SourceKind};
use crate::error::CredentialError;
use aws_config::imds;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::provider::error::CredentialsError;
use chrono::{DateTime, Utc};

/// Temporary credentials for the IAM role attached to an EC2 instance.
///
/// Reads go through the SDK metadata client, which fetches an IMDSv2 session token first.
#[derive(Debug, Clone)]
pub struct InstanceRole {
    base_url: String,
}

impl InstanceRole {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// The metadata client adds the `/latest` API prefix itself.
    fn endpoint(&self) -> &str {
        let base = self.base_url.trim_end_matches('/');
        base.strip_suffix("/latest").unwrap_or(base)
    }

    pub(super) async fn resolve(&self) -> Result<Option<ResolvedCredential>, CredentialError> {
        let client = imds::Client::builder()
            .endpoint(self.endpoint())
            .map_err(|e| CredentialError::MetadataEndpoint {
                url: self.base_url.clone(),
                message: e.to_string(),
            })?
            .build();
        let provider = ImdsCredentialsProvider::builder().imds_client(client).build();

        match provider.provide_credentials().await {
            Ok(credentials) => Ok(Some(ResolvedCredential::new(
                credentials.access_key_id(),
                credentials.secret_access_key(),
                credentials.session_token().map(str::to_string),
                credentials.expiry().map(DateTime::<Utc>::from),
                SourceKind::InstanceRole,
            ))),
            Err(CredentialsError::CredentialsNotLoaded(_)) => {
                tracing::trace!("No instance role available at {}", self.base_url);
                Ok(None)
            }
            Err(source) => Err(CredentialError::InstanceRole {
                url: self.base_url.clone(),
                source,
            }),
        }
    }
}

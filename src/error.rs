use aws_credential_types::provider::error::CredentialsError;
use aws_smithy_types::error::display::DisplayErrorContext;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while a credential source was being read.
///
/// "Source not available here" is not an error; sources report that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(
        "failed to load profile {profile} from {}: {}",
        path.display(),
        DisplayErrorContext(source)
    )]
    SharedFile {
        path: PathBuf,
        profile: String,
        #[source]
        source: CredentialsError,
    },

    #[error("invalid instance metadata endpoint {url}: {message}")]
    MetadataEndpoint { url: String, message: String },

    #[error(
        "instance role credentials from {url} could not be loaded: {}",
        DisplayErrorContext(source)
    )]
    InstanceRole {
        url: String,
        #[source]
        source: CredentialsError,
    },
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Not a valid region: {0}")]
    InvalidRegion(String),

    #[error(
        "No valid credential sources found for AWS.\n  \
         Supply access_key and secret_key, set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY,\n  \
         configure a profile in the shared credentials file, or run on an instance\n  \
         with an attached IAM role"
    )]
    NoCredentialSources,

    #[error("Error loading credentials for AWS: {0}")]
    CredentialLoad(#[from] CredentialError),

    #[error("Error building AWS connection: {0}")]
    Build(String),

    #[error("Failed authenticating with AWS: please verify credentials")]
    AuthenticationFailed,

    #[error("Error validating AWS credentials: {0}")]
    Validation(String),
}

/// Every independent problem found while bootstrapping, reported together.
#[derive(Debug, Default)]
pub struct BootstrapErrors {
    errors: Vec<BootstrapError>,
}

impl BootstrapErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: BootstrapError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[BootstrapError] {
        &self.errors
    }
}

impl From<BootstrapError> for BootstrapErrors {
    fn from(error: BootstrapError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for BootstrapErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} error(s) occurred:\n", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n* {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for BootstrapErrors {}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "AWS region is required: pass --region or set AWS_REGION / AWS_DEFAULT_REGION \
         (for example us-east-1)"
    )]
    MissingRegion,

    #[error("max_retries must not be negative, got {0}")]
    NegativeRetries(i64),

    #[error(
        "unknown service '{0}' in endpoint overrides \
         (expected iam, cognito-identity, cognito-idp or organizations)"
    )]
    UnknownService(String),
}

#[derive(Debug, Error)]
pub enum CredkitError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Bootstrap(#[from] BootstrapErrors),

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl From<BootstrapError> for CredkitError {
    fn from(error: BootstrapError) -> Self {
        CredkitError::Bootstrap(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_lists_every_error() {
        let mut errors = BootstrapErrors::new();
        errors.push(BootstrapError::InvalidRegion("mars-central-1".to_string()));
        errors.push(BootstrapError::AuthenticationFailed);

        let rendered = errors.to_string();
        assert!(rendered.starts_with("2 error(s) occurred:"));
        assert!(rendered.contains("* Not a valid region: mars-central-1"));
        assert!(rendered.contains("* Failed authenticating with AWS"));
    }

    #[test]
    fn test_no_credential_sources_has_guidance() {
        let message = BootstrapError::NoCredentialSources.to_string();
        assert!(message.contains("AWS_ACCESS_KEY_ID"));
        assert!(message.contains("shared credentials file"));
    }

    #[test]
    fn test_credential_error_wraps_cause() {
        let error: BootstrapError = CredentialError::SharedFile {
            path: PathBuf::from("/tmp/creds"),
            profile: "deploy".to_string(),
            source: CredentialsError::invalid_configuration("missing aws_secret_access_key"),
        }
        .into();

        let message = error.to_string();
        assert!(message.starts_with("Error loading credentials for AWS:"));
        assert!(message.contains("profile deploy from /tmp/creds"));
        assert!(message.contains("missing aws_secret_access_key"));
    }
}

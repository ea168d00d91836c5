use super::{ResolvedCredential, SourceKind};
use crate::env::Env;
use crate::error::CredentialError;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::provider::error::CredentialsError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

const CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";
const PROFILE_ENV: &str = "AWS_PROFILE";
const DEFAULT_PROFILE: &str = "default";

/// A named profile in an AWS shared credentials file.
#[derive(Debug, Clone)]
pub struct SharedFileProfile {
    path: Option<PathBuf>,
    profile: Option<String>,
}

impl SharedFileProfile {
    pub fn new(path: Option<PathBuf>, profile: &str) -> Self {
        Self {
            path,
            profile: Some(profile.to_string()).filter(|p| !p.is_empty()),
        }
    }

    /// Configured path, then `AWS_SHARED_CREDENTIALS_FILE`, then `~/.aws/credentials`.
    pub fn file_path(&self, env: &Env) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| env.get(CREDENTIALS_FILE_ENV).map(PathBuf::from))
            .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("credentials")))
    }

    /// Configured profile, then `AWS_PROFILE`, then `default`.
    pub fn profile_name(&self, env: &Env) -> String {
        self.profile
            .clone()
            .or_else(|| env.get(PROFILE_ENV))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    pub(super) async fn resolve(
        &self,
        env: &Env,
    ) -> Result<Option<ResolvedCredential>, CredentialError> {
        let Some(path) = self.file_path(env) else {
            return Ok(None);
        };
        let profile = self.profile_name(env);

        // Only the credentials file is read; the config file belongs to other tooling.
        let files = ProfileFiles::builder()
            .with_file(ProfileFileKind::Credentials, path.clone())
            .build();
        let provider = ProfileFileCredentialsProvider::builder()
            .profile_files(files)
            .profile_name(profile.clone())
            .build();

        match provider.provide_credentials().await {
            Ok(credentials) => Ok(Some(ResolvedCredential::new(
                credentials.access_key_id(),
                credentials.secret_access_key(),
                credentials.session_token().map(str::to_string),
                credentials.expiry().map(DateTime::<Utc>::from),
                SourceKind::SharedFile,
            ))),
            Err(CredentialsError::CredentialsNotLoaded(_)) => {
                tracing::trace!("No credentials for profile {} in {}", profile, path.display());
                Ok(None)
            }
            Err(source) => Err(CredentialError::SharedFile {
                path,
                profile,
                source,
            }),
        }
    }
}

//! Ordered credential chain.
//!
//! Sources are tried in a fixed priority order (static values, environment, shared
//! credentials file, then instance role when the metadata probe says so). The first source
//! that yields material wins and the result is cached for the lifetime of the chain.

mod environment;
mod instance_role;
mod shared_file;

pub use instance_role::InstanceRole;
pub use shared_file::SharedFileProfile;

use crate::config::Config;
use crate::env::Env;
use crate::error::{BootstrapError, CredentialError};
use crate::metadata::MetadataProbe;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::SystemTime;
use tokio::sync::OnceCell;
use zeroize::Zeroizing;

/// Which kind of source produced a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Static,
    Environment,
    SharedFile,
    InstanceRole,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Static => "static",
            SourceKind::Environment => "environment",
            SourceKind::SharedFile => "shared-file",
            SourceKind::InstanceRole => "instance-role",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete key material produced by exactly one source.
///
/// Secret parts are zeroized on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct ResolvedCredential {
    access_key_id: String,
    secret_access_key: Zeroizing<String>,
    session_token: Option<Zeroizing<String>>,
    expires_at: Option<DateTime<Utc>>,
    source: SourceKind,
}

impl ResolvedCredential {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
        source: SourceKind,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: Zeroizing::new(secret_access_key.into()),
            session_token: session_token.filter(|t| !t.is_empty()).map(Zeroizing::new),
            expires_at,
            source,
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_ref().map(|t| t.as_str())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn masked_access_key(&self) -> String {
        mask_access_key(&self.access_key_id)
    }

    pub fn to_sdk_credentials(&self) -> aws_credential_types::Credentials {
        aws_credential_types::Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.to_string(),
            self.session_token.as_ref().map(|t| t.to_string()),
            self.expires_at.map(SystemTime::from),
            self.source.as_str(),
        )
    }
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("access_key_id", &self.masked_access_key())
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .field("expires_at", &self.expires_at)
            .field("source", &self.source)
            .finish()
    }
}

/// Keeps the first and last four characters of an access key.
pub fn mask_access_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}

/// Explicitly supplied key material.
#[derive(Clone)]
pub struct StaticCredentials {
    access_key: String,
    secret_key: Zeroizing<String>,
    token: Zeroizing<String>,
}

impl StaticCredentials {
    pub fn new(access_key: &str, secret_key: &str, token: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            secret_key: Zeroizing::new(secret_key.to_string()),
            token: Zeroizing::new(token.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_key.is_empty() || self.secret_key.is_empty()
    }

    fn resolve(&self) -> Option<ResolvedCredential> {
        if self.is_empty() {
            return None;
        }
        Some(ResolvedCredential::new(
            self.access_key.clone(),
            self.secret_key.to_string(),
            Some(self.token.to_string()),
            None,
            SourceKind::Static,
        ))
    }
}

/// One mechanism able to supply access-key material.
#[derive(Clone)]
pub enum CredentialSource {
    Static(StaticCredentials),
    Environment,
    SharedFile(SharedFileProfile),
    InstanceRole(InstanceRole),
}

impl CredentialSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            CredentialSource::Static(_) => SourceKind::Static,
            CredentialSource::Environment => SourceKind::Environment,
            CredentialSource::SharedFile(_) => SourceKind::SharedFile,
            CredentialSource::InstanceRole(_) => SourceKind::InstanceRole,
        }
    }

    /// `Ok(None)` means the source has nothing to offer in this environment.
    pub async fn resolve(&self, env: &Env) -> Result<Option<ResolvedCredential>, CredentialError> {
        match self {
            CredentialSource::Static(creds) => Ok(creds.resolve()),
            CredentialSource::Environment => Ok(environment::resolve(env)),
            CredentialSource::SharedFile(profile) => profile.resolve(env).await,
            CredentialSource::InstanceRole(role) => role.resolve().await,
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().as_str())
    }
}

pub struct CredentialChain {
    sources: Vec<CredentialSource>,
    env: Env,
    resolved: OnceCell<ResolvedCredential>,
}

impl CredentialChain {
    /// Builds the chain for `config`. The instance-role source is only appended when
    /// `probe` reports a reachable EC2 metadata service.
    pub async fn build(config: &Config, env: &Env, probe: &dyn MetadataProbe) -> Self {
        let mut sources = vec![
            CredentialSource::Static(StaticCredentials::new(
                &config.access_key,
                &config.secret_key,
                &config.token,
            )),
            CredentialSource::Environment,
            CredentialSource::SharedFile(SharedFileProfile::new(
                config.shared_credentials_file.clone(),
                &config.profile,
            )),
        ];

        if probe.is_eligible().await {
            tracing::debug!("EC2 Metadata service found, adding EC2 Role Credential Provider");
            sources.push(CredentialSource::InstanceRole(InstanceRole::new(probe.base_url())));
        } else {
            tracing::debug!("EC2 Metadata service not found, not adding EC2 Role Credential Provider");
        }

        Self::from_sources(sources, env.clone())
    }

    pub fn from_sources(sources: Vec<CredentialSource>, env: Env) -> Self {
        Self {
            sources,
            env,
            resolved: OnceCell::new(),
        }
    }

    pub fn sources(&self) -> &[CredentialSource] {
        &self.sources
    }

    pub fn has_source(&self, kind: SourceKind) -> bool {
        self.sources.iter().any(|s| s.kind() == kind)
    }

    /// Resolves at most once; later calls return the committed credential.
    ///
    /// A source that fails to load is skipped. Its error is only reported when no later
    /// source yields a credential.
    pub async fn resolve(&self) -> Result<&ResolvedCredential, BootstrapError> {
        self.resolved
            .get_or_try_init(|| async {
                let mut load_error: Option<CredentialError> = None;

                for source in &self.sources {
                    match source.resolve(&self.env).await {
                        Ok(Some(credential)) => {
                            tracing::debug!(
                                "Using AWS credentials from {} source ({})",
                                credential.source(),
                                credential.masked_access_key()
                            );
                            return Ok(credential);
                        }
                        Ok(None) => {
                            tracing::trace!("No AWS credentials from {} source", source.kind());
                        }
                        Err(err) => {
                            tracing::warn!(
                                "Skipping {} credential source: {}",
                                source.kind(),
                                err
                            );
                            if load_error.is_none() {
                                load_error = Some(err);
                            }
                        }
                    }
                }

                Err(match load_error {
                    Some(err) => BootstrapError::CredentialLoad(err),
                    None => BootstrapError::NoCredentialSources,
                })
            })
            .await
    }
}

//! The end-to-end bootstrap: region check, credential chain, session, validation, clients.

use crate::config::Config;
use crate::credentials::{CredentialChain, ResolvedCredential, SourceKind};
use crate::env::Env;
use crate::error::{BootstrapError, BootstrapErrors};
use crate::metadata::{HttpMetadataProbe, MetadataProbe};
use crate::region::validate_region;
use crate::services::{AwsClient, Service};
use crate::session::{ClientFactory, SessionOptions};
use crate::validate::{IamGetUser, IdentityCheck, validate_credentials};
use std::sync::Arc;

/// Everything needed to turn a [`Config`] into an [`AwsClient`].
///
/// The metadata probe and identity check default to the real network calls and can be
/// replaced for offline use.
pub struct Bootstrap {
    config: Config,
    env: Env,
    probe: Option<Box<dyn MetadataProbe>>,
    identity: Box<dyn IdentityCheck>,
    options: Option<SessionOptions>,
}

/// The outcome of the credential phase alone.
#[derive(Debug)]
pub struct ResolvedChain {
    pub credential: ResolvedCredential,
    pub sources: Vec<SourceKind>,
}

impl Bootstrap {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            env: Env::real(),
            probe: None,
            identity: Box::new(IamGetUser),
            options: None,
        }
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn with_probe(mut self, probe: impl MetadataProbe + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    pub fn with_identity_check(mut self, check: impl IdentityCheck + 'static) -> Self {
        self.identity = Box::new(check);
        self
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn region_and_chain(&self) -> Result<CredentialChain, BootstrapError> {
        tracing::info!("Building AWS region structure");
        validate_region(&self.config.region)?;

        tracing::info!("Building AWS auth structure");
        let chain = match &self.probe {
            Some(probe) => CredentialChain::build(&self.config, &self.env, probe.as_ref()).await,
            None => {
                let probe = HttpMetadataProbe::from_env(&self.env);
                CredentialChain::build(&self.config, &self.env, &probe).await
            }
        };
        Ok(chain)
    }

    /// Validates the region and resolves credentials without creating any client.
    pub async fn resolve_credentials(&self) -> Result<ResolvedChain, BootstrapError> {
        let chain = self.region_and_chain().await?;
        let credential = chain.resolve().await?.clone();
        Ok(ResolvedChain {
            credential,
            sources: chain.sources().iter().map(|s| s.kind()).collect(),
        })
    }

    /// Runs every phase in order and returns the client bundle.
    ///
    /// Nothing downstream of a failed phase runs. The IAM identity call is the only
    /// network request besides the metadata probe and an instance-role fetch.
    pub async fn connect(self) -> Result<AwsClient, BootstrapErrors> {
        let chain = self.region_and_chain().await?;

        // Credentials are fetched eagerly so a broken chain fails here, not on first use.
        let credential = chain.resolve().await?.clone();

        let options = self.options.unwrap_or_else(SessionOptions::current);
        let context = Arc::new(ClientFactory::new(options).build(&self.config, credential)?);

        Service::Iam.log_initializing();
        let iam = context.iam_client();

        let mut errors = BootstrapErrors::new();
        let verdict = match validate_credentials(self.identity.as_ref(), &iam).await {
            Ok(verdict) => verdict,
            Err(err) => {
                errors.push(err);
                return Err(errors);
            }
        };

        Ok(AwsClient::assemble(context, iam, verdict))
    }
}

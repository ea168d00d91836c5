mod check;
mod probe;
mod regions;
mod resolve;
pub mod template;

pub use check::check;
pub use probe::probe;
pub use regions::regions;
pub use resolve::resolve;

use clap::Args;
use credkit::{Config, CredkitError, Env, Settings};
use std::path::PathBuf;

/// Provider settings accepted on the command line. Flags override the settings file.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(short = 'c', long, global = true, help = "Path to a JSON settings file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "AWS access key (prefer the environment or a profile)")]
    pub access_key: Option<String>,

    #[arg(long, global = true, help = "AWS secret key (prefer the environment or a profile)")]
    pub secret_key: Option<String>,

    #[arg(long, global = true, help = "Session token for temporary credentials")]
    pub token: Option<String>,

    #[arg(short = 'p', long, global = true, help = "Profile in the shared credentials file")]
    pub profile: Option<String>,

    #[arg(long, global = true, help = "Path to the shared credentials file")]
    pub shared_credentials_file: Option<String>,

    #[arg(
        short = 'r',
        long,
        global = true,
        help = "AWS region (falls back to AWS_REGION, then AWS_DEFAULT_REGION)"
    )]
    pub region: Option<String>,

    #[arg(long, global = true, help = "Maximum retries per request (default: 11)")]
    pub max_retries: Option<i64>,

    #[arg(long, global = true, help = "Disable TLS certificate verification")]
    pub insecure: bool,

    #[arg(long, global = true, help = "Custom IAM endpoint URL")]
    pub iam_endpoint: Option<String>,
}

impl SettingsArgs {
    pub fn to_settings(&self) -> Result<Settings, CredkitError> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        if let Some(access_key) = &self.access_key {
            settings.access_key = access_key.clone();
        }
        if let Some(secret_key) = &self.secret_key {
            settings.secret_key = secret_key.clone();
        }
        if let Some(token) = &self.token {
            settings.token = token.clone();
        }
        if let Some(profile) = &self.profile {
            settings.profile = profile.clone();
        }
        if let Some(path) = &self.shared_credentials_file {
            settings.shared_credentials_file = path.clone();
        }
        if let Some(region) = &self.region {
            settings.region = Some(region.clone());
        }
        if let Some(max_retries) = self.max_retries {
            settings.max_retries = max_retries;
        }
        if self.insecure {
            settings.insecure = true;
        }
        if let Some(endpoint) = &self.iam_endpoint {
            settings.iam_endpoint = endpoint.clone();
        }

        Ok(settings)
    }

    pub fn load(&self, env: &Env) -> Result<Config, CredkitError> {
        Ok(Config::from_settings(self.to_settings()?, env)?)
    }
}

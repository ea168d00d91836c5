//! Operator settings and the immutable configuration derived from them.

use crate::env::Env;
use crate::error::ConfigError;
use crate::services::Service;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_RETRIES: u32 = 11;
pub const REGION_ENV_VARS: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Declared settings as supplied by the operator, before validation.
///
/// Every field is optional in the settings file; defaults match the provider schema.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub access_key: String,
    pub secret_key: String,
    pub profile: String,
    pub max_retries: i64,
    pub token: String,
    pub region: Option<String>,
    pub shared_credentials_file: String,
    pub insecure: bool,
    pub iam_endpoint: String,
    /// Endpoint overrides keyed by service name (`iam`, `cognito-identity`, ...).
    pub endpoints: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            profile: String::new(),
            max_retries: DEFAULT_MAX_RETRIES as i64,
            token: String::new(),
            region: None,
            shared_credentials_file: String::new(),
            insecure: false,
            iam_endpoint: String::new(),
            endpoints: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Validated connection and authentication policy. Never mutated after creation.
#[derive(Clone)]
pub struct Config {
    pub access_key: String,
    pub secret_key: String,
    pub token: String,
    pub profile: String,
    pub shared_credentials_file: Option<PathBuf>,
    pub region: String,
    pub max_retries: u32,
    pub insecure: bool,
    pub endpoints: BTreeMap<Service, String>,
}

impl Config {
    pub fn builder(region: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(region)
    }

    /// Validates raw settings, falling back to `AWS_REGION` then `AWS_DEFAULT_REGION`
    /// when no region was declared.
    pub fn from_settings(settings: Settings, env: &Env) -> Result<Self, ConfigError> {
        let region = settings
            .region
            .filter(|r| !r.trim().is_empty())
            .or_else(|| env.first_of(&REGION_ENV_VARS))
            .ok_or(ConfigError::MissingRegion)?;

        let max_retries = u32::try_from(settings.max_retries)
            .map_err(|_| ConfigError::NegativeRetries(settings.max_retries))?;

        let mut endpoints = BTreeMap::new();
        for (name, url) in settings.endpoints {
            let service: Service = name.parse()?;
            if !url.is_empty() {
                endpoints.insert(service, url);
            }
        }
        if !settings.iam_endpoint.is_empty() {
            endpoints.insert(Service::Iam, settings.iam_endpoint);
        }

        let shared_credentials_file = Some(settings.shared_credentials_file)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            access_key: settings.access_key,
            secret_key: settings.secret_key,
            token: settings.token,
            profile: settings.profile,
            shared_credentials_file,
            region,
            max_retries,
            insecure: settings.insecure,
            endpoints,
        })
    }

    pub fn endpoint_for(&self, service: Service) -> Option<&str> {
        self.endpoints.get(&service).map(String::as_str)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_key", &crate::credentials::mask_access_key(&self.access_key))
            .field("secret_key", &redacted(&self.secret_key))
            .field("token", &redacted(&self.token))
            .field("profile", &self.profile)
            .field("shared_credentials_file", &self.shared_credentials_file)
            .field("region", &self.region)
            .field("max_retries", &self.max_retries)
            .field("insecure", &self.insecure)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "** redacted **" }
}

/// Programmatic construction of a [`Config`] without going through [`Settings`].
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            config: Config {
                access_key: String::new(),
                secret_key: String::new(),
                token: String::new(),
                profile: String::new(),
                shared_credentials_file: None,
                region: region.into(),
                max_retries: DEFAULT_MAX_RETRIES,
                insecure: false,
                endpoints: BTreeMap::new(),
            },
        }
    }

    pub fn static_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.config.access_key = access_key.into();
        self.config.secret_key = secret_key.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config.profile = profile.into();
        self
    }

    pub fn shared_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.shared_credentials_file = Some(path.into());
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.config.insecure = insecure;
        self
    }

    pub fn endpoint(mut self, service: Service, url: impl Into<String>) -> Self {
        self.config.endpoints.insert(service, url.into());
        self
    }

    pub fn iam_endpoint(self, url: impl Into<String>) -> Self {
        self.endpoint(Service::Iam, url)
    }

    pub fn build(self) -> Config {
        self.config
    }
}

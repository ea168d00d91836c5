//! AWS credential resolution and client bootstrap.
//!
//! A [`Config`] is validated, credentials are resolved through an ordered chain, a single
//! session is assembled and checked with one IAM identity call, and typed service clients
//! are derived from it.
//!
//! ```no_run
//! # async fn run() -> Result<(), credkit::BootstrapErrors> {
//! let config = credkit::Config::builder("us-east-1").profile("deploy").build();
//! let client = credkit::Bootstrap::new(config).connect().await?;
//! println!("connected to {}", client.region());
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod env;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod region;
pub mod services;
pub mod session;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use bootstrap::{Bootstrap, ResolvedChain};
pub use config::{Config, ConfigBuilder, Settings};
pub use credentials::{CredentialChain, ResolvedCredential, SourceKind};
pub use env::Env;
pub use error::{BootstrapError, BootstrapErrors, ConfigError, CredentialError, CredkitError};
pub use services::{AwsClient, Service};
pub use validate::Verdict;

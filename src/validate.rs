//! Early credential validation.
//!
//! One IAM `GetUser` call is made before anything else uses the session. Roles and
//! instance profiles commonly lack permission to describe themselves, so a
//! permission-denied answer is accepted with a warning instead of failing the bootstrap.

use crate::error::BootstrapError;
use async_trait::async_trait;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};
use serde::Serialize;
use std::fmt;

/// Error codes meaning "valid credentials, but not allowed to describe the caller".
pub const PERMISSION_DENIED_CODES: &[&str] = &["AccessDenied", "ValidationError"];

/// Error codes meaning the request signature was rejected.
pub const SIGNATURE_MISMATCH_CODES: &[&str] = &["SignatureDoesNotMatch"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// The identity call succeeded.
    Trusted,
    /// The caller may not describe itself; assumed to be a role rather than a user.
    AssumedRole,
    SignatureMismatch,
    Rejected,
}

impl Verdict {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Verdict::SignatureMismatch | Verdict::Rejected)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Verdict::Trusted => "credentials verified",
            Verdict::AssumedRole => "not permitted to describe caller, assuming IAM role",
            Verdict::SignatureMismatch => "signature mismatch",
            Verdict::Rejected => "rejected",
        }
    }
}

/// A failed service call, reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub code: Option<String>,
    pub message: String,
}

impl ServiceFailure {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Maps the outcome of the identity call to exactly one verdict.
pub fn classify(outcome: &Result<(), ServiceFailure>) -> Verdict {
    let failure = match outcome {
        Ok(()) => return Verdict::Trusted,
        Err(failure) => failure,
    };

    match failure.code.as_deref() {
        Some(code) if PERMISSION_DENIED_CODES.contains(&code) => Verdict::AssumedRole,
        Some(code) if SIGNATURE_MISMATCH_CODES.contains(&code) => Verdict::SignatureMismatch,
        _ => Verdict::Rejected,
    }
}

/// The single "who am I" call used to validate a session.
#[async_trait]
pub trait IdentityCheck: Send + Sync {
    async fn who_am_i(&self, iam: &aws_sdk_iam::Client) -> Result<(), ServiceFailure>;
}

/// IAM `GetUser` for the calling identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct IamGetUser;

#[async_trait]
impl IdentityCheck for IamGetUser {
    async fn who_am_i(&self, iam: &aws_sdk_iam::Client) -> Result<(), ServiceFailure> {
        match iam.get_user().send().await {
            Ok(_) => Ok(()),
            Err(err) => Err(ServiceFailure::new(
                err.code(),
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }
}

pub async fn validate_credentials(
    check: &dyn IdentityCheck,
    iam: &aws_sdk_iam::Client,
) -> Result<Verdict, BootstrapError> {
    let outcome = check.who_am_i(iam).await;

    match classify(&outcome) {
        Verdict::Trusted => Ok(Verdict::Trusted),
        Verdict::AssumedRole => {
            tracing::warn!("AccessDenied Error with iam.GetUser, assuming IAM role");
            Ok(Verdict::AssumedRole)
        }
        Verdict::SignatureMismatch => Err(BootstrapError::AuthenticationFailed),
        Verdict::Rejected => Err(BootstrapError::Validation(
            outcome.err().map(|f| f.to_string()).unwrap_or_default(),
        )),
    }
}

//! Call-counting stand-ins for the network seams of the bootstrap.

use crate::metadata::MetadataProbe;
use crate::validate::{IdentityCheck, ServiceFailure};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_types::region::Region;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

#[derive(Clone)]
pub struct StubProbe {
    base_url: String,
    eligible: bool,
    calls: Arc<AtomicUsize>,
}

impl StubProbe {
    pub fn ineligible() -> Self {
        Self {
            base_url: "http://127.0.0.1:9/latest".to_string(),
            eligible: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn eligible(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            eligible: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProbe for StubProbe {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn is_eligible(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.eligible
    }
}

#[derive(Clone)]
pub struct StubIdentityCheck {
    outcome: Result<(), ServiceFailure>,
    calls: Arc<AtomicUsize>,
}

impl StubIdentityCheck {
    pub fn succeeding() -> Self {
        Self {
            outcome: Ok(()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(code: Option<&str>, message: &str) -> Self {
        Self {
            outcome: Err(ServiceFailure::new(code, message)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityCheck for StubIdentityCheck {
    async fn who_am_i(&self, _iam: &aws_sdk_iam::Client) -> Result<(), ServiceFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// An IAM client that is never expected to send anything.
pub fn offline_iam_client() -> aws_sdk_iam::Client {
    let config = aws_sdk_iam::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIA_TEST", "secret", None, None, "test"))
        .build();
    aws_sdk_iam::Client::from_conf(config)
}

pub const METADATA_TOKEN: &str = "imds-session-token";
const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const CREDENTIALS_PATH: &str = "/latest/meta-data/iam/security-credentials/";

/// Matches metadata reads sent without an IMDSv2 session token.
struct MissingSessionToken;

impl Match for MissingSessionToken {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key(TOKEN_HEADER)
    }
}

/// Mounts an instance metadata service that only answers token-authenticated reads.
///
/// `document` is served as the credential document of `role`.
pub async fn mount_instance_role(server: &MockServer, role: &str, document: String) {
    Mock::given(method("PUT"))
        .and(path("/latest/api/token"))
        .and(header_exists("x-aws-ec2-metadata-token-ttl-seconds"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-aws-ec2-metadata-token-ttl-seconds", "21600")
                .set_body_string(METADATA_TOKEN),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(MissingSessionToken)
        .respond_with(ResponseTemplate::new(401))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(CREDENTIALS_PATH))
        .and(header(TOKEN_HEADER, METADATA_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_string(role.to_string()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}{}", CREDENTIALS_PATH, role)))
        .and(header(TOKEN_HEADER, METADATA_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_string(document))
        .expect(1)
        .mount(server)
        .await;
}

pub fn role_document(code: &str, access_key: &str) -> String {
    format!(
        r#"{{
            "Code": "{}",
            "LastUpdated": "2026-10-19T08:00:00Z",
            "Type": "AWS-HMAC",
            "AccessKeyId": "{}",
            "SecretAccessKey": "role-secret",
            "Token": "role-token",
            "Expiration": "2099-01-01T00:00:00Z"
        }}"#,
        code, access_key
    )
}

use chrono::{DateTime, Utc};
use credkit::{Service, SourceKind, Verdict};
use serde::Serialize;

// JSON output structures
#[derive(Serialize, Debug)]
pub struct CheckOutput {
    pub region: String,
    pub credential: CredentialSummary,
    pub max_attempts: u32,
    pub verifies_certificates: bool,
    pub request_hooks: Vec<String>,
    pub verdict: Verdict,
    pub services: Vec<ServiceEndpoint>,
}

#[derive(Serialize, Debug)]
pub struct CredentialSummary {
    pub source: SourceKind,
    pub access_key: String,
    pub has_session_token: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub struct ServiceEndpoint {
    pub service: Service,
    pub endpoint: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ResolveOutput {
    pub region: String,
    pub credential: CredentialSummary,
    pub chain: Vec<SourceKind>,
}

#[derive(Serialize, Debug)]
pub struct ProbeOutput {
    pub url: String,
    pub eligible: bool,
}

#[derive(Serialize, Debug)]
pub struct RegionsOutput {
    pub regions: Vec<String>,
}

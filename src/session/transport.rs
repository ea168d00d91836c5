use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use aws_smithy_runtime_api::client::http::SharedHttpClient;
use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, ServerName};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// HTTP transport shared by every service client of a session.
///
/// The secure transport is the SDK's default pooled HTTPS client. The insecure transport
/// is a pooled hyper client whose TLS layer accepts any server certificate.
#[derive(Clone)]
pub struct Transport {
    insecure: bool,
    http_client: Option<SharedHttpClient>,
}

impl Transport {
    pub fn new(insecure: bool) -> Self {
        if !insecure {
            return Self {
                insecure,
                http_client: None,
            };
        }

        tracing::warn!(
            "INSECURE TRANSPORT: TLS certificate verification is disabled for all AWS requests"
        );
        Self {
            insecure,
            http_client: Some(insecure_http_client()),
        }
    }

    pub fn verifies_certificates(&self) -> bool {
        !self.insecure
    }

    /// Custom HTTP client, if the session must not use the SDK default.
    pub fn http_client(&self) -> Option<SharedHttpClient> {
        self.http_client.clone()
    }

    pub fn describe(&self) -> &'static str {
        if self.insecure {
            "INSECURE (certificate verification disabled)"
        } else {
            "verified TLS"
        }
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("verifies_certificates", &self.verifies_certificates())
            .finish()
    }
}

#[allow(deprecated)]
fn insecure_http_client() -> SharedHttpClient {
    let tls = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
        .with_no_client_auth();

    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .build();

    HyperClientBuilder::new().build(connector)
}

struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_transport_uses_sdk_default() {
        let transport = Transport::new(false);
        assert!(transport.verifies_certificates());
        assert!(transport.http_client().is_none());
        assert_eq!(transport.describe(), "verified TLS");
    }

    #[test]
    fn test_insecure_transport_is_distinguishable() {
        let transport = Transport::new(true);
        assert!(!transport.verifies_certificates());
        assert!(transport.http_client().is_some());
        assert!(transport.describe().starts_with("INSECURE"));
        assert!(format!("{:?}", transport).contains("verifies_certificates: false"));
    }
}

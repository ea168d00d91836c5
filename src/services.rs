//! Typed service clients derived from one [`ConnectionContext`].

use crate::error::ConfigError;
use crate::session::ConnectionContext;
use crate::validate::Verdict;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Service {
    #[serde(rename = "iam")]
    Iam,
    #[serde(rename = "cognito-identity")]
    CognitoIdentity,
    #[serde(rename = "cognito-idp")]
    CognitoIdentityProvider,
    #[serde(rename = "organizations")]
    Organizations,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Iam,
        Service::CognitoIdentity,
        Service::CognitoIdentityProvider,
        Service::Organizations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Iam => "iam",
            Service::CognitoIdentity => "cognito-identity",
            Service::CognitoIdentityProvider => "cognito-idp",
            Service::Organizations => "organizations",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Service::Iam => "IAM",
            Service::CognitoIdentity => "Cognito Identity",
            Service::CognitoIdentityProvider => "Cognito Identity Provider",
            Service::Organizations => "Organizations",
        }
    }

    pub(crate) fn log_initializing(&self) {
        tracing::info!("Initializing {} connection", self.title());
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Service {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.name() == s)
            .ok_or_else(|| ConfigError::UnknownService(s.to_string()))
    }
}

// Every client copies the shared SdkConfig, applies the per-service endpoint override and
// installs the session's request hooks in order.
macro_rules! derive_client {
    ($sdk:ident, $context:expr, $service:expr) => {{
        let context: &ConnectionContext = $context;
        let mut builder = $sdk::config::Builder::from(context.sdk_config());
        if let Some(endpoint) = context.endpoint_for($service) {
            builder = builder.endpoint_url(endpoint);
        }
        for interceptor in context.hooks().interceptors() {
            builder.push_interceptor(interceptor);
        }
        $sdk::Client::from_conf(builder.build())
    }};
}

impl ConnectionContext {
    pub fn iam_client(&self) -> aws_sdk_iam::Client {
        derive_client!(aws_sdk_iam, self, Service::Iam)
    }

    pub fn cognito_identity_client(&self) -> aws_sdk_cognitoidentity::Client {
        derive_client!(aws_sdk_cognitoidentity, self, Service::CognitoIdentity)
    }

    pub fn cognito_idp_client(&self) -> aws_sdk_cognitoidentityprovider::Client {
        derive_client!(
            aws_sdk_cognitoidentityprovider,
            self,
            Service::CognitoIdentityProvider
        )
    }

    pub fn organizations_client(&self) -> aws_sdk_organizations::Client {
        derive_client!(aws_sdk_organizations, self, Service::Organizations)
    }
}

/// The bootstrapped client bundle handed to resource code.
///
/// Built once per process; cloning shares the same session and clients.
#[derive(Clone)]
pub struct AwsClient {
    context: Arc<ConnectionContext>,
    verdict: Verdict,
    iam: aws_sdk_iam::Client,
    cognito_identity: aws_sdk_cognitoidentity::Client,
    cognito_idp: aws_sdk_cognitoidentityprovider::Client,
    organizations: aws_sdk_organizations::Client,
}

impl AwsClient {
    /// Derives the remaining service clients once IAM has been validated.
    pub(crate) fn assemble(
        context: Arc<ConnectionContext>,
        iam: aws_sdk_iam::Client,
        verdict: Verdict,
    ) -> Self {
        Service::CognitoIdentity.log_initializing();
        let cognito_identity = context.cognito_identity_client();

        Service::CognitoIdentityProvider.log_initializing();
        let cognito_idp = context.cognito_idp_client();

        Service::Organizations.log_initializing();
        let organizations = context.organizations_client();

        Self {
            context,
            verdict,
            iam,
            cognito_identity,
            cognito_idp,
            organizations,
        }
    }

    pub fn region(&self) -> &str {
        self.context.region()
    }

    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn iam(&self) -> &aws_sdk_iam::Client {
        &self.iam
    }

    pub fn cognito_identity(&self) -> &aws_sdk_cognitoidentity::Client {
        &self.cognito_identity
    }

    pub fn cognito_idp(&self) -> &aws_sdk_cognitoidentityprovider::Client {
        &self.cognito_idp
    }

    pub fn organizations(&self) -> &aws_sdk_organizations::Client {
        &self.organizations
    }

    /// Each service with its endpoint override, if any.
    pub fn services(&self) -> Vec<(Service, Option<&str>)> {
        Service::ALL
            .into_iter()
            .map(|service| (service, self.context.endpoint_for(service)))
            .collect()
    }
}

impl fmt::Debug for AwsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsClient")
            .field("context", &self.context)
            .field("verdict", &self.verdict)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::credentials::{ResolvedCredential, SourceKind};
    use crate::error::BootstrapError;
    use crate::session::{ClientFactory, ProductToken, SessionOptions};
    use crate::validate::{IamGetUser, validate_credentials};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GET_USER_RESPONSE: &str = r#"<GetUserResponse xmlns="https://iam.amazonaws.com/doc/2010-05-08/">
  <GetUserResult>
    <User>
      <Path>/</Path>
      <UserName>ci</UserName>
      <UserId>AIDAEXAMPLEUSERID</UserId>
      <Arn>arn:aws:iam::123456789012:user/ci</Arn>
      <CreateDate>2020-01-01T00:00:00Z</CreateDate>
    </User>
  </GetUserResult>
  <ResponseMetadata>
    <RequestId>7a62c49f-347e-4fc4-9331-6e8eEXAMPLE</RequestId>
  </ResponseMetadata>
</GetUserResponse>"#;

    const ACCESS_DENIED_RESPONSE: &str = r#"<ErrorResponse xmlns="https://iam.amazonaws.com/doc/2010-05-08/">
  <Error>
    <Type>Sender</Type>
    <Code>AccessDenied</Code>
    <Message>User is not authorized to perform: iam:GetUser</Message>
  </Error>
  <RequestId>7a62c49f-347e-4fc4-9331-6e8eEXAMPLE</RequestId>
</ErrorResponse>"#;

    fn credential() -> ResolvedCredential {
        ResolvedCredential::new("AKIA_TEST", "secret", None, None, SourceKind::Static)
    }

    fn session(config: &Config) -> ConnectionContext {
        ClientFactory::new(SessionOptions::default())
            .build(config, credential())
            .unwrap()
    }

    async fn iam_server(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", "text/xml")
                    .set_body_string(body.to_string()),
            )
            .mount(&server)
            .await;
        server
    }

    /// HTTPS server with a freshly generated self-signed certificate. Counts completed
    /// TLS handshakes and answers every request with a GetUser response.
    async fn self_signed_iam_server() -> (String, Arc<AtomicUsize>) {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let tls = rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(
                vec![rustls::Certificate(cert.serialize_der().unwrap())],
                rustls::PrivateKey(cert.serialize_private_key_der()),
            )
            .unwrap();
        let acceptor = tokio_rustls::TlsAcceptor::from(Arc::new(tls));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handshakes = Arc::new(AtomicUsize::new(0));
        let counter = handshakes.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let acceptor = acceptor.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    let Ok(mut stream) = acceptor.accept(stream).await else {
                        return;
                    };
                    counter.fetch_add(1, Ordering::SeqCst);

                    let mut buf = vec![0u8; 16 * 1024];
                    let _ = stream.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: text/xml\r\ncontent-length: {}\r\n\
                         connection: close\r\n\r\n{}",
                        GET_USER_RESPONSE.len(),
                        GET_USER_RESPONSE
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (format!("https://127.0.0.1:{}", port), handshakes)
    }

    #[test]
    fn test_service_names_round_trip() {
        for service in Service::ALL {
            assert_eq!(service.name().parse::<Service>().unwrap(), service);
        }
        assert!("s3".parse::<Service>().is_err());
        assert_eq!(Service::Iam.title(), "IAM");
        assert_eq!(
            Service::CognitoIdentityProvider.title(),
            "Cognito Identity Provider"
        );
    }

    #[test]
    fn test_only_overridden_service_changes_endpoint() {
        let config = Config::builder("eu-west-1")
            .iam_endpoint("https://iam.internal.example")
            .build();
        let context = session(&config);

        let iam = context.iam_client();
        assert_eq!(
            iam.config().endpoint_url(),
            Some("https://iam.internal.example")
        );
        let organizations = context.organizations_client();
        assert_eq!(organizations.config().endpoint_url(), None);

        let client = AwsClient::assemble(Arc::new(context), iam, Verdict::Trusted);
        assert_eq!(client.region(), "eu-west-1");
        assert_eq!(
            client.services(),
            vec![
                (Service::Iam, Some("https://iam.internal.example")),
                (Service::CognitoIdentity, None),
                (Service::CognitoIdentityProvider, None),
                (Service::Organizations, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_requests_reach_override_with_product_token() {
        let server = iam_server(200, GET_USER_RESPONSE).await;
        let config = Config::builder("us-east-1")
            .iam_endpoint(server.uri())
            .max_retries(0)
            .build();
        let context = session(&config);

        let verdict = validate_credentials(&IamGetUser, &context.iam_client())
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Trusted);

        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
        assert!(String::from_utf8_lossy(&requests[0].body).contains("Action=GetUser"));

        let agent = requests[0]
            .headers
            .get("user-agent")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(
            agent.contains(&ProductToken::default().to_string()),
            "user-agent was {:?}",
            agent
        );
    }

    #[tokio::test]
    async fn test_get_user_access_denied_is_assumed_role() {
        let server = iam_server(403, ACCESS_DENIED_RESPONSE).await;
        let config = Config::builder("us-east-1")
            .iam_endpoint(server.uri())
            .max_retries(0)
            .build();

        let verdict = validate_credentials(&IamGetUser, &session(&config).iam_client())
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::AssumedRole);
    }

    #[tokio::test]
    async fn test_insecure_transport_accepts_self_signed_certificate() {
        let (endpoint, handshakes) = self_signed_iam_server().await;
        let config = Config::builder("us-east-1")
            .iam_endpoint(endpoint)
            .max_retries(0)
            .insecure(true)
            .build();

        let verdict = validate_credentials(&IamGetUser, &session(&config).iam_client())
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Trusted);
        assert_eq!(handshakes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_default_transport_rejects_self_signed_certificate() {
        let (endpoint, handshakes) = self_signed_iam_server().await;
        let config = Config::builder("us-east-1")
            .iam_endpoint(endpoint)
            .max_retries(0)
            .build();

        let result = validate_credentials(&IamGetUser, &session(&config).iam_client()).await;

        assert!(matches!(result, Err(BootstrapError::Validation(_))));
        assert_eq!(handshakes.load(Ordering::SeqCst), 0);
    }
}

use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::context::{
    BeforeDeserializationInterceptorContextRef, BeforeTransmitInterceptorContextMut,
    BeforeTransmitInterceptorContextRef,
};
use aws_smithy_runtime_api::client::interceptors::{Intercept, SharedInterceptor};
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::config_bag::ConfigBag;
use std::any::Any;
use std::collections::VecDeque;

pub const SDK_LOG_TAG: &str = "aws-sdk-rust";
const USER_AGENT: &str = "user-agent";

/// Ordered list of request hooks installed on every derived service client.
#[derive(Clone, Default)]
pub struct RequestHooks {
    hooks: VecDeque<(&'static str, SharedInterceptor)>,
}

impl RequestHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_front(&mut self, hook: impl Intercept + 'static) {
        self.hooks.push_front((hook.name(), SharedInterceptor::new(hook)));
    }

    pub fn push_back(&mut self, hook: impl Intercept + 'static) {
        self.hooks.push_back((hook.name(), SharedInterceptor::new(hook)));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|(name, _)| *name).collect()
    }

    pub fn interceptors(&self) -> impl Iterator<Item = SharedInterceptor> + '_ {
        self.hooks.iter().map(|(_, interceptor)| interceptor.clone())
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Appends a `product/version` token to the `User-Agent` header of every request.
#[derive(Debug, Clone)]
pub struct ProductUserAgent {
    token: String,
}

impl ProductUserAgent {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

pub fn append_product_token(existing: Option<&str>, token: &str) -> String {
    match existing {
        Some(agent) if !agent.is_empty() => format!("{} {}", agent, token),
        _ => token.to_string(),
    }
}

impl Intercept for ProductUserAgent {
    fn name(&self) -> &'static str {
        "ProductUserAgent"
    }

    // user-agent is excluded from SigV4 signing, so it can change after signing.
    fn modify_before_transmit(
        &self,
        context: &mut BeforeTransmitInterceptorContextMut<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let headers = context.request_mut().headers_mut();
        let agent = append_product_token(headers.get(USER_AGENT), &self.token);
        headers.try_insert(USER_AGENT, agent)?;
        Ok(())
    }
}

/// Verbose logger for SDK traffic.
///
/// Only string arguments (`&str` or `String`) are written; anything else passed in is
/// left out of the line.
#[derive(Debug, Clone)]
pub struct SdkLogger {
    tag: &'static str,
}

impl Default for SdkLogger {
    fn default() -> Self {
        Self { tag: SDK_LOG_TAG }
    }
}

impl SdkLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(&self, args: &[&dyn Any]) -> String {
        let tokens: Vec<&str> = args.iter().filter_map(|arg| string_token(*arg)).collect();
        format!("[{}] {}", self.tag, tokens.join(" "))
    }

    pub fn log(&self, args: &[&dyn Any]) {
        tracing::debug!("{}", self.format(args));
    }
}

fn string_token(arg: &dyn Any) -> Option<&str> {
    arg.downcast_ref::<&'static str>()
        .copied()
        .or_else(|| arg.downcast_ref::<String>().map(String::as_str))
}

/// Logs each request line and response status through an [`SdkLogger`].
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    logger: SdkLogger,
}

impl RequestLog {
    pub fn new(logger: SdkLogger) -> Self {
        Self { logger }
    }
}

impl Intercept for RequestLog {
    fn name(&self) -> &'static str {
        "RequestLog"
    }

    fn read_before_transmit(
        &self,
        context: &BeforeTransmitInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let request = context.request();
        let method = request.method().to_string();
        let uri = request.uri().to_string();
        self.logger.log(&[&"request:", &method, &uri]);
        Ok(())
    }

    fn read_after_transmit(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let status = context.response().status().as_u16().to_string();
        self.logger.log(&[&"response:", &status]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_keeps_only_strings() {
        let logger = SdkLogger::new();
        let owned = String::from("DescribeAccount");
        let line = logger.format(&[&"calling", &owned, &42u16, &3.5f64, &"done"]);
        assert_eq!(line, "[aws-sdk-rust] calling DescribeAccount done");
    }

    #[test]
    fn test_logger_with_no_strings() {
        let logger = SdkLogger::new();
        assert_eq!(logger.format(&[&1i32, &true]), "[aws-sdk-rust] ");
    }

    #[test]
    fn test_append_product_token() {
        assert_eq!(
            append_product_token(Some("aws-sdk-rust/1.3.0 os/linux"), "credkit/0.1.0"),
            "aws-sdk-rust/1.3.0 os/linux credkit/0.1.0"
        );
        assert_eq!(append_product_token(None, "credkit/0.1.0"), "credkit/0.1.0");
        assert_eq!(append_product_token(Some(""), "credkit/0.1.0"), "credkit/0.1.0");
    }

    #[test]
    fn test_push_front_runs_first() {
        let mut hooks = RequestHooks::new();
        hooks.push_back(RequestLog::default());
        hooks.push_front(ProductUserAgent::new("credkit/0.1.0"));
        assert_eq!(hooks.names(), vec!["ProductUserAgent", "RequestLog"]);
        assert_eq!(hooks.interceptors().count(), 2);
    }
}

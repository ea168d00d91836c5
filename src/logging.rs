use crate::env::Env;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for CREDKIT
///
/// This sets up colored output for terminals with automatic detection of:
/// - NO_COLOR environment variable (disables colors)
/// - RUST_LOG environment variable for filtering (`RUST_LOG=debug` enables SDK request logs)
pub fn init_logging() {
    let use_ansi = should_use_colors(&Env::real());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(use_ansi)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .without_time()
                .compact(),
        )
        .with(env_filter)
        .init();
}

/// Whether DEBUG events are currently recorded by the installed subscriber.
pub fn debug_enabled() -> bool {
    tracing::enabled!(tracing::Level::DEBUG)
}

/// Determine if we should use ANSI colors based on the environment
pub fn should_use_colors(env: &Env) -> bool {
    if env.get("NO_COLOR").is_some() || env.get("CREDKIT_NO_COLOR").is_some() {
        return false;
    }

    if env.get("FORCE_COLOR").is_some() || env.get("CREDKIT_FORCE_COLOR").is_some() {
        return true;
    }

    // tracing-subscriber handles TTY detection
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_detection() {
        assert!(!should_use_colors(&Env::from_slice(&[("NO_COLOR", "1")])));
        assert!(!should_use_colors(&Env::from_slice(&[("CREDKIT_NO_COLOR", "1")])));
        assert!(!should_use_colors(&Env::from_slice(&[
            ("NO_COLOR", "1"),
            ("FORCE_COLOR", "1")
        ])));
        assert!(should_use_colors(&Env::from_slice(&[("FORCE_COLOR", "1")])));
        assert!(should_use_colors(&Env::from_slice(&[])));
    }

    #[test]
    fn test_debug_disabled_without_subscriber() {
        assert!(!debug_enabled());
    }
}

//! Tracing subscriber setup for hosts embedding the assistant.

use tracing_subscriber::EnvFilter;

/// Install a formatted tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (usually
/// `general.log_level` from the config) is used. Returns `false` when a global
/// subscriber was already installed, which is not an error.
pub fn init_tracing(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let _first = init_tracing("debug");
        // A second install always reports that a subscriber already exists.
        assert!(!init_tracing("info"));
    }

    #[test]
    fn test_init_tracing_bad_level_does_not_panic() {
        let _ = init_tracing("not-a-level[");
    }
}

//! Process-wide log output.
//!
//! The library crates log through the `log` facade; the subscriber
//! installed here bridges those records and applies `RUST_LOG`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Returns `false` when one is already set.
pub fn init_logging(json: bool) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    match installed {
        Ok(()) => {
            log::debug!("Logging initialised (json: {})", json);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_harmless() {
        init_logging(false);
        assert!(!init_logging(true));
        log::info!("still logging after a repeated install");
    }
}

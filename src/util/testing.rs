//! One-time tracing setup for tests.

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{filter::filter_fn, fmt, prelude::*, EnvFilter};

static TEST_SETUP: Once = Once::new();

/// Install a global stderr subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `clmsh=debug` with HTTP client internals muted.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let module_filter = filter_fn(|metadata| {
            !["hyper", "reqwest", "httpmock"]
                .iter()
                .any(|name| metadata.target().starts_with(name))
        });
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clmsh=debug"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_filter(module_filter)
                .with_filter(env_filter),
        );

        if tracing::dispatcher::has_been_set() {
            debug!("Tracing subscriber already set");
        } else if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_calls_when_init_then_idempotent() {
        init_test_setup();
        init_test_setup();
        debug!("subscriber ready");
    }
}

//! Test utilities for taxform
//!
//! Fixtures (template sources, form data, adjustment maps) and a logging
//! initialiser shared by the inline unit tests and the `tests/` suites. The
//! module is compiled for `cfg(test)` and behind the `test-utils` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use taxform::config::EngineConfig;
//! use taxform::parser::parse_template;
//! use taxform::test_utils::{fixtures, init_test_logging};
//!
//! init_test_logging(None);
//! let result = parse_template(fixtures::BASIC_TEMPLATE, "01/GTGT", &EngineConfig::default());
//! assert!(result.success);
//! ```

pub mod fixtures;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=taxform=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

//! Test utilities for the topology engine
//!
//! This module provides builders for sample cluster resources, snapshots,
//! and operator descriptors so tests can assemble realistic inputs without
//! repeating metadata plumbing. Available to unit tests and, behind the
//! `test-utils` feature, to the integration suite.

pub mod fixtures;

pub use fixtures::{operator, resource, snapshot, OperatorFixture, ResourceFixture, SnapshotFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Initializes the tracing subscriber once regardless of how many times it
/// is called. Respects the `RUST_LOG` environment variable if set, or uses
/// the provided level.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(level.unwrap_or(Level::DEBUG).to_string().to_lowercase())
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

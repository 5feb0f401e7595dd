//! Test support utilities for formgrid integration tests
//!
//! - FakeMeasurer: table-driven preferred sizes, with optional wrapping text
//! - Assertions: layout invariants as custom assertions

#![allow(dead_code)]

mod fake_measurer;

pub use assertions::*;
pub use fake_measurer::FakeMeasurer;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

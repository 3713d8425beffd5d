// These modules use dev-dependencies, so they're only available during test builds
// or with the `test-helpers` feature.
mod compute_metrics;
pub mod test_runner;

pub use compute_metrics::{init_metrics, print_metrics_report};
pub use test_runner::{assert_fails_with, TestRunner, TransactionError};

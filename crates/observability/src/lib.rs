//! Process-wide tracing setup shared by the server binary and the serverless entry point.

/// Initialize tracing/logging.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filter, JSON layer).
pub mod tracing;

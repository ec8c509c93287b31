//! Tracing/logging setup shared by the Parallax binaries.

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}

/// Initialize tracing with human-readable output (interactive CLI use).
pub fn init_pretty() {
    tracing::init(tracing::LogFormat::Pretty);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

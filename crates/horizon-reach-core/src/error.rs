//! Error types for Horizon Reach core systems.

/// The main error type for core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The shared async runtime could not be created.
    #[error("Failed to create async runtime: {0}")]
    RuntimeCreation(#[source] std::io::Error),
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

//! Converter error types

/// Converter error types
#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    // Request errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown conversion type: {0}")]
    UnknownConversion(i32),

    #[error("series too long: {requested} values requested, limit is {limit}")]
    SeriesTooLong { requested: u32, limit: u32 },

    /// The operation is not offered over this transport.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    // Transport errors
    #[error("transport error: {0}")]
    Transport(String),

    /// Remote call failed with a gRPC status.
    #[error("rpc error ({code}): {message}")]
    Rpc { code: String, message: String },

    // Streaming errors
    #[error("stream error: {0}")]
    Stream(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ConverterError {
    /// Whether the error was caused by the caller's request rather than the system.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            ConverterError::InvalidInput(_)
                | ConverterError::UnknownConversion(_)
                | ConverterError::SeriesTooLong { .. }
        )
    }
}

/// Result type alias for converter operations
pub type Result<T> = std::result::Result<T, ConverterError>;

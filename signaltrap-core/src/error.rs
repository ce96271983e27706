use thiserror::Error;

/// Unified error type for SignalTrap.
///
/// Parsing and aggregation are total, so every variant originates at a
/// boundary: the filesystem, a config source, or serialization.
#[derive(Error, Debug)]
pub enum TrapError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal: {0}")]
    Internal(String),
}

impl TrapError {
    /// Map to HTTP status code. None of these are the caller's fault.
    pub fn status_code(&self) -> u16 {
        500
    }

    /// JSON error body: `{"error": "..."}`.
    pub fn to_json_body(&self) -> Vec<u8> {
        serde_json::json!({ "error": self.to_string() })
            .to_string()
            .into_bytes()
    }
}

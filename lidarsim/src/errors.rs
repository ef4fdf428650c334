use thiserror::Error;

#[derive(Debug, Error)]
pub enum LidarError {
    /// A configuration value is outside of the range the simulation can work with. These are
    /// reported at construction time and never clamped.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LidarError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        LidarError::InvalidConfig(msg.into())
    }
}

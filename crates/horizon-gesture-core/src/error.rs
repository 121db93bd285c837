//! Error types for Horizon Gesture.
//!
//! Gesture recognition itself never fails: a missed gesture is simply a
//! gesture that did not occur. Errors only surface from the configuration
//! surface and from timer bookkeeping.

/// Result type alias for Horizon Gesture operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Horizon Gesture operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Timer-related error.
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// A configuration section could not be decoded into its typed form.
    #[error("Invalid {kind} gesture configuration: {source}")]
    Config {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration section was not a JSON object.
    #[error("Gesture configuration for '{kind}' must be an object")]
    ConfigShape { kind: String },
}

impl Error {
    /// Create a configuration decoding error.
    pub fn config(kind: &'static str, source: serde_json::Error) -> Self {
        Self::Config { kind, source }
    }

    /// Create a configuration shape error.
    pub fn config_shape(kind: impl Into<String>) -> Self {
        Self::ConfigShape { kind: kind.into() }
    }
}

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The timer ID is invalid or has already been removed.
    #[error("Invalid or expired timer ID")]
    InvalidTimerId,
}

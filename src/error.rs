/// Crate-level error type for frame-based feature extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A required size is zero or otherwise out of range.
    #[error("invalid size for `{name}`: {value} ({reason})")]
    InvalidSize {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },

    /// Input array has incorrect dimensionality or shape for the operation.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// A named option is not part of the supported vocabulary.
    #[error("unsupported {kind} '{got}'; supported: {}", supported.join(", "))]
    Unsupported {
        kind: &'static str,
        got: String,
        supported: &'static [&'static str],
    },

    /// Audio data is empty when a non-empty signal was required.
    #[error("audio data is empty")]
    EmptyAudio,

    /// Audio data contains non-finite values (NaN or Inf).
    #[error("audio data contains non-finite values")]
    NonFiniteAudio,

    /// A numerical routine diverged or produced non-finite output.
    #[error("numerical failure in {what}: input ill-conditioned")]
    IllConditioned { what: &'static str },

    /// The external signal collaborator failed to supply samples.
    #[error("signal source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn non_positive(name: &'static str, value: usize) -> Self {
        Error::InvalidSize {
            name,
            value,
            reason: "must be > 0",
        }
    }
}

/// Convenience Result type for audiofeatures operations.
pub type Result<T> = std::result::Result<T, Error>;

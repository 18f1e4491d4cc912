/// Convenience result type used across stillcut.
pub type StillcutResult<T> = Result<T, StillcutError>;

/// Top-level error taxonomy used by the rendering pipeline.
#[derive(thiserror::Error, Debug)]
pub enum StillcutError {
    /// Invalid caller-provided request data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unreadable or malformed configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A capability the render stage needs is not available on this host.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// The external encoder failed or produced no output.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StillcutError {
    /// Build a [`StillcutError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StillcutError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`StillcutError::MissingDependency`] value.
    pub fn missing_dependency(msg: impl Into<String>) -> Self {
        Self::MissingDependency(msg.into())
    }

    /// Build a [`StillcutError::EncodingFailed`] value.
    pub fn encoding_failed(msg: impl Into<String>) -> Self {
        Self::EncodingFailed(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

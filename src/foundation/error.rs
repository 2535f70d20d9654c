/// Result alias used across the crate.
pub type NeedleResult<T> = Result<T, NeedleError>;

/// Errors raised at the crate's boundaries.
///
/// The playback core never fails: out-of-range input is clamped or ignored. Errors only come from
/// reading a stitch plan, validating options, or rasterizing a frame.
#[derive(thiserror::Error, Debug)]
pub enum NeedleError {
    /// Input data or options failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame could not be rasterized or written.
    #[error("render error: {0}")]
    Render(String),

    /// A stitch plan could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NeedleError {
    /// Build a [`NeedleError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`NeedleError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`NeedleError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

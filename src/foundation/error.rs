/// Convenience result type used across glint.
pub type GlintResult<T> = Result<T, GlintError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum GlintError {
    /// Invalid program construction inputs (unsorted stops, bad child counts, non-finite geometry).
    #[error("validation error: {0}")]
    Validation(String),

    /// The program cannot be lowered to instructions in its current form.
    #[error("compile error: {0}")]
    Compile(String),

    /// An instruction list cannot be written to the binary format.
    #[error("encode error: {0}")]
    Encode(String),

    /// A binary stream is malformed or was produced by a different opcode catalog.
    #[error("decode error: {0}")]
    Decode(String),

    /// The host stack machine reached an invalid state.
    #[error("execution error: {0}")]
    Execution(String),

    /// A program needs more stack than the configured execution limits allow.
    #[error("limits error: {0}")]
    Limits(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlintError {
    /// Build a [`GlintError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlintError::Compile`] value.
    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile(msg.into())
    }

    /// Build a [`GlintError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`GlintError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`GlintError::Execution`] value.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Build a [`GlintError::Limits`] value.
    pub fn limits(msg: impl Into<String>) -> Self {
        Self::Limits(msg.into())
    }

    /// Build a [`GlintError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

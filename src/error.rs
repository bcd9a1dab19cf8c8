//! Error types for the avatar engine.
//!
//! Errors only surface at the glue boundary: deserializing catalogs, saved
//! avatar states, and color values supplied by the caller. Compositor
//! operations themselves degrade gracefully (malformed rule names are
//! dropped, unknown dressing names fall back to a safe index, missing
//! assets render empty) and never return `Err`.

/// Result type alias for avatar engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the deserialization boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A color string that is not a recognizable hex color.
    #[error("invalid color '{value}': {message}")]
    InvalidColor { value: String, message: String },

    /// A tailor catalog that does not match the expected record shape.
    #[error("malformed tailor catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    /// A saved avatar state that is neither valid JSON nor a valid
    /// serialized pair list.
    #[error("malformed avatar state: {message}")]
    State { message: String },
}

impl Error {
    /// Create a color error.
    pub fn invalid_color(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a state error.
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }
}

//! Error types for conversion.

use thiserror::Error;

use crate::base::Position;
use crate::model::ElementKind;

/// Errors that abort a parse or write.
///
/// Soft skips (unknown tags, unresolved references, unrecognized data object
/// types) never surface here; they are logged and leave a partial model.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The underlying XML token stream is malformed.
    #[error("XML stream error at {position}: {message}")]
    Stream { message: String, position: Position },

    /// The schema used for validation cannot be located or loaded.
    #[error("Schema resource error: {0}")]
    SchemaResource(String),

    /// The document failed schema validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No converter is registered for the concrete kind being written.
    #[error("No converter registered for element kind {0}")]
    Unregistered(ElementKind),

    /// IO error while opening or reading input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML emitter rejected an event.
    #[error("XML write error: {0}")]
    Write(String),

    /// Unknown encoding label or undecodable input.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl ConvertError {
    /// Create a stream error at a document position.
    pub fn stream(message: impl Into<String>, position: Position) -> Self {
        Self::Stream {
            message: message.into(),
            position,
        }
    }

    /// Create a write error.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Create a validation error, prefixed with the position when known.
    pub fn validation(message: impl Into<String>, position: Option<Position>) -> Self {
        match position {
            Some(position) => Self::Validation(format!("{position}: {}", message.into())),
            None => Self::Validation(message.into()),
        }
    }

    /// Create a schema resource error.
    pub fn schema_resource(message: impl Into<String>) -> Self {
        Self::SchemaResource(message.into())
    }

    /// Create an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_names_kind() {
        let error = ConvertError::Unregistered(ElementKind::ScriptTask);
        assert_eq!(
            error.to_string(),
            "No converter registered for element kind ScriptTask"
        );
    }

    #[test]
    fn test_stream_error_carries_position() {
        let error = ConvertError::stream("unexpected end", Position::new(3, 7));
        assert_eq!(error.to_string(), "XML stream error at 3:7: unexpected end");
    }
}

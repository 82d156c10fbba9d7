//! Error types for the decoding layer.

/// Error returned while decoding an observation payload.
///
/// Only [`DecodeError::UnrecognizedDialect`] and [`DecodeError::NoObservations`]
/// escape [`decode`](crate::decode); a [`DecodeError::MalformedKey`] drops the
/// offending observation and decoding continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// An observation key segment is not a non-negative integer, or a linear
    /// key points outside the declared cube.
    #[error("malformed observation key '{key}': invalid segment '{segment}'")]
    MalformedKey { key: String, segment: String },

    /// The body matches neither the category-index nor the structure dialect.
    #[error("unrecognized response dialect: {detail}")]
    UnrecognizedDialect { detail: String },

    /// The body was recognized but produced no decodable observation.
    #[error("no observations found in response")]
    NoObservations,
}

impl DecodeError {
    pub(crate) fn unrecognized(detail: impl Into<String>) -> Self {
        Self::UnrecognizedDialect {
            detail: detail.into(),
        }
    }

    pub(crate) fn malformed(key: &str, segment: &str) -> Self {
        Self::MalformedKey {
            key: key.to_string(),
            segment: segment.to_string(),
        }
    }

    /// Whether the error signals that another endpoint may serve the dataset.
    pub fn is_fallback_signal(&self) -> bool {
        matches!(
            self,
            DecodeError::UnrecognizedDialect { .. } | DecodeError::NoObservations
        )
    }
}

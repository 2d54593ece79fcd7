//! Error types for traceability code and QR payload handling.

use thiserror::Error;

/// Errors raised while generating or decoding traceability artefacts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceabilityError {
    /// The lot identifier was empty once trimmed.
    #[error("lot id must not be empty")]
    EmptyLotId,

    /// A traceability code did not follow `LOT-<timestamp>-<suffix>`.
    #[error("invalid traceability code '{code}': {reason}")]
    InvalidCode {
        /// The rejected code.
        code: String,
        /// Which part of the format was violated.
        reason: &'static str,
    },

    /// A QR payload could not be decoded from base64.
    #[error("QR payload is not valid base64: {message}")]
    InvalidEncoding {
        /// Decoder error description.
        message: String,
    },

    /// A QR payload decoded to bytes that are not the expected JSON shape.
    #[error("QR payload is not valid JSON: {message}")]
    InvalidPayload {
        /// Parser error description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_code_includes_reason() {
        let err = TraceabilityError::InvalidCode {
            code: "LOT-x".to_owned(),
            reason: "timestamp must be 14 digits",
        };
        assert_eq!(
            err.to_string(),
            "invalid traceability code 'LOT-x': timestamp must be 14 digits"
        );
    }

    #[test]
    fn empty_lot_id_formats_correctly() {
        assert_eq!(
            TraceabilityError::EmptyLotId.to_string(),
            "lot id must not be empty"
        );
    }
}

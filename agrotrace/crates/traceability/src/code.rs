//! Lot traceability codes.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TraceabilityError;

const PREFIX: &str = "LOT";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;
const SUFFIX_LEN: usize = 8;

/// Human-readable lot code of the form `LOT-<YYYYmmddHHMMSS>-<SUFFIX>`.
///
/// ## Invariants
/// - The timestamp segment is exactly 14 digits and a valid UTC instant.
/// - The suffix holds 1 to 8 uppercase ASCII letters or digits taken from
///   the start of the lot id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TraceabilityCode(String);

impl TraceabilityCode {
    /// Derive a code for `lot_id` issued at `at`.
    ///
    /// Hyphens and other separators in the lot id are skipped so UUIDs and
    /// opaque backend ids both produce a compact suffix.
    ///
    /// # Errors
    ///
    /// Returns [`TraceabilityError::EmptyLotId`] when the id has no
    /// alphanumeric characters.
    pub fn generate(lot_id: &str, at: DateTime<Utc>) -> Result<Self, TraceabilityError> {
        let suffix: String = lot_id
            .trim()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(SUFFIX_LEN)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if suffix.is_empty() {
            return Err(TraceabilityError::EmptyLotId);
        }

        Ok(Self(format!(
            "{PREFIX}-{}-{suffix}",
            at.format(TIMESTAMP_FORMAT)
        )))
    }

    /// Validate an existing code, for example one returned by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`TraceabilityError::InvalidCode`] naming the violated segment.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TraceabilityError> {
        let raw = raw.into();
        let invalid = |reason| TraceabilityError::InvalidCode {
            code: raw.clone(),
            reason,
        };

        let mut parts = raw.splitn(3, '-');
        let (Some(prefix), Some(timestamp), Some(suffix)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected three hyphen-separated segments"));
        };

        if prefix != PREFIX {
            return Err(invalid("code must start with LOT"));
        }
        if timestamp.len() != TIMESTAMP_LEN || !timestamp.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("timestamp must be 14 digits"));
        }
        if NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_err() {
            return Err(invalid("timestamp is not a valid date"));
        }
        let suffix_ok = !suffix.is_empty()
            && suffix.len() <= SUFFIX_LEN
            && suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !suffix_ok {
            return Err(invalid("suffix must be 1-8 uppercase letters or digits"));
        }

        Ok(Self(raw))
    }

    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Instant embedded in the code.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        let timestamp = self.0.split('-').nth(1)?;
        NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }
}

impl fmt::Display for TraceabilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TraceabilityCode> for String {
    fn from(value: TraceabilityCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for TraceabilityCode {
    type Error = TraceabilityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for code generation and parsing.

    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn fixture_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 3, 8, 5, 9)
            .single()
            .expect("valid fixture timestamp")
    }

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", "LOT-20250103080509-3FA85F64")]
    #[case("ab-12", "LOT-20250103080509-AB12")]
    #[case("  kE9x  ", "LOT-20250103080509-KE9X")]
    fn generates_codes_from_lot_ids(#[case] lot_id: &str, #[case] expected: &str) {
        let code = TraceabilityCode::generate(lot_id, fixture_time()).expect("code");
        assert_eq!(code.as_str(), expected);
        assert_eq!(code.issued_at(), Some(fixture_time()));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("---")]
    fn rejects_ids_without_alphanumerics(#[case] lot_id: &str) {
        let err = TraceabilityCode::generate(lot_id, fixture_time()).expect_err("must fail");
        assert_eq!(err, TraceabilityError::EmptyLotId);
    }

    #[rstest]
    #[case("LOT-20250103080509-3FA85F64")]
    #[case("LOT-20241231235959-A")]
    fn parses_well_formed_codes(#[case] raw: &str) {
        let code = TraceabilityCode::parse(raw).expect("valid code");
        assert_eq!(code.to_string(), raw);
    }

    #[rstest]
    #[case("LOT-20250103080509", "expected three hyphen-separated segments")]
    #[case("BAT-20250103080509-ABC", "code must start with LOT")]
    #[case("LOT-2025010308050-ABC", "timestamp must be 14 digits")]
    #[case("LOT-20251303080509-ABC", "timestamp is not a valid date")]
    #[case("LOT-20250103080509-abc", "suffix must be 1-8 uppercase letters or digits")]
    #[case("LOT-20250103080509-ABCDEFGHI", "suffix must be 1-8 uppercase letters or digits")]
    fn rejects_malformed_codes(#[case] raw: &str, #[case] expected_reason: &str) {
        match TraceabilityCode::parse(raw) {
            Err(TraceabilityError::InvalidCode { reason, .. }) => {
                assert_eq!(reason, expected_reason);
            }
            other => panic!("expected InvalidCode, got {other:?}"),
        }
    }

    #[test]
    fn deserialization_validates_codes() {
        let ok: TraceabilityCode =
            serde_json::from_str("\"LOT-20250103080509-3FA85F64\"").expect("valid json code");
        assert_eq!(ok.as_str(), "LOT-20250103080509-3FA85F64");
        assert!(serde_json::from_str::<TraceabilityCode>("\"nope\"").is_err());
    }
}

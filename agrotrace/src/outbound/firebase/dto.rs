//! Wire DTOs for the Identity Toolkit and Firestore REST APIs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountResponseDto {
    pub(super) local_id: String,
    #[serde(default)]
    pub(super) email: Option<String>,
    pub(super) id_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteRequestDto<'a> {
    pub(super) id_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponseDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) message: String,
}

impl ErrorBodyDto {
    /// Leading error code; `WEAK_PASSWORD : Password should be...` yields
    /// `WEAK_PASSWORD`.
    pub(super) fn code(&self) -> &str {
        self.message
            .split([' ', ':'])
            .next()
            .unwrap_or_default()
    }
}

/// A Firestore document restricted to the field kinds profiles use.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct DocumentDto {
    #[serde(default)]
    pub(super) fields: BTreeMap<String, ValueDto>,
}

impl DocumentDto {
    pub(super) fn with_string(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(
            key.to_owned(),
            ValueDto {
                string_value: Some(value.to_owned()),
                ..ValueDto::default()
            },
        );
        self
    }

    pub(super) fn with_timestamp(mut self, key: &str, value: String) -> Self {
        self.fields.insert(
            key.to_owned(),
            ValueDto {
                timestamp_value: Some(value),
                ..ValueDto::default()
            },
        );
        self
    }

    pub(super) fn string(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|value| value.string_value.as_deref())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) timestamp_value: Option<String>,
}

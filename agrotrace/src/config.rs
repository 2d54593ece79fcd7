//! Client configuration loaded via OrthoConfig.
//!
//! [`ClientSettings`] is the raw layered view (CLI, `AGROTRACE_*` env
//! variables, config file). [`ClientSettings::validate`] turns it into the
//! typed [`ClientConfig`] the application root consumes.

use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use traceability::DEFAULT_QR_SERVICE_URL;
use url::Url;

use crate::domain::Locale;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Raw configuration values.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AGROTRACE")]
pub struct ClientSettings {
    /// Marketplace backend base URL, including the `/api` prefix.
    pub api_base_url: Option<String>,
    /// Directory for persisted session files; in-memory storage when unset.
    pub storage_dir: Option<PathBuf>,
    /// Per-request timeout for every HTTP adapter.
    pub request_timeout_secs: Option<u64>,
    /// Message catalogue: `es` or `en`.
    pub locale: Option<String>,
    /// `backend`, `firebase` or `fixture`.
    pub identity_backend: Option<String>,
    pub firebase_api_key: Option<String>,
    pub firebase_project_id: Option<String>,
    /// QR rendering service used when the backend omits a QR reference.
    pub qr_service_url: Option<String>,
}

/// Where identities come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityBackend {
    /// The marketplace backend's `/auth` routes.
    Backend,
    /// Identity Toolkit accounts plus Firestore profiles.
    Firebase { api_key: String, project_id: String },
    /// Offline demo account; see [`crate::domain::ports::FixtureIdentityProvider`].
    Fixture,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub storage_dir: Option<Utf8PathBuf>,
    pub request_timeout: Duration,
    pub locale: Locale,
    pub identity: IdentityBackend,
    pub qr_service_url: Url,
}

/// Reasons a [`ClientSettings`] value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} is not a valid URL: {message}")]
    InvalidUrl { field: &'static str, message: String },
    #[error("storage_dir must be valid UTF-8: {path}")]
    NonUtf8Path { path: String },
    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("unsupported locale '{0}'")]
    UnknownLocale(String),
    #[error("unknown identity backend '{0}'; expected 'backend', 'firebase' or 'fixture'")]
    UnknownIdentityBackend(String),
    #[error("{field} is required when identity_backend is 'firebase'")]
    MissingFirebaseSetting { field: &'static str },
}

impl ClientSettings {
    /// Validate the raw settings, applying defaults for unset values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed URLs, a zero timeout, an
    /// unknown locale or identity backend, or incomplete Firebase settings.
    pub fn validate(&self) -> Result<ClientConfig, ConfigError> {
        let api_base_url = parse_url(
            "api_base_url",
            self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )?;
        let qr_service_url = parse_url(
            "qr_service_url",
            self.qr_service_url
                .as_deref()
                .unwrap_or(DEFAULT_QR_SERVICE_URL),
        )?;
        let storage_dir = self
            .storage_dir
            .clone()
            .map(|path| {
                Utf8PathBuf::from_path_buf(path).map_err(|path| ConfigError::NonUtf8Path {
                    path: path.display().to_string(),
                })
            })
            .transpose()?;
        let request_timeout = match self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        {
            0 => return Err(ConfigError::ZeroTimeout),
            secs => Duration::from_secs(secs),
        };
        let locale = match self.locale.as_deref() {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::UnknownLocale(raw.to_owned()))?,
            None => Locale::default(),
        };

        Ok(ClientConfig {
            api_base_url,
            storage_dir,
            request_timeout,
            locale,
            identity: self.identity_backend()?,
            qr_service_url,
        })
    }

    fn identity_backend(&self) -> Result<IdentityBackend, ConfigError> {
        let raw = self.identity_backend.as_deref().unwrap_or("backend");
        match raw.trim().to_ascii_lowercase().as_str() {
            "backend" => Ok(IdentityBackend::Backend),
            "firebase" => Ok(IdentityBackend::Firebase {
                api_key: required(self.firebase_api_key.as_deref(), "firebase_api_key")?,
                project_id: required(self.firebase_project_id.as_deref(), "firebase_project_id")?,
            }),
            "fixture" => Ok(IdentityBackend::Fixture),
            _ => Err(ConfigError::UnknownIdentityBackend(raw.to_owned())),
        }
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidUrl {
        field,
        message: err.to_string(),
    })
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, ConfigError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or(ConfigError::MissingFirebaseSetting { field })
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "AGROTRACE_API_BASE_URL",
        "AGROTRACE_STORAGE_DIR",
        "AGROTRACE_REQUEST_TIMEOUT_SECS",
        "AGROTRACE_LOCALE",
        "AGROTRACE_IDENTITY_BACKEND",
        "AGROTRACE_FIREBASE_API_KEY",
        "AGROTRACE_FIREBASE_PROJECT_ID",
        "AGROTRACE_QR_SERVICE_URL",
    ];

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("agrotrace")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn blank() -> ClientSettings {
        ClientSettings {
            api_base_url: None,
            storage_dir: None,
            request_timeout_secs: None,
            locale: None,
            identity_backend: None,
            firebase_api_key: None,
            firebase_project_id: None,
            qr_service_url: None,
        }
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let config = load_from_empty_args().validate().expect("valid defaults");
        assert_eq!(config.api_base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.locale, Locale::Es);
        assert_eq!(config.identity, IdentityBackend::Backend);
        assert!(config.storage_dir.is_none());
        assert_eq!(config.qr_service_url.as_str(), DEFAULT_QR_SERVICE_URL);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("AGROTRACE_API_BASE_URL", "https://agro.example/api"),
            ("AGROTRACE_STORAGE_DIR", "/tmp/agrotrace-session"),
            ("AGROTRACE_REQUEST_TIMEOUT_SECS", "5"),
            ("AGROTRACE_LOCALE", "en-GB"),
            ("AGROTRACE_IDENTITY_BACKEND", "firebase"),
            ("AGROTRACE_FIREBASE_API_KEY", "key-123"),
            ("AGROTRACE_FIREBASE_PROJECT_ID", "agro-589bb"),
        ]));

        let config = load_from_empty_args().validate().expect("valid overrides");
        assert_eq!(config.api_base_url.as_str(), "https://agro.example/api");
        assert_eq!(
            config.storage_dir.as_deref().map(|dir| dir.as_str()),
            Some("/tmp/agrotrace-session")
        );
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.locale, Locale::En);
        assert_eq!(
            config.identity,
            IdentityBackend::Firebase {
                api_key: "key-123".into(),
                project_id: "agro-589bb".into(),
            }
        );
    }

    #[rstest]
    #[case(
        ClientSettings { api_base_url: Some("not a url".into()), ..blank() },
        "invalid_url"
    )]
    #[case(ClientSettings { request_timeout_secs: Some(0), ..blank() }, "zero_timeout")]
    #[case(ClientSettings { locale: Some("fr".into()), ..blank() }, "unknown_locale")]
    #[case(
        ClientSettings { identity_backend: Some("ldap".into()), ..blank() },
        "unknown_identity_backend"
    )]
    #[case(
        ClientSettings {
            identity_backend: Some("firebase".into()),
            firebase_api_key: Some("key".into()),
            ..blank()
        },
        "missing_firebase_setting"
    )]
    fn invalid_settings_are_rejected(#[case] settings: ClientSettings, #[case] kind: &str) {
        let err = settings.validate().expect_err("invalid settings");
        let actual = match err {
            ConfigError::InvalidUrl { .. } => "invalid_url",
            ConfigError::NonUtf8Path { .. } => "non_utf8_path",
            ConfigError::ZeroTimeout => "zero_timeout",
            ConfigError::UnknownLocale(_) => "unknown_locale",
            ConfigError::UnknownIdentityBackend(_) => "unknown_identity_backend",
            ConfigError::MissingFirebaseSetting { .. } => "missing_firebase_setting",
        };
        assert_eq!(actual, kind);
    }
}

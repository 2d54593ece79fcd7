//! Authentication primitives: credentials, registrations and bearer tokens.
//!
//! Constructors validate raw form input before anything talks to the
//! identity authority, mirroring the checks the backend performs.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::identity::{DisplayName, Email, IdentityValidationError, Role};

/// Minimum password length accepted by the authority.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Domain error returned when credential input is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email did not match the accepted address shape.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN_LEN`].
    WeakPassword { min: usize },
    /// Display name was blank or too long.
    InvalidName(IdentityValidationError),
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::WeakPassword { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::InvalidName(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is a trimmed, well-formed address.
/// - `password` is non-empty and keeps caller-provided whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    ///
    /// Login does not enforce the minimum length: an old short password is
    /// still the authority's call to reject.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(|_| CredentialsValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated account registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: DisplayName,
    email: Email,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    /// Validate raw registration form input.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Self, CredentialsValidationError> {
        let name = DisplayName::new(name).map_err(CredentialsValidationError::InvalidName)?;
        let email = Email::new(email).map_err(|_| CredentialsValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(CredentialsValidationError::WeakPassword {
                min: PASSWORD_MIN_LEN,
            });
        }
        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Opaque bearer credential issued by the identity authority.
///
/// The raw value is zeroized on drop and never appears in `Debug` output.
/// Use [`SessionToken::fingerprint`] to correlate tokens in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(Zeroizing<String>);

/// Error returned when an authority hands back an empty token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyTokenError;

impl fmt::Display for EmptyTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session token must not be empty")
    }
}

impl std::error::Error for EmptyTokenError {}

impl SessionToken {
    /// Wrap a raw token, rejecting blank values.
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyTokenError> {
        let raw = Zeroizing::new(raw.into());
        if raw.trim().is_empty() {
            return Err(EmptyTokenError);
        }
        Ok(Self(raw))
    }

    /// Raw token value for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// First 8 hex characters of the token's SHA-256 digest.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..4])
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken")
            .field(&format_args!("<redacted:{}>", self.fingerprint()))
            .finish()
    }
}

impl From<SessionToken> for String {
    fn from(value: SessionToken) -> Self {
        value.0.as_str().to_owned()
    }
}

impl TryFrom<String> for SessionToken {
    type Error = EmptyTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

//! Identity data model.
//!
//! An [`Identity`] is created on successful login or registration and
//! persisted by the session store. Only the avatar may change afterwards.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by identity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityValidationError {
    EmptyId,
    InvalidEmail,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    UnknownRole { value: String },
}

impl fmt::Display for IdentityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::UnknownRole { value } => {
                write!(f, "role must be farmer or buyer, got '{value}'")
            }
        }
    }
}

impl std::error::Error for IdentityValidationError {}

/// Opaque user identifier issued by the identity authority.
///
/// Authorities issue their own uid formats, so this only requires a
/// non-empty value without surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let id = id.into();
        if id.trim().is_empty() || id.trim() != id {
            return Err(IdentityValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address accepted by the identity authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

static EMAIL_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$"));

impl Email {
    /// Validate and construct an [`Email`], trimming surrounding whitespace.
    pub fn new(email: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = email.as_ref().trim();
        if !EMAIL_RE.as_ref().is_ok_and(|re| re.is_match(trimmed)) {
            return Err(IdentityValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 80;

/// Human readable name shown in the dashboard greeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    ///
    /// The name is kept exactly as entered; only blank names are rejected.
    pub fn new(name: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentityValidationError::EmptyDisplayName);
        }
        if name.chars().count() > DISPLAY_NAME_MAX {
            return Err(IdentityValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(name))
    }

    /// Name derived from the local part of `email`, for accounts that have
    /// no profile name on record.
    pub fn from_email(email: &Email) -> Self {
        let local = email
            .as_ref()
            .split_once('@')
            .map_or(email.as_ref(), |(local, _)| local);
        Self(local.chars().take(DISPLAY_NAME_MAX).collect())
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Marketplace role. Farmers publish lots; buyers make offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Buyer,
}

impl Role {
    /// Wire representation used by the backend and persisted storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Buyer => "buyer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentityValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "farmer" => Ok(Self::Farmer),
            "buyer" => Ok(Self::Buyer),
            _ => Err(IdentityValidationError::UnknownRole {
                value: value.to_owned(),
            }),
        }
    }
}

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/identicon/svg";

/// Default avatar reference derived from the display name.
pub fn default_avatar(name: &DisplayName) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("seed", name.as_ref())
        .finish();
    format!("{AVATAR_BASE_URL}?{query}")
}

/// Authenticated marketplace user.
///
/// ## Invariants
/// - `id`, `email` and `name` satisfy their newtype validation.
/// - Only `avatar` changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    id: UserId,
    email: Email,
    name: DisplayName,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
}

impl Identity {
    /// Build an identity with the default avatar for `name`.
    pub fn new(id: UserId, email: Email, name: DisplayName, role: Role) -> Self {
        let avatar = Some(default_avatar(&name));
        Self {
            id,
            email,
            name,
            role,
            avatar,
        }
    }

    /// Fallible constructor from raw strings.
    pub fn try_from_strings(
        id: impl Into<String>,
        email: impl AsRef<str>,
        name: impl Into<String>,
        role: Role,
    ) -> Result<Self, IdentityValidationError> {
        Ok(Self::new(
            UserId::new(id)?,
            Email::new(email)?,
            DisplayName::new(name)?,
            role,
        ))
    }

    /// Stable authority uid.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Marketplace role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Avatar reference (usually an image URL).
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    /// Copy of this identity with a different avatar.
    #[must_use]
    pub fn with_avatar(mut self, avatar: Option<String>) -> Self {
        self.avatar = avatar;
        self
    }
}

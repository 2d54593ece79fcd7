//! User-facing message catalogue for authentication and service errors.
//!
//! Messages are keyed by the stable error `code()` so adapters can add
//! detail to `Display` output without that detail reaching the user.

use std::fmt;
use std::str::FromStr;

use super::error::ServiceError;
use super::ports::AuthError;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    #[default]
    Es,
}

/// Raised when a configured locale is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale '{0}'; expected 'en' or 'es'")]
pub struct UnknownLocaleError(pub String);

impl FromStr for Locale {
    type Err = UnknownLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        // Accept region-qualified tags such as `es-CO`.
        match lowered.split(['-', '_']).next().unwrap_or_default() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            _ => Err(UnknownLocaleError(s.to_owned())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::En => "en",
            Self::Es => "es",
        })
    }
}

impl Locale {
    /// Message shown when a failure must not leak detail.
    pub fn generic_message(self) -> &'static str {
        match self {
            Self::En => "Something went wrong. Please try again.",
            Self::Es => "Algo salió mal. Inténtalo de nuevo.",
        }
    }

    /// Localized message for an error code, falling back to the generic one.
    pub fn message(self, code: &str) -> &'static str {
        let entry = CATALOGUE.iter().find(|entry| entry.code == code);
        match (self, entry) {
            (Self::En, Some(entry)) => entry.en,
            (Self::Es, Some(entry)) => entry.es,
            (_, None) => self.generic_message(),
        }
    }

    pub fn describe_auth(self, err: &AuthError) -> &'static str {
        self.message(err.code())
    }

    pub fn describe_service(self, err: &ServiceError) -> &'static str {
        self.message(err.code())
    }
}

struct CatalogueEntry {
    code: &'static str,
    en: &'static str,
    es: &'static str,
}

// `remote`, `decode` and `superseded` are deliberately absent: they render
// the generic message.
const CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        code: "invalid_credentials",
        en: "Incorrect email or password.",
        es: "Correo o contraseña incorrectos.",
    },
    CatalogueEntry {
        code: "email_in_use",
        en: "An account with this email already exists.",
        es: "Ya existe una cuenta con este correo.",
    },
    CatalogueEntry {
        code: "weak_password",
        en: "The password must be at least 6 characters long.",
        es: "La contraseña debe tener al menos 6 caracteres.",
    },
    CatalogueEntry {
        code: "invalid_email",
        en: "The email address is not valid.",
        es: "El correo electrónico no es válido.",
    },
    CatalogueEntry {
        code: "invalid_name",
        en: "Please enter your name.",
        es: "Por favor ingresa tu nombre.",
    },
    CatalogueEntry {
        code: "rate_limited",
        en: "Too many attempts. Please wait a moment and try again.",
        es: "Demasiados intentos. Espera un momento e inténtalo de nuevo.",
    },
    CatalogueEntry {
        code: "unauthenticated",
        en: "Your session has ended. Please sign in again.",
        es: "Tu sesión ha terminado. Inicia sesión de nuevo.",
    },
    CatalogueEntry {
        code: "network",
        en: "Could not reach the server. Check your connection.",
        es: "No se pudo conectar con el servidor. Revisa tu conexión.",
    },
    CatalogueEntry {
        code: "storage",
        en: "Your session could not be saved on this device.",
        es: "No se pudo guardar tu sesión en este dispositivo.",
    },
    CatalogueEntry {
        code: "forbidden",
        en: "Your account type cannot perform this action.",
        es: "Tu tipo de cuenta no puede realizar esta acción.",
    },
    CatalogueEntry {
        code: "not_found",
        en: "The requested item no longer exists.",
        es: "El elemento solicitado ya no existe.",
    },
    CatalogueEntry {
        code: "invalid_lot",
        en: "Check the lot details: the product is required and the quantity must be greater than 0.",
        es: "Revisa los datos del lote: el producto es obligatorio y la cantidad debe ser mayor que 0.",
    },
    CatalogueEntry {
        code: "invalid_offer",
        en: "Check the offer: price and quantity must be greater than 0.",
        es: "Revisa la oferta: el precio y la cantidad deben ser mayores que 0.",
    },
];

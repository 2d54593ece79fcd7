//! Errors returned by the lot, offer and report services.

use super::identity::Role;
use super::lot::LotValidationError;
use super::offer::OfferValidationError;
use super::ports::GatewayError;

/// Failure of a domain service operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// No session token is stored.
    #[error("an authenticated session is required")]
    Unauthenticated,
    /// The signed-in role may not perform the action.
    #[error("{role} accounts cannot {action}")]
    Forbidden { role: Role, action: &'static str },
    #[error("invalid lot: {0}")]
    InvalidLot(#[from] LotValidationError),
    #[error("invalid offer: {0}")]
    InvalidOffer(#[from] OfferValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    /// Stable snake_case identifier used for logs and message lookup.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidLot(_) => "invalid_lot",
            Self::InvalidOffer(_) => "invalid_offer",
            Self::Gateway(GatewayError::Unauthenticated) => "unauthenticated",
            Self::Gateway(err) => err.code(),
        }
    }
}

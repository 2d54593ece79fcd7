//! Domain primitives, use cases and ports.
//!
//! Purpose: define the marketplace entities (identities, lots, offers),
//! the auth context that owns "who is signed in", and the services the
//! view layer calls. Nothing here performs I/O directly; adapters in
//! `outbound` implement the traits in [`ports`].
//!
//! Public surface:
//! - [`AuthContext`]: login, registration, logout and state subscription.
//! - [`SessionStore`]: persisted identity and token.
//! - [`LotsService`], [`OffersService`], [`ReportsService`]: domain services.
//! - [`FederatedIdentityProvider`]: two-phase identity provider.

pub mod auth;
pub mod auth_context;
pub mod auth_state;
pub mod error;
pub mod federated_identity;
pub mod identity;
pub mod localization;
pub mod lot;
pub mod lots_service;
pub mod offer;
pub mod offers_service;
pub mod ports;
pub mod reports;
pub mod reports_service;
pub mod session_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::auth::{
    CredentialsValidationError, EmptyTokenError, LoginCredentials, PASSWORD_MIN_LEN, Registration,
    SessionToken,
};
pub use self::auth_context::{AuthContext, AuthSubscription};
pub use self::auth_state::{AuthSnapshot, AuthStatus};
pub use self::error::ServiceError;
pub use self::federated_identity::FederatedIdentityProvider;
pub use self::identity::{
    DISPLAY_NAME_MAX, DisplayName, Email, Identity, IdentityValidationError, Role, UserId,
    default_avatar,
};
pub use self::localization::{Locale, UnknownLocaleError};
pub use self::lot::{
    DEFAULT_CURRENCY, DEFAULT_UNIT, Lot, LotDraft, LotId, LotStatus, LotValidationError,
    SustainabilityMetrics,
};
pub use self::lots_service::LotsService;
pub use self::offer::{
    Offer, OfferDecision, OfferDraft, OfferFilter, OfferId, OfferStatus, OfferValidationError,
};
pub use self::offers_service::OffersService;
pub use self::reports::{LotSummary, SustainabilityImpact};
pub use self::reports_service::ReportsService;
pub use self::session_store::{SessionStore, StoredSession, TOKEN_KEY, USER_KEY};

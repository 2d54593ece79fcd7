//! Driven port for offer negotiation.

use async_trait::async_trait;

use crate::domain::{Identity, Offer, OfferDecision, OfferDraft, OfferFilter, OfferId, SessionToken};

use super::GatewayError;

/// Port for recording offers and their outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OffersGateway: Send + Sync {
    /// Record a pending offer from `buyer`.
    async fn create_offer(
        &self,
        token: &SessionToken,
        buyer: &Identity,
        draft: &OfferDraft,
    ) -> Result<Offer, GatewayError>;

    async fn list_offers(
        &self,
        token: &SessionToken,
        filter: &OfferFilter,
    ) -> Result<Vec<Offer>, GatewayError>;

    /// Accept or reject a pending offer. Decided offers are refused with
    /// [`GatewayError::Forbidden`].
    async fn update_status(
        &self,
        token: &SessionToken,
        id: &OfferId,
        decision: OfferDecision,
    ) -> Result<Offer, GatewayError>;
}

//! Offer negotiation use cases.

use std::sync::Arc;

use tracing::debug;

use super::error::ServiceError;
use super::ports::OffersGateway;
use super::session_store::{SessionStore, StoredSession};
use super::{Offer, OfferDecision, OfferDraft, OfferFilter, OfferId, Role};

#[derive(Clone)]
pub struct OffersService<G> {
    gateway: Arc<G>,
    sessions: SessionStore,
}

impl<G> OffersService<G>
where
    G: OffersGateway,
{
    pub fn new(gateway: Arc<G>, sessions: SessionStore) -> Self {
        Self { gateway, sessions }
    }

    /// Make an offer on a lot. Only buyers may make offers.
    pub async fn create(&self, draft: &OfferDraft) -> Result<Offer, ServiceError> {
        let session = self.require(Role::Buyer, "make offers")?;
        let offer = self
            .gateway
            .create_offer(&session.token, &session.identity, draft)
            .await?;
        debug!(offer = %offer.id, lot = %offer.lot_id, "offer created");
        Ok(offer)
    }

    pub async fn list(&self, filter: &OfferFilter) -> Result<Vec<Offer>, ServiceError> {
        let session = self.session()?;
        Ok(self.gateway.list_offers(&session.token, filter).await?)
    }

    /// Offers made by the signed-in buyer.
    pub async fn list_mine(&self) -> Result<Vec<Offer>, ServiceError> {
        let session = self.session()?;
        let filter = OfferFilter::for_buyer(session.identity.id().clone());
        Ok(self.gateway.list_offers(&session.token, &filter).await?)
    }

    /// Accept or reject a pending offer. Only farmers decide offers.
    pub async fn decide(&self, id: &OfferId, decision: OfferDecision) -> Result<Offer, ServiceError> {
        let session = self.require(Role::Farmer, "decide offers")?;
        let offer = self
            .gateway
            .update_status(&session.token, id, decision)
            .await?;
        debug!(offer = %offer.id, status = %offer.status, "offer decided");
        Ok(offer)
    }

    fn session(&self) -> Result<StoredSession, ServiceError> {
        self.sessions
            .load_session()
            .ok_or(ServiceError::Unauthenticated)
    }

    fn require(&self, role: Role, action: &'static str) -> Result<StoredSession, ServiceError> {
        let session = self.session()?;
        let actual = session.identity.role();
        if actual != role {
            return Err(ServiceError::Forbidden {
                role: actual,
                action,
            });
        }
        Ok(session)
    }
}

//! Offers held in process memory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{GatewayError, OffersGateway};
use crate::domain::{
    Identity, Offer, OfferDecision, OfferDraft, OfferFilter, OfferId, OfferStatus, SessionToken,
};

/// [`OffersGateway`] backed by a vector; offers last for the process lifetime.
pub struct InMemoryOffersGateway {
    offers: Mutex<Vec<Offer>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl InMemoryOffersGateway {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            offers: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn offers(&self) -> MutexGuard<'_, Vec<Offer>> {
        self.offers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl OffersGateway for InMemoryOffersGateway {
    async fn create_offer(
        &self,
        _token: &SessionToken,
        buyer: &Identity,
        draft: &OfferDraft,
    ) -> Result<Offer, GatewayError> {
        let id = OfferId::new(Uuid::new_v4().to_string())
            .map_err(|err| GatewayError::remote(err.to_string()))?;
        let offer = Offer {
            id,
            lot_id: draft.lot_id().clone(),
            buyer_id: buyer.id().clone(),
            buyer_name: buyer.name().to_string(),
            price: draft.price(),
            quantity: draft.quantity(),
            message: draft.message().map(str::to_owned),
            status: OfferStatus::Pending,
            created_at: self.clock.utc(),
        };
        self.offers().push(offer.clone());
        debug!(offer_id = %offer.id, lot_id = %offer.lot_id, "offer recorded");
        Ok(offer)
    }

    async fn list_offers(
        &self,
        _token: &SessionToken,
        filter: &OfferFilter,
    ) -> Result<Vec<Offer>, GatewayError> {
        let mut offers: Vec<Offer> = self
            .offers()
            .iter()
            .filter(|offer| filter.matches(offer))
            .cloned()
            .collect();
        offers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(offers)
    }

    async fn update_status(
        &self,
        _token: &SessionToken,
        id: &OfferId,
        decision: OfferDecision,
    ) -> Result<Offer, GatewayError> {
        let mut offers = self.offers();
        let offer = offers
            .iter_mut()
            .find(|offer| offer.id == *id)
            .ok_or_else(|| GatewayError::not_found(format!("offer {id}")))?;
        offer
            .decide(decision)
            .map_err(|err| GatewayError::forbidden(err.to_string()))?;
        debug!(offer_id = %id, status = %offer.status, "offer decided");
        Ok(offer.clone())
    }
}

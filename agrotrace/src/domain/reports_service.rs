//! Sustainability report use cases.

use std::sync::Arc;

use super::error::ServiceError;
use super::ports::{LotsGateway, OffersGateway};
use super::reports::{LotSummary, SustainabilityImpact};
use super::session_store::SessionStore;
use super::{OfferFilter, OfferStatus, Role};

/// Aggregates the signed-in user's lots (and, for buyers, accepted offers).
#[derive(Clone)]
pub struct ReportsService<L, O> {
    lots: Arc<L>,
    offers: Arc<O>,
    sessions: SessionStore,
}

impl<L, O> ReportsService<L, O>
where
    L: LotsGateway,
    O: OffersGateway,
{
    pub fn new(lots: Arc<L>, offers: Arc<O>, sessions: SessionStore) -> Self {
        Self {
            lots,
            offers,
            sessions,
        }
    }

    /// Environmental impact and revenue for the dashboard.
    ///
    /// Farmers earn revenue from sold lots; buyers see the value of their
    /// accepted offers instead.
    pub async fn sustainability_impact(&self) -> Result<SustainabilityImpact, ServiceError> {
        let session = self
            .sessions
            .load_session()
            .ok_or(ServiceError::Unauthenticated)?;
        let lots = self.lots.list_lots(&session.token).await?;
        let impact = SustainabilityImpact::from_lots(&lots);
        match session.identity.role() {
            Role::Farmer => Ok(impact),
            Role::Buyer => {
                let filter = OfferFilter::for_buyer(session.identity.id().clone());
                let accepted: f64 = self
                    .offers
                    .list_offers(&session.token, &filter)
                    .await?
                    .iter()
                    .filter(|offer| offer.status == OfferStatus::Accepted)
                    .map(|offer| offer.total())
                    .sum();
                Ok(impact.with_revenue(accepted))
            }
        }
    }

    pub async fn lot_summary(&self) -> Result<LotSummary, ServiceError> {
        let token = self.sessions.token().ok_or(ServiceError::Unauthenticated)?;
        let lots = self.lots.list_lots(&token).await?;
        Ok(LotSummary::from_lots(&lots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockLotsGateway, MockOffersGateway};
    use crate::domain::test_support::{MapStorage, identity, sample_lot, token};
    use crate::domain::{LotId, LotStatus, Offer, OfferId, SustainabilityMetrics, UserId};
    use chrono::Utc;
    use rstest::rstest;

    fn store(role: Option<Role>) -> SessionStore {
        let store = SessionStore::new(Arc::new(MapStorage::default()));
        if let Some(role) = role {
            store
                .save(&identity("user-1", role), &token("tok-1"))
                .expect("seed session");
        }
        store
    }

    fn offer(status: OfferStatus, price: f64, quantity: f64) -> Offer {
        Offer {
            id: OfferId::new("offer-1").expect("id"),
            lot_id: LotId::new("lot-1").expect("lot"),
            buyer_id: UserId::new("user-1").expect("uid"),
            buyer_name: "Ana".into(),
            price,
            quantity,
            message: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn farmer_impact_counts_sold_lots() {
        let mut lots = MockLotsGateway::new();
        lots.expect_list_lots().returning(|_| {
            let mut sold = sample_lot("lot-2", "user-1");
            sold.status = LotStatus::Sold;
            sold.sustainability = SustainabilityMetrics {
                carbon_saved: 12.5,
                water_saved: 300.0,
                emissions_reduced: 4.0,
            };
            Ok(vec![sample_lot("lot-1", "user-1"), sold])
        });
        let mut offers = MockOffersGateway::new();
        offers.expect_list_offers().times(0);
        let service = ReportsService::new(Arc::new(lots), Arc::new(offers), store(Some(Role::Farmer)));

        let impact = service.sustainability_impact().await.expect("impact");
        assert_eq!(impact.lots_created, 2);
        assert_eq!(impact.total_carbon_saved, 12.5);
        assert_eq!(impact.revenue, 200_000.0);
    }

    #[rstest]
    #[tokio::test]
    async fn buyer_revenue_sums_accepted_offers() {
        let mut lots = MockLotsGateway::new();
        lots.expect_list_lots().returning(|_| Ok(Vec::new()));
        let mut offers = MockOffersGateway::new();
        offers.expect_list_offers().returning(|_, _| {
            Ok(vec![
                offer(OfferStatus::Accepted, 100.0, 3.0),
                offer(OfferStatus::Pending, 1_000.0, 1.0),
                offer(OfferStatus::Accepted, 50.0, 2.0),
            ])
        });
        let service = ReportsService::new(Arc::new(lots), Arc::new(offers), store(Some(Role::Buyer)));

        let impact = service.sustainability_impact().await.expect("impact");
        assert_eq!(impact.lots_created, 0);
        assert_eq!(impact.revenue, 400.0);
    }

    #[rstest]
    #[tokio::test]
    async fn reports_require_a_session() {
        let service = ReportsService::new(
            Arc::new(MockLotsGateway::new()),
            Arc::new(MockOffersGateway::new()),
            store(None),
        );
        assert_eq!(
            service.sustainability_impact().await,
            Err(ServiceError::Unauthenticated)
        );
        assert_eq!(service.lot_summary().await, Err(ServiceError::Unauthenticated));
    }
}

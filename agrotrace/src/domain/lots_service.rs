//! Lot use cases for the signed-in farmer.

use std::sync::Arc;

use tracing::debug;

use super::error::ServiceError;
use super::ports::LotsGateway;
use super::reports::LotSummary;
use super::session_store::{SessionStore, StoredSession};
use super::{Lot, LotDraft, LotId, Role};

/// Creates, lists and deletes lots with the stored session's token.
#[derive(Clone)]
pub struct LotsService<G> {
    gateway: Arc<G>,
    sessions: SessionStore,
}

impl<G> LotsService<G>
where
    G: LotsGateway,
{
    pub fn new(gateway: Arc<G>, sessions: SessionStore) -> Self {
        Self { gateway, sessions }
    }

    /// Publish a new lot. Only farmers may create lots.
    pub async fn create(&self, draft: &LotDraft) -> Result<Lot, ServiceError> {
        let session = self.session()?;
        let role = session.identity.role();
        if role != Role::Farmer {
            return Err(ServiceError::Forbidden {
                role,
                action: "create lots",
            });
        }
        let mut lot = self.gateway.create_lot(&session.token, draft).await?;
        if lot.farmer_name.is_none() {
            lot.farmer_name = Some(session.identity.name().to_string());
        }
        debug!(lot = %lot.id, code = %lot.traceability_code.as_str(), "lot created");
        Ok(lot)
    }

    pub async fn list(&self) -> Result<Vec<Lot>, ServiceError> {
        let session = self.session()?;
        Ok(self.gateway.list_lots(&session.token).await?)
    }

    pub async fn delete(&self, id: &LotId) -> Result<(), ServiceError> {
        let session = self.session()?;
        self.gateway.delete_lot(&session.token, id).await?;
        debug!(lot = %id, "lot deleted");
        Ok(())
    }

    /// Dashboard quick stats over the caller's lots.
    pub async fn summary(&self) -> Result<LotSummary, ServiceError> {
        let lots = self.list().await?;
        Ok(LotSummary::from_lots(&lots))
    }

    fn session(&self) -> Result<StoredSession, ServiceError> {
        self.sessions
            .load_session()
            .ok_or(ServiceError::Unauthenticated)
    }
}

//! Driven port for the lots endpoints of the marketplace backend.

use async_trait::async_trait;

use crate::domain::{Lot, LotDraft, LotId, SessionToken};

use super::GatewayError;

/// Port for creating, listing and deleting the caller's lots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LotsGateway: Send + Sync {
    /// Create a lot owned by the token's user and return it as stored,
    /// including its traceability code and QR reference.
    async fn create_lot(&self, token: &SessionToken, draft: &LotDraft)
    -> Result<Lot, GatewayError>;

    /// List the token user's lots, newest first. Soft-deleted lots are omitted.
    async fn list_lots(&self, token: &SessionToken) -> Result<Vec<Lot>, GatewayError>;

    async fn delete_lot(&self, token: &SessionToken, id: &LotId) -> Result<(), GatewayError>;
}

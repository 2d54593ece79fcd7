//! Lots gateway backed by the marketplace backend's `/lots` routes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::warn;
use traceability::QrImageService;

use super::client::{BackendClient, BackendResponse, error_message};
use super::dto::{CreateLotRequestDto, DecodedLot, LotEnvelopeDto, LotsEnvelopeDto};
use crate::domain::ports::{GatewayError, LotsGateway};
use crate::domain::{Lot, LotDraft, LotId, SessionToken};

/// [`LotsGateway`] over HTTP.
#[derive(Clone)]
pub struct HttpLotsGateway {
    client: BackendClient,
    qr: QrImageService,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl HttpLotsGateway {
    pub fn new(
        client: BackendClient,
        qr: QrImageService,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self { client, qr, clock }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        token: &SessionToken,
    ) -> Result<BackendResponse, GatewayError> {
        let response = self
            .client
            .execute(request, Some(token))
            .await
            .map_err(|failure| GatewayError::network(failure.describe()))?;
        if response.status.is_success() {
            Ok(response)
        } else {
            Err(map_status(response.status, &response.body))
        }
    }

    fn decode_lot(&self, dto: super::dto::LotDto) -> Result<Option<Lot>, GatewayError> {
        match dto.into_domain(&self.qr, self.clock.utc()) {
            Ok(DecodedLot::Live(lot)) => Ok(Some(*lot)),
            Ok(DecodedLot::Deleted) => Ok(None),
            Err(message) => Err(GatewayError::decode(message)),
        }
    }
}

#[async_trait]
impl LotsGateway for HttpLotsGateway {
    async fn create_lot(&self, token: &SessionToken, draft: &LotDraft) -> Result<Lot, GatewayError> {
        let url = self.client.endpoint(&["lots"]).map_err(GatewayError::remote)?;
        let request = self.client.post(url).json(&CreateLotRequestDto::from(draft));
        let response = self.send(request, token).await?;
        let envelope: LotEnvelopeDto = decode(&response.body)?;
        self.decode_lot(envelope.lot)?
            .ok_or_else(|| GatewayError::decode("backend returned a deleted lot on create"))
    }

    async fn list_lots(&self, token: &SessionToken) -> Result<Vec<Lot>, GatewayError> {
        let url = self.client.endpoint(&["lots"]).map_err(GatewayError::remote)?;
        let response = self.send(self.client.get(url), token).await?;
        let envelope: LotsEnvelopeDto = decode(&response.body)?;

        let mut lots = Vec::with_capacity(envelope.lots.len());
        for dto in envelope.lots {
            if let Some(lot) = self.decode_lot(dto)? {
                lots.push(lot);
            }
        }
        lots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(lots)
    }

    async fn delete_lot(&self, token: &SessionToken, id: &LotId) -> Result<(), GatewayError> {
        let url = self
            .client
            .endpoint(&["lots", id.as_ref()])
            .map_err(GatewayError::remote)?;
        self.send(self.client.delete(url), token).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|err| GatewayError::decode(err.to_string()))
}

fn map_status(status: StatusCode, body: &[u8]) -> GatewayError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED => GatewayError::unauthenticated(),
        StatusCode::FORBIDDEN => GatewayError::forbidden(message),
        StatusCode::NOT_FOUND => GatewayError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GatewayError::network(message)
        }
        _ => {
            warn!(status = status.as_u16(), %message, "lots request failed");
            GatewayError::remote(message)
        }
    }
}

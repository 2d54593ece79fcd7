//! QR payloads and the external image service that renders them.
//!
//! The client never rasterises QR images itself. It encodes the lot summary
//! as URL-safe base64 JSON and asks a third-party service for an image URL.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::code::TraceabilityCode;
use crate::error::TraceabilityError;

/// Public QR rendering endpoint used when no override is configured.
pub const DEFAULT_QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Default square image size in pixels.
pub const DEFAULT_QR_SIZE: u32 = 150;

/// Data embedded in a lot's QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrPayload {
    /// Lot identifier assigned by the backend.
    pub lot_id: String,
    /// Human-readable traceability code.
    pub traceability_code: TraceabilityCode,
    /// Product type, for example `Tomate`.
    pub crop_type: String,
    /// Quantity with unit, for example `250 kg`.
    pub quantity: String,
    /// Lot creation instant.
    pub created_at: DateTime<Utc>,
    /// Identifier of the farmer who owns the lot.
    pub farmer_uid: String,
}

impl QrPayload {
    /// Format a quantity and unit the way labels print them.
    #[must_use]
    pub fn format_quantity(quantity: f64, unit: &str) -> String {
        format!("{quantity} {unit}")
    }

    /// Encode the payload as URL-safe base64 JSON.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serialising plain strings and a timestamp cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a payload previously produced by [`QrPayload::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`TraceabilityError::InvalidEncoding`] for bad base64 and
    /// [`TraceabilityError::InvalidPayload`] for JSON that does not match.
    pub fn decode(encoded: &str) -> Result<Self, TraceabilityError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|err| TraceabilityError::InvalidEncoding {
                message: err.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|err| TraceabilityError::InvalidPayload {
            message: err.to_string(),
        })
    }
}

/// Builds image URLs on a third-party QR rendering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImageService {
    base: Url,
    size: u32,
}

impl QrImageService {
    /// Use `base` as the rendering endpoint with square images of `size` pixels.
    #[must_use]
    pub fn new(base: Url, size: u32) -> Self {
        Self {
            base,
            size: size.max(1),
        }
    }

    /// Image URL rendering `payload`.
    #[must_use]
    pub fn image_url(&self, payload: &QrPayload) -> Url {
        self.image_url_for_data(&payload.encode())
    }

    /// Image URL rendering arbitrary text.
    #[must_use]
    pub fn image_url_for_data(&self, data: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("size", &format!("{size}x{size}", size = self.size))
            .append_pair("data", data);
        url
    }

    /// The public service at [`DEFAULT_QR_SERVICE_URL`] with
    /// [`DEFAULT_QR_SIZE`] images.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the default endpoint is not a valid URL.
    pub fn hosted() -> Result<Self, url::ParseError> {
        Url::parse(DEFAULT_QR_SERVICE_URL).map(|base| Self::new(base, DEFAULT_QR_SIZE))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for QR payload encoding and image URLs.

    use super::*;
    use chrono::TimeZone;

    fn payload() -> QrPayload {
        let created_at = Utc
            .with_ymd_and_hms(2025, 1, 3, 8, 5, 9)
            .single()
            .expect("valid fixture timestamp");
        QrPayload {
            lot_id: "3fa85f64-5717-4562-b3fc-2c963f66afa6".to_owned(),
            traceability_code: TraceabilityCode::generate("3fa85f64", created_at)
                .expect("code"),
            crop_type: "Tomate".to_owned(),
            quantity: QrPayload::format_quantity(250.0, "kg"),
            created_at,
            farmer_uid: "farmer-1".to_owned(),
        }
    }

    #[test]
    fn encoded_payload_is_url_safe_and_decodes() {
        let encoded = payload().encode();
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "encoding must avoid characters that need escaping"
        );
        assert_eq!(QrPayload::decode(&encoded).expect("decode"), payload());
    }

    #[test]
    fn quantity_is_printed_with_unit() {
        assert_eq!(QrPayload::format_quantity(12.5, "t"), "12.5 t");
        assert_eq!(payload().quantity, "250 kg");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            QrPayload::decode("***"),
            Err(TraceabilityError::InvalidEncoding { .. })
        ));
        let not_json = URL_SAFE_NO_PAD.encode(b"plain text");
        assert!(matches!(
            QrPayload::decode(&not_json),
            Err(TraceabilityError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn image_url_carries_size_and_data() {
        let service = QrImageService::hosted().expect("hosted service");
        let url = service.image_url_for_data("LOT-20250103080509-3FA85F64");
        assert_eq!(url.host_str(), Some("api.qrserver.com"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("size".to_owned(), "150x150".to_owned()),
                ("data".to_owned(), "LOT-20250103080509-3FA85F64".to_owned()),
            ]
        );
    }
}

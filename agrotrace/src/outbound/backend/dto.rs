//! Wire DTOs for the marketplace backend.
//!
//! The backend serialises datetimes with Flask's default JSON encoder, which
//! emits RFC 2822 strings (`Fri, 14 Mar 2025 09:26:53 GMT`). Newer handlers
//! send ISO 8601. Both are accepted.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use traceability::{QrImageService, QrPayload, TraceabilityCode};

use crate::domain::{
    DEFAULT_CURRENCY, DEFAULT_UNIT, Lot, LotDraft, LotId, LotStatus, SustainabilityMetrics, UserId,
};

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    error: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ErrorEnvelopeDto {
    /// Machine-readable error code, when the backend sends one.
    pub(super) fn code(&self) -> Option<&str> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub(super) fn into_message(self) -> Option<String> {
        match self.error {
            Some(error) if !error.trim().is_empty() => Some(error),
            _ if !self.errors.is_empty() => Some(self.errors.join("; ")),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginResponseDto {
    pub(super) uid: String,
    pub(super) email: Option<String>,
    pub(super) token: String,
    #[serde(default)]
    pub(super) user_data: Option<UserDataDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UserDataDto {
    pub(super) name: Option<String>,
    pub(super) role: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RegisterRequestDto<'a> {
    pub(super) name: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) role: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct RegisterResponseDto {
    pub(super) uid: String,
    pub(super) token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateLotRequestDto<'a> {
    crop_type: &'a str,
    quantity: f64,
    unit: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    harvest_date: Option<String>,
    certifications: Vec<&'a str>,
    price: f64,
    currency: &'a str,
    sustainability_metrics: SustainabilityMetrics,
}

impl<'a> From<&'a LotDraft> for CreateLotRequestDto<'a> {
    fn from(draft: &'a LotDraft) -> Self {
        Self {
            crop_type: draft.product_type(),
            quantity: draft.quantity(),
            unit: draft.unit(),
            location: draft.location(),
            harvest_date: draft
                .harvest_date()
                .map(|date| date.format("%Y-%m-%d").to_string()),
            certifications: draft.certifications().iter().map(String::as_str).collect(),
            price: draft.price(),
            currency: draft.currency(),
            sustainability_metrics: draft.sustainability(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LotEnvelopeDto {
    pub(super) lot: LotDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LotsEnvelopeDto {
    #[serde(default)]
    pub(super) lots: Vec<LotDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LotDto {
    id: String,
    farmer_uid: String,
    #[serde(default)]
    farmer_name: Option<String>,
    crop_type: String,
    quantity: f64,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    harvest_date: Option<String>,
    #[serde(default)]
    certifications: Option<Vec<String>>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    sustainability_metrics: Option<SustainabilityMetrics>,
    status: String,
    #[serde(default)]
    qr_code: Option<String>,
    #[serde(default)]
    traceability_code: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

/// What a decoded lot turned into.
pub(super) enum DecodedLot {
    Live(Box<Lot>),
    /// Soft-deleted on the backend.
    Deleted,
}

impl LotDto {
    /// Map into a domain lot.
    ///
    /// Missing optional fields take the documented defaults. A missing or
    /// malformed traceability code is regenerated from the id and creation
    /// time, and a missing QR reference is built on `qr`.
    pub(super) fn into_domain(
        self,
        qr: &QrImageService,
        now: DateTime<Utc>,
    ) -> Result<DecodedLot, String> {
        let status = match LotStatus::from_backend(&self.status) {
            Some(status) => status,
            None if self.status.eq_ignore_ascii_case("deleted") => return Ok(DecodedLot::Deleted),
            None => return Err(format!("lot {} has unknown status '{}'", self.id, self.status)),
        };
        if !self.quantity.is_finite() {
            return Err(format!("lot {} has a non-finite quantity", self.id));
        }
        let id = LotId::new(self.id.clone()).map_err(|err| err.to_string())?;
        let farmer_id = UserId::new(self.farmer_uid.clone())
            .map_err(|err| format!("lot {id} farmer: {err}"))?;
        let created_at = match self.created_at.as_deref() {
            Some(raw) => parse_timestamp(raw).ok_or_else(|| {
                format!("lot {id} has unparseable created_at '{raw}'")
            })?,
            None => now,
        };
        let traceability_code = match self
            .traceability_code
            .as_deref()
            .map(TraceabilityCode::parse)
        {
            Some(Ok(code)) => code,
            _ => TraceabilityCode::generate(&self.id, created_at).map_err(|err| err.to_string())?,
        };
        let unit = self
            .unit
            .filter(|unit| !unit.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UNIT.to_owned());
        let qr_code = match self.qr_code.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => normalise_qr_reference(raw),
            None => qr
                .image_url(&QrPayload {
                    lot_id: self.id.clone(),
                    traceability_code: traceability_code.clone(),
                    crop_type: self.crop_type.clone(),
                    quantity: QrPayload::format_quantity(self.quantity, &unit),
                    created_at,
                    farmer_uid: self.farmer_uid.clone(),
                })
                .into(),
        };

        Ok(DecodedLot::Live(Box::new(Lot {
            id,
            farmer_id,
            farmer_name: self.farmer_name,
            product_type: self.crop_type,
            quantity: self.quantity,
            unit,
            harvest_date: self.harvest_date.as_deref().and_then(parse_date),
            location: self.location.filter(|location| !location.trim().is_empty()),
            certifications: self
                .certifications
                .unwrap_or_default()
                .into_iter()
                .collect::<BTreeSet<_>>(),
            price: self.price.filter(|price| price.is_finite()).unwrap_or(0.0),
            currency: self
                .currency
                .filter(|currency| !currency.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
            traceability_code,
            qr_code,
            sustainability: self.sustainability_metrics.unwrap_or_default(),
            status,
            created_at,
        })))
    }
}

/// Backend-rendered QR codes arrive as bare base64 PNG data.
fn normalise_qr_reference(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("data:") || trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("data:image/png;base64,{trimmed}")
    }
}

pub(super) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            // Python `isoformat()` on naive UTC datetimes has no offset.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()))
}

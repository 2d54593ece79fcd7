//! Produce lot data model and draft validation.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use traceability::TraceabilityCode;

use super::identity::UserId;

/// Unit applied when a draft does not name one.
pub const DEFAULT_UNIT: &str = "kg";
/// Currency applied when a draft does not name one.
pub const DEFAULT_CURRENCY: &str = "COP";

/// Validation errors raised while building a [`LotDraft`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LotValidationError {
    #[error("lot id must not be empty")]
    EmptyId,
    #[error("product type is required")]
    MissingProductType,
    #[error("quantity must be a number greater than 0, got {quantity}")]
    InvalidQuantity { quantity: f64 },
    #[error("price must be a number of at least 0, got {price}")]
    InvalidPrice { price: f64 },
    #[error("unit must not be empty")]
    EmptyUnit,
    #[error("currency must be a three-letter code, got '{currency}'")]
    InvalidCurrency { currency: String },
}

/// Backend identifier of a lot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotId(String);

impl LotId {
    pub fn new(id: impl Into<String>) -> Result<Self, LotValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LotValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for LotId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LotId> for String {
    fn from(value: LotId) -> Self {
        value.0
    }
}

impl TryFrom<String> for LotId {
    type Error = LotValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Sale status of a lot. Only offer acceptance (outside this client) moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotStatus {
    Available,
    Reserved,
    Sold,
}

impl LotStatus {
    /// Map a backend status string. `active` is the backend's name for
    /// available stock; soft-deleted and unknown statuses yield `None`.
    pub fn from_backend(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" | "available" => Some(Self::Available),
            "reserved" => Some(Self::Reserved),
            "sold" => Some(Self::Sold),
            _ => None,
        }
    }
}

/// Environmental savings attributed to a lot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityMetrics {
    /// Kilograms of carbon saved.
    #[serde(default)]
    pub carbon_saved: f64,
    /// Litres of water saved.
    #[serde(default)]
    pub water_saved: f64,
    /// Kilograms of CO2-equivalent emissions avoided.
    #[serde(default)]
    pub emissions_reduced: f64,
}

/// Traceable batch of produce offered for sale.
#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub id: LotId,
    pub farmer_id: UserId,
    /// Owner display name when the backend or the creating session knows it.
    pub farmer_name: Option<String>,
    pub product_type: String,
    pub quantity: f64,
    pub unit: String,
    pub harvest_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub certifications: BTreeSet<String>,
    pub price: f64,
    pub currency: String,
    pub traceability_code: TraceabilityCode,
    /// Image reference for the lot's QR code: a `data:` URL for backend
    /// rendered PNGs or an image-service URL.
    pub qr_code: String,
    pub sustainability: SustainabilityMetrics,
    pub status: LotStatus,
    pub created_at: DateTime<Utc>,
}

impl Lot {
    /// Market value of the whole lot.
    pub fn value(&self) -> f64 {
        self.price * self.quantity
    }
}

/// Validated request to create a lot.
///
/// ## Invariants
/// - `product_type` and `unit` are trimmed and non-empty.
/// - `quantity` is finite and strictly positive; `price` is finite and >= 0.
/// - `currency` is three uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq)]
pub struct LotDraft {
    product_type: String,
    quantity: f64,
    unit: String,
    harvest_date: Option<NaiveDate>,
    location: Option<String>,
    certifications: BTreeSet<String>,
    price: f64,
    currency: String,
    sustainability: SustainabilityMetrics,
}

impl LotDraft {
    /// Start a draft with the default unit, currency and a zero price.
    pub fn new(product_type: &str, quantity: f64) -> Result<Self, LotValidationError> {
        let product_type = product_type.trim();
        if product_type.is_empty() {
            return Err(LotValidationError::MissingProductType);
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(LotValidationError::InvalidQuantity { quantity });
        }
        Ok(Self {
            product_type: product_type.to_owned(),
            quantity,
            unit: DEFAULT_UNIT.to_owned(),
            harvest_date: None,
            location: None,
            certifications: BTreeSet::new(),
            price: 0.0,
            currency: DEFAULT_CURRENCY.to_owned(),
            sustainability: SustainabilityMetrics::default(),
        })
    }

    pub fn with_unit(mut self, unit: &str) -> Result<Self, LotValidationError> {
        let unit = unit.trim();
        if unit.is_empty() {
            return Err(LotValidationError::EmptyUnit);
        }
        self.unit = unit.to_owned();
        Ok(self)
    }

    pub fn with_price(mut self, price: f64, currency: &str) -> Result<Self, LotValidationError> {
        if !price.is_finite() || price < 0.0 {
            return Err(LotValidationError::InvalidPrice { price });
        }
        let currency = currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(LotValidationError::InvalidCurrency { currency });
        }
        self.price = price;
        self.currency = currency;
        Ok(self)
    }

    #[must_use]
    pub fn with_harvest_date(mut self, date: NaiveDate) -> Self {
        self.harvest_date = Some(date);
        self
    }

    /// Set the location; blank input clears it.
    #[must_use]
    pub fn with_location(mut self, location: &str) -> Self {
        let location = location.trim();
        self.location = (!location.is_empty()).then(|| location.to_owned());
        self
    }

    /// Add certifications, ignoring blanks and duplicates.
    #[must_use]
    pub fn with_certifications<I, S>(mut self, certifications: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.certifications.extend(
            certifications
                .into_iter()
                .map(|c| c.as_ref().trim().to_owned())
                .filter(|c| !c.is_empty()),
        );
        self
    }

    #[must_use]
    pub fn with_sustainability(mut self, metrics: SustainabilityMetrics) -> Self {
        self.sustainability = metrics;
        self
    }

    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn harvest_date(&self) -> Option<NaiveDate> {
        self.harvest_date
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn certifications(&self) -> &BTreeSet<String> {
        &self.certifications
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn sustainability(&self) -> SustainabilityMetrics {
        self.sustainability
    }
}

//! Purchase offers made by buyers against lots.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::UserId;
use super::lot::LotId;

/// Validation errors raised while building or transitioning offers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OfferValidationError {
    #[error("offer id must not be empty")]
    EmptyId,
    #[error("offer price must be greater than 0, got {price}")]
    InvalidPrice { price: f64 },
    #[error("offer quantity must be greater than 0, got {quantity}")]
    InvalidQuantity { quantity: f64 },
    #[error("offer is already {status} and can no longer change")]
    AlreadyDecided { status: OfferStatus },
}

/// Identifier of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OfferId(String);

impl OfferId {
    pub fn new(id: impl Into<String>) -> Result<Self, OfferValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(OfferValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for OfferId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<OfferId> for String {
    fn from(value: OfferId) -> Self {
        value.0
    }
}

impl TryFrom<String> for OfferId {
    type Error = OfferValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        })
    }
}

/// Farmer's answer to a pending offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferDecision {
    Accept,
    Reject,
}

impl From<OfferDecision> for OfferStatus {
    fn from(value: OfferDecision) -> Self {
        match value {
            OfferDecision::Accept => Self::Accepted,
            OfferDecision::Reject => Self::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub lot_id: LotId,
    pub buyer_id: UserId,
    pub buyer_name: String,
    pub price: f64,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Apply a decision. Only pending offers may transition.
    pub fn decide(&mut self, decision: OfferDecision) -> Result<(), OfferValidationError> {
        if self.status != OfferStatus::Pending {
            return Err(OfferValidationError::AlreadyDecided {
                status: self.status,
            });
        }
        self.status = decision.into();
        Ok(())
    }

    /// Total amount the buyer proposes to pay.
    pub fn total(&self) -> f64 {
        self.price * self.quantity
    }
}

/// Validated request to make an offer on a lot.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferDraft {
    lot_id: LotId,
    price: f64,
    quantity: f64,
    message: Option<String>,
}

impl OfferDraft {
    pub fn new(lot_id: LotId, price: f64, quantity: f64) -> Result<Self, OfferValidationError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(OfferValidationError::InvalidPrice { price });
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(OfferValidationError::InvalidQuantity { quantity });
        }
        Ok(Self {
            lot_id,
            price,
            quantity,
            message: None,
        })
    }

    /// Attach a note for the farmer; blank input clears it.
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        let message = message.trim();
        self.message = (!message.is_empty()).then(|| message.to_owned());
        self
    }

    pub fn lot_id(&self) -> &LotId {
        &self.lot_id
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Optional restrictions for listing offers. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferFilter {
    pub buyer_id: Option<UserId>,
    pub lot_id: Option<LotId>,
}

impl OfferFilter {
    pub fn for_buyer(buyer_id: UserId) -> Self {
        Self {
            buyer_id: Some(buyer_id),
            lot_id: None,
        }
    }

    pub fn for_lot(lot_id: LotId) -> Self {
        Self {
            buyer_id: None,
            lot_id: Some(lot_id),
        }
    }

    pub fn matches(&self, offer: &Offer) -> bool {
        self.buyer_id.as_ref().is_none_or(|id| *id == offer.buyer_id)
            && self.lot_id.as_ref().is_none_or(|id| *id == offer.lot_id)
    }
}

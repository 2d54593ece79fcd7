//! Shared builders for domain unit tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use traceability::TraceabilityCode;

use super::ports::{KeyValueStorage, StorageError};
use super::{
    Identity, Lot, LotId, LotStatus, Role, SessionToken, SustainabilityMetrics, UserId,
};

/// Map-backed storage double that always succeeds.
#[derive(Debug, Default)]
pub(crate) struct MapStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MapStorage {
    pub(crate) fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("storage lock")
            .insert(key.to_owned(), value.to_owned());
    }

    pub(crate) fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage lock").get(key).cloned()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.lock().expect("storage lock").is_empty()
    }
}

impl KeyValueStorage for MapStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().expect("storage lock").remove(key);
        Ok(())
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
        .single()
        .expect("timestamp")
}

pub(crate) fn identity(id: &str, role: Role) -> Identity {
    Identity::try_from_strings(id, &format!("{id}@agrotrace.test"), "Ana", role)
        .expect("valid identity")
}

pub(crate) fn token(raw: &str) -> SessionToken {
    SessionToken::new(raw).expect("valid token")
}

pub(crate) fn sample_lot(id: &str, farmer: &str) -> Lot {
    let created_at = fixed_instant();
    Lot {
        id: LotId::new(id).expect("lot id"),
        farmer_id: UserId::new(farmer).expect("farmer id"),
        farmer_name: Some("Ana".into()),
        product_type: "Tomate".into(),
        quantity: 100.0,
        unit: "kg".into(),
        harvest_date: None,
        location: Some("Boyacá".into()),
        certifications: BTreeSet::new(),
        price: 2_000.0,
        currency: "COP".into(),
        traceability_code: TraceabilityCode::generate(id, created_at).expect("code"),
        qr_code: "https://api.qrserver.com/v1/create-qr-code/?size=150x150&data=x".into(),
        sustainability: SustainabilityMetrics::default(),
        status: LotStatus::Available,
        created_at,
    }
}

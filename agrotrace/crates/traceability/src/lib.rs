//! Traceability primitives for AgroTrace produce lots.
//!
//! A lot carries a human-readable traceability code and a QR payload that a
//! buyer can scan to recover the lot's origin. This crate is independent of
//! the client's domain types so it can be shared with tooling that prints
//! labels.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use traceability::TraceabilityCode;
//!
//! let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).single().expect("valid time");
//! let code = TraceabilityCode::generate("3fa85f64-5717-4562-b3fc-2c963f66afa6", at)
//!     .expect("lot id is not empty");
//!
//! assert_eq!(code.as_str(), "LOT-20250314092653-3FA85F64");
//! ```

mod code;
mod error;
mod qr;

pub use code::TraceabilityCode;
pub use error::TraceabilityError;
pub use qr::{DEFAULT_QR_SERVICE_URL, DEFAULT_QR_SIZE, QrImageService, QrPayload};

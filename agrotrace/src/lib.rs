//! AgroTrace client library.
//!
//! Session persistence, identity provider adapters, the shared auth context
//! and the lots, offers and reports services behind the AgroTrace produce
//! marketplace client. Start from [`app::AgroTrace`].

pub mod app;
pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod telemetry;

pub use app::{AgroTrace, AppError};
pub use config::{ClientConfig, ClientSettings, ConfigError, IdentityBackend};

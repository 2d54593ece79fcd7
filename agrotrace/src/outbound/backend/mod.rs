//! Adapters for the AgroTrace marketplace backend (`/api/auth`, `/api/lots`).

mod client;
mod dto;
mod identity;
mod lots;

pub use client::BackendClient;
pub(crate) use client::body_preview;
pub use identity::HttpIdentityProvider;
pub use lots::HttpLotsGateway;

//! Firebase REST adapters: Identity Toolkit accounts and Firestore profiles.
//!
//! Compose them with [`crate::domain::FederatedIdentityProvider`].

mod authority;
mod dto;
mod profiles;

pub use authority::{IDENTITY_TOOLKIT_URL, IdentityToolkitAuthority};
pub use profiles::FirestoreProfileDirectory;

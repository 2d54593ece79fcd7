//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod gateway_error;
mod identity_authority;
mod identity_provider;
mod key_value_storage;
mod lots_gateway;
mod offers_gateway;
mod profile_directory;

pub use gateway_error::GatewayError;
#[cfg(test)]
pub use identity_authority::MockIdentityAuthority;
pub use identity_authority::{AuthorityAccount, IdentityAuthority};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{
    AuthError, AuthenticatedSession, FixtureIdentityProvider, IdentityProvider, SessionLiveness,
    resolve_role,
};
#[cfg(test)]
pub use key_value_storage::MockKeyValueStorage;
pub use key_value_storage::{KeyValueStorage, StorageError};
#[cfg(test)]
pub use lots_gateway::MockLotsGateway;
pub use lots_gateway::LotsGateway;
#[cfg(test)]
pub use offers_gateway::MockOffersGateway;
pub use offers_gateway::OffersGateway;
#[cfg(test)]
pub use profile_directory::MockProfileDirectory;
pub use profile_directory::{ProfileDirectory, UserProfile};

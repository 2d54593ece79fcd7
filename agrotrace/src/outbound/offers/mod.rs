//! [`crate::domain::ports::OffersGateway`] adapters.

mod memory;

pub use memory::InMemoryOffersGateway;

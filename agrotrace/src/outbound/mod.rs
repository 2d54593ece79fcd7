//! Outbound adapters implementing the domain ports.

pub mod backend;
pub mod firebase;
pub mod offers;
pub mod storage;

//! Inbound adapters that translate view-layer requests into domain calls.
//!
//! The view layer itself is out of scope; [`navigation`] is the edge it
//! consults before rendering a screen.

pub mod navigation;

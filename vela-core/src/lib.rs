//! Vela Core
//!
//! Core library for a declarative cloud-provisioning engine: the resource and
//! schema models, the provider contract, composite import identifiers, and the
//! provisioning waiter that polls remote objects to a terminal lifecycle state.

pub mod import;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod wait;

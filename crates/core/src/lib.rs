//! Domain core of the project management service.
//!
//! Entity schema, payload validation, list filters, the referential
//! integrity graph, and the persistence contract every storage realization
//! implements. Nothing in this crate performs I/O.

pub mod error;
pub mod integrity;
pub mod models;
pub mod parse;
pub mod query;
pub mod store;
pub mod types;

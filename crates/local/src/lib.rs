//! Local-mirror realization of the persistence contract.
//!
//! Each entity collection is one JSON array stored under a fixed key in a
//! [`KeyValueStore`]. There are no native constraints underneath, so deletes
//! run the shared cascade engine from [`pms_core::integrity`] and write back
//! every collection it touched.

mod error;
pub mod keys;
mod kv;
mod seed;
mod store;

pub use error::KvError;
pub use kv::{FileKv, KeyValueStore, MemoryKv};
pub use seed::seed_dataset;
pub use store::LocalStore;

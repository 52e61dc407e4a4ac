//! The persistence contract.
//!
//! Both realizations (SQLite-backed and local key-value mirror) implement
//! [`Store`]; callers hold an `Arc<dyn Store>` and cannot tell them apart.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::{Entity, Issue, Milestone, Project, Schedule};
use crate::types::DbId;

/// CRUD over one entity collection.
///
/// - `get`, `update` and `delete` on a missing id fail with
///   [`CoreError::NotFound`].
/// - `create` and `update` fail with [`CoreError::Validation`] when a
///   referenced parent does not exist.
/// - `update` replaces every editable field and refreshes `updated_at`;
///   `id`, `created_at` and the owning `project_id` never change.
/// - `delete` applies the referential actions in
///   [`crate::integrity::FOREIGN_KEYS`] as part of the same operation.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn list(&self, filter: &E::Filter) -> Result<Vec<E>, CoreError>;

    async fn get(&self, id: DbId) -> Result<E, CoreError>;

    async fn create(&self, input: E::New) -> Result<E, CoreError>;

    async fn update(&self, id: DbId, fields: E::Fields) -> Result<E, CoreError>;

    async fn delete(&self, id: DbId) -> Result<(), CoreError>;
}

/// A complete persistence backend.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short identifier for logs and the health endpoint.
    fn backend_name(&self) -> &'static str;

    fn projects(&self) -> &dyn EntityStore<Project>;

    fn milestones(&self) -> &dyn EntityStore<Milestone>;

    fn issues(&self) -> &dyn EntityStore<Issue>;

    fn schedules(&self) -> &dyn EntityStore<Schedule>;

    /// Verify the backing storage is reachable.
    async fn health_check(&self) -> Result<(), CoreError>;

    /// Release connections and flush pending state. Called once on shutdown.
    async fn close(&self);
}

use crate::types::DbId;

/// Domain error shared by every persistence realization.
///
/// The three variants are the whole failure taxonomy a caller can observe:
/// a rejected payload, a missing record, or a backing store that could not
/// complete the operation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        CoreError::NotFound { entity, id }
    }

    /// Build a validation error for a foreign key that points nowhere.
    pub fn dangling_reference(field: &str, id: DbId, target: &str) -> Self {
        CoreError::Validation(format!(
            "{field} {id} does not reference an existing {target}"
        ))
    }
}

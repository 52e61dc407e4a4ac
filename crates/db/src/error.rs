use pms_core::error::CoreError;

/// Classify a sqlx error into a domain error.
///
/// - Foreign key violations become [`CoreError::Validation`]; the explicit
///   reference checks normally catch these first.
/// - Everything else is logged and becomes [`CoreError::Storage`].
pub fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return CoreError::Validation(
                "A referenced record does not exist".to_string(),
            );
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}

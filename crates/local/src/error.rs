use std::io;

use pms_core::error::CoreError;
use thiserror::Error;

/// Errors raised by a [`crate::KeyValueStore`] or while decoding its values.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Value under key {key} is not a valid collection: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

impl From<KvError> for CoreError {
    fn from(err: KvError) -> Self {
        tracing::error!(error = %err, "Local store error");
        CoreError::Storage(err.to_string())
    }
}

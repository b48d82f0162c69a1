// Engine error taxonomy.
//
// Every request-level failure is one of these variants. None of them are
// retried inside the engine; the caller decides what to do with them. The
// `kind()` code is what transports (CLI exit message, HTTP body) key on.

use crate::catalog::ItemId;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Malformed or missing required input. Caller error.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Referenced user or item absent from the current data.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request is well-formed but there is not enough data to answer it.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Store and catalog disagree about an item. Recovered by skipping the
    /// record; only surfaces in logs and `skipped` lists.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// The storage collaborator failed (I/O, SQL, serialization).
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
}

impl EngineError {
    /// Stable code for the variant, distinguishable by any transport.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidRequest(_) => "invalid_request",
            EngineError::NotFound(_) => "not_found",
            EngineError::InsufficientData(_) => "insufficient_data",
            EngineError::InternalInconsistency(_) => "internal_inconsistency",
            EngineError::Storage(_) => "storage",
        }
    }

    /// A rated or reviewed item id that the catalog does not know about.
    pub fn missing_from_catalog(item_id: ItemId) -> Self {
        EngineError::InternalInconsistency(format!(
            "item {item_id} is referenced by the store but absent from the catalog"
        ))
    }
}

// Store backends speak anyhow. Validation failures raised inside a backend are
// EngineErrors wrapped in anyhow, so unwrap those back into their typed form
// and treat everything else as a storage failure.
impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<EngineError>() {
            Ok(engine) => engine,
            Err(other) => EngineError::Storage(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur within the storage layer.
///
/// `NotFound` and `Conflict` are distinct variants so the API layer can
/// map them to 404/409; everything else surfaces as a generic storage
/// failure.
///
/// # Examples
///
/// ```rust
/// use ace_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "kpi",
///     id: "kpi-99".to_string(),
/// };
/// assert!(err.to_string().contains("kpi"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required record was not found.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// The operation violates an invariant: duplicate KPI identifier,
    /// deleting a department that still owns KPIs, or mutating an alert
    /// that has already been sent.
    #[error("Storage: conflict on {entity}: {reason}")]
    Conflict {
        entity: &'static str,
        reason: String,
    },

    /// A required field failed validation before reaching the database.
    #[error("Storage: invalid {entity}: {reason}")]
    Invalid {
        entity: &'static str,
        reason: String,
    },

    /// An underlying database error.
    #[error("Storage: database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// JSON serialization or deserialization failure (e.g. the text[]
    /// columns stored as JSON arrays).
    #[error("Storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic storage error for cases not covered by other variants.
    #[error("Storage: {0}")]
    Other(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

use thiserror::Error;

/// Failure taxonomy for storage operations.
///
/// A lookup that finds nothing is an absent `Option`, never an error; these
/// variants cover backend failures only. Backend-specific errors are caught
/// at the adapter boundary and re-raised as one of these kinds with the
/// original cause attached.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected an insert.
    #[error("insert failed: {0}")]
    Insert(#[source] anyhow::Error),

    /// The backend rejected an update.
    #[error("update failed: {0}")]
    Update(#[source] anyhow::Error),

    /// The backend rejected a delete.
    #[error("delete failed: {0}")]
    Delete(#[source] anyhow::Error),

    /// The backend could not be reached, initialized, or read.
    #[error("connection failed: {0}")]
    Connection(#[source] anyhow::Error),

    /// The local-persisted backend could not serialize or rewrite a slot.
    /// The in-memory copy stays authoritative after this failure.
    #[error("persistence failed: {0}")]
    Persistence(#[source] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

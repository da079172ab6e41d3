#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CatalogError {
    /// HTTP status the surrounding layer reports for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            CatalogError::InvalidArgument(_) => 400,
            CatalogError::Unauthorized(_) => 401,
            CatalogError::Forbidden(_) => 403,
            CatalogError::NotFound(_) => 404,
            CatalogError::Conflict(_) | CatalogError::Storage(StorageError::Constraint(_)) => 409,
            CatalogError::Storage(StorageError::Unavailable) => 503,
            CatalogError::Storage(StorageError::Other(_)) => 500,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

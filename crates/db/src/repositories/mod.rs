use async_trait::async_trait;
use thiserror::Error;

use petrate_core::domain::Factor;
use petrate_core::{PolicyBook, RateEntry, RateTable};

pub mod rates;
pub mod source;

pub use rates::SqlRateStore;
pub use source::SqlPolicySource;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Persisted rate table. `replace_all` is the only write path and is
/// all-or-nothing: a failed refresh leaves the previous card untouched.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn replace_all(&self, entries: &[RateEntry]) -> Result<(), RepositoryError>;

    /// Build the immutable lookup index for one re-rating pass.
    async fn load_table(&self) -> Result<RateTable, RepositoryError>;

    async fn factor_entries(&self, factor: Factor) -> Result<Vec<RateEntry>, RepositoryError>;

    /// Distinct option labels for one factor, in display order.
    async fn factor_options(&self, factor: Factor) -> Result<Vec<String>, RepositoryError>;
}

/// Bulk reader over the upstream policy-administration mirror. The whole
/// book is fetched in one pass; a wholesale retrieval failure aborts the
/// run rather than rating a partial population.
#[async_trait]
pub trait PolicySource: Send + Sync {
    async fn load_book(&self) -> Result<PolicyBook, RepositoryError>;
}

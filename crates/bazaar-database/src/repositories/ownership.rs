//! Owner lookup for resources stored by other domain modules.

use sqlx::PgPool;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;

/// Reads the owner column of a single row.
///
/// Table and column names are fixed at construction by the caller and
/// never come from request input.
#[derive(Debug, Clone)]
pub struct OwnershipRepository {
    pool: PgPool,
    table: &'static str,
    owner_column: &'static str,
}

impl OwnershipRepository {
    /// Create a lookup over `table.owner_column`, keyed by `id`.
    pub fn new(pool: PgPool, table: &'static str, owner_column: &'static str) -> Self {
        Self {
            pool,
            table,
            owner_column,
        }
    }

    /// Owner id of the row, or `None` when the row does not exist.
    pub async fn find_owner(&self, id: &str) -> AppResult<Option<String>> {
        let sql = format!(
            "SELECT {}::TEXT FROM {} WHERE id::TEXT = $1",
            self.owner_column, self.table
        );
        sqlx::query_scalar::<_, Option<String>>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(Option::flatten)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to look up owner in {}", self.table),
                    e,
                )
            })
    }
}

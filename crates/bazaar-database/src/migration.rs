//! Embedded schema migrations and boot-time reporting.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;

/// Credentials, the revocation negative list and the role catalog seed.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// What a migration run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Versions applied by this run, ascending.
    pub applied: Vec<i64>,
    /// Highest version now present in the database.
    pub current: Option<i64>,
}

/// Versions already recorded as applied. Empty on a fresh database.
pub async fn applied_versions(pool: &PgPool) -> AppResult<Vec<i64>> {
    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to inspect schema", e))?;
    if !tracked {
        return Ok(Vec::new());
    }

    sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read migration history", e)
        })
}

/// Applies pending migrations and reports which ones ran.
pub async fn run_migrations(pool: &PgPool) -> AppResult<MigrationReport> {
    let before = applied_versions(pool).await?;

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    let report = report(&before);
    if report.applied.is_empty() {
        info!(current = ?report.current, "Schema up to date");
    } else {
        info!(
            applied = ?report.applied,
            current = ?report.current,
            "Applied database migrations"
        );
    }
    Ok(report)
}

fn report(before: &[i64]) -> MigrationReport {
    let applied: Vec<i64> = MIGRATOR
        .iter()
        .map(|m| m.version)
        .filter(|v| !before.contains(v))
        .collect();
    let current = MIGRATOR
        .iter()
        .map(|m| m.version)
        .chain(before.iter().copied())
        .max();
    MigrationReport { applied, current }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScratchDb;

    #[test]
    fn test_embedded_migrations_are_ordered() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert_eq!(versions.len(), 3);
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_report_skips_already_applied() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        let fresh = report(&[]);
        assert_eq!(fresh.applied, versions);
        assert_eq!(fresh.current, versions.last().copied());

        let partial = report(&versions[..1]);
        assert_eq!(partial.applied, versions[1..].to_vec());
    }

    #[tokio::test]
    async fn test_second_run_applies_nothing() {
        let Some(db) = ScratchDb::open(false).await.unwrap() else {
            return;
        };

        let first = run_migrations(&db.pool).await.unwrap();
        assert_eq!(first.applied.len(), 3);
        let second = run_migrations(&db.pool).await.unwrap();
        assert!(second.applied.is_empty());
        assert_eq!(second.current, first.current);
        assert_eq!(applied_versions(&db.pool).await.unwrap(), first.applied);

        db.finish().await.unwrap();
    }
}

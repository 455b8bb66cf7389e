//! Scratch schemas for tests that need a live PostgreSQL.
//!
//! Tests call [`ScratchDb::open`] and skip themselves when it returns
//! `None`, which happens whenever `DATABASE_URL` is unset.

use sqlx::Executor;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;

use crate::migration::MIGRATOR;

/// A throwaway schema on the database named by `DATABASE_URL`.
#[derive(Debug)]
pub struct ScratchDb {
    /// Pool whose connections resolve names in the scratch schema.
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl ScratchDb {
    /// Creates an empty schema and a pool whose `search_path` points at it.
    /// When `migrate` is set the embedded migrations are applied.
    pub async fn open(migrate: bool) -> AppResult<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };
        let schema = format!("bazaar_test_{}", Uuid::new_v4().simple());

        let admin = PgPool::connect(&url).await.map_err(db_error)?;
        admin
            .execute(format!("CREATE SCHEMA {schema}").as_str())
            .await
            .map_err(db_error)?;

        let search_path = format!("SET search_path TO {schema}");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .map_err(db_error)?;

        if migrate {
            MIGRATOR.run(&pool).await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Scratch migration failed", e)
            })?;
        }

        Ok(Some(Self {
            pool,
            admin,
            schema,
        }))
    }

    /// Drops the schema and everything in it.
    pub async fn finish(self) -> AppResult<()> {
        self.pool.close().await;
        self.admin
            .execute(format!("DROP SCHEMA {} CASCADE", self.schema).as_str())
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

fn db_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Scratch database setup failed", e)
}

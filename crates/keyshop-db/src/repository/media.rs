//! # Media Repository
//!
//! Image paths attached to products. A product may have any number of
//! images; `position` orders them and the first one is the card thumbnail.
//!
//! Paths are stored relative to the uploads directory. Turning them into
//! public URLs is the server's job.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MediaRecord {
    pub id: i64,
    pub product_id: i64,
    pub file_path: String,
    pub position: i64,
}

#[derive(Debug, Clone)]
pub struct MediaRepository {
    pool: SqlitePool,
}

impl MediaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MediaRepository { pool }
    }

    /// Appends an image after the product's existing ones.
    pub async fn attach(&self, product_id: i64, file_path: &str) -> DbResult<MediaRecord> {
        let file_path = file_path.trim().trim_start_matches('/');
        if file_path.is_empty() {
            return Err(keyshop_core::ValidationError::Required {
                field: "file_path".to_string(),
            }
            .into());
        }

        let position: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM media WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        let result = sqlx::query(
            "INSERT INTO media (product_id, file_path, position, updated_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(product_id)
        .bind(file_path)
        .bind(position)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(product_id, position, "Attached media");

        Ok(MediaRecord {
            id: result.last_insert_rowid(),
            product_id,
            file_path: file_path.to_string(),
            position,
        })
    }

    pub async fn list_for_product(&self, product_id: i64) -> DbResult<Vec<MediaRecord>> {
        let media = sqlx::query_as::<_, MediaRecord>(
            "SELECT id, product_id, file_path, position FROM media
             WHERE product_id = ?1 ORDER BY position, id",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(media)
    }

    /// Ordered file paths for many products in one query.
    ///
    /// Products without media are absent from the map.
    pub async fn paths_for_products(&self, product_ids: &[i64]) -> DbResult<HashMap<i64, Vec<String>>> {
        let mut paths: HashMap<i64, Vec<String>> = HashMap::new();
        if product_ids.is_empty() {
            return Ok(paths);
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, product_id, file_path, position FROM media WHERE product_id IN (");
        let mut separated = qb.separated(", ");
        for id in product_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY product_id, position, id");

        let rows = qb
            .build_query_as::<MediaRecord>()
            .fetch_all(&self.pool)
            .await?;

        for row in rows {
            paths.entry(row.product_id).or_default().push(row.file_path);
        }
        Ok(paths)
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM media WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Media", id));
        }
        Ok(())
    }
}

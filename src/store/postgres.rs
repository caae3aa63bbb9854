use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::{CollectionPath, DocumentPath, DocumentStore};
use crate::error::AppResult;

/// Documents live in one JSONB table keyed by their full path.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn set(&self, path: &DocumentPath, data: Value) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (path, collection, doc_id, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (path) DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = NOW()
            "#,
        )
        .bind(path.to_string())
        .bind(path.collection().as_str())
        .bind(path.id())
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, path: &DocumentPath) -> AppResult<Option<Value>> {
        let data = sqlx::query_scalar::<_, Value>("SELECT data FROM documents WHERE path = $1")
            .bind(path.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(data)
    }

    async fn delete(&self, path: &DocumentPath) -> AppResult<()> {
        sqlx::query("DELETE FROM documents WHERE path = $1")
            .bind(path.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> AppResult<Vec<(DocumentPath, Value)>> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            r#"
            SELECT doc_id, data FROM documents
            WHERE collection = $1
            ORDER BY doc_id ASC
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, data)| Ok((collection.doc(&id)?, data)))
            .collect()
    }

    async fn delete_batch(&self, paths: &[DocumentPath]) -> AppResult<()> {
        let paths: Vec<String> = paths.iter().map(ToString::to_string).collect();

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM documents WHERE path = ANY($1)")
            .bind(paths)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{Change, DataError, EntitySet};
use crate::models::FileStorage;

/// PostgreSQL-backed entity set for the `file_storages` table.
#[derive(Clone)]
pub struct PgFileSet {
    pool: PgPool,
}

impl PgFileSet {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitySet<FileStorage> for PgFileSet {
    async fn find(&self, key: Uuid) -> Result<Option<FileStorage>, DataError> {
        let file = sqlx::query_as::<_, FileStorage>(
            "SELECT id, name, extension, path, created_on FROM file_storages WHERE id = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn load_all(&self) -> Result<Vec<FileStorage>, DataError> {
        // `seq` is a BIGSERIAL, so it follows insertion order
        let files = sqlx::query_as::<_, FileStorage>(
            "SELECT id, name, extension, path, created_on FROM file_storages ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn apply(&self, changes: Vec<Change<FileStorage>>) -> Result<u64, DataError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for change in changes {
            let result = match change {
                Change::Insert(file) => {
                    sqlx::query(
                        r#"
                        INSERT INTO file_storages (id, name, extension, path, created_on)
                        VALUES ($1, $2, $3, $4, $5)
                        "#,
                    )
                    .bind(file.id)
                    .bind(&file.name)
                    .bind(&file.extension)
                    .bind(&file.path)
                    .bind(file.created_on)
                    .execute(&mut *tx)
                    .await?
                }
                Change::Update(file) => {
                    // created_on is immutable once inserted
                    sqlx::query(
                        "UPDATE file_storages SET name = $2, extension = $3, path = $4 WHERE id = $1",
                    )
                    .bind(file.id)
                    .bind(&file.name)
                    .bind(&file.extension)
                    .bind(&file.path)
                    .execute(&mut *tx)
                    .await?
                }
                Change::Delete(id) => {
                    sqlx::query("DELETE FROM file_storages WHERE id = $1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?
                }
            };
            affected += result.rows_affected();
        }

        tx.commit().await?;
        info!("Committed {} file record change(s)", affected);
        Ok(affected)
    }
}

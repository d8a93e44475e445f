use std::sync::Arc;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::{
    data::{DataContext, PgFileSet},
    models::FileStorage,
};

/// Initialize a PostgreSQL connection pool and bring the schema up to date.
pub async fn init_db(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("Database connection established");

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Register every entity set backed by `pool`.
pub fn init_data_context(pool: PgPool) -> DataContext {
    DataContext::builder()
        .register::<FileStorage>(Arc::new(PgFileSet::new(pool)))
        .build()
}

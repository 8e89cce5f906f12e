use anyhow::Context;
use catalog_service::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config)?;

    match config.database.clone() {
        #[cfg(feature = "postgres")]
        Some(db_config) => {
            let pool = catalog_service::database::create_pool(&db_config).await?;
            if db_config.run_migrations {
                catalog_service::database::run_migrations(&pool).await?;
            }
            let state = AppState::new(config.clone(), PgStore::<Product>::new(pool.clone()))
                .with_db_pool(pool);
            Server::new(config).serve(build_app(state)).await?;
        }
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            anyhow::bail!("a [database] section is configured but the `postgres` feature is disabled");
        }
        None => {
            tracing::warn!("No database configured; products are kept in memory");
            let state = AppState::new(config.clone(), MemoryStore::<Product>::new());
            Server::new(config).serve(build_app(state)).await?;
        }
    }

    Ok(())
}

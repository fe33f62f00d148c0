//! Process-level wiring: database pool, services, module registry, lifecycle.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use lectern_kernel::settings::Settings;
use lectern_kernel::{InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::catalog::{CatalogRepository, RankingEngine};
use crate::modules::{self, author::AuthorSummaryClient, author::RestSummaryClient, Services};

/// A fully wired Lectern application.
///
/// The application owns the database pool; [`Application::run`] closes it once
/// the server has stopped.
pub struct Application {
    settings: Settings,
    pool: SqlitePool,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect to the configured database and build the production services.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let pool = lectern_db::connect(&settings.database)
            .await
            .context("failed to open catalog database")?;
        let summaries = RestSummaryClient::new(&settings.author_summary)
            .context("failed to build author summary client")?;

        Ok(Self::with_parts(settings, pool, Arc::new(summaries)))
    }

    /// Assemble an application from an existing pool and summary client.
    pub fn with_parts(
        settings: Settings,
        pool: SqlitePool,
        summaries: Arc<dyn AuthorSummaryClient>,
    ) -> Self {
        let services = Services {
            catalog: CatalogRepository::new(pool.clone()),
            ranking: RankingEngine::new(pool.clone()),
            summaries,
        };

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &services);

        Self {
            settings,
            pool,
            registry,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Apply pending migrations from every registered module.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        let applied = lectern_db::run_migrations(&self.pool, &migrations)
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, total = migrations.len(), "migrations complete");
        Ok(applied)
    }

    /// The HTTP router for every registered module.
    pub fn router(&self) -> Router {
        lectern_http::build_router(&self.registry, &self.settings)
    }

    /// Migrate, start modules, serve until ctrl-c, then stop and close the pool.
    pub async fn run(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };

        self.registry.init_modules(&ctx).await?;
        self.migrate().await?;
        self.registry.start_modules(&ctx).await?;

        let served = lectern_http::start_server(&self.registry, &self.settings, shutdown_signal()).await;

        // Stop modules and release the pool even if serving failed.
        let stopped = self.registry.stop_modules().await;
        self.close().await;

        served?;
        stopped
    }

    /// Close the database pool, waiting for checked-out connections to return.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_kernel::settings::DatabaseSettings;

    fn application(pool: SqlitePool) -> Application {
        let settings = Settings::default();
        let summaries = RestSummaryClient::new(&settings.author_summary).unwrap();
        Application::with_parts(settings, pool, Arc::new(summaries))
    }

    #[tokio::test]
    async fn migrate_then_close_releases_the_pool() {
        let pool = lectern_db::connect(&DatabaseSettings::in_memory())
            .await
            .unwrap();
        let app = application(pool.clone());

        assert_eq!(app.migrate().await.unwrap(), 2);
        assert_eq!(app.migrate().await.unwrap(), 0);

        app.close().await;
        assert!(pool.is_closed());
    }
}

// Embedded schema migrations, applied at startup for the postgres backend

pub mod diesel;

use std::error::Error;
use tracing::{error, info};

use crate::app_config::AppConfig;

/// Configuration for migration execution
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub database_url: String,
    pub environment: String,
}

impl From<&AppConfig> for MigrationConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            database_url: config.database.url.clone(),
            environment: config.environment.to_string(),
        }
    }
}

pub async fn run_all_migrations(config: MigrationConfig) -> Result<usize, Box<dyn Error + Send + Sync>> {
    info!(
        "[MIGRATIONS] Starting migration process for environment: {}",
        config.environment
    );

    match diesel::run_migrations(&config.database_url).await {
        Ok(0) => {
            info!("[MIGRATIONS] Schema is up to date");
            Ok(0)
        },
        Ok(applied) => {
            info!("[MIGRATIONS] Applied {} migrations", applied);
            Ok(applied)
        },
        Err(e) => {
            error!("[MIGRATIONS] Diesel migration failed: {}", e);
            Err(format!("Diesel migration failed: {}", e).into())
        },
    }
}

pub fn should_run_migrations(config: &AppConfig) -> bool {
    config.storage_backend == crate::app_config::StorageBackend::Postgres
        && !config.disable_embedded_migrations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::StorageBackend;

    #[test]
    fn test_memory_backend_skips_migrations() {
        let mut config = AppConfig::for_test();
        config.disable_embedded_migrations = false;
        assert!(!should_run_migrations(&config));

        config.storage_backend = StorageBackend::Postgres;
        assert!(should_run_migrations(&config));

        config.disable_embedded_migrations = true;
        assert!(!should_run_migrations(&config));
    }
}

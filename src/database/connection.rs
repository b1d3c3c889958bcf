//! Configuración de conexión a PostgreSQL
//!
//! Este módulo crea el pool de conexiones y aplica las migraciones del
//! esquema de flota.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;

/// Pool de conexiones compartido por todas las operaciones
#[derive(Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Conectar usando la configuración indicada
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("🔌 Conectando a {}", mask_database_url(&config.url));
        let pool = config
            .create_pool()
            .await
            .context("no se pudo crear el pool de PostgreSQL")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ejecutar migraciones de la base de datos
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("fallo al aplicar migraciones")?;
        info!("✅ Migraciones aplicadas");
        Ok(())
    }
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    match url.rfind('@') {
        Some(at_pos) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}

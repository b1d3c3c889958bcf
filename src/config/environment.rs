//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno del servicio.

use anyhow::Result;

use super::parse_var;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Vacío = CORS permisivo (sólo desarrollo)
    pub cors_origins: Vec<String>,
    /// Margen en km antes de `service_due_km` a partir del cual se avisa
    pub service_due_margin_km: i64,
    pub run_migrations: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            service_due_margin_km: 500,
            run_migrations: true,
        }
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            cors_origins,
            service_due_margin_km: parse_var(
                &lookup,
                "SERVICE_DUE_MARGIN_KM",
                defaults.service_due_margin_km,
            )?,
            run_migrations: parse_var(&lookup, "RUN_MIGRATIONS", defaults.run_migrations)?,
        })
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_values_and_splits_origins() {
        let config = EnvironmentConfig::from_lookup(|key| match key {
            "PORT" => Some("8080".to_string()),
            "CORS_ORIGINS" => Some("https://a.example, https://b.example,".to_string()),
            "SERVICE_DUE_MARGIN_KM" => Some("250".to_string()),
            "RUN_MIGRATIONS" => Some("false".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.server_url(), "0.0.0.0:8080");
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.service_due_margin_km, 250);
        assert!(!config.run_migrations);
        assert!(!config.is_production());
    }

    #[test]
    fn invalid_port_is_an_error() {
        let result = EnvironmentConfig::from_lookup(|key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }
}

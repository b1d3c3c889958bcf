//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::services::{DispatchService, FleetService, PostCommitRunner};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub dispatch: DispatchService,
    pub fleet: FleetService,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let post_commit = PostCommitRunner::new(pool.clone(), config.service_due_margin_km);
        Self {
            dispatch: DispatchService::new(pool.clone(), post_commit),
            fleet: FleetService::new(pool.clone()),
            pool,
            config,
        }
    }
}

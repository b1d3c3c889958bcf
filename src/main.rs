use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleet_dispatch::config::{DatabaseConfig, EnvironmentConfig};
use fleet_dispatch::database::DatabaseConnection;
use fleet_dispatch::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG, por defecto info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚚 Fleet Dispatch - núcleo de despacho");
    info!("======================================");

    let config = EnvironmentConfig::from_env().context("configuración de entorno inválida")?;
    let db_config = DatabaseConfig::from_env().context("configuración de base de datos inválida")?;

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new(&db_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {:#}", e);
            return Err(e);
        }
    };

    if config.run_migrations {
        db_connection.run_migrations().await?;
    } else {
        warn!("⏭️ RUN_MIGRATIONS=false, no se aplican migraciones");
    }

    let pool = db_connection.pool().clone();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("dirección inválida {}:{}", config.host, config.port))?;

    if config.is_production() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío en producción: se acepta cualquier origen");
    }

    let app = create_router(AppState::new(pool, config.clone()));

    info!("🌐 Servidor iniciando en http://{}", config.server_url());
    info!("🚛 Viajes:");
    info!("   POST /trips - Crear y despachar viaje");
    info!("   POST /trips/draft - Crear borrador");
    info!("   POST /trips/:id/dispatch - Despachar borrador");
    info!("   POST /trips/complete - Completar viaje");
    info!("   POST /trips/cancel - Cancelar viaje");
    info!("   GET  /trips, /trips/:id");
    info!("🚗 Vehículos:");
    info!("   POST /vehicles, GET /vehicles, GET /vehicles/:id");
    info!("   PATCH /vehicles/:id/status, PATCH /vehicles/:id/retire, DELETE /vehicles/:id");
    info!("👤 Conductores:");
    info!("   POST /drivers, GET /drivers, GET /drivers/:id, PATCH /drivers/:id/status");
    info!("📝 Auditoría: GET /audit-logs");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("no se pudo abrir {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}

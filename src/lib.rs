//! Núcleo de despacho de flota
//!
//! Máquinas de estado de vehículos, conductores y viajes, protocolo
//! transaccional de despacho con bloqueos de fila NOWAIT, clasificación de
//! conflictos y auditoría inmutable, expuestos por una API HTTP con axum.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;

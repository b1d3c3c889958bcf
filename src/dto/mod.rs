//! DTOs de la API
//!
//! Cuerpos de petición (validados con `validator`) y envoltorios de respuesta.

pub mod audit_dto;
pub mod driver_dto;
pub mod trip_dto;
pub mod vehicle_dto;

use serde::Serialize;

/// Envoltorio estándar de respuestas exitosas
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

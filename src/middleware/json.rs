//! Cuerpo JSON con rechazo propio
//!
//! `axum::Json` responde 415/422 en texto plano cuando el cuerpo no
//! deserializa; aquí cualquier rechazo es un 400 `VALIDATION_ERROR` con el
//! mismo formato que el resto de errores.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::utils::errors::AppError;

pub struct AppJson<T>(pub T);

#[async_trait::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(AppJson(value))
    }
}

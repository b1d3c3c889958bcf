//! Identidad del actor
//!
//! Cada petición puede traer `x-actor-id`; se registra como actor en la
//! auditoría. Sin cabecera (o con una vacía o no ASCII) el actor es `system`.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

pub const ACTOR_HEADER: &str = "x-actor-id";
pub const DEFAULT_ACTOR: &str = "system";
const MAX_ACTOR_LEN: usize = 128;

/// Actor que firma las entradas de auditoría de la petición
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_header(value: Option<&str>) -> Self {
        let actor = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| v.chars().take(MAX_ACTOR_LEN).collect::<String>())
            .unwrap_or_else(|| DEFAULT_ACTOR.to_string());
        Actor(actor)
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok());
        Ok(Actor::from_header(header))
    }
}

//! Utilidades del sistema
//!
//! Taxonomía de errores del núcleo y su traducción a HTTP.

pub mod errors;

//! Utilidades del sistema
//!
//! Este módulo contiene el manejo de errores y la validación de
//! montos compartida por los DTOs.

pub mod errors;
pub mod validation;

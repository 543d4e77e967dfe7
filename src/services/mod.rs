//! Services module
//!
//! Lógica de negocio: el reconciliador de inventario, el asignador de
//! plazas y la fórmula de precio. Las partes puras no tocan la base de
//! datos; las funciones async reciben la conexión de la transacción.

pub mod place_allocator_service;
pub mod pricing_service;
pub mod room_reconciler_service;

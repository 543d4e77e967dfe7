//! Controladores
//!
//! Orquestan repositorios y servicios, y deciden el alcance de cada
//! transacción.

pub mod hotel_controller;
pub mod program_controller;
pub mod reservation_controller;

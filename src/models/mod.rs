//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL (ver `migrations/`).

pub mod hotel;
pub mod program;
pub mod reservation;
pub mod room;

pub use hotel::{City, Hotel};
pub use program::Program;
pub use reservation::Reservation;
pub use room::{Gender, Room, RoomState, RoomType};

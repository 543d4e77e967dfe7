//! Repositorios
//!
//! Acceso a PostgreSQL con SQLx. Cada función recibe la conexión (del pool
//! o de una transacción abierta) para que los controladores decidan el
//! alcance transaccional.

pub mod hotel_repository;
pub mod program_repository;
pub mod reservation_repository;
pub mod room_repository;

pub use hotel_repository::HotelRepository;
pub use program_repository::ProgramRepository;
pub use reservation_repository::ReservationRepository;
pub use room_repository::RoomRepository;

//! DTOs de la API
//!
//! Formas de request/response tal como viajan por HTTP.

pub mod common_dto;
pub mod hotel_dto;
pub mod program_dto;
pub mod reservation_dto;

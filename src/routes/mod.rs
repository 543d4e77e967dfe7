pub mod hotel_routes;
pub mod program_routes;
pub mod reservation_routes;

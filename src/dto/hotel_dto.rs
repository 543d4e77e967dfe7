use serde::Deserialize;

use crate::models::City;

// Filtro de listado de hoteles
#[derive(Debug, Deserialize)]
pub struct HotelFilters {
    pub city: Option<City>,
}

//! Modelo de Reservation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::hotel::City;
use super::room::{Gender, RoomType};

/// Reservation principal - mapea exactamente a la tabla reservations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub program_id: Uuid,
    pub room_type: RoomType,
    pub gender: Gender,
    pub madina_room_id: Option<Uuid>,
    pub makkah_room_id: Option<Uuid>,
    pub client_name: String,
    pub phone: Option<String>,
    pub passport_number: Option<String>,
    pub days_madina: i32,
    pub days_makkah: i32,
    pub include_flight: bool,
    pub include_visa: bool,
    pub price: Decimal,
    pub is_paid: bool,
    pub documents_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn room_at(&self, city: City) -> Option<Uuid> {
        match city {
            City::Madina => self.madina_room_id,
            City::Makkah => self.makkah_room_id,
        }
    }

    /// Habitaciones donde esta reserva ocupa una plaza
    pub fn occupied_rooms(&self) -> impl Iterator<Item = Uuid> + '_ {
        City::ALL.into_iter().filter_map(|city| self.room_at(city))
    }
}

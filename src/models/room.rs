//! Modelo de Room
//!
//! Una habitación física de un programa: la unidad de asignación. Los dos
//! campos numéricos (`total_places`, `remaining_places`) y la lista de
//! ocupantes son la fuente de verdad persistida; el estado (`RoomState`) se
//! deriva siempre en lectura.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

/// Tamaño de habitación - mapea a la columna SMALLINT room_type (1..5)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
#[repr(i16)]
pub enum RoomType {
    Single = 1,
    Double = 2,
    Triple = 3,
    Quadruple = 4,
    Quintuple = 5,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid room type '{0}', expected 1..5")]
pub struct RoomTypeError(pub String);

impl RoomType {
    /// Número de personas (y por lo tanto de plazas) de este tipo
    pub fn person_count(self) -> i32 {
        self as i32
    }
}

impl TryFrom<u8> for RoomType {
    type Error = RoomTypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RoomType::Single),
            2 => Ok(RoomType::Double),
            3 => Ok(RoomType::Triple),
            4 => Ok(RoomType::Quadruple),
            5 => Ok(RoomType::Quintuple),
            other => Err(RoomTypeError(other.to_string())),
        }
    }
}

impl From<RoomType> for u8 {
    fn from(room_type: RoomType) -> Self {
        room_type as u8
    }
}

impl std::str::FromStr for RoomType {
    type Err = RoomTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| RoomTypeError(s.to_string()))
            .and_then(RoomType::try_from)
    }
}

/// Restricción de género - mapea al ENUM room_gender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "room_gender")]
pub enum Gender {
    Male,
    Female,
    Mixed,
}

impl Gender {
    /// Una habitación Mixed todavía no está fijada a ningún género
    pub fn is_flexible(self) -> bool {
        self == Gender::Mixed
    }

    /// ¿Puede una habitación con este género recibir a un ocupante de `target`?
    pub fn accepts(self, target: Gender) -> bool {
        self == target || self.is_flexible()
    }
}

/// Estado derivado de una habitación, nunca persistido
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RoomState {
    Free,
    PartiallyOccupied,
    Full,
}

/// Room principal - mapea exactamente a la tabla rooms
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub program_id: Uuid,
    pub hotel_id: Uuid,
    pub room_type: RoomType,
    pub gender: Gender,
    pub total_places: i32,
    pub remaining_places: i32,
    pub price: Decimal,
    pub reservation_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Habitación nueva y vacía, como la crea el reconciliador
    pub fn new_empty(program_id: Uuid, hotel_id: Uuid, room_type: RoomType, price: Decimal) -> Self {
        let places = room_type.person_count();
        Self {
            id: Uuid::new_v4(),
            program_id,
            hotel_id,
            room_type,
            gender: Gender::Mixed,
            total_places: places,
            remaining_places: places,
            price,
            reservation_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn occupied_count(&self) -> i32 {
        (self.total_places - self.remaining_places).max(0)
    }

    /// Libre solo si no falta ninguna plaza Y la lista de ocupantes está vacía.
    /// La lista es la señal más fiable: `remaining_places` puede quedar
    /// desfasado respecto a ella.
    pub fn is_free(&self) -> bool {
        self.remaining_places >= self.total_places && self.reservation_ids.is_empty()
    }

    pub fn has_free_place(&self) -> bool {
        self.remaining_places > 0
    }

    pub fn state(&self) -> RoomState {
        if self.is_free() {
            RoomState::Free
        } else if self.remaining_places <= 0 {
            RoomState::Full
        } else {
            RoomState::PartiallyOccupied
        }
    }

    /// Índice de la primera plaza disponible (las plazas se llenan en orden)
    pub fn first_free_place(&self) -> Option<i32> {
        self.has_free_place().then(|| self.occupied_count())
    }
}

#[cfg(test)]
impl Room {
    /// Aplica en memoria la misma transición que el UPDATE condicional de
    /// `RoomRepository::claim_place`. Devuelve `false` si no había plaza o si
    /// el género ya está fijado a otro valor.
    pub fn claim_place(&mut self, reservation_id: Uuid, gender: Gender) -> bool {
        if !self.has_free_place() || !self.gender.accepts(gender) {
            return false;
        }
        self.remaining_places = (self.remaining_places - 1).max(0);
        self.reservation_ids.push(reservation_id);
        if self.gender.is_flexible() {
            self.gender = gender;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double_room() -> Room {
        Room::new_empty(Uuid::new_v4(), Uuid::new_v4(), RoomType::Double, Decimal::new(800, 0))
    }

    #[test]
    fn test_room_type_parsing() {
        assert_eq!("3".parse::<RoomType>(), Ok(RoomType::Triple));
        assert_eq!(RoomType::Quintuple.person_count(), 5);
        assert!("6".parse::<RoomType>().is_err());
        assert!("double".parse::<RoomType>().is_err());
    }

    #[test]
    fn test_room_type_serde_as_number() {
        let value = serde_json::to_value(RoomType::Quadruple).unwrap();
        assert_eq!(value, serde_json::json!(4));
        let parsed: RoomType = serde_json::from_value(serde_json::json!(2)).unwrap();
        assert_eq!(parsed, RoomType::Double);
        assert!(serde_json::from_value::<RoomType>(serde_json::json!(0)).is_err());
    }

    #[test]
    fn test_new_room_is_free_and_mixed() {
        let room = double_room();
        assert_eq!(room.total_places, 2);
        assert_eq!(room.remaining_places, 2);
        assert_eq!(room.gender, Gender::Mixed);
        assert_eq!(room.state(), RoomState::Free);
        assert_eq!(room.first_free_place(), Some(0));
    }

    #[test]
    fn test_occupant_list_alone_marks_room_occupied() {
        // remaining_places desfasado: la lista manda
        let mut room = double_room();
        room.reservation_ids.push(Uuid::new_v4());
        assert!(!room.is_free());
        assert_eq!(room.state(), RoomState::PartiallyOccupied);
    }

    #[test]
    fn test_claim_pins_gender_and_decrements() {
        let mut room = double_room();
        let first = Uuid::new_v4();
        assert!(room.claim_place(first, Gender::Female));
        assert_eq!(room.gender, Gender::Female);
        assert_eq!(room.remaining_places, 1);
        assert_eq!(room.reservation_ids, vec![first]);
        assert_eq!(room.first_free_place(), Some(1));

        assert!(!room.claim_place(Uuid::new_v4(), Gender::Male));
        assert!(room.claim_place(Uuid::new_v4(), Gender::Female));
        assert_eq!(room.state(), RoomState::Full);
        assert!(!room.claim_place(Uuid::new_v4(), Gender::Female));
        assert_eq!(room.remaining_places, 0);
    }
}

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::models::{City, Hotel, Program, Room, RoomState, RoomType};
use crate::services::room_reconciler_service::{DesiredHotel, DesiredInventory, DesiredRooms, RoomAdjustment};
use crate::utils::errors::AppError;
use crate::utils::validation::{fits_numeric, validate_exchange_rate, validate_money, validate_not_blank};

// Cantidad y precio deseados de un tipo de habitación
#[derive(Debug, Clone, Deserialize)]
pub struct ChambreRequest {
    #[serde(default)]
    pub nb: i32,
    #[serde(default)]
    pub prix: Decimal,
}

// Hotel de una ciudad con su configuración de habitaciones, claves "1".."5"
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HotelRoomsRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: String,
    #[serde(default)]
    pub chambres: BTreeMap<String, ChambreRequest>,
}

// Request para crear o actualizar un programa (sustituye todos los campos)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub name: String,
    pub visa_deadline: Option<NaiveDate>,
    pub hotel_deadline: Option<NaiveDate>,
    pub flight_deadline: Option<NaiveDate>,
    pub passport_deadline: Option<NaiveDate>,
    #[serde(rename = "exchange")]
    #[validate(custom = "validate_exchange_rate")]
    pub exchange_rate: Decimal,
    #[serde(rename = "prixAvionDH", default)]
    #[validate(custom = "validate_money")]
    pub flight_price: Decimal,
    #[serde(rename = "prixVisaRiyal", default)]
    #[validate(custom = "validate_money")]
    pub visa_price: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_money")]
    pub profit: Decimal,
    #[serde(rename = "nbJoursMadina", default)]
    #[validate(range(min = 0, max = 365))]
    pub days_madina: i32,
    #[serde(rename = "nbJoursMakkah", default)]
    #[validate(range(min = 0, max = 365))]
    pub days_makkah: i32,
    #[serde(default)]
    #[validate]
    pub hotels_madina: Vec<HotelRoomsRequest>,
    #[serde(default)]
    #[validate]
    pub hotels_makkah: Vec<HotelRoomsRequest>,
}

impl ProgramRequest {
    pub fn to_program(&self, id: Uuid) -> Program {
        Program {
            id,
            name: self.name.trim().to_string(),
            created_at: Utc::now(),
            visa_deadline: self.visa_deadline,
            hotel_deadline: self.hotel_deadline,
            flight_deadline: self.flight_deadline,
            passport_deadline: self.passport_deadline,
            exchange_rate: self.exchange_rate,
            flight_price: self.flight_price,
            visa_price: self.visa_price,
            profit: self.profit,
            days_madina: self.days_madina,
            days_makkah: self.days_makkah,
        }
    }

    /// Convierte `hotelsMadina` / `hotelsMakkah` a la configuración deseada
    pub fn desired_inventory(&self) -> Result<DesiredInventory, AppError> {
        let mut hotels = Vec::new();
        for (city, entries) in [(City::Madina, &self.hotels_madina), (City::Makkah, &self.hotels_makkah)] {
            for entry in entries {
                hotels.push(desired_hotel(city, entry)?);
            }
        }
        Ok(DesiredInventory { hotels })
    }
}

fn desired_hotel(city: City, entry: &HotelRoomsRequest) -> Result<DesiredHotel, AppError> {
    let mut rooms = BTreeMap::new();
    for (key, chambre) in &entry.chambres {
        let room_type: RoomType = key.parse()?;
        if chambre.nb < 0 {
            return Err(AppError::BadRequest(format!(
                "'{}' room type {}: nb must not be negative",
                entry.name, key
            )));
        }
        if chambre.prix < Decimal::ZERO {
            return Err(AppError::BadRequest(format!(
                "'{}' room type {}: prix must not be negative",
                entry.name, key
            )));
        }
        if !fits_numeric(&chambre.prix, 12, 2) {
            return Err(AppError::BadRequest(format!(
                "'{}' room type {}: prix must have at most 2 decimals and stay below 10^10",
                entry.name, key
            )));
        }
        rooms.insert(room_type, DesiredRooms { count: chambre.nb, price: chambre.prix });
    }
    Ok(DesiredHotel {
        name: entry.name.trim().to_string(),
        city,
        rooms,
    })
}

// Habitación con su estado derivado
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    #[serde(flatten)]
    pub room: Room,
    pub state: RoomState,
    pub occupied_count: i32,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            state: room.state(),
            occupied_count: room.occupied_count(),
            room,
        }
    }
}

// Programa con hoteles enlazados e inventario actual
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDetailResponse {
    pub program: Program,
    pub hotels_madina: Vec<Hotel>,
    pub hotels_makkah: Vec<Hotel>,
    pub rooms: Vec<RoomResponse>,
}

// Resultado de crear / actualizar un programa
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSaveResponse {
    #[serde(flatten)]
    pub detail: ProgramDetailResponse,
    pub adjustments: Vec<RoomAdjustment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> serde_json::Value {
        json!({
            "name": "Omra Ramadan",
            "exchange": "3.75",
            "prixAvionDH": 7750,
            "prixVisaRiyal": 550,
            "profit": 1000,
            "nbJoursMadina": 4,
            "nbJoursMakkah": 10,
            "hotelsMadina": [
                { "name": "Hotel A", "chambres": { "2": { "nb": 5, "prix": 800 }, "4": { "nb": 2, "prix": 1200 } } }
            ],
            "hotelsMakkah": [
                { "name": " Hotel B ", "chambres": { "3": { "nb": 1, "prix": "950.50" } } }
            ]
        })
    }

    #[test]
    fn test_parse_program_request() {
        let request: ProgramRequest = serde_json::from_value(body()).unwrap();
        assert!(request.validate().is_ok());

        let inventory = request.desired_inventory().unwrap();
        assert_eq!(inventory.hotels.len(), 2);
        let madina = &inventory.hotels[0];
        assert_eq!(madina.city, City::Madina);
        assert_eq!(madina.rooms[&RoomType::Double], DesiredRooms { count: 5, price: Decimal::new(800, 0) });
        assert_eq!(madina.rooms[&RoomType::Quadruple].count, 2);

        let makkah = &inventory.hotels[1];
        assert_eq!(makkah.name, "Hotel B");
        assert_eq!(makkah.rooms[&RoomType::Triple].price, Decimal::new(95050, 2));
    }

    #[test]
    fn test_invalid_room_type_key_is_rejected() {
        let mut value = body();
        value["hotelsMadina"][0]["chambres"] = json!({ "7": { "nb": 1, "prix": 100 } });
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(matches!(request.desired_inventory(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_negative_amounts_are_rejected() {
        let mut value = body();
        value["hotelsMakkah"][0]["chambres"]["3"]["nb"] = json!(-1);
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(request.desired_inventory().is_err());

        let mut value = body();
        value["exchange"] = json!(0);
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());

        let mut value = body();
        value["profit"] = json!(-5);
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_room_price_must_fit_numeric_column() {
        let mut value = body();
        value["hotelsMakkah"][0]["chambres"]["3"]["prix"] = json!("950.505");
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(matches!(request.desired_inventory(), Err(AppError::BadRequest(_))));

        let mut value = body();
        value["hotelsMakkah"][0]["chambres"]["3"]["prix"] = json!("10000000000");
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(matches!(request.desired_inventory(), Err(AppError::BadRequest(_))));

        let mut value = body();
        value["hotelsMakkah"][0]["chambres"]["3"]["prix"] = json!("9999999999.99");
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(request.desired_inventory().is_ok());

        let mut value = body();
        value["prixAvionDH"] = json!("7750.125");
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_names() {
        let mut value = body();
        value["hotelsMadina"][0]["name"] = json!("");
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());

        let mut value = body();
        value["name"] = json!("   ");
        let request: ProgramRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{City, Gender, Reservation, RoomType};
use crate::services::place_allocator_service::AllocationPreview;
use crate::services::pricing_service::PriceBreakdown;
use crate::utils::validation::{validate_not_blank, PASSPORT_REGEX, PHONE_REGEX};

fn default_true() -> bool {
    true
}

// Hotel elegido en una ciudad y, opcionalmente, la habitación preseleccionada
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityChoiceRequest {
    pub hotel_id: Uuid,
    pub room_id: Option<Uuid>,
}

// Parte común de presupuesto y reserva
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub program_id: Uuid,
    pub room_type: RoomType,
    pub gender: Gender,
    /// `None` = sin hotel en Madina
    pub madina: Option<CityChoiceRequest>,
    /// `None` = sin hotel en Makkah
    pub makkah: Option<CityChoiceRequest>,
    #[serde(default = "default_true")]
    pub include_flight: bool,
    #[serde(default = "default_true")]
    pub include_visa: bool,
    /// Por defecto, los días del programa
    #[validate(range(min = 0, max = 365))]
    pub days_madina: Option<i32>,
    #[validate(range(min = 0, max = 365))]
    pub days_makkah: Option<i32>,
}

impl BookingRequest {
    pub fn choice(&self, city: City) -> Option<&CityChoiceRequest> {
        match city {
            City::Madina => self.madina.as_ref(),
            City::Makkah => self.makkah.as_ref(),
        }
    }

    pub fn days_override(&self, city: City) -> Option<i32> {
        match city {
            City::Madina => self.days_madina,
            City::Makkah => self.days_makkah,
        }
    }
}

// Request para crear una reserva
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[serde(flatten)]
    #[validate]
    pub booking: BookingRequest,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub client_name: String,
    #[validate(length(max = 50), regex = "PHONE_REGEX")]
    pub phone: Option<String>,
    #[validate(length(max = 50), regex = "PASSPORT_REGEX")]
    pub passport_number: Option<String>,
}

// Query de previsualización de asignación
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub hotel_id: Uuid,
    pub room_type: RoomType,
    pub gender: Gender,
}

// Plaza asignada en una ciudad
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAssignment {
    pub city: City,
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub place_index: i32,
    pub room_gender: Gender,
    pub remaining_places: i32,
}

// Presupuesto con las habitaciones que se asignarían
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub price: Decimal,
    pub breakdown: PriceBreakdown,
    pub madina: Option<AllocationPreview>,
    pub makkah: Option<AllocationPreview>,
}

// Response de reserva creada
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation: Reservation,
    pub places: Vec<PlaceAssignment>,
    pub breakdown: PriceBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_create_reservation_defaults() {
        let request: CreateReservationRequest = serde_json::from_value(json!({
            "programId": Uuid::new_v4(),
            "roomType": 2,
            "gender": "Female",
            "madina": { "hotelId": Uuid::new_v4() },
            "clientName": "Fatima Zahra"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.booking.room_type, RoomType::Double);
        assert!(request.booking.include_flight && request.booking.include_visa);
        assert!(request.booking.choice(City::Makkah).is_none());
        assert!(request.booking.choice(City::Madina).unwrap().room_id.is_none());
    }

    #[test]
    fn test_malformed_passport_fails_validation() {
        let request: CreateReservationRequest = serde_json::from_value(json!({
            "programId": Uuid::new_v4(),
            "roomType": 3,
            "gender": "Male",
            "clientName": "Hamza",
            "phone": "+212 661 234 567",
            "passportNumber": "x-1"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("passport_number"));
    }

    #[test]
    fn test_empty_client_name_fails_validation() {
        let request: CreateReservationRequest = serde_json::from_value(json!({
            "programId": Uuid::new_v4(),
            "roomType": 4,
            "gender": "Male",
            "clientName": ""
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}

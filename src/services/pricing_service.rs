//! Cálculo del precio de una reserva
//!
//! Regla de negocio fija:
//!
//! ```text
//! costeHotelPorPersona = (precioHabitacion / personas) * díasEnLaCiudad   // Riyal
//! precioFinal = vuelo_DH + profit_DH
//!             + (visado + costeHotelMadina + costeHotelMakkah) * cambio
//! ```
//!
//! Solo se redondea la suma final (2 decimales), nunca los términos
//! intermedios.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::{Program, RoomType};

/// Estancia en una ciudad: precio de la habitación elegida y días
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityStay {
    pub room_price: Decimal,
    pub days: i32,
}

/// Todo lo que necesita la fórmula de precio
#[derive(Debug, Clone)]
pub struct PriceInputs {
    pub room_type: RoomType,
    pub exchange_rate: Decimal,
    pub flight_price: Decimal,
    pub visa_price: Decimal,
    pub profit: Decimal,
    pub include_flight: bool,
    pub include_visa: bool,
    /// `None` = sin hotel en Madina
    pub madina: Option<CityStay>,
    /// `None` = sin hotel en Makkah
    pub makkah: Option<CityStay>,
}

impl PriceInputs {
    /// Parámetros del programa con todos los servicios incluidos y sin hotel
    pub fn from_program(program: &Program, room_type: RoomType) -> Self {
        Self {
            room_type,
            exchange_rate: program.exchange_rate,
            flight_price: program.flight_price,
            visa_price: program.visa_price,
            profit: program.profit,
            include_flight: true,
            include_visa: true,
            madina: None,
            makkah: None,
        }
    }
}

/// Desglose del precio. Los términos en Riyal no están redondeados.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub flight_local: Decimal,
    pub profit_local: Decimal,
    pub visa_foreign: Decimal,
    pub madina_hotel_foreign: Decimal,
    pub makkah_hotel_foreign: Decimal,
    pub total: Decimal,
}

/// Coste de hotel por persona para una estancia, en moneda extranjera
pub fn hotel_cost_per_person(stay: CityStay, room_type: RoomType) -> Decimal {
    stay.room_price / Decimal::from(room_type.person_count()) * Decimal::from(stay.days)
}

pub fn compute_price(inputs: &PriceInputs) -> PriceBreakdown {
    let flight_local = if inputs.include_flight { inputs.flight_price } else { Decimal::ZERO };
    let visa_foreign = if inputs.include_visa { inputs.visa_price } else { Decimal::ZERO };
    let madina_hotel_foreign = inputs
        .madina
        .map(|stay| hotel_cost_per_person(stay, inputs.room_type))
        .unwrap_or(Decimal::ZERO);
    let makkah_hotel_foreign = inputs
        .makkah
        .map(|stay| hotel_cost_per_person(stay, inputs.room_type))
        .unwrap_or(Decimal::ZERO);

    let total = flight_local
        + inputs.profit
        + (visa_foreign + madina_hotel_foreign + makkah_hotel_foreign) * inputs.exchange_rate;

    PriceBreakdown {
        flight_local,
        profit_local: inputs.profit,
        visa_foreign,
        madina_hotel_foreign,
        makkah_hotel_foreign,
        total: total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn reference_inputs() -> PriceInputs {
        PriceInputs {
            room_type: RoomType::Double,
            exchange_rate: dec("3.75"),
            flight_price: dec("7750"),
            visa_price: dec("550"),
            profit: dec("1000"),
            include_flight: true,
            include_visa: true,
            madina: Some(CityStay { room_price: dec("800"), days: 4 }),
            makkah: Some(CityStay { room_price: dec("800"), days: 10 }),
        }
    }

    #[test]
    fn test_reference_package_price() {
        // 7750 + 1000 + (550 + 400*4 + 400*10) * 3.75 = 31812.50
        let breakdown = compute_price(&reference_inputs());
        assert_eq!(breakdown.madina_hotel_foreign, dec("1600"));
        assert_eq!(breakdown.makkah_hotel_foreign, dec("4000"));
        assert_eq!(breakdown.total, dec("31812.50"));
    }

    #[test]
    fn test_excluded_services_and_hotels_are_zero() {
        let mut inputs = reference_inputs();
        inputs.include_flight = false;
        inputs.include_visa = false;
        inputs.madina = None;
        // 1000 + 4000 * 3.75
        assert_eq!(compute_price(&inputs).total, dec("16000"));

        inputs.makkah = None;
        assert_eq!(compute_price(&inputs).total, dec("1000"));
    }

    #[test]
    fn test_only_final_sum_is_rounded() {
        // 1000 / 3 * 1 = 333.333...; * 3.75 = 1249.99999... -> 1250.00
        // redondear el término intermedio daría 333.33 * 3.75 = 1249.9875 -> 1249.99
        let inputs = PriceInputs {
            room_type: RoomType::Triple,
            exchange_rate: dec("3.75"),
            flight_price: Decimal::ZERO,
            visa_price: Decimal::ZERO,
            profit: Decimal::ZERO,
            include_flight: true,
            include_visa: true,
            madina: Some(CityStay { room_price: dec("1000"), days: 1 }),
            makkah: None,
        };
        assert_eq!(compute_price(&inputs).total, dec("1250.00"));
    }
}

//! Modelo de Program
//!
//! Plantilla de viaje: fechas límite, parámetros de precio y número de días
//! en cada ciudad. Es dueño de su inventario de habitaciones.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::hotel::City;

/// Program principal - mapea exactamente a la tabla programs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub visa_deadline: Option<NaiveDate>,
    pub hotel_deadline: Option<NaiveDate>,
    pub flight_deadline: Option<NaiveDate>,
    pub passport_deadline: Option<NaiveDate>,
    /// Tipo de cambio moneda extranjera (Riyal) → moneda local (DH)
    #[serde(rename = "exchange")]
    pub exchange_rate: Decimal,
    /// Precio del vuelo, en moneda local
    #[serde(rename = "prixAvionDH")]
    pub flight_price: Decimal,
    /// Precio del visado, en moneda extranjera
    #[serde(rename = "prixVisaRiyal")]
    pub visa_price: Decimal,
    /// Margen fijo, en moneda local
    pub profit: Decimal,
    #[serde(rename = "nbJoursMadina")]
    pub days_madina: i32,
    #[serde(rename = "nbJoursMakkah")]
    pub days_makkah: i32,
}

impl Program {
    pub fn days_at(&self, city: City) -> i32 {
        match city {
            City::Madina => self.days_madina,
            City::Makkah => self.days_makkah,
        }
    }
}

//! Modelo de Hotel
//!
//! Entidad independiente; un programa la referencia por tablas de unión
//! (una por ciudad) y cada Room la referencia directamente.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Ciudad del hotel - mapea al ENUM city
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "city")]
pub enum City {
    Madina,
    Makkah,
}

impl City {
    /// Orden fijo en que se reconcilian las ciudades de un programa
    pub const ALL: [City; 2] = [City::Madina, City::Makkah];

    /// Tabla de unión programa↔hotel de esta ciudad
    pub fn link_table(self) -> &'static str {
        match self {
            City::Madina => "program_madina_hotels",
            City::Makkah => "program_makkah_hotels",
        }
    }
}

/// Hotel principal - mapea exactamente a la tabla hotels
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub city: City,
    pub created_at: DateTime<Utc>,
}

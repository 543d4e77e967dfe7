//! Reconciliación del inventario de habitaciones
//!
//! Traduce la configuración deseada `{hotel, tipo} -> {nb, prix}` de un
//! programa en creaciones, borrados y cambios de precio sobre `rooms`, sin
//! tocar nunca la capacidad de una habitación ocupada.
//!
//! Todo corre dentro de una única transacción: la fila del programa se
//! bloquea primero (serializa reconciliaciones concurrentes del mismo
//! programa) y el recuento actual de cada combinación se relee con
//! `FOR UPDATE` justo antes de decidir qué crear o borrar.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgConnection;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{City, Room, RoomType};
use crate::repositories::hotel_repository::HotelRepository;
use crate::repositories::program_repository::ProgramRepository;
use crate::repositories::room_repository::RoomRepository;
use crate::utils::errors::{not_found_error, AppResult};

/// Cantidad y precio deseados para un tipo de habitación
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesiredRooms {
    pub count: i32,
    pub price: Decimal,
}

/// Configuración deseada de un hotel
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredHotel {
    pub name: String,
    pub city: City,
    pub rooms: BTreeMap<RoomType, DesiredRooms>,
}

/// Configuración completa de un programa; los hoteles se procesan en orden
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredInventory {
    pub hotels: Vec<DesiredHotel>,
}

/// Resultado visible de una combinación (hotel, tipo)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomAdjustment {
    pub hotel_id: Uuid,
    pub hotel_name: String,
    pub room_type: RoomType,
    pub requested: i32,
    pub before: i32,
    pub after: i32,
    pub created: i32,
    pub deleted: i32,
    /// Reducción pedida que no se aplicó porque las habitaciones están ocupadas
    pub not_removed: i32,
    pub price_updated: bool,
}

impl RoomAdjustment {
    pub fn changed(&self) -> bool {
        self.created > 0 || self.deleted > 0 || self.price_updated
    }
}

/// Operaciones a aplicar sobre una combinación
#[derive(Debug, Clone)]
pub struct ReconciliationPlan {
    pub update_price: Option<Decimal>,
    pub rooms_to_create: Vec<Room>,
    pub rooms_to_delete: Vec<Uuid>,
    pub adjustment: RoomAdjustment,
}

/// Decide las operaciones para una combinación a partir de TODAS sus
/// habitaciones actuales (cualquier género).
pub fn plan_reconciliation(
    program_id: Uuid,
    hotel_id: Uuid,
    hotel_name: &str,
    room_type: RoomType,
    existing: &[Room],
    desired: DesiredRooms,
) -> ReconciliationPlan {
    let existing: Vec<&Room> = existing
        .iter()
        .filter(|room| room.hotel_id == hotel_id && room.room_type == room_type)
        .collect();
    let free: Vec<&Room> = existing.iter().copied().filter(|room| room.is_free()).collect();
    let current_total = existing.len() as i32;
    let free_count = free.len() as i32;

    let update_price = (desired.price > Decimal::ZERO
        && existing.iter().any(|room| room.price != desired.price))
    .then_some(desired.price);

    let mut rooms_to_create = Vec::new();
    let mut rooms_to_delete = Vec::new();
    let mut not_removed = 0;

    if desired.count <= 0 {
        rooms_to_delete.extend(free.iter().map(|room| room.id));
        not_removed = current_total - free_count;
    } else if desired.count > current_total {
        let price = if desired.price > Decimal::ZERO {
            desired.price
        } else {
            existing.first().map(|room| room.price).unwrap_or(Decimal::ZERO)
        };
        rooms_to_create = (0..desired.count - current_total)
            .map(|_| Room::new_empty(program_id, hotel_id, room_type, price))
            .collect();
    } else if desired.count < current_total {
        let to_remove = current_total - desired.count;
        let removable = to_remove.min(free_count);
        rooms_to_delete.extend(free.iter().take(removable as usize).map(|room| room.id));
        not_removed = to_remove - removable;
    }

    let created = rooms_to_create.len() as i32;
    let deleted = rooms_to_delete.len() as i32;

    ReconciliationPlan {
        update_price,
        rooms_to_create,
        rooms_to_delete,
        adjustment: RoomAdjustment {
            hotel_id,
            hotel_name: hotel_name.to_string(),
            room_type,
            requested: desired.count.max(0),
            before: current_total,
            after: current_total + created - deleted,
            created,
            deleted,
            not_removed,
            price_updated: update_price.is_some(),
        },
    }
}

/// Reconciliación completa de un programa. `conn` debe ser una transacción
/// abierta; si algo falla el llamador la descarta y no persiste ningún cambio.
pub async fn reconcile_program_rooms(
    conn: &mut PgConnection,
    program_id: Uuid,
    desired: &DesiredInventory,
) -> AppResult<Vec<RoomAdjustment>> {
    if !ProgramRepository::lock(&mut *conn, program_id).await? {
        return Err(not_found_error("Program", &program_id.to_string()));
    }

    let mut adjustments = Vec::new();

    for desired_hotel in &desired.hotels {
        let hotel = HotelRepository::find_or_create(&mut *conn, &desired_hotel.name, desired_hotel.city).await?;
        HotelRepository::link_to_program(&mut *conn, program_id, &hotel).await?;

        for (&room_type, &rooms) in &desired_hotel.rooms {
            let existing = RoomRepository::lock_combination(&mut *conn, program_id, hotel.id, room_type).await?;
            let plan = plan_reconciliation(program_id, hotel.id, &hotel.name, room_type, &existing, rooms);
            apply_plan(&mut *conn, program_id, &plan).await?;
            log_adjustment(&plan.adjustment);
            adjustments.push(plan.adjustment);
        }
    }

    Ok(adjustments)
}

async fn apply_plan(conn: &mut PgConnection, program_id: Uuid, plan: &ReconciliationPlan) -> AppResult<()> {
    let adjustment = &plan.adjustment;

    if let Some(price) = plan.update_price {
        RoomRepository::update_price(&mut *conn, program_id, adjustment.hotel_id, adjustment.room_type, price)
            .await?;
    }

    if !plan.rooms_to_delete.is_empty() {
        let deleted = RoomRepository::delete_free(&mut *conn, &plan.rooms_to_delete).await?;
        if deleted != plan.rooms_to_delete.len() as u64 {
            warn!(
                "⚠️ Se esperaban {} borrados en {} tipo {:?}, se borraron {}",
                plan.rooms_to_delete.len(),
                adjustment.hotel_name,
                adjustment.room_type,
                deleted
            );
        }
    }

    for room in &plan.rooms_to_create {
        RoomRepository::insert(&mut *conn, room).await?;
    }

    Ok(())
}

fn log_adjustment(adjustment: &RoomAdjustment) {
    if adjustment.not_removed > 0 {
        warn!(
            "🔒 {} tipo {:?}: reducción parcial, {} habitaciones ocupadas no se eliminaron ({} -> {}, pedido {})",
            adjustment.hotel_name,
            adjustment.room_type,
            adjustment.not_removed,
            adjustment.before,
            adjustment.after,
            adjustment.requested
        );
    }
    if adjustment.changed() {
        info!(
            "🏨 {} tipo {:?}: {} -> {} habitaciones (+{} / -{}){}",
            adjustment.hotel_name,
            adjustment.room_type,
            adjustment.before,
            adjustment.after,
            adjustment.created,
            adjustment.deleted,
            if adjustment.price_updated { ", precio actualizado" } else { "" }
        );
    } else {
        debug!("{} tipo {:?}: sin cambios", adjustment.hotel_name, adjustment.room_type);
    }
}

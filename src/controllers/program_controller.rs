use crate::dto::common_dto::ApiResponse;
use crate::dto::program_dto::{ProgramDetailResponse, ProgramRequest, ProgramSaveResponse, RoomResponse};
use crate::models::{City, Program};
use crate::repositories::{HotelRepository, ProgramRepository, RoomRepository};
use crate::services::room_reconciler_service::{reconcile_program_rooms, RoomAdjustment};
use crate::utils::errors::{not_found_error, AppError};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct ProgramController {
    pool: PgPool,
}

impl ProgramController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crea el programa y siembra su inventario en una sola transacción
    pub async fn create(&self, request: ProgramRequest) -> Result<ApiResponse<ProgramSaveResponse>, AppError> {
        request.validate()?;
        let desired = request.desired_inventory()?;

        let mut tx = self.pool.begin().await?;
        let program = ProgramRepository::create(&mut tx, &request.to_program(Uuid::new_v4())).await?;
        let adjustments = reconcile_program_rooms(&mut tx, program.id, &desired).await?;
        let detail = load_detail(&mut tx, program).await?;
        tx.commit().await?;

        info!("✅ Programa '{}' creado con {} habitaciones", detail.program.name, detail.rooms.len());

        Ok(ApiResponse::success_with_message(
            ProgramSaveResponse { detail, adjustments },
            "Programa creado exitosamente".to_string(),
        ))
    }

    /// Actualiza los campos del programa y reconcilia el inventario.
    /// Si cualquier paso falla, el rollback deja el programa intacto.
    pub async fn update(&self, id: Uuid, request: ProgramRequest) -> Result<ApiResponse<ProgramSaveResponse>, AppError> {
        request.validate()?;
        let desired = request.desired_inventory()?;

        let mut tx = self.pool.begin().await?;
        let adjustments = reconcile_program_rooms(&mut tx, id, &desired).await?;
        let program = ProgramRepository::update(&mut tx, &request.to_program(id))
            .await?
            .ok_or_else(|| not_found_error("Program", &id.to_string()))?;
        let detail = load_detail(&mut tx, program).await?;
        tx.commit().await?;

        let message = partial_shrink_message(&adjustments)
            .unwrap_or_else(|| "Programa actualizado exitosamente".to_string());
        info!("✅ Programa '{}' actualizado", detail.program.name);

        Ok(ApiResponse::success_with_message(
            ProgramSaveResponse { detail, adjustments },
            message,
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ProgramDetailResponse, AppError> {
        let mut conn = self.pool.acquire().await?;
        let program = ProgramRepository::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| not_found_error("Program", &id.to_string()))?;
        load_detail(&mut conn, program).await
    }

    pub async fn list(&self) -> Result<Vec<Program>, AppError> {
        let mut conn = self.pool.acquire().await?;
        ProgramRepository::list(&mut conn).await
    }

    /// Borrado administrativo en cascada: pagos, reservas, gastos, habitaciones y enlaces
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !ProgramRepository::lock_for_delete(&mut tx, id).await? {
            return Err(not_found_error("Program", &id.to_string()));
        }
        ProgramRepository::delete_cascade(&mut tx, id).await?;
        tx.commit().await?;

        info!("🗑️ Programa {} eliminado con todas sus dependencias", id);
        Ok(())
    }
}

async fn load_detail(conn: &mut PgConnection, program: Program) -> Result<ProgramDetailResponse, AppError> {
    let hotels_madina = HotelRepository::find_by_program(&mut *conn, program.id, City::Madina).await?;
    let hotels_makkah = HotelRepository::find_by_program(&mut *conn, program.id, City::Makkah).await?;
    let rooms = RoomRepository::find_by_program(&mut *conn, program.id)
        .await?
        .into_iter()
        .map(RoomResponse::from)
        .collect();

    Ok(ProgramDetailResponse {
        program,
        hotels_madina,
        hotels_makkah,
        rooms,
    })
}

/// Mensaje para las combinaciones cuya reducción no se aplicó del todo
fn partial_shrink_message(adjustments: &[RoomAdjustment]) -> Option<String> {
    let partial: Vec<String> = adjustments
        .iter()
        .filter(|a| a.not_removed > 0)
        .map(|a| {
            format!(
                "{} tipo {}: reducido en {} en lugar de {}",
                a.hotel_name,
                u8::from(a.room_type),
                a.deleted,
                a.deleted + a.not_removed
            )
        })
        .collect();

    (!partial.is_empty()).then(|| format!("Programa actualizado; se conservaron habitaciones ocupadas ({})", partial.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomType;

    fn adjustment(deleted: i32, not_removed: i32) -> RoomAdjustment {
        RoomAdjustment {
            hotel_id: Uuid::new_v4(),
            hotel_name: "Hotel A".to_string(),
            room_type: RoomType::Double,
            requested: 2,
            before: 5,
            after: 5 - deleted,
            created: 0,
            deleted,
            not_removed,
            price_updated: false,
        }
    }

    #[test]
    fn test_partial_shrink_message() {
        assert!(partial_shrink_message(&[adjustment(3, 0)]).is_none());
        let message = partial_shrink_message(&[adjustment(1, 2)]).unwrap();
        assert!(message.contains("Hotel A tipo 2: reducido en 1 en lugar de 3"));
    }
}

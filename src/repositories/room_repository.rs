use crate::models::{Gender, Room, RoomType};
use crate::services::place_allocator_service::AllocationRequest;
use crate::utils::errors::AppError;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

/// Acceso a la tabla rooms. Todas las funciones reciben la conexión para
/// poder componerse dentro de una misma transacción.
pub struct RoomRepository;

impl RoomRepository {
    pub async fn find_by_program(conn: &mut PgConnection, program_id: Uuid) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            "SELECT * FROM rooms WHERE program_id = $1 ORDER BY hotel_id, room_type, created_at, id"
        )
        .bind(program_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rooms)
    }

    pub async fn find_in_program(
        conn: &mut PgConnection,
        program_id: Uuid,
        room_id: Uuid,
    ) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1 AND program_id = $2")
            .bind(room_id)
            .bind(program_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(room)
    }

    /// Todas las habitaciones de (programa, hotel, tipo), de cualquier género,
    /// bloqueadas hasta el final de la transacción
    pub async fn lock_combination(
        conn: &mut PgConnection,
        program_id: Uuid,
        hotel_id: Uuid,
        room_type: RoomType,
    ) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT * FROM rooms
            WHERE program_id = $1 AND hotel_id = $2 AND room_type = $3
            ORDER BY created_at, id
            FOR UPDATE
            "#
        )
        .bind(program_id)
        .bind(hotel_id)
        .bind(room_type)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rooms)
    }

    /// Candidatas para una reserva: mismo hotel y tipo, género exacto o Mixed
    pub async fn find_candidates(
        conn: &mut PgConnection,
        program_id: Uuid,
        request: &AllocationRequest,
    ) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT * FROM rooms
            WHERE program_id = $1 AND hotel_id = $2 AND room_type = $3
              AND (gender = $4 OR gender = 'Mixed')
            ORDER BY created_at, id
            "#
        )
        .bind(program_id)
        .bind(request.hotel_id)
        .bind(request.room_type)
        .bind(request.gender)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rooms)
    }

    pub async fn insert(conn: &mut PgConnection, room: &Room) -> Result<Room, AppError> {
        let created = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (
                id, program_id, hotel_id, room_type, gender,
                total_places, remaining_places, price, reservation_ids, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#
        )
        .bind(room.id)
        .bind(room.program_id)
        .bind(room.hotel_id)
        .bind(room.room_type)
        .bind(room.gender)
        .bind(room.total_places)
        .bind(room.remaining_places)
        .bind(room.price)
        .bind(&room.reservation_ids)
        .bind(room.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(created)
    }

    /// El precio es un atributo compartido: se actualiza en habitaciones libres y ocupadas
    pub async fn update_price(
        conn: &mut PgConnection,
        program_id: Uuid,
        hotel_id: Uuid,
        room_type: RoomType,
        price: Decimal,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE rooms SET price = $4 WHERE program_id = $1 AND hotel_id = $2 AND room_type = $3"
        )
        .bind(program_id)
        .bind(hotel_id)
        .bind(room_type)
        .bind(price)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Borra solo las habitaciones de `ids` que siguen libres
    pub async fn delete_free(conn: &mut PgConnection, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM rooms
            WHERE id = ANY($1)
              AND remaining_places = total_places
              AND cardinality(reservation_ids) = 0
            "#
        )
        .bind(ids)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Ocupa una plaza de forma atómica. El WHERE se reevalúa tras esperar el
    /// bloqueo de fila, así que dos reservas no pueden llevarse la misma
    /// última plaza: la perdedora recibe `None`.
    pub async fn claim_place(
        conn: &mut PgConnection,
        room_id: Uuid,
        reservation_id: Uuid,
        gender: Gender,
    ) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            UPDATE rooms
            SET remaining_places = remaining_places - 1,
                reservation_ids = array_append(reservation_ids, $2),
                gender = CASE WHEN gender = 'Mixed' THEN $3 ELSE gender END
            WHERE id = $1
              AND remaining_places > 0
              AND (gender = $3 OR gender = 'Mixed')
            RETURNING *
            "#
        )
        .bind(room_id)
        .bind(reservation_id)
        .bind(gender)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(room)
    }

    /// Libera la plaza de una reserva; la habitación vuelve a Mixed si queda vacía
    pub async fn release_place(
        conn: &mut PgConnection,
        room_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            UPDATE rooms
            SET remaining_places = LEAST(total_places, remaining_places + 1),
                reservation_ids = array_remove(reservation_ids, $2),
                gender = CASE
                    WHEN cardinality(array_remove(reservation_ids, $2)) = 0 THEN 'Mixed'::room_gender
                    ELSE gender
                END
            WHERE id = $1 AND $2 = ANY(reservation_ids)
            RETURNING *
            "#
        )
        .bind(room_id)
        .bind(reservation_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(room)
    }

    pub async fn delete_by_program(conn: &mut PgConnection, program_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM rooms WHERE program_id = $1")
            .bind(program_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}

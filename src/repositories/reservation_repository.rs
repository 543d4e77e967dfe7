use crate::models::Reservation;
use crate::utils::errors::AppError;
use sqlx::PgConnection;
use uuid::Uuid;

pub struct ReservationRepository;

impl ReservationRepository {
    pub async fn create(conn: &mut PgConnection, reservation: &Reservation) -> Result<Reservation, AppError> {
        let result = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                id, program_id, room_type, gender, madina_room_id, makkah_room_id,
                client_name, phone, passport_number, days_madina, days_makkah,
                include_flight, include_visa, price, is_paid, documents_complete, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#
        )
        .bind(reservation.id)
        .bind(reservation.program_id)
        .bind(reservation.room_type)
        .bind(reservation.gender)
        .bind(reservation.madina_room_id)
        .bind(reservation.makkah_room_id)
        .bind(&reservation.client_name)
        .bind(&reservation.phone)
        .bind(&reservation.passport_number)
        .bind(reservation.days_madina)
        .bind(reservation.days_makkah)
        .bind(reservation.include_flight)
        .bind(reservation.include_visa)
        .bind(reservation.price)
        .bind(reservation.is_paid)
        .bind(reservation.documents_complete)
        .bind(reservation.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(result)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Reservation>, AppError> {
        let result = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(result)
    }

    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<Reservation>, AppError> {
        let result = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(result)
    }

    pub async fn find_by_program(conn: &mut PgConnection, program_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        let result = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE program_id = $1 ORDER BY created_at"
        )
        .bind(program_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(result)
    }

    /// Borra la reserva junto con sus pagos
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM payments WHERE reservation_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

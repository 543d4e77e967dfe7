use crate::models::Program;
use crate::utils::errors::AppError;
use sqlx::PgConnection;
use uuid::Uuid;

pub struct ProgramRepository;

impl ProgramRepository {
    pub async fn create(conn: &mut PgConnection, program: &Program) -> Result<Program, AppError> {
        let result = sqlx::query_as::<_, Program>(
            r#"
            INSERT INTO programs (
                id, name, created_at, visa_deadline, hotel_deadline, flight_deadline,
                passport_deadline, exchange_rate, flight_price, visa_price, profit,
                days_madina, days_makkah
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#
        )
        .bind(program.id)
        .bind(&program.name)
        .bind(program.created_at)
        .bind(program.visa_deadline)
        .bind(program.hotel_deadline)
        .bind(program.flight_deadline)
        .bind(program.passport_deadline)
        .bind(program.exchange_rate)
        .bind(program.flight_price)
        .bind(program.visa_price)
        .bind(program.profit)
        .bind(program.days_madina)
        .bind(program.days_makkah)
        .fetch_one(&mut *conn)
        .await?;

        Ok(result)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Program>, AppError> {
        let result = sqlx::query_as::<_, Program>("SELECT * FROM programs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(result)
    }

    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Program>, AppError> {
        let result = sqlx::query_as::<_, Program>("SELECT * FROM programs ORDER BY created_at DESC")
            .fetch_all(&mut *conn)
            .await?;

        Ok(result)
    }

    /// Bloqueo de reconciliación, válido hasta el final de la transacción.
    /// `FOR NO KEY UPDATE` serializa las reconciliaciones sin chocar con el
    /// `FOR KEY SHARE` de las reservas. Devuelve `false` si el programa no existe.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM programs WHERE id = $1 FOR NO KEY UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.is_some())
    }

    /// Bloqueo compartido de reservas y cancelaciones. Solo excluye el borrado.
    pub async fn lock_shared(conn: &mut PgConnection, id: Uuid) -> Result<Option<Program>, AppError> {
        let result = sqlx::query_as::<_, Program>("SELECT * FROM programs WHERE id = $1 FOR KEY SHARE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(result)
    }

    /// Bloqueo exclusivo previo a `delete_cascade`
    pub async fn lock_for_delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM programs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.is_some())
    }

    pub async fn update(conn: &mut PgConnection, program: &Program) -> Result<Option<Program>, AppError> {
        let result = sqlx::query_as::<_, Program>(
            r#"
            UPDATE programs
            SET name = $2, visa_deadline = $3, hotel_deadline = $4, flight_deadline = $5,
                passport_deadline = $6, exchange_rate = $7, flight_price = $8, visa_price = $9,
                profit = $10, days_madina = $11, days_makkah = $12
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(program.id)
        .bind(&program.name)
        .bind(program.visa_deadline)
        .bind(program.hotel_deadline)
        .bind(program.flight_deadline)
        .bind(program.passport_deadline)
        .bind(program.exchange_rate)
        .bind(program.flight_price)
        .bind(program.visa_price)
        .bind(program.profit)
        .bind(program.days_madina)
        .bind(program.days_makkah)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(result)
    }

    /// Borra el programa y todo lo que depende de él. Debe llamarse dentro de
    /// una transacción; devuelve `false` si el programa no existía.
    pub async fn delete_cascade(conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
        sqlx::query(
            "DELETE FROM payments WHERE reservation_id IN (SELECT id FROM reservations WHERE program_id = $1)"
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM reservations WHERE program_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("DELETE FROM expenses WHERE program_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        crate::repositories::room_repository::RoomRepository::delete_by_program(&mut *conn, id).await?;
        crate::repositories::hotel_repository::HotelRepository::unlink_all(&mut *conn, id).await?;

        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

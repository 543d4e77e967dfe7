use crate::models::{City, Hotel};
use crate::utils::errors::AppError;
use sqlx::PgConnection;
use uuid::Uuid;

pub struct HotelRepository;

impl HotelRepository {
    pub async fn list(conn: &mut PgConnection, city: Option<City>) -> Result<Vec<Hotel>, AppError> {
        let hotels = sqlx::query_as::<_, Hotel>(
            "SELECT * FROM hotels WHERE ($1::city IS NULL OR city = $1) ORDER BY city, name"
        )
        .bind(city)
        .fetch_all(&mut *conn)
        .await?;

        Ok(hotels)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Hotel>, AppError> {
        let hotel = sqlx::query_as::<_, Hotel>("SELECT * FROM hotels WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(hotel)
    }

    /// Busca o crea el hotel por (nombre, ciudad). Si otra petición lo crea a
    /// la vez, el INSERT no hace nada y la lectura posterior lo encuentra.
    pub async fn find_or_create(conn: &mut PgConnection, name: &str, city: City) -> Result<Hotel, AppError> {
        let name = name.trim();

        sqlx::query(
            r#"
            INSERT INTO hotels (id, name, city)
            VALUES ($1, $2, $3)
            ON CONFLICT (name, city) DO NOTHING
            "#
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(city)
        .execute(&mut *conn)
        .await?;

        sqlx::query_as::<_, Hotel>("SELECT * FROM hotels WHERE name = $1 AND city = $2")
            .bind(name)
            .bind(city)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Hotel '{}' ({:?}) missing after insert", name, city)))
    }

    /// Enlaza hotel y programa en la tabla de su ciudad; un enlace existente no es error
    pub async fn link_to_program(conn: &mut PgConnection, program_id: Uuid, hotel: &Hotel) -> Result<(), AppError> {
        let table = hotel.city.link_table();

        sqlx::query(&format!(
            "INSERT INTO {} (program_id, hotel_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            table
        ))
        .bind(program_id)
        .bind(hotel.id)
        .execute(&mut *conn)
        .await?;

        let (exists,): (bool,) = sqlx::query_as(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE program_id = $1 AND hotel_id = $2)",
            table
        ))
        .bind(program_id)
        .bind(hotel.id)
        .fetch_one(&mut *conn)
        .await?;

        if !exists {
            return Err(AppError::Internal(format!(
                "Link between program {} and hotel {} missing after insert",
                program_id, hotel.id
            )));
        }

        Ok(())
    }

    pub async fn find_by_program(
        conn: &mut PgConnection,
        program_id: Uuid,
        city: City,
    ) -> Result<Vec<Hotel>, AppError> {
        let hotels = sqlx::query_as::<_, Hotel>(&format!(
            r#"
            SELECT h.* FROM hotels h
            JOIN {} l ON l.hotel_id = h.id
            WHERE l.program_id = $1
            ORDER BY h.name
            "#,
            city.link_table()
        ))
        .bind(program_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(hotels)
    }

    pub async fn is_linked(conn: &mut PgConnection, program_id: Uuid, hotel: &Hotel) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE program_id = $1 AND hotel_id = $2)",
            hotel.city.link_table()
        ))
        .bind(program_id)
        .bind(hotel.id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    pub async fn unlink_all(conn: &mut PgConnection, program_id: Uuid) -> Result<(), AppError> {
        for city in City::ALL {
            sqlx::query(&format!("DELETE FROM {} WHERE program_id = $1", city.link_table()))
                .bind(program_id)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }
}

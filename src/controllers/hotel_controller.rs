use crate::models::{City, Hotel};
use crate::repositories::HotelRepository;
use crate::utils::errors::AppError;
use sqlx::PgPool;

pub struct HotelController {
    pool: PgPool,
}

impl HotelController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, city: Option<City>) -> Result<Vec<Hotel>, AppError> {
        let mut conn = self.pool.acquire().await?;
        HotelRepository::list(&mut conn, city).await
    }
}

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use crate::controllers::hotel_controller::HotelController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::hotel_dto::HotelFilters;
use crate::models::Hotel;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_hotel_router() -> Router<AppState> {
    Router::new().route("/", get(list_hotels))
}

async fn list_hotels(
    State(state): State<AppState>,
    Query(filters): Query<HotelFilters>,
) -> Result<Json<ApiResponse<Vec<Hotel>>>, AppError> {
    let controller = HotelController::new(state.pool.clone());
    let hotels = controller.list(filters.city).await?;
    Ok(Json(ApiResponse::success(hotels)))
}

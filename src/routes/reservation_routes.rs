use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use crate::controllers::reservation_controller::ReservationController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::reservation_dto::{BookingRequest, CreateReservationRequest, QuoteResponse, ReservationResponse};
use crate::models::Reservation;
use crate::state::AppState;
use crate::utils::errors::AppError;
use uuid::Uuid;

pub fn create_reservation_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_reservation))
        .route("/quote", post(quote_reservation))
        .route("/:id", get(get_reservation).delete(cancel_reservation))
}

async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<Json<ApiResponse<ReservationResponse>>, AppError> {
    let controller = ReservationController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn quote_reservation(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, AppError> {
    let controller = ReservationController::new(state.pool.clone());
    let quote = controller.quote(request).await?;
    Ok(Json(ApiResponse::success(quote)))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Reservation>>, AppError> {
    let controller = ReservationController::new(state.pool.clone());
    let reservation = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(reservation)))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = ReservationController::new(state.pool.clone());
    controller.cancel(id).await?;
    Ok(Json(ApiResponse::ok_message("Reserva cancelada exitosamente".to_string())))
}

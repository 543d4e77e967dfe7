use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use crate::controllers::program_controller::ProgramController;
use crate::controllers::reservation_controller::ReservationController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::program_dto::{ProgramDetailResponse, ProgramRequest, ProgramSaveResponse};
use crate::dto::reservation_dto::AvailabilityQuery;
use crate::models::{Program, Reservation};
use crate::services::place_allocator_service::AllocationPreview;
use crate::state::AppState;
use crate::utils::errors::AppError;
use uuid::Uuid;

pub fn create_program_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_programs).post(create_program))
        .route("/:id", get(get_program).put(update_program).delete(delete_program))
        .route("/:id/rooms/availability", get(room_availability))
        .route("/:id/reservations", get(list_program_reservations))
}

async fn create_program(
    State(state): State<AppState>,
    Json(request): Json<ProgramRequest>,
) -> Result<Json<ApiResponse<ProgramSaveResponse>>, AppError> {
    let controller = ProgramController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_programs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Program>>>, AppError> {
    let controller = ProgramController::new(state.pool.clone());
    let programs = controller.list().await?;
    Ok(Json(ApiResponse::success(programs)))
}

async fn get_program(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProgramDetailResponse>>, AppError> {
    let controller = ProgramController::new(state.pool.clone());
    let detail = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

async fn update_program(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProgramRequest>,
) -> Result<Json<ApiResponse<ProgramSaveResponse>>, AppError> {
    let controller = ProgramController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_program(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = ProgramController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(ApiResponse::ok_message("Programa eliminado exitosamente".to_string())))
}

async fn room_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<AllocationPreview>>, AppError> {
    let controller = ReservationController::new(state.pool.clone());
    let preview = controller.availability(id, query).await?;
    Ok(Json(ApiResponse::success(preview)))
}

async fn list_program_reservations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Reservation>>>, AppError> {
    let controller = ReservationController::new(state.pool.clone());
    let reservations = controller.list_by_program(id).await?;
    Ok(Json(ApiResponse::success(reservations)))
}

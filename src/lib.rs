//! Hajj/Omra booking backend
//!
//! Back office de una agencia de viajes: programas, inventario de
//! habitaciones por hotel, asignación de plazas y cálculo de precios.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::cors::cors_for;
use crate::state::AppState;

/// Tiempo máximo de una petición
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Construir el router completo de la API
pub fn create_app(state: AppState) -> Router {
    let cors = cors_for(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/hotels", routes::hotel_routes::create_hotel_router())
        .nest("/api/programs", routes::program_routes::create_program_router())
        .nest("/api/reservations", routes::reservation_routes::create_reservation_router())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check simple
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "hajj_booking_backend",
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

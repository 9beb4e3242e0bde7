// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::db::{collect_bounded, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::auth::SessionUser;
use crate::models::{FuelPurchase, Repair, ServiceStation, Vehicle};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

/// API routes (require a session).
/// The session middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles/{id}", get(get_vehicle))
        .route("/api/vehicles/{id}/fill-ups", get(list_fill_ups))
        .route("/api/vehicles/{id}/repairs", get(list_repairs))
        .route("/api/license-plates", get(list_license_plates))
        .route("/api/stations", get(list_stations))
}

/// Current user, as recorded in the session.
async fn get_me(Extension(user): Extension<SessionUser>) -> Json<SessionUser> {
    Json(user)
}

// ─── Vehicles ────────────────────────────────────────────────

async fn list_vehicles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Vehicle>>> {
    let vehicles = collect_bounded(state.db.list_vehicles(), state.db.query_timeout()).await?;
    Ok(Json(vehicles))
}

/// `id` must parse as an integer; anything else is rejected with 400 before
/// reaching the store.
async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vehicle>> {
    let vehicle = state
        .db
        .get_vehicle(id)
        .await
        .map_err(|e| not_found_as(e, format!("Vehicle {}", id)))?;
    Ok(Json(vehicle))
}

async fn list_license_plates(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    let plates =
        collect_bounded(state.db.list_license_plates(), state.db.query_timeout()).await?;
    Ok(Json(plates))
}

// ─── Fill-ups and repairs ────────────────────────────────────

async fn list_fill_ups(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<FuelPurchase>>> {
    ensure_vehicle_exists(&state, id).await?;
    let fill_ups = collect_bounded(state.db.list_fill_ups(id), state.db.query_timeout()).await?;
    Ok(Json(fill_ups))
}

async fn list_repairs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Repair>>> {
    ensure_vehicle_exists(&state, id).await?;
    let repairs = collect_bounded(state.db.list_repairs(id), state.db.query_timeout()).await?;
    Ok(Json(repairs))
}

async fn list_stations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ServiceStation>>> {
    let stations = collect_bounded(state.db.list_stations(), state.db.query_timeout()).await?;
    Ok(Json(stations))
}

/// An unknown vehicle is a 404, not an empty list.
async fn ensure_vehicle_exists(state: &AppState, id: i32) -> Result<()> {
    state
        .db
        .get_vehicle(id)
        .await
        .map(|_| ())
        .map_err(|e| not_found_as(e, format!("Vehicle {}", id)))
}

fn not_found_as(err: RepositoryError, what: String) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(what),
        other => other.into(),
    }
}

//! Telemetry ingestion and range queries.
//!
//! Ingestion carries the one non-CRUD rule in the system: a device that is
//! not online must not produce telemetry, so the status check and the insert
//! run inside the same transaction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::access;
use crate::auth::CurrentUser;
use crate::common::AppState;
use crate::entity::device_data;
use crate::entity::devices::{self, DeviceStatus};
use crate::error::{AppError, AppResult};

/// Sentinel applied when only `end` is given. Fixed literal, not a computed
/// minimum, for wire compatibility.
pub const FAR_PAST: &str = "1980-01-01T00:00:00Z";
/// Sentinel applied when only `start` is given.
pub const FAR_FUTURE: &str = "2050-12-31T00:00:00Z";

/// Resolve the requested time window.
///
/// No bounds means no filter. A single bound pairs with the fixed far-past or
/// far-future sentinel. Malformed timestamps are rejected, never silently
/// ignored.
pub fn resolve_window(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, String> {
    if start.is_none() && end.is_none() {
        return Ok(None);
    }
    let start = parse_bound(start.unwrap_or(FAR_PAST))?;
    let end = parse_bound(end.unwrap_or(FAR_FUTURE))?;
    Ok(Some((start, end)))
}

fn parse_bound(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| format!("Invalid timestamp '{raw}', expected ISO 8601"))
}

/// Telemetry is only accepted from devices known to be reachable.
#[must_use]
pub fn ingestion_allowed(status: &DeviceStatus) -> bool {
    matches!(status, DeviceStatus::Online)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceDataResponse {
    pub id: Uuid,
    pub device: Uuid,
    pub data: String,
    pub created_at: DateTime<Utc>,
}

impl From<device_data::Model> for DeviceDataResponse {
    fn from(row: device_data::Model) -> Self {
        Self {
            id: row.id,
            device: row.device_id,
            data: row.data,
            created_at: row.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeviceDataRequest {
    pub data: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeviceDataQuery {
    /// Inclusive lower bound (ISO 8601). Pairs with a far-future sentinel
    /// when `end` is omitted.
    pub start: Option<String>,
    /// Inclusive upper bound (ISO 8601). Pairs with a far-past sentinel
    /// when `start` is omitted.
    pub end: Option<String>,
}

/// List telemetry for a device, oldest first, optionally range-filtered
#[utoipa::path(
    get,
    path = "/api/devices/{device_id}/data",
    params(
        ("device_id" = Uuid, Path, description = "Device id"),
        DeviceDataQuery
    ),
    responses(
        (status = 200, description = "Telemetry retrieved successfully", body = Vec<DeviceDataResponse>),
        (status = 400, description = "Malformed start/end timestamp"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Device exists but is owned by another user"),
        (status = 404, description = "Device not found"),
    ),
    tag = "telemetry"
)]
pub async fn list_device_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<Uuid>,
    Query(query): Query<DeviceDataQuery>,
) -> AppResult<Json<Vec<DeviceDataResponse>>> {
    let device =
        access::find_owned_device(&*state.db, &user, device_id, state.ownership_policy()).await?;

    let window =
        resolve_window(query.start.as_deref(), query.end.as_deref()).map_err(AppError::BadRequest)?;

    let mut db_query = device_data::Entity::find()
        .filter(device_data::Column::DeviceId.eq(device.id));

    if let Some((start, end)) = window {
        db_query = db_query
            .filter(device_data::Column::CreatedAt.gte(start))
            .filter(device_data::Column::CreatedAt.lte(end));
    }

    let rows = db_query
        .order_by_asc(device_data::Column::CreatedAt)
        .order_by_asc(device_data::Column::Id)
        .all(&*state.db)
        .await?;

    Ok(Json(rows.into_iter().map(DeviceDataResponse::from).collect()))
}

/// Append a telemetry record to an online device
#[utoipa::path(
    post,
    path = "/api/devices/{device_id}/data",
    params(
        ("device_id" = Uuid, Path, description = "Device id"),
    ),
    request_body = CreateDeviceDataRequest,
    responses(
        (status = 201, description = "Telemetry record created", body = DeviceDataResponse),
        (status = 400, description = "Empty payload"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Device exists but is owned by another user"),
        (status = 404, description = "Device not found"),
        (status = 409, description = "Device is offline or in error state"),
    ),
    tag = "telemetry"
)]
pub async fn create_device_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<Uuid>,
    Json(req): Json<CreateDeviceDataRequest>,
) -> AppResult<(StatusCode, Json<DeviceDataResponse>)> {
    if req.data.is_empty() {
        return Err(AppError::BadRequest("Data must not be empty".to_string()));
    }

    // Status check and insert share one transaction so a device cannot go
    // offline between the check and the append.
    let txn = state.db.begin().await?;

    let device =
        access::find_owned_device(&txn, &user, device_id, state.ownership_policy()).await?;

    if !ingestion_allowed(&device.status) {
        return Err(AppError::Conflict(
            "Cannot add data: device is offline or in error state".to_string(),
        ));
    }

    let now = state.clock.now();

    let row = device_data::ActiveModel {
        id: Set(Uuid::new_v4()),
        device_id: Set(device.id),
        data: Set(req.data),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut active: devices::ActiveModel = device.into();
    active.last_seen = Set(now.into());
    active.update(&txn).await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(DeviceDataResponse::from(row))))
}

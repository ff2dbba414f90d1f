//! Device log lines. Same ownership gating as telemetry, but logs are
//! accepted regardless of device status: an offline device reporting why it
//! went offline is exactly the point.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access;
use crate::auth::CurrentUser;
use crate::common::AppState;
use crate::entity::device_logs;
use crate::entity::devices;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceLogResponse {
    pub id: Uuid,
    pub device: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<device_logs::Model> for DeviceLogResponse {
    fn from(row: device_logs::Model) -> Self {
        Self {
            id: row.id,
            device: row.device_id,
            message: row.message,
            created_at: row.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeviceLogRequest {
    pub message: String,
}

/// List log lines for a device, oldest first
#[utoipa::path(
    get,
    path = "/api/devices/{device_id}/logs",
    params(
        ("device_id" = Uuid, Path, description = "Device id"),
    ),
    responses(
        (status = 200, description = "Logs retrieved successfully", body = Vec<DeviceLogResponse>),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Device exists but is owned by another user"),
        (status = 404, description = "Device not found"),
    ),
    tag = "logs"
)]
pub async fn list_device_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<Uuid>,
) -> AppResult<Json<Vec<DeviceLogResponse>>> {
    let device =
        access::find_owned_device(&*state.db, &user, device_id, state.ownership_policy()).await?;

    let rows = device_logs::Entity::find()
        .filter(device_logs::Column::DeviceId.eq(device.id))
        .order_by_asc(device_logs::Column::CreatedAt)
        .order_by_asc(device_logs::Column::Id)
        .all(&*state.db)
        .await?;

    Ok(Json(rows.into_iter().map(DeviceLogResponse::from).collect()))
}

/// Append a log line to a device, regardless of its status
#[utoipa::path(
    post,
    path = "/api/devices/{device_id}/logs",
    params(
        ("device_id" = Uuid, Path, description = "Device id"),
    ),
    request_body = CreateDeviceLogRequest,
    responses(
        (status = 201, description = "Log line created", body = DeviceLogResponse),
        (status = 400, description = "Empty message"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Device exists but is owned by another user"),
        (status = 404, description = "Device not found"),
    ),
    tag = "logs"
)]
pub async fn create_device_log(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<Uuid>,
    Json(req): Json<CreateDeviceLogRequest>,
) -> AppResult<(StatusCode, Json<DeviceLogResponse>)> {
    if req.message.is_empty() {
        return Err(AppError::BadRequest(
            "Message must not be empty".to_string(),
        ));
    }

    let txn = state.db.begin().await?;

    let device =
        access::find_owned_device(&txn, &user, device_id, state.ownership_policy()).await?;

    let now = state.clock.now();

    let row = device_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        device_id: Set(device.id),
        message: Set(req.message),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut active: devices::ActiveModel = device.into();
    active.last_seen = Set(now.into());
    active.update(&txn).await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(DeviceLogResponse::from(row))))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::access;
use crate::auth::CurrentUser;
use crate::common::AppState;
use crate::entity::devices::{self, DeviceStatus};
use crate::error::AppResult;

use super::types::{CreateDeviceRequest, DeviceResponse, UpdateDeviceRequest};

/// List devices owned by the caller
#[utoipa::path(
    get,
    path = "/api/devices",
    responses(
        (status = 200, description = "Devices retrieved successfully", body = Vec<DeviceResponse>),
        (status = 401, description = "Missing or invalid credentials"),
    ),
    tag = "devices"
)]
pub async fn list_devices(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<DeviceResponse>>> {
    let devices_list = devices::Entity::find()
        .filter(devices::Column::OwnerId.eq(user.id))
        .order_by_asc(devices::Column::CreatedAt)
        .order_by_asc(devices::Column::Id)
        .all(&*state.db)
        .await?;

    Ok(Json(
        devices_list.into_iter().map(DeviceResponse::from).collect(),
    ))
}

/// Register a new device owned by the caller
#[utoipa::path(
    post,
    path = "/api/devices",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created", body = DeviceResponse),
        (status = 401, description = "Missing or invalid credentials"),
    ),
    tag = "devices"
)]
pub async fn create_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateDeviceRequest>,
) -> AppResult<(StatusCode, Json<DeviceResponse>)> {
    let now = state.clock.now();

    let device = devices::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.id),
        name: Set(req.name),
        device_type: Set(req.device_type),
        status: Set(req.status.unwrap_or(DeviceStatus::Online)),
        last_seen: Set(now.into()),
        serial_number: Set(req.serial_number),
        created_at: Set(Some(now.into())),
    }
    .insert(&*state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(DeviceResponse::from(device))))
}

/// Get a single device by id
#[utoipa::path(
    get,
    path = "/api/devices/{device_id}",
    params(
        ("device_id" = Uuid, Path, description = "Device id"),
    ),
    responses(
        (status = 200, description = "Device retrieved successfully", body = DeviceResponse),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Device exists but is owned by another user"),
        (status = 404, description = "Device not found"),
    ),
    tag = "devices"
)]
pub async fn get_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<Uuid>,
) -> AppResult<Json<DeviceResponse>> {
    let device =
        access::find_owned_device(&*state.db, &user, device_id, state.ownership_policy()).await?;

    Ok(Json(DeviceResponse::from(device)))
}

/// Update a device. Owner is preserved; `last_seen` is refreshed.
#[utoipa::path(
    put,
    path = "/api/devices/{device_id}",
    params(
        ("device_id" = Uuid, Path, description = "Device id"),
    ),
    request_body = UpdateDeviceRequest,
    responses(
        (status = 200, description = "Device updated", body = DeviceResponse),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Device exists but is owned by another user"),
        (status = 404, description = "Device not found"),
    ),
    tag = "devices"
)]
pub async fn update_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<Uuid>,
    Json(req): Json<UpdateDeviceRequest>,
) -> AppResult<Json<DeviceResponse>> {
    let device =
        access::find_owned_device(&*state.db, &user, device_id, state.ownership_policy()).await?;

    let current_status = device.status.clone();
    let mut active: devices::ActiveModel = device.into();
    active.name = Set(req.name);
    active.device_type = Set(req.device_type);
    active.status = Set(req.status.unwrap_or(current_status));
    active.serial_number = Set(req.serial_number);
    active.last_seen = Set(state.clock.now().into());

    let updated = active.update(&*state.db).await?;

    Ok(Json(DeviceResponse::from(updated)))
}

/// Delete a device. Its logs, telemetry, and group memberships go with it.
#[utoipa::path(
    delete,
    path = "/api/devices/{device_id}",
    params(
        ("device_id" = Uuid, Path, description = "Device id"),
    ),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Device exists but is owned by another user"),
        (status = 404, description = "Device not found"),
    ),
    tag = "devices"
)]
pub async fn delete_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(device_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let device =
        access::find_owned_device(&*state.db, &user, device_id, state.ownership_policy()).await?;

    devices::Entity::delete_by_id(device.id)
        .exec(&*state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

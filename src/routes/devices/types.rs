use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::devices::{self, DeviceStatus, DeviceType};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceResponse {
    pub id: Uuid,
    pub name: String,
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    pub last_seen: DateTime<Utc>,
    pub serial_number: String,
    pub owner: Uuid,
}

impl From<devices::Model> for DeviceResponse {
    fn from(d: devices::Model) -> Self {
        Self {
            id: d.id,
            name: d.name,
            device_type: d.device_type,
            status: d.status,
            last_seen: d.last_seen.with_timezone(&Utc),
            serial_number: d.serial_number,
            owner: d.owner_id,
        }
    }
}

/// Owner is never client-settable; it is stamped from the authenticated user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub device_type: DeviceType,
    /// Defaults to `online` when omitted.
    pub status: Option<DeviceStatus>,
    pub serial_number: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeviceRequest {
    pub name: String,
    pub device_type: DeviceType,
    /// Keeps the current status when omitted.
    pub status: Option<DeviceStatus>,
    pub serial_number: String,
}

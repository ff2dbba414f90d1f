use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::device_groups;

/// Collapse a requested member list into the set it denotes. Duplicate ids
/// are a no-op, so re-adding an existing member never grows the group.
#[must_use]
pub fn normalize_member_ids(ids: Vec<Uuid>) -> BTreeSet<Uuid> {
    ids.into_iter().collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Uuid,
    /// Member device ids. A set: no duplicates, no ordering guarantees
    /// beyond ascending id.
    pub devices: Vec<Uuid>,
}

impl GroupResponse {
    pub fn from_model(group: device_groups::Model, mut devices: Vec<Uuid>) -> Self {
        devices.sort_unstable();
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            created_at: group.created_at.with_timezone(&Utc),
            updated_at: group.updated_at.with_timezone(&Utc),
            owner: group.owner_id,
            devices,
        }
    }
}

/// `device_ids` replaces the whole membership set; duplicates collapse.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub device_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub device_ids: Vec<Uuid>,
}

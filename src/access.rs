//! Ownership-scoped access control.
//!
//! Every object-level operation resolves the target record first, then checks
//! that the acting user owns it. The ordering is fixed: authentication is
//! enforced by the `CurrentUser` extractor before any of this runs, a missing
//! id is `NotFound`, and an existing but foreign-owned id is `Forbidden`
//! (or `NotFound` under [`OwnershipPolicy::HideExistence`]).

use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::entity::{device_groups, devices, users};
use crate::error::{AppError, AppResult};

/// How to answer a request for an existing record owned by someone else.
///
/// `RevealExistence` returns 403, which tells the caller the id is taken.
/// `HideExistence` returns 404, indistinguishable from an absent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipPolicy {
    RevealExistence,
    HideExistence,
}

/// Decide whether `actor_id` may operate on a record owned by `owner_id`.
pub fn check_ownership(
    owner_id: Uuid,
    actor_id: Uuid,
    policy: OwnershipPolicy,
) -> AppResult<()> {
    if owner_id == actor_id {
        return Ok(());
    }
    match policy {
        OwnershipPolicy::RevealExistence => Err(AppError::Forbidden(
            "You do not own this resource".to_string(),
        )),
        OwnershipPolicy::HideExistence => {
            Err(AppError::NotFound("Resource not found".to_string()))
        }
    }
}

/// Resolve a device by id and verify the actor owns it.
///
/// Telemetry and log records are owned transitively through their device, so
/// this is also the gate for those collections.
pub async fn find_owned_device<C: ConnectionTrait>(
    conn: &C,
    actor: &users::Model,
    device_id: Uuid,
    policy: OwnershipPolicy,
) -> AppResult<devices::Model> {
    let device = devices::Entity::find_by_id(device_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Device '{device_id}' not found")))?;

    check_ownership(device.owner_id, actor.id, policy)?;
    Ok(device)
}

/// Resolve a device group by id and verify the actor owns the group itself.
/// Membership is a non-owning reference set, so member devices are not
/// checked here.
pub async fn find_owned_group<C: ConnectionTrait>(
    conn: &C,
    actor: &users::Model,
    group_id: Uuid,
    policy: OwnershipPolicy,
) -> AppResult<device_groups::Model> {
    let group = device_groups::Entity::find_by_id(group_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group '{group_id}' not found")))?;

    check_ownership(group.owner_id, actor.id, policy)?;
    Ok(group)
}

use std::collections::{BTreeSet, HashMap};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::access;
use crate::auth::CurrentUser;
use crate::common::AppState;
use crate::entity::{device_group_devices, device_groups, devices};
use crate::error::{AppError, AppResult};

use super::types::{normalize_member_ids, CreateGroupRequest, GroupResponse, UpdateGroupRequest};

/// Verify every id refers to an existing device. Members may belong to other
/// users; only the group itself is ownership-gated.
async fn validate_member_ids<C: ConnectionTrait>(
    conn: &C,
    member_ids: &BTreeSet<Uuid>,
) -> AppResult<()> {
    if member_ids.is_empty() {
        return Ok(());
    }

    let found: BTreeSet<Uuid> = devices::Entity::find()
        .filter(devices::Column::Id.is_in(member_ids.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|d| d.id)
        .collect();

    if let Some(missing) = member_ids.difference(&found).next() {
        return Err(AppError::BadRequest(format!(
            "Unknown device id '{missing}' in device_ids"
        )));
    }
    Ok(())
}

/// Replace a group's membership with the given set.
async fn replace_members<C: ConnectionTrait>(
    conn: &C,
    group_id: Uuid,
    member_ids: &BTreeSet<Uuid>,
) -> AppResult<()> {
    device_group_devices::Entity::delete_many()
        .filter(device_group_devices::Column::GroupId.eq(group_id))
        .exec(conn)
        .await?;

    if member_ids.is_empty() {
        return Ok(());
    }

    let rows = member_ids.iter().map(|device_id| device_group_devices::ActiveModel {
        group_id: Set(group_id),
        device_id: Set(*device_id),
    });

    // The composite primary key already deduplicates; the on_conflict guard
    // keeps concurrent replacements from erroring out.
    device_group_devices::Entity::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                device_group_devices::Column::GroupId,
                device_group_devices::Column::DeviceId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

async fn member_ids_for<C: ConnectionTrait>(conn: &C, group_id: Uuid) -> AppResult<Vec<Uuid>> {
    Ok(device_group_devices::Entity::find()
        .filter(device_group_devices::Column::GroupId.eq(group_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| m.device_id)
        .collect())
}

/// List device groups owned by the caller
#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "Groups retrieved successfully", body = Vec<GroupResponse>),
        (status = 401, description = "Missing or invalid credentials"),
    ),
    tag = "groups"
)]
pub async fn list_groups(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<GroupResponse>>> {
    let groups = device_groups::Entity::find()
        .filter(device_groups::Column::OwnerId.eq(user.id))
        .order_by_asc(device_groups::Column::CreatedAt)
        .order_by_asc(device_groups::Column::Id)
        .all(&*state.db)
        .await?;

    let group_ids: Vec<Uuid> = groups.iter().map(|g| g.id).collect();

    let mut members: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    if !group_ids.is_empty() {
        let memberships = device_group_devices::Entity::find()
            .filter(device_group_devices::Column::GroupId.is_in(group_ids))
            .all(&*state.db)
            .await?;
        for m in memberships {
            members.entry(m.group_id).or_default().push(m.device_id);
        }
    }

    let response = groups
        .into_iter()
        .map(|g| {
            let devices = members.remove(&g.id).unwrap_or_default();
            GroupResponse::from_model(g, devices)
        })
        .collect();

    Ok(Json(response))
}

/// Create a device group owned by the caller
#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Unknown device id in device_ids"),
        (status = 401, description = "Missing or invalid credentials"),
    ),
    tag = "groups"
)]
pub async fn create_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<GroupResponse>)> {
    let member_ids = normalize_member_ids(req.device_ids);

    let txn = state.db.begin().await?;

    validate_member_ids(&txn, &member_ids).await?;

    let now = state.clock.now();
    let group = device_groups::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.id),
        name: Set(req.name),
        description: Set(req.description),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    replace_members(&txn, group.id, &member_ids).await?;

    txn.commit().await?;

    let devices = member_ids.into_iter().collect();
    Ok((
        StatusCode::CREATED,
        Json(GroupResponse::from_model(group, devices)),
    ))
}

/// Get a single device group by id
#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = Uuid, Path, description = "Group id"),
    ),
    responses(
        (status = 200, description = "Group retrieved successfully", body = GroupResponse),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Group exists but is owned by another user"),
        (status = 404, description = "Group not found"),
    ),
    tag = "groups"
)]
pub async fn get_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<GroupResponse>> {
    let group =
        access::find_owned_group(&*state.db, &user, group_id, state.ownership_policy()).await?;

    let devices = member_ids_for(&*state.db, group.id).await?;

    Ok(Json(GroupResponse::from_model(group, devices)))
}

/// Update a group and replace its membership set
#[utoipa::path(
    put,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = Uuid, Path, description = "Group id"),
    ),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = GroupResponse),
        (status = 400, description = "Unknown device id in device_ids"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Group exists but is owned by another user"),
        (status = 404, description = "Group not found"),
    ),
    tag = "groups"
)]
pub async fn update_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(group_id): Path<Uuid>,
    Json(req): Json<UpdateGroupRequest>,
) -> AppResult<Json<GroupResponse>> {
    let member_ids = normalize_member_ids(req.device_ids);

    let txn = state.db.begin().await?;

    let group = access::find_owned_group(&txn, &user, group_id, state.ownership_policy()).await?;

    validate_member_ids(&txn, &member_ids).await?;

    let mut active: device_groups::ActiveModel = group.into();
    active.name = Set(req.name);
    active.description = Set(req.description);
    active.updated_at = Set(state.clock.now().into());
    let updated = active.update(&txn).await?;

    replace_members(&txn, updated.id, &member_ids).await?;

    txn.commit().await?;

    let devices = member_ids.into_iter().collect();
    Ok(Json(GroupResponse::from_model(updated, devices)))
}

/// Delete a group. Memberships go with it; member devices are untouched.
#[utoipa::path(
    delete,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = Uuid, Path, description = "Group id"),
    ),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Group exists but is owned by another user"),
        (status = 404, description = "Group not found"),
    ),
    tag = "groups"
)]
pub async fn delete_group(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(group_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let group =
        access::find_owned_group(&*state.db, &user, group_id, state.ownership_policy()).await?;

    device_groups::Entity::delete_by_id(group.id)
        .exec(&*state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

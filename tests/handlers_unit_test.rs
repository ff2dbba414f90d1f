//! Handler tests against a mocked database connection.
//!
//! These pin the behaviors that only show up at the handler level: owner
//! scoping of list queries, the 403/404 split on foreign records, the
//! ingestion gate refusing to write, the `last_seen` touch on accepted
//! writes, and device deletion leaning on the schema for child cleanup.
//!
//! Run with: cargo test --test handlers_unit_test

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use uuid::Uuid;

use device_hub::auth::CurrentUser;
use device_hub::common::{AppState, FixedClock};
use device_hub::config::{Config, Deployment};
use device_hub::entity::devices::{DeviceStatus, DeviceType};
use device_hub::entity::{device_data, device_logs, devices, users};
use device_hub::error::AppError;
use device_hub::routes::device_data::{
    create_device_data, list_device_data, CreateDeviceDataRequest, DeviceDataQuery,
};
use device_hub::routes::device_logs::{create_device_log, CreateDeviceLogRequest};
use device_hub::routes::devices::{delete_device, get_device, list_devices};

fn instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()
}

fn test_config(hide_existence: bool) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 3000,
        ownership_hide_existence: hide_existence,
        disable_rate_limiting: true,
        rate_limit_metadata_per_second: 1,
        rate_limit_metadata_burst: 60,
        rate_limit_data_per_second: 10,
        rate_limit_data_burst: 60,
        deployment: Deployment::Local,
    }
}

/// `DatabaseConnection` is not `Clone` when the `mock` feature is on, but the
/// mock variant just wraps an `Arc`, so a handle sharing the same mock (and
/// transaction log) can be rebuilt by cloning that `Arc`.
fn clone_mock(db: &DatabaseConnection) -> DatabaseConnection {
    match db {
        DatabaseConnection::MockDatabaseConnection(mock) => {
            DatabaseConnection::MockDatabaseConnection(Arc::clone(mock))
        }
        _ => panic!("not a mock connection"),
    }
}

fn test_state(db: DatabaseConnection, hide_existence: bool) -> AppState {
    AppState::with_clock(
        db,
        test_config(hide_existence),
        Arc::new(FixedClock(instant())),
    )
}

fn user_fixture(name: &str) -> users::Model {
    users::Model {
        id: Uuid::new_v4(),
        email: format!("{name}@example.com"),
        name: name.to_string(),
        password_hash: "argon2-hash".to_string(),
        api_token: format!("token-{name}"),
        is_active: true,
        is_staff: false,
        is_superuser: false,
        created_at: Some(instant().fixed_offset()),
    }
}

fn device_fixture(owner: &users::Model, status: DeviceStatus) -> devices::Model {
    devices::Model {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        name: "greenhouse-7".to_string(),
        device_type: DeviceType::Sensor,
        status,
        last_seen: instant().fixed_offset(),
        serial_number: "SN-0042".to_string(),
        created_at: Some(instant().fixed_offset()),
    }
}

#[tokio::test]
async fn listing_devices_is_scoped_to_the_caller() {
    let owner = user_fixture("alice");
    let device = device_fixture(&owner, DeviceStatus::Online);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![device.clone()]])
        .into_connection();
    let state = test_state(clone_mock(&db), false);

    let Json(listed) = list_devices(State(state), CurrentUser(owner.clone()))
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, device.id);
    assert_eq!(listed[0].owner, owner.id);

    // The scoping has to live in the query, not in post-filtering.
    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("owner_id"), "no owner filter in: {log}");
    assert!(log.contains(&owner.id.to_string()), "wrong owner in: {log}");
}

#[tokio::test]
async fn foreign_device_is_forbidden_by_default() {
    let owner = user_fixture("alice");
    let intruder = user_fixture("mallory");
    let device = device_fixture(&owner, DeviceStatus::Online);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![device.clone()]])
        .into_connection();
    let state = test_state(db, false);

    let err = get_device(State(state), CurrentUser(intruder), Path(device.id))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
}

#[tokio::test]
async fn foreign_device_looks_absent_when_existence_is_hidden() {
    let owner = user_fixture("alice");
    let intruder = user_fixture("mallory");
    let device = device_fixture(&owner, DeviceStatus::Online);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![device.clone()]])
        .into_connection();
    let state = test_state(db, true);

    let err = list_device_data(
        State(state),
        CurrentUser(intruder),
        Path(device.id),
        Query(DeviceDataQuery {
            start: None,
            end: None,
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn offline_device_refuses_telemetry_without_writing() {
    let owner = user_fixture("alice");
    let device = device_fixture(&owner, DeviceStatus::Offline);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![device.clone()]])
        .into_connection();
    let state = test_state(clone_mock(&db), false);

    let err = create_device_data(
        State(state),
        CurrentUser(owner),
        Path(device.id),
        Json(CreateDeviceDataRequest {
            data: "ABC123".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    // The refusal happens inside the transaction, before any row is written.
    let log = format!("{:?}", db.into_transaction_log());
    assert!(!log.contains("INSERT"), "unexpected write in: {log}");
    assert!(!log.contains("UPDATE"), "unexpected write in: {log}");
}

#[tokio::test]
async fn accepted_telemetry_touches_last_seen() {
    let owner = user_fixture("alice");
    let device = device_fixture(&owner, DeviceStatus::Online);

    let stored = device_data::Model {
        id: Uuid::new_v4(),
        device_id: device.id,
        data: "ABC123".to_string(),
        created_at: instant().fixed_offset(),
    };
    let touched = devices::Model {
        last_seen: instant().fixed_offset(),
        ..device.clone()
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![device.clone()]])
        .append_query_results([vec![stored.clone()]])
        .append_query_results([vec![touched]])
        .into_connection();
    let state = test_state(clone_mock(&db), false);

    let (status, Json(body)) = create_device_data(
        State(state),
        CurrentUser(owner),
        Path(device.id),
        Json(CreateDeviceDataRequest {
            data: "ABC123".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.device, device.id);
    assert_eq!(body.data, "ABC123");
    assert_eq!(body.created_at, instant());

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("INSERT"), "telemetry row not written: {log}");
    assert!(log.contains("last_seen"), "last_seen not refreshed: {log}");
}

#[tokio::test]
async fn log_lines_are_accepted_from_offline_devices() {
    let owner = user_fixture("alice");
    let device = device_fixture(&owner, DeviceStatus::Offline);

    let stored = device_logs::Model {
        id: Uuid::new_v4(),
        device_id: device.id,
        message: "link lost, retrying".to_string(),
        created_at: instant().fixed_offset(),
    };
    let touched = device.clone();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![device.clone()]])
        .append_query_results([vec![stored]])
        .append_query_results([vec![touched]])
        .into_connection();
    let state = test_state(clone_mock(&db), false);

    let (status, Json(body)) = create_device_log(
        State(state),
        CurrentUser(owner),
        Path(device.id),
        Json(CreateDeviceLogRequest {
            message: "link lost, retrying".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.message, "link lost, retrying");

    // Logs still count as the device reporting in.
    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("last_seen"), "last_seen not refreshed: {log}");
}

#[tokio::test]
async fn deleting_a_device_issues_one_delete_and_trusts_the_schema() {
    let owner = user_fixture("alice");
    let device = device_fixture(&owner, DeviceStatus::Online);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![device.clone()]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let state = test_state(clone_mock(&db), false);

    let status = delete_device(State(state), CurrentUser(owner), Path(device.id))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);

    // Child rows (logs, telemetry, memberships) are removed by the cascading
    // foreign keys, so exactly one statement targets the devices table.
    let log = format!("{:?}", db.into_transaction_log());
    assert_eq!(
        log.matches("DELETE FROM").count(),
        1,
        "expected a single delete in: {log}"
    );
    assert!(log.contains(r#"DELETE FROM "devices""#), "in: {log}");
}

//! Unit tests for the telemetry range-window and ingestion-gate logic.
//!
//! Run with: cargo test --test telemetry_unit_test

use chrono::{DateTime, TimeZone, Utc};
use device_hub::common::{Clock, FixedClock};
use device_hub::entity::devices::DeviceStatus;
use device_hub::routes::device_data::{
    ingestion_allowed, resolve_window, FAR_FUTURE, FAR_PAST,
};

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[test]
fn no_bounds_means_no_filter() {
    assert_eq!(resolve_window(None, None), Ok(None));
}

#[test]
fn both_bounds_are_used_as_given() {
    let window = resolve_window(
        Some("2025-04-01T09:00:00Z"),
        Some("2025-04-01T17:00:00Z"),
    )
    .unwrap()
    .unwrap();

    assert_eq!(window.0, utc("2025-04-01T09:00:00Z"));
    assert_eq!(window.1, utc("2025-04-01T17:00:00Z"));
}

#[test]
fn missing_end_defaults_to_far_future_sentinel() {
    let window = resolve_window(Some("2025-04-01T09:00:00Z"), None)
        .unwrap()
        .unwrap();

    assert_eq!(window.0, utc("2025-04-01T09:00:00Z"));
    assert_eq!(window.1, utc(FAR_FUTURE));
    assert_eq!(window.1, utc("2050-12-31T00:00:00Z"));
}

#[test]
fn missing_start_defaults_to_far_past_sentinel() {
    let window = resolve_window(None, Some("2025-04-01T17:00:00Z"))
        .unwrap()
        .unwrap();

    assert_eq!(window.0, utc(FAR_PAST));
    assert_eq!(window.0, utc("1980-01-01T00:00:00Z"));
    assert_eq!(window.1, utc("2025-04-01T17:00:00Z"));
}

#[test]
fn malformed_bounds_are_rejected() {
    assert!(resolve_window(Some("yesterday"), None).is_err());
    assert!(resolve_window(None, Some("2025-13-99T99:00:00Z")).is_err());
    assert!(resolve_window(Some("2025-04-01T09:00:00Z"), Some("")).is_err());
}

#[test]
fn offset_timestamps_normalize_to_utc() {
    let window = resolve_window(Some("2025-04-01T11:00:00+02:00"), None)
        .unwrap()
        .unwrap();
    assert_eq!(window.0, utc("2025-04-01T09:00:00Z"));
}

#[test]
fn window_is_inclusive_on_both_ends() {
    // Rows at 08:00, 12:00, 18:00; window 09:00..17:00 keeps only 12:00.
    let rows = [
        utc("2025-04-01T08:00:00Z"),
        utc("2025-04-01T12:00:00Z"),
        utc("2025-04-01T18:00:00Z"),
    ];
    let (start, end) = resolve_window(
        Some("2025-04-01T09:00:00Z"),
        Some("2025-04-01T17:00:00Z"),
    )
    .unwrap()
    .unwrap();

    let kept: Vec<_> = rows.iter().filter(|t| **t >= start && **t <= end).collect();
    assert_eq!(kept, vec![&rows[1]]);

    // Boundary rows are kept, not dropped.
    let (start, end) = resolve_window(
        Some("2025-04-01T08:00:00Z"),
        Some("2025-04-01T18:00:00Z"),
    )
    .unwrap()
    .unwrap();
    let kept = rows.iter().filter(|t| **t >= start && **t <= end).count();
    assert_eq!(kept, 3);
}

#[test]
fn only_online_devices_accept_telemetry() {
    assert!(ingestion_allowed(&DeviceStatus::Online));
    assert!(!ingestion_allowed(&DeviceStatus::Offline));
    assert!(!ingestion_allowed(&DeviceStatus::Error));
}

#[test]
fn fixed_clock_returns_the_injected_instant() {
    let instant = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
    let clock = FixedClock(instant);

    assert_eq!(clock.now(), instant);
    assert_eq!(clock.now(), clock.now());
}

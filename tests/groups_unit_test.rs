//! Unit tests for group membership set semantics.
//!
//! Run with: cargo test --test groups_unit_test

use device_hub::routes::groups::normalize_member_ids;
use uuid::Uuid;

#[test]
fn duplicate_ids_collapse_to_one_membership() {
    let d = Uuid::new_v4();
    let set = normalize_member_ids(vec![d, d, d]);
    assert_eq!(set.len(), 1);
    assert!(set.contains(&d));
}

#[test]
fn distinct_ids_are_all_kept() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();
    let set = normalize_member_ids(vec![a, b, c, b, a]);
    assert_eq!(set.len(), 3);
}

#[test]
fn empty_request_means_empty_set() {
    assert!(normalize_member_ids(vec![]).is_empty());
}

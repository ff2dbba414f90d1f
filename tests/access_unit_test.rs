//! Unit tests for the ownership decision logic.
//!
//! Run with: cargo test --test access_unit_test

use device_hub::access::{check_ownership, OwnershipPolicy};
use device_hub::error::AppError;
use uuid::Uuid;

#[test]
fn owner_passes_under_both_policies() {
    let actor = Uuid::new_v4();
    assert!(check_ownership(actor, actor, OwnershipPolicy::RevealExistence).is_ok());
    assert!(check_ownership(actor, actor, OwnershipPolicy::HideExistence).is_ok());
}

#[test]
fn foreign_owner_is_forbidden_by_default() {
    let owner = Uuid::new_v4();
    let actor = Uuid::new_v4();

    let err = check_ownership(owner, actor, OwnershipPolicy::RevealExistence).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[test]
fn foreign_owner_becomes_not_found_when_hiding_existence() {
    let owner = Uuid::new_v4();
    let actor = Uuid::new_v4();

    let err = check_ownership(owner, actor, OwnershipPolicy::HideExistence).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn decision_depends_only_on_ids_not_on_call_order() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    // a's records are closed to b and vice versa, symmetrically
    assert!(check_ownership(a, b, OwnershipPolicy::RevealExistence).is_err());
    assert!(check_ownership(b, a, OwnershipPolicy::RevealExistence).is_err());
}

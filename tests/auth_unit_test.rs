//! Unit tests for bearer-token extraction from the Authorization header.
//!
//! Run with: cargo test --test auth_unit_test

use axum::http::{header, HeaderMap, HeaderValue};
use device_hub::auth::bearer_token;

fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
}

#[test]
fn scheme_is_matched_case_insensitively() {
    // RFC 7235: auth scheme tokens are case-insensitive.
    for raw in ["Bearer tok123", "bearer tok123", "BEARER tok123", "BeArEr tok123"] {
        assert_eq!(bearer_token(&headers_with(raw)), Some("tok123"), "{raw}");
    }
}

#[test]
fn other_schemes_are_rejected() {
    assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwdw==")), None);
    assert_eq!(bearer_token(&headers_with("Digest tok123")), None);
}

#[test]
fn missing_header_yields_nothing() {
    assert_eq!(bearer_token(&HeaderMap::new()), None);
}

#[test]
fn scheme_without_separator_is_rejected() {
    assert_eq!(bearer_token(&headers_with("Bearertok123")), None);
}

#[test]
fn empty_or_blank_token_is_rejected() {
    assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    assert_eq!(bearer_token(&headers_with("Bearer    ")), None);
}

#[test]
fn surrounding_whitespace_is_trimmed_from_the_token() {
    assert_eq!(bearer_token(&headers_with("Bearer  tok123 ")), Some("tok123"));
}

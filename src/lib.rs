//! Device Hub - device management and telemetry API with per-owner access control
//!
//! This library exposes the core modules for testing and reuse.

pub mod access;
pub mod auth;
pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod routes;

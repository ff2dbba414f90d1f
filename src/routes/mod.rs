pub mod device_data;
pub mod device_logs;
pub mod devices;
pub mod groups;
pub mod health;
mod rate_limit;

use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::ClientIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::entity::devices::{DeviceStatus, DeviceType};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        devices::list_devices,
        devices::create_device,
        devices::get_device,
        devices::update_device,
        devices::delete_device,
        device_data::list_device_data,
        device_data::create_device_data,
        device_logs::list_device_logs,
        device_logs::create_device_log,
        groups::list_groups,
        groups::create_group,
        groups::get_group,
        groups::update_group,
        groups::delete_group,
    ),
    components(
        schemas(
            DeviceType,
            DeviceStatus,
            devices::DeviceResponse,
            devices::CreateDeviceRequest,
            devices::UpdateDeviceRequest,
            device_data::DeviceDataResponse,
            device_data::CreateDeviceDataRequest,
            device_logs::DeviceLogResponse,
            device_logs::CreateDeviceLogRequest,
            groups::GroupResponse,
            groups::CreateGroupRequest,
            groups::UpdateGroupRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "devices", description = "Device registry, scoped to the owning user"),
        (name = "telemetry", description = "Append-only device telemetry with range queries"),
        (name = "logs", description = "Append-only device log lines"),
        (name = "groups", description = "Device groupings with set-semantics membership"),
    ),
    info(
        title = "Device Hub API",
        description = "Device management and telemetry API with per-owner access control",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            metadata_rate = %format!("{}/s burst {}", config.rate_limit_metadata_per_second, config.rate_limit_metadata_burst),
            data_rate = %format!("{}/s burst {}", config.rate_limit_data_per_second, config.rate_limit_data_burst),
            "Rate limiting configured"
        );
    }

    // Base routes without rate limiting
    let metadata_routes_base = Router::new()
        .route(
            "/devices",
            get(devices::list_devices).post(devices::create_device),
        )
        .route(
            "/devices/{device_id}",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route(
            "/groups/{group_id}",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        );

    let data_routes_base = Router::new()
        .route(
            "/devices/{device_id}/data",
            get(device_data::list_device_data).post(device_data::create_device_data),
        )
        .route(
            "/devices/{device_id}/logs",
            get(device_logs::list_device_logs).post(device_logs::create_device_log),
        );

    // Combine API routes, conditionally applying rate limiting
    let api_routes = if config.disable_rate_limiting {
        Router::new()
            .merge(metadata_routes_base)
            .merge(data_routes_base)
    } else {
        let metadata_limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_metadata_per_second)
            .burst_size(config.rate_limit_metadata_burst)
            .finish()
            .expect("Failed to create metadata rate limiter");

        let data_limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_data_per_second)
            .burst_size(config.rate_limit_data_burst)
            .finish()
            .expect("Failed to create data rate limiter");

        Router::new()
            .merge(metadata_routes_base.layer(GovernorLayer {
                config: Arc::new(metadata_limiter),
            }))
            .merge(data_routes_base.layer(GovernorLayer {
                config: Arc::new(data_limiter),
            }))
    }
    .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB body limit

    // Health check routes (NO rate limiting)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Combine all routes
    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{AppConfig, SitemapConfig};
use crate::logic::discovery::{ActivityCollectionBuilder, DiscoveryError};
use crate::logic::sitemap::{self, SitemapTasks};
use crate::model::{
    MonitoringStatus, OrderedCollection, OrderedCollectionPage, SitemapRunState,
    SitemapUpdateRequest, VersionInfo, KEY_INDEX, STATUS_ERROR,
};
use crate::store::traits::IndexStore;
use crate::urls::{ApiUrls, OPENAPI};

/// Shared state for all handlers, wired once at startup.
#[derive(Debug)]
pub struct AppContext<S> {
    pub index: S,
    pub urls: ApiUrls,
    pub activities_per_page: u64,
    pub sitemap: SitemapConfig,
    pub sitemap_tasks: SitemapTasks,
    /// Last version report received from the indexer, if any.
    pub indexer_version: RwLock<Option<Value>>,
}

pub type AppState<S> = Arc<AppContext<S>>;

impl<S> AppContext<S> {
    pub fn new(index: S, config: &AppConfig) -> Self {
        Self {
            index,
            urls: config.api_urls(),
            activities_per_page: config.api.activities_per_page,
            sitemap: config.sitemap.clone(),
            sitemap_tasks: SitemapTasks::new(),
            indexer_version: RwLock::new(None),
        }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    /// Where the machine-readable API description lives.
    pub specification: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

pub async fn get_api_info<S: IndexStore>(State(state): State<AppState<S>>) -> Json<ApiInfo> {
    Json(ApiInfo {
        name: "viewer REST API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        specification: state.urls.path([OPENAPI]).build(),
    })
}

pub async fn get_activities<S: IndexStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<OrderedCollection>, (StatusCode, Json<ErrorResponse>)> {
    let builder =
        ActivityCollectionBuilder::new(&state.index, &state.urls, state.activities_per_page);
    match builder.build_collection().await {
        Ok(collection) => Ok(Json(collection)),
        Err(e) => Err(map_discovery_error(e)),
    }
}

pub async fn get_activities_page<S: IndexStore>(
    State(state): State<AppState<S>>,
    Path(page_no): Path<i64>,
) -> Result<Json<OrderedCollectionPage>, (StatusCode, Json<ErrorResponse>)> {
    let builder =
        ActivityCollectionBuilder::new(&state.index, &state.urls, state.activities_per_page);
    match builder.build_page(page_no).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => Err(map_discovery_error(e)),
    }
}

fn map_discovery_error(error: DiscoveryError) -> (StatusCode, Json<ErrorResponse>) {
    match error {
        DiscoveryError::PageOutOfBounds { .. } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(&error.to_string())),
        ),
        DiscoveryError::Index(e) => {
            log::error!("Activity lookup against the index failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(&e.to_string())),
            )
        }
    }
}

pub async fn get_monitoring<S: IndexStore>(
    State(state): State<AppState<S>>,
) -> Json<MonitoringStatus> {
    let mut status = MonitoringStatus::new();
    if !state.index.check_availability().await {
        status
            .monitoring
            .insert(KEY_INDEX.to_string(), STATUS_ERROR.to_string());
    }
    status.versions.insert("core".to_string(), VersionInfo::core());
    if let Some(report) = state.indexer_version.read().await.as_ref() {
        status
            .versions
            .insert("indexer".to_string(), VersionInfo::from_report(report));
    }
    Json(status)
}

pub async fn set_indexer_version<S: IndexStore>(
    State(state): State<AppState<S>>,
    RequestJson(report): RequestJson<Value>,
) -> Json<VersionInfo> {
    let info = VersionInfo::from_report(&report);
    log::info!("Indexer reported version {} ({})", info.version, info.hash);
    *state.indexer_version.write().await = Some(report);
    Json(info)
}

pub async fn get_indexer_version<S: IndexStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    match state.indexer_version.read().await.as_ref() {
        Some(report) => Ok(Json(report.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("No indexer version reported yet")),
        )),
    }
}

/// Kick off sitemap generation in the background. Responds immediately with
/// the new run state, or 409 while an earlier run is still in progress. The
/// body is optional; without one the configured output path is used.
pub async fn update_sitemap<S: IndexStore + 'static>(
    State(state): State<AppState<S>>,
    body: Option<RequestJson<SitemapUpdateRequest>>,
) -> Result<(StatusCode, Json<SitemapRunState>), (StatusCode, Json<ErrorResponse>)> {
    let request = body.map(|RequestJson(r)| r).unwrap_or_default();
    let Some((run_id, run_state)) = state.sitemap_tasks.try_begin().await else {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("Sitemap generation already in progress")),
        ));
    };

    let output_path = request
        .output_path
        .unwrap_or_else(|| state.sitemap.output_path.clone());
    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        let result = sitemap::generate(
            &task_state.index,
            &task_state.urls,
            &task_state.sitemap,
            std::path::Path::new(&output_path),
        )
        .await;
        match result {
            Ok(files) => task_state.sitemap_tasks.finish_ok(run_id, files).await,
            Err(e) => {
                log::error!("Sitemap generation failed: {:#}", e);
                task_state
                    .sitemap_tasks
                    .finish_err(run_id, e.to_string())
                    .await;
            }
        }
    });

    Ok((StatusCode::ACCEPTED, Json(run_state)))
}

pub async fn get_sitemap_status<S: IndexStore>(
    State(state): State<AppState<S>>,
) -> Json<SitemapRunState> {
    Json(state.sitemap_tasks.status().await)
}

pub async fn get_openapi_spec<S: IndexStore>(_state: State<AppState<S>>) -> Json<Value> {
    let spec = serde_json::json!({
        "openapi": "3.0.3",
        "info": {
            "title": "viewer REST API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Change discovery, monitoring and sitemap generation for a digitized-object viewer."
        },
        "servers": [
            {
                "url": "/",
                "description": "Current server"
            }
        ],
        "paths": {
            "/": {
                "get": {
                    "summary": "API name, version and specification link",
                    "responses": {"200": {"description": "API description"}}
                }
            },
            "/health": {
                "get": {
                    "summary": "Liveness probe",
                    "responses": {"200": {"description": "Service is up"}}
                }
            },
            "/activities": {
                "get": {
                    "summary": "Activity Streams collection of all record changes",
                    "responses": {
                        "200": {"description": "OrderedCollection with first/last page links"},
                        "500": {"description": "Index unavailable"}
                    }
                }
            },
            "/activities/{pageNo}": {
                "get": {
                    "summary": "One page of record change activities",
                    "parameters": [
                        {"name": "pageNo", "in": "path", "required": true, "schema": {"type": "integer"}}
                    ],
                    "responses": {
                        "200": {"description": "OrderedCollectionPage in stable order"},
                        "404": {"description": "Page number out of range"},
                        "500": {"description": "Index unavailable"}
                    }
                }
            },
            "/monitoring": {
                "get": {
                    "summary": "Subsystem health and component versions",
                    "responses": {"200": {"description": "Monitoring status"}}
                }
            },
            "/indexer/version": {
                "put": {
                    "summary": "Accept a version report from the indexer",
                    "responses": {"200": {"description": "Parsed version info"}}
                },
                "get": {
                    "summary": "Last version report received from the indexer",
                    "responses": {
                        "200": {"description": "Stored version report"},
                        "404": {"description": "No report received yet"}
                    }
                }
            },
            "/sitemap/update": {
                "post": {
                    "summary": "Start sitemap generation in the background",
                    "responses": {
                        "202": {"description": "Generation started"},
                        "409": {"description": "A generation run is already in progress"}
                    }
                }
            },
            "/sitemap/status": {
                "get": {
                    "summary": "State of the latest sitemap generation run",
                    "responses": {"200": {"description": "Run state"}}
                }
            },
            "/sitemap/files": {
                "get": {
                    "summary": "Serve generated sitemap files",
                    "responses": {"200": {"description": "Sitemap XML"}}
                }
            }
        }
    });
    Json(spec)
}

use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use filekit_core::catalog::{tool_count, Category, ToolDescriptor};
use filekit_infra::SystemStats;
use serde::Serialize;
use std::sync::Arc;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub system: SystemStats,
    pub tools_available: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tools: usize,
    pub categories: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct CategoryListing {
    pub id: Category,
    pub name: &'static str,
    pub icon: &'static str,
    pub tools: Vec<&'static ToolDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub total: usize,
    pub categories: Vec<CategoryListing>,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: VERSION,
        system: state.system.snapshot_async().await,
        tools_available: tool_count(),
    })
}

/// `GET /api/status`
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "operational",
        version: VERSION,
        tools: tool_count(),
        categories: Category::ALL.iter().map(|c| c.as_str()).collect(),
    })
}

/// `GET /api/tools`
pub async fn catalog() -> Json<CatalogResponse> {
    let categories = Category::ALL
        .into_iter()
        .map(|category| CategoryListing {
            id: category,
            name: category.display_name(),
            icon: category.icon(),
            tools: category.tools().collect(),
        })
        .collect();

    Json(CatalogResponse {
        total: tool_count(),
        categories,
    })
}

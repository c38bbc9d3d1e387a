//! SalesOps API Library
//!
//! Read-only analytics engine for a multi-godown distribution business:
//! transforms raw order and field-visit records into role-scoped performance
//! reports (per-executive, per-godown, per-customer) with unit-normalized
//! quantity totals and pagination-safe summary statistics.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod openapi;
pub mod reports;
pub mod services;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config,
            services,
        }
    }
}

/// Versioned API routes; the caller supplies shared state and outer layers.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api/v1/reports", handlers::reports::report_routes())
        .merge(handlers::health::health_routes())
}

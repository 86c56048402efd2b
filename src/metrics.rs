//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{Counter, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("yatter_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "yatter_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Database Metrics
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("yatter_db_queries_total", "Total number of database queries"),
        &["operation", "table"]
    ).expect("metric can be created");
    pub static ref DB_QUERY_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "yatter_db_query_duration_seconds",
            "Database query duration in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["operation", "table"]
    ).expect("metric can be created");

    // Storage Metrics
    pub static ref MEDIA_UPLOADS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("yatter_media_uploads_total", "Total number of media uploads"),
        &["media_type"]
    ).expect("metric can be created");
    pub static ref MEDIA_BYTES_UPLOADED: Counter = Counter::new(
        "yatter_media_bytes_uploaded_total",
        "Total bytes of media uploaded"
    ).expect("metric can be created");

    // Domain Metrics
    pub static ref ACCOUNTS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "yatter_accounts_created_total",
        "Total number of accounts created"
    ).expect("metric can be created");
    pub static ref STATUSES_CREATED_TOTAL: IntCounter = IntCounter::new(
        "yatter_statuses_created_total",
        "Total number of statuses created"
    ).expect("metric can be created");
    pub static ref RELATION_CHANGES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("yatter_relation_changes_total", "Follow edges created or removed"),
        &["change"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("yatter_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: std::sync::Once = std::sync::Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(register_metrics);
}

fn register_metrics() {
    REGISTRY
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("HTTP_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("HTTP_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(DB_QUERIES_TOTAL.clone()))
        .expect("DB_QUERIES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
        .expect("DB_QUERY_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(MEDIA_UPLOADS_TOTAL.clone()))
        .expect("MEDIA_UPLOADS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(MEDIA_BYTES_UPLOADED.clone()))
        .expect("MEDIA_BYTES_UPLOADED can be registered");
    REGISTRY
        .register(Box::new(ACCOUNTS_CREATED_TOTAL.clone()))
        .expect("ACCOUNTS_CREATED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(STATUSES_CREATED_TOTAL.clone()))
        .expect("STATUSES_CREATED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(RELATION_CHANGES_TOTAL.clone()))
        .expect("RELATION_CHANGES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

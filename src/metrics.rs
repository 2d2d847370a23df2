//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Real-time Metrics
    pub static ref CONNECTIONS_ACTIVE: IntGauge = IntGauge::new(
        "glimpse_connections_active",
        "Current number of open real-time connections"
    ).expect("metric can be created");
    pub static ref ONLINE_USERS: IntGauge = IntGauge::new(
        "glimpse_online_users",
        "Current number of users with a registered connection"
    ).expect("metric can be created");
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("glimpse_notifications_total", "Total number of notification fan-out attempts"),
        &["kind", "outcome"]
    ).expect("metric can be created");

    // Application Metrics
    pub static ref ACTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("glimpse_actions_total", "Total number of completed user actions"),
        &["action"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("glimpse_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(CONNECTIONS_ACTIVE.clone()))
        .expect("CONNECTIONS_ACTIVE can be registered");
    REGISTRY
        .register(Box::new(ONLINE_USERS.clone()))
        .expect("ONLINE_USERS can be registered");
    REGISTRY
        .register(Box::new(NOTIFICATIONS_TOTAL.clone()))
        .expect("NOTIFICATIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ACTIONS_TOTAL.clone()))
        .expect("ACTIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

/// Count one completed action
pub fn record_action(action: &str) {
    ACTIONS_TOTAL.with_label_values(&[action]).inc();
}

/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::{
    opts, register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

pub static INCOMING_API: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "http_request_duration_seconds",
        "Incoming API requests",
        &["method", "handler", "status_code", "code", "version"]
    )
    .expect("Failed to register incoming api metrics")
});

pub static CALL_EXTERNAL_API: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "external_api_call_duration_seconds",
        "Outbound API calls",
        &["method", "host", "service", "status"]
    )
    .expect("Failed to register external api call metrics")
});

pub static PUSH_DELIVERY: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("push_delivery", "Push notification delivery outcomes"),
        &["status"]
    )
    .expect("Failed to register push delivery metrics")
});

pub static TOKENS_INVALIDATED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "tokens_invalidated",
        "Device tokens invalidated after gateway rejection"
    ))
    .expect("Failed to register token invalidation metrics")
});

pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create prometheus metrics");

    prometheus
        .registry
        .register(Box::new(INCOMING_API.to_owned()))
        .expect("Failed to register incoming api metrics");

    prometheus
        .registry
        .register(Box::new(CALL_EXTERNAL_API.to_owned()))
        .expect("Failed to register external api call metrics");

    prometheus
        .registry
        .register(Box::new(PUSH_DELIVERY.to_owned()))
        .expect("Failed to register push delivery metrics");

    prometheus
        .registry
        .register(Box::new(TOKENS_INVALIDATED.to_owned()))
        .expect("Failed to register token invalidation metrics");

    prometheus
}

#[macro_export]
macro_rules! incoming_api {
    ($method:expr, $endpoint:expr, $status:expr, $code:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        let version = std::env::var("DEPLOYMENT_VERSION").unwrap_or("DEV".to_string());
        INCOMING_API
            .with_label_values(&[$method, $endpoint, $status, $code, version.as_str()])
            .observe(duration);
    };
}

#[macro_export]
macro_rules! call_external_api {
    ($method:expr, $host:expr, $path:expr, $status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        CALL_EXTERNAL_API
            .with_label_values(&[$method, $host, $path, $status])
            .observe(duration);
    };
}

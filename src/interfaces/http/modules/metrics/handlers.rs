//! `GET /metrics`

use axum::{extract::State, http::header, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// Text exposition of every counter and histogram the service records
/// (HTTP traffic, bookings, conflicts, notifications, webhook rejections).
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.handle.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[tokio::test]
    async fn renders_text_exposition() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = MetricsState {
            handle: recorder.handle(),
        };

        let resp = prometheus_metrics(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            PROMETHEUS_CONTENT_TYPE
        );
    }
}

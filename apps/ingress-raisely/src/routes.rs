use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post},
};
use serde_json::{Value, json};
use streamhook_core::{Bridge, InboundEnvelope, Outcome, Rejection};
use streamhook_telemetry::record_event;
use tracing::{Instrument, error, info, warn};

use crate::cors::{CorsPolicy, apply_cors};
use crate::reqid::{RequestId, with_request_id};
use crate::respond::{WebhookReply, failure_reason, failure_status};

const UNKNOWN_EVENT: &str = "unknown";

#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<Bridge>,
}

/// Webhook on `/`, liveness on `/healthz`. Every response carries CORS
/// headers and an `x-request-id`; `OPTIONS` is answered by the CORS layer.
pub fn build_router(bridge: Arc<Bridge>, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/", post(handle_webhook))
        .route("/healthz", get(healthz))
        .with_state(AppState { bridge })
        .layer(middleware::from_fn_with_state(Arc::new(cors), apply_cors))
        .layer(middleware::from_fn(with_request_id))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle_webhook(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> Response {
    let envelope = InboundEnvelope::from_slice(&body);
    let event_type = envelope.event_type().unwrap_or(UNKNOWN_EVENT).to_string();
    let span = tracing::info_span!(
        "webhook",
        request_id = %request_id,
        event_type = %event_type
    );

    async move {
        match state.bridge.handle(envelope).await {
            Ok(Outcome::Forwarded { event, response }) => {
                record_event(event.as_str(), "forwarded");
                info!("event forwarded to streamlabs");
                WebhookReply::forwarded(response).into_response_with(StatusCode::OK)
            }
            // 200 so the webhook sender does not retry.
            Ok(Outcome::Rejected(rejection)) => {
                record_event(metric_event(&rejection, &event_type), rejection.reason());
                warn!(reason = rejection.reason(), "webhook rejected: {rejection}");
                WebhookReply::failed(rejection.to_string()).into_response_with(StatusCode::OK)
            }
            Err(err) => {
                let status = failure_status(&err);
                record_event(&event_type, failure_reason(&err));
                error!(error = %err, status = status.as_u16(), "webhook failed");
                WebhookReply::failed(err.to_string()).into_response_with(status)
            }
        }
    }
    .instrument(span)
    .await
}

// Unauthenticated bodies must not pick metric label values.
fn metric_event<'a>(rejection: &Rejection, event_type: &'a str) -> &'a str {
    match rejection {
        Rejection::InvalidAuth => UNKNOWN_EVENT,
        _ => event_type,
    }
}

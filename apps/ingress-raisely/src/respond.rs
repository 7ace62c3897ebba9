use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use streamhook_core::{BridgeError, UpstreamError};

/// Body returned to the webhook sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl WebhookReply {
    pub fn forwarded(response: Value) -> Self {
        Self {
            success: true,
            message: None,
            response: Some(response),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            response: None,
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Undecodable records are the sender's fault; upstream failures get 502 so
/// the sender retries.
pub fn failure_status(err: &BridgeError) -> StatusCode {
    match err {
        BridgeError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        BridgeError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

pub fn failure_reason(err: &BridgeError) -> &'static str {
    match err {
        BridgeError::InvalidPayload(_) => "invalid_payload",
        BridgeError::Upstream(UpstreamError::Transport { .. }) => "upstream_transport",
        BridgeError::Upstream(UpstreamError::Status { .. }) => "upstream_status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forwarded_reply_shape() {
        let reply = WebhookReply::forwarded(json!("ok"));
        assert_eq!(
            serde_json::to_value(reply).unwrap(),
            json!({ "success": true, "response": "ok" })
        );
    }

    #[test]
    fn failed_reply_shape() {
        let reply = WebhookReply::failed("invalid auth");
        assert_eq!(
            serde_json::to_value(reply).unwrap(),
            json!({ "success": false, "message": "invalid auth" })
        );
    }

    #[test]
    fn failure_statuses() {
        assert_eq!(
            failure_status(&BridgeError::InvalidPayload("x".into())),
            StatusCode::BAD_REQUEST
        );
        let upstream = BridgeError::Upstream(UpstreamError::Status {
            path: "/api/v1.0/alerts",
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        });
        assert_eq!(failure_status(&upstream), StatusCode::BAD_GATEWAY);
        assert_eq!(failure_reason(&upstream), "upstream_status");
    }
}

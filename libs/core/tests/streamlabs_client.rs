use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, State};
use axum::http::{StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use streamhook_core::client::{ALERTS_PATH, DONATIONS_PATH, USER_POINTS_PATH};
use streamhook_core::{
    AlertForm, AlertService, DonationForm, PointsForm, StreamlabsClient, UpstreamError,
};
use tokio::net::TcpListener;

type Seen = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

async fn record(
    State(seen): State<Seen>,
    uri: Uri,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().unwrap().push((uri.path().to_string(), form));
    Json(json!({ "success": true }))
}

async fn reject() -> (StatusCode, &'static str) {
    (StatusCode::UNAUTHORIZED, "bad token")
}

// Local stand-in for the Streamlabs API. Returns None when binding to
// localhost is not permitted in the current environment.
async fn mock_streamlabs() -> Option<(SocketAddr, Seen, tokio::task::JoinHandle<()>)> {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("skipping streamlabs client test: {err}");
            return None;
        }
    };
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route(DONATIONS_PATH, post(record))
        .route(ALERTS_PATH, post(record))
        .route(USER_POINTS_PATH, post(reject))
        .with_state(seen.clone());
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app.into_make_service()).await {
            eprintln!("mock streamlabs error: {err}");
        }
    });
    Some((addr, seen, server))
}

#[tokio::test]
async fn donation_is_posted_form_encoded() {
    let Some((addr, seen, server)) = mock_streamlabs().await else {
        return;
    };
    let client = StreamlabsClient::new(Some(format!("http://{addr}")), None).unwrap();

    let response = client
        .create_donation(&DonationForm {
            name: "Alexandria".into(),
            message: Some("Good luck!".into()),
            identifier: Some("user-uuid".into()),
            amount: 20.5,
            currency: Some("AUD".into()),
            access_token: "test-token".into(),
        })
        .await
        .unwrap();
    assert_eq!(response, json!({ "success": true }));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    let (path, form) = &seen[0];
    assert_eq!(path, DONATIONS_PATH);
    assert_eq!(form["name"], "Alexandria");
    assert_eq!(form["message"], "Good luck!");
    assert_eq!(form["identifier"], "user-uuid");
    assert_eq!(form["amount"], "20.5");
    assert_eq!(form["currency"], "AUD");
    assert_eq!(form["access_token"], "test-token");

    server.abort();
}

#[tokio::test]
async fn alert_omits_absent_user_message() {
    let Some((addr, seen, server)) = mock_streamlabs().await else {
        return;
    };
    let client = StreamlabsClient::new(Some(format!("http://{addr}/")), None).unwrap();

    client
        .create_alert(&AlertForm {
            access_token: "test-token".into(),
            kind: "follow".into(),
            message: "Alexandria is taking action".into(),
            user_message: None,
        })
        .await
        .unwrap();

    let seen = seen.lock().unwrap().clone();
    let (path, form) = &seen[0];
    assert_eq!(path, ALERTS_PATH);
    assert_eq!(form["type"], "follow");
    assert_eq!(form["message"], "Alexandria is taking action");
    assert!(!form.contains_key("user_message"));

    server.abort();
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let Some((addr, _seen, server)) = mock_streamlabs().await else {
        return;
    };
    let client = StreamlabsClient::new(Some(format!("http://{addr}")), None).unwrap();

    let err = client
        .edit_user_points(&PointsForm {
            access_token: "test-token".into(),
            username: "Alexandria".into(),
            points: 1,
        })
        .await
        .unwrap_err();

    match err {
        UpstreamError::Status { path, status, body } => {
            assert_eq!(path, USER_POINTS_PATH);
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "bad token");
        }
        other => panic!("unexpected error {other:?}"),
    }

    server.abort();
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    // Port 9 (discard) on localhost is not served by anything here.
    let client = StreamlabsClient::new(Some("http://127.0.0.1:9".into()), None).unwrap();
    let err = client
        .create_alert(&AlertForm {
            access_token: "t".into(),
            kind: "follow".into(),
            message: "m".into(),
            user_message: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Transport { path: ALERTS_PATH, .. }));
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::mapping::{AlertForm, DonationForm, PointsForm};

pub const DEFAULT_STREAMLABS_BASE: &str = "https://streamlabs.com";

pub const DONATIONS_PATH: &str = "/api/v1.0/donations";
pub const ALERTS_PATH: &str = "/api/v1.0/alerts";
pub const USER_POINTS_PATH: &str = "/api/v1.0/points/user_point_edit";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("transport error calling {path}: {source}")]
    Transport {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned {status}: {body}")]
    Status {
        path: &'static str,
        status: StatusCode,
        body: String,
    },
}

/// Calls on the livestream alert service. Each call resolves to the
/// upstream response body.
#[async_trait]
pub trait AlertService: Send + Sync {
    async fn create_donation(&self, form: &DonationForm) -> Result<Value, UpstreamError>;
    async fn create_alert(&self, form: &AlertForm) -> Result<Value, UpstreamError>;
    async fn edit_user_points(&self, form: &PointsForm) -> Result<Value, UpstreamError>;
}

#[derive(Clone)]
pub struct StreamlabsClient {
    http: reqwest::Client,
    base_url: String,
}

impl StreamlabsClient {
    pub fn new(base_url: Option<String>, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("streamhook/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(builder.build()?, base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_STREAMLABS_BASE.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn post_form<T: Serialize + Sync>(
        &self,
        path: &'static str,
        form: &T,
    ) -> Result<Value, UpstreamError> {
        let transport = |source: reqwest::Error| UpstreamError::Transport { path, source };
        let res = self
            .http
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .map_err(transport)?;
        let status = res.status();
        let body = res.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(UpstreamError::Status { path, status, body });
        }
        tracing::debug!(path, status = status.as_u16(), "streamlabs call succeeded");
        Ok(body_value(body))
    }
}

#[async_trait]
impl AlertService for StreamlabsClient {
    async fn create_donation(&self, form: &DonationForm) -> Result<Value, UpstreamError> {
        self.post_form(DONATIONS_PATH, form).await
    }

    async fn create_alert(&self, form: &AlertForm) -> Result<Value, UpstreamError> {
        self.post_form(ALERTS_PATH, form).await
    }

    async fn edit_user_points(&self, form: &PointsForm) -> Result<Value, UpstreamError> {
        self.post_form(USER_POINTS_PATH, form).await
    }
}

/// JSON bodies are passed through as JSON, anything else as a string.
fn body_value(body: String) -> Value {
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => Value::String(body),
    }
}

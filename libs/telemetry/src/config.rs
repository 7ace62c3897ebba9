use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryProtocol {
    Grpc,
    HttpProtobuf,
}

/// Logging and trace export settings.
///
/// | variable | effect |
/// |---|---|
/// | `LOG_FORMAT` | `text`/`pretty`/`plain` for human output, JSON otherwise |
/// | `ENABLE_OTEL` | `1`/`true`/`yes`/`on` turns on OTLP span export |
/// | `OTEL_EXPORTER_OTLP_ENDPOINT` | collector endpoint, export stays off when empty |
/// | `OTEL_EXPORTER_OTLP_PROTOCOL` | `http`/`http/protobuf`, gRPC otherwise |
/// | `OTEL_SERVICE_NAME` | overrides the service name |
/// | `DEPLOYMENT_ENV` | `deployment.environment` resource attribute |
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub json_logs: bool,
    pub otlp_endpoint: String,
    pub protocol: TelemetryProtocol,
    pub otlp_enabled: bool,
}

impl TelemetryConfig {
    pub fn from_env(service_name: &str, service_version: &str) -> Self {
        Self::from_lookup(service_name, service_version, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(service_name: &str, service_version: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or_default();
        let protocol = match lookup("OTEL_EXPORTER_OTLP_PROTOCOL")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            Some("http" | "http/protobuf") => TelemetryProtocol::HttpProtobuf,
            _ => TelemetryProtocol::Grpc,
        };
        let json_logs = lookup("LOG_FORMAT")
            .map(|v| !matches!(v.to_lowercase().as_str(), "text" | "pretty" | "plain"))
            .unwrap_or(true);
        let otlp_enabled = lookup("ENABLE_OTEL")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or_else(|| service_name.into()),
            service_version: service_version.into(),
            environment: lookup("DEPLOYMENT_ENV").unwrap_or_else(|| "dev".into()),
            json_logs,
            otlp_endpoint,
            protocol,
            otlp_enabled,
        }
    }

    pub fn exporter_enabled(&self) -> bool {
        self.otlp_enabled && !self.otlp_endpoint.trim().is_empty()
    }
}

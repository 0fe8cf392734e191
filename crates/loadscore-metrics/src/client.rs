use crate::error::{MetricsError, Result};
use crate::query;
use crate::response::{extract_value, parse_f64, parse_i64};
use crate::source::MetricsSource;
use crate::types::MetricKind;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Connection settings for the Prometheus telemetry backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Base URL of the Prometheus HTTP API, without the `/api/v1` suffix
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Divisor applied to the inbound byte rate to bring it near the 0-1 range
    pub network_divisor: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9090".to_string(),
            request_timeout_secs: 5,
            network_divisor: 10_000_000.0,
        }
    }
}

impl TelemetryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject settings under which every reading would be lost or skewed
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(MetricsError::invalid_config(
                "request_timeout_secs must be positive",
                "A zero timeout fails every query; the default is 5 seconds",
            ));
        }

        if !self.network_divisor.is_finite() || self.network_divisor <= 0.0 {
            return Err(MetricsError::invalid_config(
                format!("network_divisor must be a positive finite number, got {}", self.network_divisor),
                "The default of 10000000 scales 10 MB/s of inbound traffic to 1.0",
            ));
        }

        Ok(())
    }
}

/// Prometheus instant-query client implementing [`MetricsSource`]
#[derive(Clone)]
pub struct PrometheusClient {
    base_url: String,
    network_divisor: f64,
    client: Client,
}

impl PrometheusClient {
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                MetricsError::transport(&config.endpoint, format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            network_divisor: config.network_divisor,
            client,
        })
    }

    /// GET /api/v1/query?query={expr} and return the first sample value
    async fn instant_query(&self, expr: &str) -> Result<String> {
        let url = format!("{}/api/v1/query", self.base_url);
        debug!("GET {} query={}", url, expr);

        let resp = self
            .client
            .get(&url)
            .query(&[("query", expr)])
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("request timed out: {}", e)
                } else {
                    e.to_string()
                };
                MetricsError::transport(&url, message)
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(MetricsError::backend(status.as_u16(), body));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| MetricsError::transport(&url, format!("Failed to read body: {}", e)))?;

        extract_value(&body)
    }

    async fn query_f64(&self, kind: MetricKind, node_name: &str) -> Result<f64> {
        let value = self.instant_query(&query::expression(kind, node_name)).await?;
        parse_f64(&value)
    }

    async fn query_i64(&self, kind: MetricKind, node_name: &str) -> Result<i64> {
        let value = self.instant_query(&query::expression(kind, node_name)).await?;
        parse_i64(&value)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MetricsSource for PrometheusClient {
    async fn cpu_utilization(&self, node_name: &str) -> Result<f64> {
        self.query_f64(MetricKind::CpuUtilization, node_name).await
    }

    async fn memory_utilization(&self, node_name: &str) -> Result<f64> {
        self.query_f64(MetricKind::MemoryUtilization, node_name).await
    }

    async fn network_utilization(&self, node_name: &str) -> Result<f64> {
        let rate = self
            .query_f64(MetricKind::NetworkUtilization, node_name)
            .await?;
        Ok(rate / self.network_divisor)
    }

    async fn allocatable_cpu_cores(&self, node_name: &str) -> Result<i64> {
        self.query_i64(MetricKind::AllocatableCpuCores, node_name)
            .await
    }

    async fn allocatable_memory_bytes(&self, node_name: &str) -> Result<i64> {
        self.query_i64(MetricKind::AllocatableMemoryBytes, node_name)
            .await
    }
}

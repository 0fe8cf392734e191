use crate::error::{MetricsError, Result};
use crate::source::MetricsSource;
use crate::types::{MetricKind, NodeMetrics};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory metrics source for tests and dry runs
///
/// Holds fixed readings per node. Individual reads can be made to fail so
/// callers can exercise the zero-substitution path without a backend.
/// Unknown nodes answer every read with a shape error, the same way an
/// empty Prometheus result would.
#[derive(Clone, Default)]
pub struct StaticMetricsSource {
    nodes: Arc<RwLock<HashMap<String, NodeMetrics>>>,
    failures: Arc<RwLock<HashMap<(String, MetricKind), MetricsError>>>,
}

impl StaticMetricsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_node(&self, node_name: &str, metrics: NodeMetrics) {
        self.nodes
            .write()
            .await
            .insert(node_name.to_string(), metrics);
    }

    /// Make every read of `kind` for `node_name` fail with the given error
    pub async fn fail_metric(&self, node_name: &str, kind: MetricKind, error: MetricsError) {
        self.failures
            .write()
            .await
            .insert((node_name.to_string(), kind), error);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    async fn read(&self, node_name: &str, kind: MetricKind) -> Result<NodeMetrics> {
        if let Some(error) = self
            .failures
            .read()
            .await
            .get(&(node_name.to_string(), kind))
        {
            debug!("Static: injected failure for {} on {}", kind, node_name);
            return Err(error.clone());
        }

        self.nodes
            .read()
            .await
            .get(node_name)
            .copied()
            .ok_or_else(|| MetricsError::shape(format!("no series for node {}", node_name)))
    }
}

#[async_trait]
impl MetricsSource for StaticMetricsSource {
    async fn cpu_utilization(&self, node_name: &str) -> Result<f64> {
        Ok(self
            .read(node_name, MetricKind::CpuUtilization)
            .await?
            .cpu_utilization)
    }

    async fn memory_utilization(&self, node_name: &str) -> Result<f64> {
        Ok(self
            .read(node_name, MetricKind::MemoryUtilization)
            .await?
            .memory_utilization)
    }

    async fn network_utilization(&self, node_name: &str) -> Result<f64> {
        Ok(self
            .read(node_name, MetricKind::NetworkUtilization)
            .await?
            .network_utilization)
    }

    async fn allocatable_cpu_cores(&self, node_name: &str) -> Result<i64> {
        Ok(self
            .read(node_name, MetricKind::AllocatableCpuCores)
            .await?
            .allocatable_cpu_cores)
    }

    async fn allocatable_memory_bytes(&self, node_name: &str) -> Result<i64> {
        Ok(self
            .read(node_name, MetricKind::AllocatableMemoryBytes)
            .await?
            .allocatable_memory_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_injected_failure_keeps_variant() {
        let source = StaticMetricsSource::new();
        source.set_node("node1", NodeMetrics::default()).await;
        source
            .fail_metric(
                "node1",
                MetricKind::CpuUtilization,
                MetricsError::transport("http://x", "refused"),
            )
            .await;

        let err = source.cpu_utilization("node1").await.unwrap_err();
        assert!(matches!(err, MetricsError::Transport { .. }));
        assert!(source.memory_utilization("node1").await.is_ok());

        source.clear_failures().await;
        assert!(source.cpu_utilization("node1").await.is_ok());
    }
}

use crate::error::Result;
use crate::types::{MetricFailure, MetricKind, MetricsSnapshot, NodeMetrics};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Trait for per-node telemetry sources
///
/// Every method is an independent lookup for a single node. Implementations
/// must not cache between calls; the scorer expects fresh readings.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fraction of CPU capacity in use over the last minute
    async fn cpu_utilization(&self, node_name: &str) -> Result<f64>;

    /// Memory in use divided by allocatable memory
    async fn memory_utilization(&self, node_name: &str) -> Result<f64>;

    /// Inbound byte rate excluding loopback, already divided by the network divisor
    async fn network_utilization(&self, node_name: &str) -> Result<f64>;

    /// Allocatable CPU cores
    async fn allocatable_cpu_cores(&self, node_name: &str) -> Result<i64>;

    /// Allocatable memory in bytes
    async fn allocatable_memory_bytes(&self, node_name: &str) -> Result<i64>;
}

/// Fetch all five readings for a node, substituting zero for any that fail
///
/// Queries run one after another. A failed read is logged and recorded in
/// `MetricsSnapshot::failures`; there is no retry and nothing is cached.
/// A telemetry outage therefore biases scores toward whichever nodes still
/// report, since the missing terms read as zero.
pub async fn collect(source: &dyn MetricsSource, node_name: &str) -> MetricsSnapshot {
    let mut failures = Vec::new();

    let cpu_utilization = or_zero(
        source.cpu_utilization(node_name).await,
        MetricKind::CpuUtilization,
        node_name,
        &mut failures,
    );
    let memory_utilization = or_zero(
        source.memory_utilization(node_name).await,
        MetricKind::MemoryUtilization,
        node_name,
        &mut failures,
    );
    let network_utilization = or_zero(
        source.network_utilization(node_name).await,
        MetricKind::NetworkUtilization,
        node_name,
        &mut failures,
    );
    let allocatable_cpu_cores = or_zero(
        source.allocatable_cpu_cores(node_name).await,
        MetricKind::AllocatableCpuCores,
        node_name,
        &mut failures,
    );
    let allocatable_memory_bytes = or_zero(
        source.allocatable_memory_bytes(node_name).await,
        MetricKind::AllocatableMemoryBytes,
        node_name,
        &mut failures,
    );

    let metrics = NodeMetrics {
        cpu_utilization,
        memory_utilization,
        network_utilization,
        allocatable_cpu_cores,
        allocatable_memory_bytes,
    };

    debug!("Collected metrics for node {}: {:?}", node_name, metrics);

    MetricsSnapshot {
        node_name: node_name.to_string(),
        metrics,
        failures,
    }
}

fn or_zero<T: Default>(
    result: Result<T>,
    kind: MetricKind,
    node_name: &str,
    failures: &mut Vec<MetricFailure>,
) -> T {
    match result {
        Ok(v) => v,
        Err(error) => {
            warn!("Failed to read {} for node {}: {}", kind, node_name, error);
            failures.push(MetricFailure { kind, error });
            T::default()
        }
    }
}

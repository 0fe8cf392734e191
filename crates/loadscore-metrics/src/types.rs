use crate::error::MetricsError;
use serde::Serialize;
use std::fmt;

/// The five per-node readings the scorer consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    CpuUtilization,
    MemoryUtilization,
    NetworkUtilization,
    AllocatableCpuCores,
    AllocatableMemoryBytes,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::CpuUtilization,
        MetricKind::MemoryUtilization,
        MetricKind::NetworkUtilization,
        MetricKind::AllocatableCpuCores,
        MetricKind::AllocatableMemoryBytes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::CpuUtilization => "cpuUtilization",
            MetricKind::MemoryUtilization => "memoryUtilization",
            MetricKind::NetworkUtilization => "networkUtilization",
            MetricKind::AllocatableCpuCores => "allocatableCpuCores",
            MetricKind::AllocatableMemoryBytes => "allocatableMemoryBytes",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time utilization and capacity readings for one node
///
/// Fetched fresh for every scoring call. There is no identity beyond the
/// node name that was used to query it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    /// Fraction of CPU capacity in use (0-1, may exceed 1 on odd input)
    pub cpu_utilization: f64,
    /// Memory in use divided by allocatable memory
    pub memory_utilization: f64,
    /// Inbound byte rate (excluding loopback) divided by the network divisor
    pub network_utilization: f64,
    pub allocatable_cpu_cores: i64,
    pub allocatable_memory_bytes: i64,
}

impl NodeMetrics {
    /// Value of one reading as a float, for uniform display
    pub fn reading(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::CpuUtilization => self.cpu_utilization,
            MetricKind::MemoryUtilization => self.memory_utilization,
            MetricKind::NetworkUtilization => self.network_utilization,
            MetricKind::AllocatableCpuCores => self.allocatable_cpu_cores as f64,
            MetricKind::AllocatableMemoryBytes => self.allocatable_memory_bytes as f64,
        }
    }
}

/// A reading that could not be fetched and was replaced by zero
#[derive(Debug)]
pub struct MetricFailure {
    pub kind: MetricKind,
    pub error: MetricsError,
}

/// Readings for one node together with the reads that failed
#[derive(Debug, Default)]
pub struct MetricsSnapshot {
    pub node_name: String,
    pub metrics: NodeMetrics,
    pub failures: Vec<MetricFailure>,
}

impl MetricsSnapshot {
    /// Metric kinds that were substituted by zero
    pub fn missing(&self) -> Vec<MetricKind> {
        self.failures.iter().map(|f| f.kind).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

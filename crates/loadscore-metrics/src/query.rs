//! PromQL expressions for the per-node readings

use crate::types::MetricKind;

/// Recording rule for one-minute CPU utilisation, keyed by `instance`
pub const CPU_UTILISATION_RATE1M: &str = "instance:node_cpu_utilisation:rate1m";
/// Recording rule for memory utilisation ratio, keyed by `instance`
pub const MEMORY_UTILISATION_RATIO: &str = "instance:node_memory_utilisation:ratio";
/// Recording rule for inbound bytes per second excluding loopback, keyed by `instance`
pub const NETWORK_RECEIVE_RATE1M: &str = "instance:node_network_receive_bytes_excluding_lo:rate1m";
/// kube-state-metrics allocatable CPU, keyed by `node`
pub const ALLOCATABLE_CPU_CORES: &str = "kube_node_status_allocatable_cpu_cores";
/// kube-state-metrics allocatable memory, keyed by `node`
pub const ALLOCATABLE_MEMORY_BYTES: &str = "kube_node_status_allocatable_memory_bytes";

/// Build the instant-query expression for a metric of the given node
///
/// The node name is embedded as an exact-match label filter. The
/// node-exporter recording rules label by `instance`, kube-state-metrics
/// by `node`.
pub fn expression(kind: MetricKind, node_name: &str) -> String {
    let (series, label) = match kind {
        MetricKind::CpuUtilization => (CPU_UTILISATION_RATE1M, "instance"),
        MetricKind::MemoryUtilization => (MEMORY_UTILISATION_RATIO, "instance"),
        MetricKind::NetworkUtilization => (NETWORK_RECEIVE_RATE1M, "instance"),
        MetricKind::AllocatableCpuCores => (ALLOCATABLE_CPU_CORES, "node"),
        MetricKind::AllocatableMemoryBytes => (ALLOCATABLE_MEMORY_BYTES, "node"),
    };

    format!("{}{{{}=\"{}\"}}", series, label, escape_label_value(node_name))
}

/// Escape a string for use inside a double-quoted PromQL label matcher
fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_keyed_expressions() {
        assert_eq!(
            expression(MetricKind::CpuUtilization, "worker-1"),
            "instance:node_cpu_utilisation:rate1m{instance=\"worker-1\"}"
        );
        assert_eq!(
            expression(MetricKind::MemoryUtilization, "worker-1"),
            "instance:node_memory_utilisation:ratio{instance=\"worker-1\"}"
        );
        assert_eq!(
            expression(MetricKind::NetworkUtilization, "worker-1"),
            "instance:node_network_receive_bytes_excluding_lo:rate1m{instance=\"worker-1\"}"
        );
    }

    #[test]
    fn test_node_keyed_expressions() {
        assert_eq!(
            expression(MetricKind::AllocatableCpuCores, "worker-1"),
            "kube_node_status_allocatable_cpu_cores{node=\"worker-1\"}"
        );
        assert_eq!(
            expression(MetricKind::AllocatableMemoryBytes, "worker-1"),
            "kube_node_status_allocatable_memory_bytes{node=\"worker-1\"}"
        );
    }

    #[test]
    fn test_label_value_is_escaped() {
        assert_eq!(
            expression(MetricKind::AllocatableCpuCores, "a\"b\\c"),
            "kube_node_status_allocatable_cpu_cores{node=\"a\\\"b\\\\c\"}"
        );
    }
}

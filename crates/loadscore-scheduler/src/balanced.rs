use crate::config::BalanceWeights;
use crate::framework::{PluginArgs, Registry, ScorePlugin};
use crate::score::{normalize, raw_score};
use crate::types::{pod_key, NodeScore, ScoreResult};
use crate::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use loadscore_metrics::{collect, MetricsSource};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name the plugin is registered under
pub const PLUGIN_NAME: &str = "LoadBalancedAllocation";

/// Score nodes by live utilization relative to node size
///
/// Each `score` call fetches fresh readings for the node. Readings that
/// cannot be fetched count as zero and the call still succeeds; the
/// returned `ScoreResult` lists what was missing.
pub struct LoadBalancedAllocation {
    metrics: Arc<dyn MetricsSource>,
    weights: BalanceWeights,
}

impl LoadBalancedAllocation {
    pub fn new(metrics: Arc<dyn MetricsSource>, weights: BalanceWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { metrics, weights })
    }

    /// Factory for [`Registry::register`]
    pub fn factory(args: &PluginArgs) -> Result<Box<dyn ScorePlugin>> {
        Ok(Box::new(Self::new(args.metrics.clone(), args.weights.clone())?))
    }
}

/// Register the plugin under [`PLUGIN_NAME`]
pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register(PLUGIN_NAME, LoadBalancedAllocation::factory)
}

#[async_trait]
impl ScorePlugin for LoadBalancedAllocation {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn score(&self, pod: &Pod, node_name: &str) -> Result<ScoreResult> {
        let snapshot = collect(self.metrics.as_ref(), node_name).await;
        let score = raw_score(&snapshot.metrics, &self.weights);

        if snapshot.is_complete() {
            debug!(
                "Node {} raw score for pod {}: {}",
                node_name,
                pod_key(pod),
                score
            );
            return Ok(ScoreResult::complete(score));
        }

        let missing = snapshot.missing();
        warn!(
            "Node {} scored {} for pod {} with missing readings {:?}",
            node_name,
            score,
            pod_key(pod),
            missing
        );
        Ok(ScoreResult::degraded(score, missing))
    }

    fn normalize_scores(&self, pod: &Pod, scores: &mut [NodeScore]) -> Result<()> {
        normalize(scores);

        let pod_name = pod_key(pod);
        for node_score in scores.iter() {
            info!(
                "Node: {}, Score: {} in Plugin: {} when scheduling Pod: {}",
                node_score.name, node_score.score, PLUGIN_NAME, pod_name
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Framework;
    use crate::SchedulerError;
    use loadscore_metrics::{MetricKind, MetricsError, NodeMetrics, StaticMetricsSource};

    fn test_pod() -> Pod {
        let mut pod = Pod::default();
        pod.metadata.name = Some("test-pod".to_string());
        pod.metadata.namespace = Some("default".to_string());
        pod
    }

    fn busy_small() -> NodeMetrics {
        NodeMetrics {
            cpu_utilization: 0.9,
            memory_utilization: 0.8,
            network_utilization: 0.3,
            allocatable_cpu_cores: 2,
            allocatable_memory_bytes: 4_000_000_000,
        }
    }

    fn idle_large() -> NodeMetrics {
        NodeMetrics {
            cpu_utilization: 0.1,
            memory_utilization: 0.2,
            network_utilization: 0.05,
            allocatable_cpu_cores: 16,
            allocatable_memory_bytes: 64_000_000_000,
        }
    }

    async fn source_with(nodes: &[(&str, NodeMetrics)]) -> Arc<StaticMetricsSource> {
        let source = Arc::new(StaticMetricsSource::new());
        for (name, metrics) in nodes {
            source.set_node(name, *metrics).await;
        }
        source
    }

    #[tokio::test]
    async fn test_score_matches_formula() {
        let source = source_with(&[("node1", idle_large())]).await;
        let plugin = LoadBalancedAllocation::new(source, BalanceWeights::default()).unwrap();

        let result = plugin.score(&test_pod(), "node1").await.unwrap();
        assert!(!result.is_degraded());
        assert_eq!(
            result.score,
            raw_score(&idle_large(), &BalanceWeights::default())
        );
    }

    #[tokio::test]
    async fn test_memory_transport_error_scores_as_zero() {
        let source = source_with(&[("node1", busy_small())]).await;
        source
            .fail_metric(
                "node1",
                MetricKind::MemoryUtilization,
                MetricsError::transport("http://prometheus:9090/api/v1/query", "connection refused"),
            )
            .await;
        let plugin = LoadBalancedAllocation::new(source, BalanceWeights::default()).unwrap();

        let result = plugin.score(&test_pod(), "node1").await.unwrap();

        let expected = raw_score(
            &NodeMetrics {
                memory_utilization: 0.0,
                ..busy_small()
            },
            &BalanceWeights::default(),
        );
        assert_eq!(result.score, expected);
        assert_ne!(result.score, raw_score(&busy_small(), &BalanceWeights::default()));
        assert_eq!(result.missing, vec![MetricKind::MemoryUtilization]);
    }

    #[tokio::test]
    async fn test_unknown_node_still_scores() {
        let source = source_with(&[]).await;
        let plugin = LoadBalancedAllocation::new(source, BalanceWeights::default()).unwrap();

        // All readings zero: demand 0 over capacity 0.2
        let result = plugin.score(&test_pod(), "ghost").await.unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.missing.len(), 5);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = BalanceWeights {
            memory_divisor: -1.0,
            ..Default::default()
        };
        let result = LoadBalancedAllocation::new(Arc::new(StaticMetricsSource::new()), weights);
        assert!(matches!(result, Err(SchedulerError::InvalidConfig { .. })));
    }

    #[test]
    fn test_normalize_scores_plugin() {
        let plugin =
            LoadBalancedAllocation::new(Arc::new(StaticMetricsSource::new()), BalanceWeights::default())
                .unwrap();
        let mut scores = vec![
            NodeScore::new("a", 10),
            NodeScore::new("b", 50),
            NodeScore::new("c", 90),
        ];

        plugin.normalize_scores(&test_pod(), &mut scores).unwrap();
        let values: Vec<i64> = scores.iter().map(|s| s.score).collect();
        assert_eq!(values, vec![0, 50, 100]);
    }

    #[tokio::test]
    async fn test_registered_plugin_prefers_idle_large_node() {
        let source = source_with(&[("small", busy_small()), ("large", idle_large())]).await;

        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        assert_eq!(registry.names(), vec![PLUGIN_NAME]);

        let args = PluginArgs {
            metrics: source,
            weights: BalanceWeights::default(),
        };
        let framework = Framework::from_registry(&registry, &[(PLUGIN_NAME, 1)], &args).unwrap();

        let nodes = vec!["small".to_string(), "large".to_string()];
        let ranked = framework.run_score_plugins(&test_pod(), &nodes).await.unwrap();
        assert_eq!(ranked[0].score, 0);
        assert_eq!(ranked[1].score, 100);

        let best = framework.select_host(&test_pod(), &nodes).await.unwrap();
        assert_eq!(best.name, "large");
    }

    #[tokio::test]
    async fn test_degraded_nodes_reported_by_framework() {
        let source = source_with(&[("n1", idle_large()), ("n2", idle_large())]).await;
        source
            .fail_metric(
                "n2",
                MetricKind::NetworkUtilization,
                MetricsError::backend(503, "unavailable"),
            )
            .await;

        let mut framework = Framework::new();
        framework
            .add_plugin(
                Box::new(LoadBalancedAllocation::new(source, BalanceWeights::default()).unwrap()),
                1,
            )
            .unwrap();

        let nodes = vec!["n1".to_string(), "n2".to_string()];
        let ranked = framework.run_score_plugins(&test_pod(), &nodes).await.unwrap();
        assert!(ranked[0].missing.is_empty());
        assert_eq!(ranked[1].missing, vec![MetricKind::NetworkUtilization]);
        // Missing network load makes n2 look slightly less busy
        assert!(ranked[1].score >= ranked[0].score);
    }
}

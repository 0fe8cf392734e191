use crate::config::BalanceWeights;
use crate::types::{pod_key, NodeScore, NodeScoreList, ScoreResult};
use crate::{Result, SchedulerError};
use async_trait::async_trait;
use futures_util::future::join_all;
use k8s_openapi::api::core::v1::Pod;
use loadscore_metrics::{MetricKind, MetricsSource};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Score plugin trait
///
/// The host calls `score` once per feasible node, possibly concurrently,
/// then `normalize_scores` once with every node's raw score.
#[async_trait]
pub trait ScorePlugin: Send + Sync {
    /// Name the plugin is registered under
    fn name(&self) -> &str;

    /// Raw score of a node for the given pod (higher is better)
    async fn score(&self, pod: &Pod, node_name: &str) -> Result<ScoreResult>;

    /// Rescale all raw scores of one cycle in place
    fn normalize_scores(&self, pod: &Pod, scores: &mut [NodeScore]) -> Result<()>;
}

/// Everything a plugin factory may need at construction
#[derive(Clone)]
pub struct PluginArgs {
    pub metrics: Arc<dyn MetricsSource>,
    pub weights: BalanceWeights,
}

/// Constructor registered for a plugin name
pub type PluginFactory = Box<dyn Fn(&PluginArgs) -> Result<Box<dyn ScorePlugin>> + Send + Sync>;

/// Largest weight a score plugin may be enabled with
pub const MAX_PLUGIN_WEIGHT: i64 = 100;

/// Reject plugin weights that are non-positive or above [`MAX_PLUGIN_WEIGHT`]
pub fn validate_plugin_weight(name: &str, weight: i64) -> Result<()> {
    if !(1..=MAX_PLUGIN_WEIGHT).contains(&weight) {
        return Err(SchedulerError::invalid_config(
            format!("weight {} for score plugin {} is out of range", weight, name),
            format!("Use a plugin weight between 1 and {}", MAX_PLUGIN_WEIGHT),
        ));
    }
    Ok(())
}

/// Name-to-factory table populated at startup
#[derive(Default)]
pub struct Registry {
    factories: BTreeMap<String, PluginFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn(&PluginArgs) -> Result<Box<dyn ScorePlugin>> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(SchedulerError::duplicate_plugin(name));
        }
        debug!("Registered score plugin {}", name);
        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    /// Instantiate the plugin registered under `name`
    pub fn build(&self, name: &str, args: &PluginArgs) -> Result<Box<dyn ScorePlugin>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SchedulerError::plugin_not_found(name))?;
        factory(args)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

/// Per-node outcome of a scoring cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNode {
    pub name: String,
    /// Sum over plugins of `weight * normalized score`
    pub score: i64,
    /// Readings missing on this node in any plugin
    pub missing: Vec<MetricKind>,
}

/// Drives score plugins through one scheduling cycle
///
/// Stands in for the host framework: concurrent `score` calls, then one
/// `normalize_scores` per plugin, then a weighted sum per node.
#[derive(Default)]
pub struct Framework {
    plugins: Vec<(Box<dyn ScorePlugin>, i64)>,
}

impl Framework {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a framework from registered plugins and their weights
    pub fn from_registry(
        registry: &Registry,
        enabled: &[(&str, i64)],
        args: &PluginArgs,
    ) -> Result<Self> {
        let mut framework = Self::new();
        for (name, weight) in enabled {
            framework.add_plugin(registry.build(name, args)?, *weight)?;
        }
        Ok(framework)
    }

    /// Enable a plugin; `weight` must lie in `1..=MAX_PLUGIN_WEIGHT`
    pub fn add_plugin(&mut self, plugin: Box<dyn ScorePlugin>, weight: i64) -> Result<()> {
        validate_plugin_weight(plugin.name(), weight)?;
        info!("Enabled score plugin {} with weight {}", plugin.name(), weight);
        self.plugins.push((plugin, weight));
        Ok(())
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|(p, _)| p.name()).collect()
    }

    /// Score every node with every plugin and combine the normalized results
    ///
    /// The output keeps the order of `nodes`.
    pub async fn run_score_plugins(&self, pod: &Pod, nodes: &[String]) -> Result<Vec<RankedNode>> {
        let pod_name = pod_key(pod);
        if nodes.is_empty() {
            return Err(SchedulerError::no_feasible_nodes(pod_name));
        }

        let mut totals: Vec<RankedNode> = nodes
            .iter()
            .map(|n| RankedNode {
                name: n.clone(),
                score: 0,
                missing: Vec::new(),
            })
            .collect();

        for (plugin, weight) in &self.plugins {
            let results = join_all(nodes.iter().map(|n| plugin.score(pod, n))).await;

            let mut scores: NodeScoreList = Vec::with_capacity(nodes.len());
            for (node_name, result) in nodes.iter().zip(results) {
                let result = result?;
                if result.is_degraded() {
                    let ranked = totals
                        .iter_mut()
                        .find(|r| &r.name == node_name)
                        .ok_or_else(|| SchedulerError::internal_error("Scored unknown node"))?;
                    for kind in &result.missing {
                        if !ranked.missing.contains(kind) {
                            ranked.missing.push(*kind);
                        }
                    }
                }
                scores.push(NodeScore::new(node_name.clone(), result.score));
            }

            plugin.normalize_scores(pod, &mut scores)?;

            for (ranked, normalized) in totals.iter_mut().zip(&scores) {
                ranked.score = ranked
                    .score
                    .saturating_add(weight.saturating_mul(normalized.score));
            }
        }

        let degraded = totals.iter().filter(|r| !r.missing.is_empty()).count();
        if degraded > 0 {
            warn!(
                "Pod {}: {} of {} nodes scored on incomplete telemetry",
                pod_name,
                degraded,
                totals.len()
            );
        }

        Ok(totals)
    }

    /// Pick the node with the highest combined score; earlier nodes win ties
    pub async fn select_host(&self, pod: &Pod, nodes: &[String]) -> Result<RankedNode> {
        let ranked = self.run_score_plugins(pod, nodes).await?;

        let mut best: Option<RankedNode> = None;
        for node in ranked {
            if best.as_ref().map_or(true, |b| node.score > b.score) {
                best = Some(node);
            }
        }

        let best = best.ok_or_else(|| SchedulerError::internal_error("No nodes scored"))?;
        info!(
            "Selected node {} for pod {} with score {}",
            best.name,
            pod_key(pod),
            best.score
        );
        Ok(best)
    }
}

/// Sort ranked nodes by score, highest first, keeping input order on ties
pub fn sort_ranked(ranked: &mut [RankedNode]) {
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Count how often each metric was missing across a cycle
pub fn missing_histogram(ranked: &[RankedNode]) -> HashMap<MetricKind, usize> {
    let mut counts = HashMap::new();
    for node in ranked {
        for kind in &node.missing {
            *counts.entry(*kind).or_insert(0) += 1;
        }
    }
    counts
}

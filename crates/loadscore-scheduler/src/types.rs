use k8s_openapi::api::core::v1::Pod;
use loadscore_metrics::MetricKind;
use serde::Serialize;

/// A node name paired with a score, as handed between score and normalize
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeScore {
    /// Node name
    pub name: String,
    /// Raw score before normalization, 0-100 after
    pub score: i64,
}

impl NodeScore {
    /// Create a new node score
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Ordered list of per-node scores for one pod
pub type NodeScoreList = Vec<NodeScore>;

/// Result of scoring a single node
///
/// Scoring never fails on missing telemetry. `missing` lists the readings
/// that were substituted by zero so callers can tell a degraded score from
/// a fully-informed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    /// Raw score (unbounded, higher is better)
    pub score: i64,
    /// Readings that could not be fetched
    pub missing: Vec<MetricKind>,
}

impl ScoreResult {
    /// A score computed from complete readings
    pub fn complete(score: i64) -> Self {
        Self {
            score,
            missing: Vec::new(),
        }
    }

    /// A score computed with some readings substituted by zero
    pub fn degraded(score: i64, missing: Vec<MetricKind>) -> Self {
        Self { score, missing }
    }

    pub fn is_degraded(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// `namespace/name` of a pod, for log records
pub fn pod_key(pod: &Pod) -> String {
    format!(
        "{}/{}",
        pod.metadata.namespace.as_deref().unwrap_or("default"),
        pod.metadata.name.as_deref().unwrap_or("unknown")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_result_degraded() {
        assert!(!ScoreResult::complete(80).is_degraded());

        let degraded = ScoreResult::degraded(80, vec![MetricKind::NetworkUtilization]);
        assert!(degraded.is_degraded());
        assert_eq!(degraded.score, 80);
    }

    #[test]
    fn test_pod_key() {
        let mut pod = Pod::default();
        assert_eq!(pod_key(&pod), "default/unknown");

        pod.metadata.name = Some("web-0".to_string());
        pod.metadata.namespace = Some("shop".to_string());
        assert_eq!(pod_key(&pod), "shop/web-0");
    }
}

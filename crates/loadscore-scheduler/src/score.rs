use crate::config::BalanceWeights;
use crate::types::NodeScore;
use loadscore_metrics::NodeMetrics;

/// Upper bound of the normalized range
pub const MAX_NODE_SCORE: i64 = 100;

/// Weighted multi-resource utilization index of a node
pub fn demand(metrics: &NodeMetrics, weights: &BalanceWeights) -> f64 {
    weights.cpu * metrics.cpu_utilization
        + weights.memory * metrics.memory_utilization
        + weights.network * metrics.network_utilization
}

/// Synthetic node size blending core count and memory
pub fn capacity(metrics: &NodeMetrics, weights: &BalanceWeights) -> f64 {
    weights.cpu * metrics.allocatable_cpu_cores as f64
        + weights.memory * (metrics.allocatable_memory_bytes as f64 / weights.memory_divisor)
        + weights.capacity_offset
}

/// Raw load-balance score: `(1 - demand / capacity) * 100`
///
/// Nodes with low utilization relative to their size score higher. The
/// result is unbounded; an overloaded small node goes negative. Nothing
/// guards against capacity shrinking toward the offset when capacity
/// readings are missing or negative.
pub fn raw_score(metrics: &NodeMetrics, weights: &BalanceWeights) -> i64 {
    let ratio = demand(metrics, weights) / capacity(metrics, weights);
    to_i64((1.0 - ratio) * MAX_NODE_SCORE as f64)
}

/// Truncate toward zero. NaN becomes 0, infinities saturate.
fn to_i64(value: f64) -> i64 {
    value as i64
}

/// Rescale raw scores in place into `[0, MAX_NODE_SCORE]`
///
/// `lowest` starts at the first score but `highest` starts at zero, so a
/// list of only negative scores is rescaled against a maximum of 0 rather
/// than its true maximum. When `highest == lowest` (a tie, or a single
/// non-negative entry) `lowest` is lowered by one and every node scores
/// `MAX_NODE_SCORE`. Integer division truncates.
pub fn normalize(scores: &mut [NodeScore]) {
    let Some(first) = scores.first() else {
        return;
    };

    let mut lowest = first.score;
    let mut highest = 0i64;

    for node_score in scores.iter() {
        if node_score.score < lowest {
            lowest = node_score.score;
        }
        if node_score.score > highest {
            highest = node_score.score;
        }
    }

    if highest == lowest {
        lowest -= 1;
    }

    // i128 keeps (s - lowest) * 100 from overflowing on extreme raw scores
    let range = highest as i128 - lowest as i128;
    for node_score in scores.iter_mut() {
        let shifted = node_score.score as i128 - lowest as i128;
        node_score.score = (shifted * MAX_NODE_SCORE as i128 / range) as i64;
    }
}

//! Loadscore Scheduler - load-aware node scoring
//!
//! This crate provides:
//! - The load-balance raw score and cross-node normalization
//! - The `LoadBalancedAllocation` score plugin
//! - A plugin registry and a scoring-cycle driver standing in for the host scheduler

pub mod balanced;
pub mod config;
pub mod error;
pub mod framework;
pub mod score;
pub mod types;

// Re-export commonly used types
pub use balanced::{LoadBalancedAllocation, PLUGIN_NAME};
pub use config::BalanceWeights;
pub use error::{Result, SchedulerError};
pub use framework::{Framework, PluginArgs, RankedNode, Registry, ScorePlugin, MAX_PLUGIN_WEIGHT};
pub use types::{NodeScore, NodeScoreList, ScoreResult};

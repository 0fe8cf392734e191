// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Scheduler error type
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    /// No plugin registered under the requested name
    #[error("Score plugin not found: {name}")]
    #[diagnostic(
        code(loadscore::scheduler::plugin_not_found),
        help("Registered plugins can be listed with `loadscore plugins`")
    )]
    PluginNotFound {
        name: String,
    },

    /// A plugin with the same name was already registered
    #[error("Score plugin already registered: {name}")]
    #[diagnostic(
        code(loadscore::scheduler::duplicate_plugin),
        help("Each plugin name may only be registered once")
    )]
    DuplicatePlugin {
        name: String,
    },

    /// Scoring was requested with an empty node list
    #[error("No feasible nodes to score for pod {pod_name}")]
    #[diagnostic(
        code(loadscore::scheduler::no_feasible_nodes),
        help("Pass at least one candidate node")
    )]
    NoFeasibleNodes {
        pod_name: String,
    },

    /// Configuration rejected at plugin construction
    #[error("Invalid configuration: {message}")]
    #[diagnostic(
        code(loadscore::scheduler::invalid_config),
        help("{suggestion}")
    )]
    InvalidConfig {
        message: String,
        suggestion: String,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(loadscore::scheduler::internal_error),
        help("This is likely a bug. Please report it")
    )]
    InternalError {
        message: String,
    },
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

impl SchedulerError {
    /// Create a PluginNotFound error
    pub fn plugin_not_found(name: impl Into<String>) -> Self {
        Self::PluginNotFound { name: name.into() }
    }

    /// Create a DuplicatePlugin error
    pub fn duplicate_plugin(name: impl Into<String>) -> Self {
        Self::DuplicatePlugin { name: name.into() }
    }

    /// Create a NoFeasibleNodes error
    pub fn no_feasible_nodes(pod_name: impl Into<String>) -> Self {
        Self::NoFeasibleNodes {
            pod_name: pod_name.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

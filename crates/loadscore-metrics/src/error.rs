use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while fetching a single telemetry reading
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum MetricsError {
    /// The telemetry backend could not be reached (connection refused, DNS, timeout)
    #[error("Telemetry request to {url} failed: {message}")]
    #[diagnostic(
        code(loadscore::metrics::transport),
        help("Check that the Prometheus endpoint is reachable from the scheduler and that the request timeout is not too short")
    )]
    Transport {
        #[allow(unused)]
        url: String,
        #[allow(unused)]
        message: String,
    },

    /// The telemetry backend answered with a non-success status
    #[error("Telemetry backend returned status {status}: {body}")]
    #[diagnostic(
        code(loadscore::metrics::backend),
        help("Inspect the query expression; Prometheus answers 400 for malformed PromQL and 503 while it is starting up")
    )]
    Backend {
        #[allow(unused)]
        status: u16,
        #[allow(unused)]
        body: String,
    },

    /// The response body did not contain a value at the expected position
    #[error("Unexpected response shape: {message}")]
    #[diagnostic(
        code(loadscore::metrics::shape),
        help("An empty result usually means the series does not exist for this node. Verify the instance/node label with the Prometheus UI")
    )]
    Shape {
        #[allow(unused)]
        message: String,
    },

    /// The value was present but is not a number of the expected type
    #[error("Failed to parse '{value}' as {expected}: {message}")]
    #[diagnostic(code(loadscore::metrics::parse), help("The series returned a value of an unexpected type"))]
    Parse {
        #[allow(unused)]
        value: String,
        #[allow(unused)]
        expected: &'static str,
        #[allow(unused)]
        message: String,
    },

    /// Telemetry settings rejected before any request is made
    #[error("Invalid telemetry configuration: {message}")]
    #[diagnostic(code(loadscore::metrics::invalid_config), help("{suggestion}"))]
    InvalidConfig {
        #[allow(unused)]
        message: String,
        #[allow(unused)]
        suggestion: String,
    },
}

/// Result type for metrics operations
pub type Result<T> = std::result::Result<T, MetricsError>;

impl MetricsError {
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn backend(status: u16, body: impl Into<String>) -> Self {
        Self::Backend {
            status,
            body: body.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn parse(value: impl Into<String>, expected: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            value: value.into(),
            expected,
            message: message.into(),
        }
    }
}

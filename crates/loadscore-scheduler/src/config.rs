use crate::{Result, SchedulerError};
use serde::Deserialize;

/// Coefficients of the load-balance score
///
/// `cpu`, `memory` and `network` weight both the demand index and the
/// capacity proxy. `memory_divisor` converts allocatable bytes into the
/// unit blended with core counts, and `capacity_offset` keeps capacity
/// away from zero on tiny nodes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BalanceWeights {
    pub cpu: f64,
    pub memory: f64,
    pub network: f64,
    pub memory_divisor: f64,
    pub capacity_offset: f64,
}

impl Default for BalanceWeights {
    fn default() -> Self {
        Self {
            cpu: 0.5,
            memory: 0.3,
            network: 0.2,
            memory_divisor: 1e9,
            capacity_offset: 0.2,
        }
    }
}

impl BalanceWeights {
    /// Reject weights that would make every score meaningless
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("cpu", self.cpu),
            ("memory", self.memory),
            ("network", self.network),
            ("memory_divisor", self.memory_divisor),
            ("capacity_offset", self.capacity_offset),
        ];

        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SchedulerError::invalid_config(
                    format!("weight '{}' is not finite", name),
                    "Use a finite decimal number",
                ));
            }
        }

        if self.memory_divisor <= 0.0 {
            return Err(SchedulerError::invalid_config(
                format!("memory_divisor must be positive, got {}", self.memory_divisor),
                "The default of 1e9 expresses memory in gigabytes",
            ));
        }

        Ok(())
    }
}

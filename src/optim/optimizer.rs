use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::error::{BaselineError, Result};

use crate::optim::ftrl::Ftrl;
use crate::optim::sgd::Sgd;

/// Updates the bias from its gradient once per training step.
pub trait Optimizer {
    fn name(&self) -> &str;

    /// Applies one update in place. `loss` is the training loss the gradient
    /// was taken from.
    fn apply_gradients(&mut self, loss: f64, params: &mut [f64], grads: &[f64]);

    /// Per-parameter state to persist, keyed by slot name.
    fn slots(&self) -> BTreeMap<String, Vec<f64>> {
        BTreeMap::new()
    }

    /// Restores state written by `slots`. Slots that are missing, or whose
    /// length does not match, are reset to their initial values.
    fn restore_slots(&mut self, _slots: &BTreeMap<String, Vec<f64>>) {}
}

/// Serializable optimizer choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd { learning_rate: f64 },
    Ftrl { learning_rate: f64 },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Ftrl { learning_rate: Ftrl::DEFAULT_LEARNING_RATE }
    }
}

impl OptimizerConfig {
    pub fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerConfig::Sgd { learning_rate } | OptimizerConfig::Ftrl { learning_rate } => learning_rate,
        }
    }

    /// The learning rate must be finite and positive.
    pub fn validate(&self) -> Result<()> {
        let lr = self.learning_rate();
        if !(lr.is_finite() && lr > 0.0) {
            return Err(BaselineError::InvalidConfig(format!(
                "learning_rate must be finite and positive, got {lr}"
            )));
        }
        Ok(())
    }

    pub fn build(&self, n_params: usize) -> Box<dyn Optimizer> {
        match *self {
            OptimizerConfig::Sgd { learning_rate } => Box::new(Sgd::new(learning_rate)),
            OptimizerConfig::Ftrl { learning_rate } => Box::new(Ftrl::new(learning_rate, n_params)),
        }
    }
}

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Serialize, Deserialize};

use crate::train::step_stats::StepStats;

/// Persistent settings of an estimator's run environment.
///
/// - `model_dir`              — where checkpoints live; a fresh temporary
///                              directory is used when unset
/// - `save_checkpoints_steps` — also checkpoint every N steps (the final
///                              step is always checkpointed)
/// - `log_step_count_steps`   — log the training loss every N steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub model_dir: Option<PathBuf>,
    pub save_checkpoints_steps: Option<u64>,
    pub log_step_count_steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            model_dir: None,
            save_checkpoints_steps: None,
            log_step_count_steps: 100,
        }
    }
}

/// Configuration for one `train` call.
///
/// # Fields
/// - `steps`       — number of additional steps; `None` trains until the
///                   input is exhausted
/// - `max_steps`   — absolute bound on the global step; training is skipped
///                   when the checkpoint is already there
/// - `progress_tx` — optional channel; one `StepStats` per completed step.
///                   If the receiver is dropped the loop terminates early.
/// - `stop_flag`   — optional atomic flag; when set to `true` from another
///                   thread the loop terminates after the current step.
#[derive(Default)]
pub struct TrainConfig {
    pub steps: Option<u64>,
    pub max_steps: Option<u64>,
    pub progress_tx: Option<mpsc::Sender<StepStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Trains for `steps` more steps, with no channel and no stop flag.
    pub fn steps(steps: u64) -> Self {
        TrainConfig {
            steps: Some(steps),
            ..TrainConfig::default()
        }
    }

    pub fn max_steps(max_steps: u64) -> Self {
        TrainConfig {
            max_steps: Some(max_steps),
            ..TrainConfig::default()
        }
    }
}

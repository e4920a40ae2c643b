use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::head::Head;
use crate::optim::OptimizerConfig;
use crate::train::train_config::RunConfig;

/// A fully serializable description of a baseline estimator: the task head,
/// the optional weight column, the optimizer and the run environment.
///
/// Can be saved to / loaded from JSON independently of any checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub head: Head,
    /// Feature holding per-example weights; all weights are 1 when unset.
    #[serde(default)]
    pub weight_column: Option<String>,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl EstimatorConfig {
    pub fn new(head: Head) -> Self {
        EstimatorConfig {
            head,
            weight_column: None,
            optimizer: OptimizerConfig::default(),
            run: RunConfig::default(),
        }
    }

    /// Checks the head and the optimizer settings.
    pub fn validate(&self) -> Result<()> {
        self.head.validate()?;
        self.optimizer.validate()
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a config from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<EstimatorConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: EstimatorConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

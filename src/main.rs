//! Command-line front end for the baseline estimator.
//!
//! ```text
//! ferrite-baseline train    <config.json> <dataset.json> [steps]
//! ferrite-baseline evaluate <config.json> <dataset.json>
//! ferrite-baseline predict  <config.json> <dataset.json>
//! ferrite-baseline export   <config.json> <export_dir_base> <feature>...
//! ```
//!
//! Set `RUST_LOG=info` to see training progress.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use log::error;
use serde::Deserialize;

use ferrite_baseline::export::NumericColumn;
use ferrite_baseline::input::FeatureMap;
use ferrite_baseline::{
    build_parsing_serving_input_receiver, make_parse_example_spec, ArrayInput, BaselineError,
    BaselineEstimator, EstimatorConfig, Labels, Matrix, Result, TrainConfig,
};

const USAGE: &str = "usage: ferrite-baseline <train|evaluate|predict|export> <config.json> <path> [args...]";

/// Dataset file layout: feature columns as rows of values, plus either
/// numeric or string labels.
#[derive(Debug, Deserialize)]
struct Dataset {
    features: BTreeMap<String, Vec<Vec<f64>>>,
    #[serde(default)]
    labels: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    text_labels: Option<Vec<String>>,
    #[serde(default = "default_batch_size")]
    batch_size: usize,
}

fn default_batch_size() -> usize {
    128
}

impl Dataset {
    fn load(path: &Path) -> Result<Dataset> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn into_input(self, num_epochs: Option<usize>) -> Result<ArrayInput> {
        let mut features = FeatureMap::new();
        for (key, rows) in self.features {
            features.insert(key, Matrix::try_from_data(rows)?);
        }
        let labels = match (self.labels, self.text_labels) {
            (Some(_), Some(_)) => {
                return Err(BaselineError::InvalidConfig(
                    "dataset has both labels and text_labels".into(),
                ))
            }
            (Some(rows), None) => Some(Labels::Dense(Matrix::try_from_data(rows)?)),
            (None, Some(values)) => Some(Labels::Text(values)),
            (None, None) => None,
        };
        Ok(ArrayInput::new(features, labels)?
            .batch_size(self.batch_size)?
            .num_epochs(num_epochs))
    }
}

fn run(args: &[String]) -> Result<()> {
    let (Some(command), Some(config_path), Some(path)) = (args.first(), args.get(1), args.get(2)) else {
        return Err(BaselineError::InvalidConfig(USAGE.into()));
    };
    let config = EstimatorConfig::load_json(config_path)?;
    let mut estimator = BaselineEstimator::new(config)?;

    match command.as_str() {
        "train" => {
            let steps = match args.get(3) {
                Some(s) => Some(s.parse::<u64>().map_err(|e| {
                    BaselineError::InvalidConfig(format!("invalid step count {s:?}: {e}"))
                })?),
                None => None,
            };
            // With a step count the data repeats; otherwise one pass.
            let epochs = if steps.is_some() { None } else { Some(1) };
            let mut input = Dataset::load(Path::new(path))?.into_input(epochs)?;
            let train_config = TrainConfig { steps, ..TrainConfig::default() };
            let loss = estimator.train(&mut input, &train_config)?;
            println!("{}", serde_json::json!({ "loss": loss }));
        }
        "evaluate" => {
            let mut input = Dataset::load(Path::new(path))?.into_input(Some(1))?;
            let metrics = estimator.evaluate(&mut input, None)?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        "predict" => {
            let mut input = Dataset::load(Path::new(path))?.into_input(Some(1))?;
            let predictions = estimator.predict(&mut input)?;
            println!("{}", serde_json::to_string_pretty(&predictions)?);
        }
        "export" => {
            let columns: Vec<NumericColumn> = args[3..].iter()
                .map(|key| NumericColumn::new(key.as_str(), vec![1]))
                .collect();
            let receiver = build_parsing_serving_input_receiver(make_parse_example_spec(&columns));
            let dir = estimator.export_saved_model(path, &receiver)?;
            println!("{}", dir.display());
        }
        other => {
            return Err(BaselineError::InvalidConfig(format!("unknown command {other:?}\n{USAGE}")));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

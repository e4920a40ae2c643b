use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::error::{BaselineError, Result};
use crate::export::{SavedModel, ServingInputReceiver};
use crate::head::{Head, Prediction};
use crate::input::{Batch, InputFn};
use crate::math::matrix::Matrix;
use crate::metrics::{Metrics, MetricsAccumulator};
use crate::model::{BaselineModel, Checkpoint, Variable, BIAS_NAME};
use crate::optim::Optimizer;
use crate::train::estimator_config::EstimatorConfig;
use crate::train::step_stats::StepStats;
use crate::train::train_config::TrainConfig;

/// A regressor or classifier that predicts its bias for every example.
///
/// All state lives in `model_dir`: `train` warm-starts from the checkpoint
/// there and writes a new one when it finishes; `evaluate`, `predict` and
/// `export_saved_model` read it.
pub struct BaselineEstimator {
    config: EstimatorConfig,
    model_dir: PathBuf,
    optimizer: Box<dyn Optimizer>,
}

/// A batch after label and weight validation.
struct PreparedBatch {
    logits: Matrix,
    targets: Matrix,
    weights: Vec<f64>,
}

impl BaselineEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        let model_dir = match &config.run.model_dir {
            Some(dir) => dir.clone(),
            None => {
                let dir = temporary_model_dir();
                warn!("no model_dir configured, using temporary directory {}", dir.display());
                dir
            }
        };
        let optimizer = config.optimizer.build(config.head.logits_dimension());
        Ok(BaselineEstimator { config, model_dir, optimizer })
    }

    pub fn regressor(label_dimension: usize) -> Result<Self> {
        BaselineEstimator::new(EstimatorConfig::new(Head::regression(label_dimension)?))
    }

    pub fn classifier(n_classes: usize) -> Result<Self> {
        BaselineEstimator::new(EstimatorConfig::new(Head::classifier(n_classes, None)?))
    }

    pub fn with_model_dir(mut self, model_dir: impl Into<PathBuf>) -> Self {
        self.model_dir = model_dir.into();
        self.config.run.model_dir = Some(self.model_dir.clone());
        self
    }

    pub fn with_weight_column(mut self, column: impl Into<String>) -> Self {
        self.config.weight_column = Some(column.into());
        self
    }

    /// Maps string labels to class ids and class ids back to strings.
    pub fn with_label_vocabulary(mut self, vocabulary: Vec<String>) -> Result<Self> {
        let head = Head::classifier(self.config.head.n_classes(), Some(vocabulary))?;
        self.config.head = head;
        Ok(self)
    }

    /// Replaces the optimizer built from the config.
    pub fn with_optimizer(mut self, optimizer: Box<dyn Optimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn head(&self) -> &Head {
        &self.config.head
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Trains the bias and checkpoints the result. Returns the training loss
    /// of the last step, or 0 when no step ran.
    ///
    /// Starts from the checkpoint in `model_dir` when there is one, otherwise
    /// from a zero bias at step 0.
    ///
    /// # Early termination
    /// The loop stops before `config.steps` when:
    /// - the input is exhausted,
    /// - the global step reaches `config.max_steps`,
    /// - the `progress_tx` receiver has been dropped, **or**
    /// - `config.stop_flag` is set to `true`.
    pub fn train(&mut self, input: &mut dyn InputFn, config: &TrainConfig) -> Result<f64> {
        let head = self.config.head.clone();
        let dim = head.logits_dimension();

        let mut checkpoint = Checkpoint::load_optional(&self.model_dir)?
            .unwrap_or_else(|| Checkpoint::new(0).with_variable(BIAS_NAME, vec![0.0; dim]));
        let mut model = BaselineModel::from_checkpoint(&checkpoint, dim)?;
        self.optimizer.restore_slots(&optimizer_slots(&checkpoint));

        let start_step = checkpoint.global_step;
        if config.max_steps.is_some_and(|max| start_step >= max) {
            info!("skipping training: global step {start_step} already reached max_steps");
            return Ok(0.0);
        }
        info!("training {} head from global step {start_step}", head.name());

        let mut global_step = start_step;
        let mut last_loss = 0.0;
        let log_every = self.config.run.log_step_count_steps.max(1);

        loop {
            if config.steps.is_some_and(|s| global_step - start_step >= s)
                || config.max_steps.is_some_and(|max| global_step >= max)
            {
                break;
            }
            if let Some(ref flag) = config.stop_flag {
                if flag.load(Ordering::Relaxed) {
                    info!("stop requested at step {global_step}");
                    break;
                }
            }
            let Some(batch) = input.next_batch() else {
                info!("input exhausted after {} steps", global_step - start_step);
                break;
            };

            let t_start = Instant::now();
            let prepared = self.prepare(&model, &batch, "training")?;
            let loss = head.loss(&prepared.logits, &prepared.targets, &prepared.weights);
            let training_loss = loss.sum_over_batch_size();
            if !training_loss.is_finite() {
                return Err(BaselineError::NonFiniteLoss { step: global_step, loss: training_loss });
            }

            let grads = head.bias_gradient(&prepared.logits, &prepared.targets, &prepared.weights);
            self.optimizer.apply_gradients(training_loss, &mut model.bias, &grads);
            global_step += 1;
            last_loss = training_loss;

            if global_step == start_step + 1 || global_step % log_every == 0 {
                info!("loss = {training_loss:.6}, step = {global_step}");
            }

            let stats = StepStats {
                global_step,
                loss: training_loss,
                batch_size: prepared.logits.rows,
                elapsed_us: t_start.elapsed().as_micros() as u64,
            };
            if let Some(ref tx) = config.progress_tx {
                // If the receiver has been dropped, stop training.
                if tx.send(stats).is_err() {
                    break;
                }
            }

            if self.config.run.save_checkpoints_steps.is_some_and(|every| every > 0 && global_step % every == 0) {
                self.snapshot(&mut checkpoint, &model, global_step).save(&self.model_dir)?;
            }
        }

        self.snapshot(&mut checkpoint, &model, global_step).save(&self.model_dir)?;
        info!("saved checkpoint for step {global_step} in {}", self.model_dir.display());
        Ok(last_loss)
    }

    /// Convenience wrapper: trains for `steps` more steps.
    pub fn train_steps(&mut self, input: &mut dyn InputFn, steps: u64) -> Result<f64> {
        self.train(input, &TrainConfig::steps(steps))
    }

    /// Computes the head's metric bundle over up to `steps` batches, or until
    /// the input is exhausted. Requires a checkpoint.
    pub fn evaluate(&self, input: &mut dyn InputFn, steps: Option<u64>) -> Result<Metrics> {
        let checkpoint = Checkpoint::load(&self.model_dir)?;
        let model = BaselineModel::from_checkpoint(&checkpoint, self.config.head.logits_dimension())?;
        let mut acc = MetricsAccumulator::new(&self.config.head);

        let mut step = 0u64;
        while steps.map_or(true, |s| step < s) {
            let Some(batch) = input.next_batch() else { break };
            let prepared = self.prepare(&model, &batch, "evaluation")?;
            let loss = self.config.head.loss(&prepared.logits, &prepared.targets, &prepared.weights);
            acc.update(&prepared.logits, &prepared.targets, &prepared.weights, &loss);
            step += 1;
            debug!("evaluation [{step}] done");
        }
        if step == 0 {
            warn!("evaluation input produced no batches");
        }

        let metrics = acc.finish(checkpoint.global_step);
        info!("evaluation at global step {}: {}", checkpoint.global_step, format_metrics(&metrics));
        Ok(metrics)
    }

    /// One prediction per example, in input order. Requires a checkpoint.
    pub fn predict(&self, input: &mut dyn InputFn) -> Result<Vec<Prediction>> {
        let checkpoint = Checkpoint::load(&self.model_dir)?;
        let model = BaselineModel::from_checkpoint(&checkpoint, self.config.head.logits_dimension())?;

        let mut out = Vec::new();
        while let Some(batch) = input.next_batch() {
            let logits = model.forward(batch.batch_size()?);
            out.extend(logits.iter_rows().map(|row| self.config.head.predict(row)));
        }
        Ok(out)
    }

    /// Reads a variable from the latest checkpoint.
    pub fn get_variable_value(&self, name: &str) -> Result<Vec<f64>> {
        Checkpoint::load_variable(&self.model_dir, name)
    }

    pub fn list_variables(&self) -> Result<Vec<(String, Vec<usize>)>> {
        Checkpoint::list_variables(&self.model_dir)
    }

    /// Exports the latest checkpoint under `export_dir_base` and returns the
    /// export directory.
    pub fn export_saved_model(
        &self,
        export_dir_base: impl AsRef<Path>,
        receiver: &ServingInputReceiver,
    ) -> Result<PathBuf> {
        let checkpoint = Checkpoint::load(&self.model_dir)?;
        let model = BaselineModel::from_checkpoint(&checkpoint, self.config.head.logits_dimension())?;
        SavedModel {
            head: self.config.head.clone(),
            model,
            global_step: checkpoint.global_step,
            serving: receiver.clone(),
        }
        .write(export_dir_base)
    }

    fn prepare(&self, model: &BaselineModel, batch: &Batch, mode: &'static str) -> Result<PreparedBatch> {
        let n = batch.batch_size()?;
        let labels = batch.labels.as_ref().ok_or(BaselineError::MissingLabels(mode))?;
        let targets = self.config.head.process_labels(labels)?;
        let weights = batch.weights(self.config.weight_column.as_deref())?;
        Ok(PreparedBatch { logits: model.forward(n), targets, weights })
    }

    /// Writes the bias, step and optimizer slots into `checkpoint`.
    fn snapshot<'a>(&self, checkpoint: &'a mut Checkpoint, model: &BaselineModel, global_step: u64) -> &'a Checkpoint {
        checkpoint.global_step = global_step;
        checkpoint.variables.insert(BIAS_NAME.to_string(), Variable::vector(model.bias.clone()));
        for (slot, values) in self.optimizer.slots() {
            checkpoint.variables.insert(format!("{BIAS_NAME}/{slot}"), Variable::vector(values));
        }
        checkpoint
    }
}

/// Optimizer slots stored under `baseline/bias/<slot>`.
fn optimizer_slots(checkpoint: &Checkpoint) -> BTreeMap<String, Vec<f64>> {
    let prefix = format!("{BIAS_NAME}/");
    checkpoint.variables.iter()
        .filter_map(|(name, v)| name.strip_prefix(&prefix).map(|slot| (slot.to_string(), v.values.clone())))
        .collect()
}

fn format_metrics(metrics: &Metrics) -> String {
    metrics.iter()
        .map(|(k, v)| format!("{k} = {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn temporary_model_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("ferrite-baseline-{}-{nanos}", std::process::id()))
}

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Serialize, Deserialize};

use crate::error::{BaselineError, Result};

/// Checkpoint name of the bias vector.
pub const BIAS_NAME: &str = "baseline/bias";
/// Checkpoint name of the step counter. Reported with shape `[]`.
pub const GLOBAL_STEP_NAME: &str = "global_step";

const CHECKPOINT_FILE: &str = "checkpoint.json";

/// A named, shaped block of parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl Variable {
    pub fn vector(values: Vec<f64>) -> Variable {
        Variable { shape: vec![values.len()], values }
    }
}

/// Everything persisted in a model directory: the global step plus named
/// variables (the bias and any optimizer slots).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub global_step: u64,
    pub variables: BTreeMap<String, Variable>,
}

impl Checkpoint {
    pub fn new(global_step: u64) -> Checkpoint {
        Checkpoint { global_step, variables: BTreeMap::new() }
    }

    pub fn with_variable(mut self, name: impl Into<String>, values: Vec<f64>) -> Checkpoint {
        self.variables.insert(name.into(), Variable::vector(values));
        self
    }

    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.variables.get(name)
            .ok_or_else(|| BaselineError::MissingVariable(name.to_string()))
    }

    pub fn path(model_dir: impl AsRef<Path>) -> PathBuf {
        model_dir.as_ref().join(CHECKPOINT_FILE)
    }

    pub fn exists(model_dir: impl AsRef<Path>) -> bool {
        Checkpoint::path(model_dir).is_file()
    }

    /// Writes the checkpoint as pretty-printed JSON, replacing any previous
    /// one. The file is written next to its final location and renamed so a
    /// reader never sees a partial checkpoint.
    pub fn save(&self, model_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = model_dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = Checkpoint::path(dir);
        let tmp = dir.join(format!("{CHECKPOINT_FILE}.tmp"));
        {
            let file = fs::File::create(&tmp)?;
            let writer = std::io::BufWriter::new(file);
            serde_json::to_writer_pretty(writer, self)?;
        }
        fs::rename(&tmp, &path)?;
        debug!("saved checkpoint for step {} to {}", self.global_step, path.display());
        Ok(path)
    }

    pub fn load(model_dir: impl AsRef<Path>) -> Result<Checkpoint> {
        Checkpoint::load_optional(model_dir.as_ref())?
            .ok_or_else(|| BaselineError::MissingCheckpoint(model_dir.as_ref().to_path_buf()))
    }

    /// Like `load`, but a missing checkpoint is `Ok(None)`.
    pub fn load_optional(model_dir: impl AsRef<Path>) -> Result<Option<Checkpoint>> {
        let path = Checkpoint::path(model_dir);
        if !path.is_file() {
            return Ok(None);
        }
        let file = fs::File::open(&path)?;
        let reader = std::io::BufReader::new(file);
        let checkpoint: Checkpoint = serde_json::from_reader(reader)?;
        for (name, v) in &checkpoint.variables {
            let expected: usize = v.shape.iter().product();
            if expected != v.values.len() {
                return Err(BaselineError::ShapeMismatch {
                    name: name.clone(),
                    expected: v.shape.clone(),
                    got: vec![v.values.len()],
                });
            }
        }
        Ok(Some(checkpoint))
    }

    /// Names and shapes of every variable, the global step included.
    pub fn list_variables(model_dir: impl AsRef<Path>) -> Result<Vec<(String, Vec<usize>)>> {
        let ckpt = Checkpoint::load(model_dir)?;
        let mut out: Vec<(String, Vec<usize>)> = ckpt.variables.iter()
            .map(|(name, v)| (name.clone(), v.shape.clone()))
            .collect();
        out.push((GLOBAL_STEP_NAME.to_string(), vec![]));
        out.sort();
        Ok(out)
    }

    /// Values of one variable; the global step comes back as a single value.
    pub fn load_variable(model_dir: impl AsRef<Path>, name: &str) -> Result<Vec<f64>> {
        let ckpt = Checkpoint::load(model_dir)?;
        if name == GLOBAL_STEP_NAME {
            return Ok(vec![ckpt.global_step as f64]);
        }
        Ok(ckpt.variable(name)?.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = Checkpoint::new(100).with_variable(BIAS_NAME, vec![46.0, 58.0]);
        ckpt.save(dir.path()).unwrap();
        assert_eq!(Checkpoint::load(dir.path()).unwrap(), ckpt);
        assert!(!dir.path().join("checkpoint.json.tmp").exists());
    }

    #[test]
    fn missing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Checkpoint::load_optional(dir.path()).unwrap().is_none());
        assert!(matches!(Checkpoint::load(dir.path()), Err(BaselineError::MissingCheckpoint(_))));
    }

    #[test]
    fn list_and_load_variables() {
        let dir = tempfile::tempdir().unwrap();
        Checkpoint::new(7).with_variable(BIAS_NAME, vec![-1.0]).save(dir.path()).unwrap();
        let vars = Checkpoint::list_variables(dir.path()).unwrap();
        assert_eq!(vars, vec![
            (BIAS_NAME.to_string(), vec![1]),
            (GLOBAL_STEP_NAME.to_string(), vec![]),
        ]);
        assert_eq!(Checkpoint::load_variable(dir.path(), GLOBAL_STEP_NAME).unwrap(), vec![7.0]);
        assert!(Checkpoint::load_variable(dir.path(), "nope").is_err());
    }

    #[test]
    fn inconsistent_shape_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut ckpt = Checkpoint::new(0).with_variable(BIAS_NAME, vec![1.0]);
        ckpt.variables.get_mut(BIAS_NAME).unwrap().shape = vec![2];
        ckpt.save(dir.path()).unwrap();
        assert!(matches!(Checkpoint::load(dir.path()), Err(BaselineError::ShapeMismatch { .. })));
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::export::parsing::{parse_examples, ParsingSpec};
use crate::head::{Head, Prediction};
use crate::model::BaselineModel;

const SAVED_MODEL_FILE: &str = "saved_model.json";

/// Describes how a served model receives its input: serialized examples
/// parsed with `parsing_spec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingInputReceiver {
    pub parsing_spec: ParsingSpec,
}

pub fn build_parsing_serving_input_receiver(parsing_spec: ParsingSpec) -> ServingInputReceiver {
    ServingInputReceiver { parsing_spec }
}

/// Self-contained export of a trained baseline model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub head: Head,
    pub model: BaselineModel,
    pub global_step: u64,
    pub serving: ServingInputReceiver,
}

impl SavedModel {
    /// Writes the export under `<export_dir_base>/<unix seconds>` and returns
    /// that directory. The export is staged in a `temp-` directory and renamed
    /// into place once complete.
    pub fn write(&self, export_dir_base: impl AsRef<Path>) -> Result<PathBuf> {
        let base = export_dir_base.as_ref();
        fs::create_dir_all(base)?;

        let mut stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        while base.join(stamp.to_string()).exists() {
            stamp += 1;
        }

        let staging = base.join(format!("temp-{stamp}"));
        fs::create_dir_all(&staging)?;
        {
            let file = fs::File::create(staging.join(SAVED_MODEL_FILE))?;
            let writer = std::io::BufWriter::new(file);
            serde_json::to_writer_pretty(writer, self)?;
        }

        let export_dir = base.join(stamp.to_string());
        fs::rename(&staging, &export_dir)?;
        info!("exported {} model at step {} to {}", self.head.name(), self.global_step, export_dir.display());
        Ok(export_dir)
    }

    pub fn load(export_dir: impl AsRef<Path>) -> Result<SavedModel> {
        let file = fs::File::open(export_dir.as_ref().join(SAVED_MODEL_FILE))?;
        let reader = std::io::BufReader::new(file);
        let saved: SavedModel = serde_json::from_reader(reader)?;
        saved.head.validate()?;
        saved.model.check_dimension(saved.head.logits_dimension())?;
        Ok(saved)
    }

    /// Parses `serialized` examples with the serving spec and predicts one
    /// output per example.
    pub fn predict_serialized(&self, serialized: &[String]) -> Result<Vec<Prediction>> {
        parse_examples(serialized, &self.serving.parsing_spec)?;
        let logits = self.model.forward(serialized.len());
        Ok(logits.iter_rows().map(|row| self.head.predict(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::parsing::{make_parse_example_spec, Example, Feature, NumericColumn};

    fn saved() -> SavedModel {
        SavedModel {
            head: Head::classifier(2, None).unwrap(),
            model: BaselineModel::from_bias(vec![10.0]),
            global_step: 200,
            serving: build_parsing_serving_input_receiver(
                make_parse_example_spec(&[NumericColumn::new("x", vec![1])]),
            ),
        }
    }

    #[test]
    fn write_then_load() {
        let base = tempfile::tempdir().unwrap();
        let dir = saved().write(base.path()).unwrap();
        assert!(dir.join(SAVED_MODEL_FILE).is_file());
        assert_eq!(SavedModel::load(&dir).unwrap(), saved());
    }

    #[test]
    fn repeated_exports_get_distinct_dirs() {
        let base = tempfile::tempdir().unwrap();
        let a = saved().write(base.path()).unwrap();
        let b = saved().write(base.path()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn serves_serialized_examples() {
        let s = Example::new().with_feature("x", Feature::FloatList(vec![3.0])).serialize_to_string().unwrap();
        let preds = saved().predict_serialized(&[s.clone(), s]).unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].as_classification().unwrap().class_ids, vec![1]);
    }

    #[test]
    fn serving_rejects_bad_examples() {
        let s = Example::new().with_feature("x", Feature::FloatList(vec![1.0, 2.0])).serialize_to_string().unwrap();
        assert!(saved().predict_serialized(&[s]).is_err());
    }

    #[test]
    fn load_rejects_bias_of_wrong_length() {
        let base = tempfile::tempdir().unwrap();
        let mut broken = saved();
        broken.model = BaselineModel::from_bias(vec![]);
        let dir = broken.write(base.path()).unwrap();
        assert!(matches!(
            SavedModel::load(&dir),
            Err(crate::error::BaselineError::ShapeMismatch { .. })
        ));
    }
}

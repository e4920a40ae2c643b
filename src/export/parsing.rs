//! Parsing of serialized examples for serving.
//!
//! An example is a JSON object mapping feature names to typed value lists:
//!
//! ```json
//! { "features": { "x": { "float_list": [0.1, 0.2] }, "y": { "int64_list": [1] } } }
//! ```

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::error::{BaselineError, Result};
use crate::input::batch::FeatureMap;
use crate::math::matrix::Matrix;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    FloatList(Vec<f64>),
    Int64List(Vec<i64>),
    BytesList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Example {
    pub features: BTreeMap<String, Feature>,
}

impl Example {
    pub fn new() -> Self {
        Example::default()
    }

    pub fn with_feature(mut self, key: impl Into<String>, feature: Feature) -> Self {
        self.features.insert(key.into(), feature);
        self
    }

    pub fn serialize_to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Float32,
    Int64,
}

/// A feature with a fixed number of values per example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedLenFeature {
    pub shape: Vec<usize>,
    pub dtype: DType,
    /// Used when an example lacks the feature.
    #[serde(default)]
    pub default_value: Option<Vec<f64>>,
}

impl FixedLenFeature {
    pub fn new(shape: Vec<usize>, dtype: DType) -> Self {
        FixedLenFeature { shape, dtype, default_value: None }
    }

    pub fn width(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Feature name → how to parse it.
pub type ParsingSpec = BTreeMap<String, FixedLenFeature>;

/// A dense float input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub key: String,
    pub shape: Vec<usize>,
}

impl NumericColumn {
    pub fn new(key: impl Into<String>, shape: Vec<usize>) -> Self {
        NumericColumn { key: key.into(), shape }
    }
}

pub fn make_parse_example_spec(columns: &[NumericColumn]) -> ParsingSpec {
    columns.iter()
        .map(|c| (c.key.clone(), FixedLenFeature::new(c.shape.clone(), DType::Float32)))
        .collect()
}

/// Parses serialized examples into one matrix per spec entry, one row per
/// example. Features not named in the spec are ignored.
pub fn parse_examples(serialized: &[String], spec: &ParsingSpec) -> Result<FeatureMap> {
    let examples = serialized.iter().enumerate()
        .map(|(index, s)| {
            serde_json::from_str::<Example>(s).map_err(|e| BaselineError::MalformedExample {
                index,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<Example>>>()?;

    let mut out = FeatureMap::new();
    for (key, feature_spec) in spec {
        let rows = examples.iter().enumerate()
            .map(|(index, example)| parse_feature(index, key, example, feature_spec))
            .collect::<Result<Vec<Vec<f64>>>>()?;
        out.insert(key.clone(), Matrix {
            rows: rows.len(),
            cols: feature_spec.width(),
            data: rows,
        });
    }
    Ok(out)
}

fn parse_feature(index: usize, key: &str, example: &Example, spec: &FixedLenFeature) -> Result<Vec<f64>> {
    let malformed = |reason: String| BaselineError::MalformedExample { index, reason };

    let values = match (example.features.get(key), spec.dtype) {
        (None, _) => spec.default_value.clone()
            .ok_or_else(|| malformed(format!("missing required feature {key:?}")))?,
        (Some(Feature::FloatList(v)), DType::Float32) => v.clone(),
        (Some(Feature::Int64List(v)), DType::Int64) => v.iter().map(|&x| x as f64).collect(),
        (Some(other), dtype) => {
            return Err(malformed(format!("feature {key:?} is {other:?}, expected {dtype:?}")));
        }
    };

    if values.len() != spec.width() {
        return Err(malformed(format!(
            "feature {key:?} has {} values, expected {}",
            values.len(),
            spec.width()
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ParsingSpec {
        let mut spec = make_parse_example_spec(&[NumericColumn::new("x", vec![2])]);
        spec.insert("y".into(), FixedLenFeature::new(vec![1], DType::Int64));
        spec
    }

    fn example(x: Vec<f64>, y: i64) -> String {
        Example::new()
            .with_feature("x", Feature::FloatList(x))
            .with_feature("y", Feature::Int64List(vec![y]))
            .serialize_to_string()
            .unwrap()
    }

    #[test]
    fn parses_into_columns() {
        let parsed = parse_examples(&[example(vec![0.0, 0.5], 1), example(vec![1.0, 1.5], 0)], &spec()).unwrap();
        assert_eq!(parsed["x"].data, vec![vec![0.0, 0.5], vec![1.0, 1.5]]);
        assert_eq!(parsed["y"].to_column_vec(), Some(vec![1.0, 0.0]));
    }

    #[test]
    fn wrong_length_is_malformed() {
        let err = parse_examples(&[example(vec![0.0], 1)], &spec());
        assert!(matches!(err, Err(BaselineError::MalformedExample { index: 0, .. })));
    }

    #[test]
    fn wrong_dtype_is_malformed() {
        let s = Example::new()
            .with_feature("x", Feature::Int64List(vec![1, 2]))
            .with_feature("y", Feature::Int64List(vec![1]))
            .serialize_to_string()
            .unwrap();
        assert!(parse_examples(&[s], &spec()).is_err());
    }

    #[test]
    fn missing_feature_uses_default() {
        let mut spec = spec();
        spec.get_mut("y").unwrap().default_value = Some(vec![0.0]);
        let s = Example::new().with_feature("x", Feature::FloatList(vec![1.0, 2.0])).serialize_to_string().unwrap();
        let parsed = parse_examples(&[s], &spec).unwrap();
        assert_eq!(parsed["y"].data, vec![vec![0.0]]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_examples(&["not json".to_string()], &spec()).is_err());
    }
}

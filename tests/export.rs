//! End-to-end flow: train, evaluate, predict, export and serve.

mod common;

use approx::assert_abs_diff_eq;

use common::save_checkpoint;
use ferrite_baseline::export::{Example, Feature, NumericColumn};
use ferrite_baseline::input::{FeatureMap, once};
use ferrite_baseline::metrics::keys;
use ferrite_baseline::{
    build_parsing_serving_input_receiver, make_parse_example_spec, ArrayInput, BaselineError,
    BaselineEstimator, Batch, Labels, Matrix, SavedModel,
};

const N: usize = 40;

fn data() -> (FeatureMap, Vec<Vec<f64>>) {
    let x: Vec<Vec<f64>> = (0..N).map(|i| vec![i as f64, (i * 2) as f64]).collect();
    let labels: Vec<Vec<f64>> = (0..N).map(|i| vec![i as f64 / 10.0, 1.0]).collect();
    (FeatureMap::from([("x".to_string(), Matrix::from_data(x))]), labels)
}

fn serialized_examples(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            Example::new()
                .with_feature("x", Feature::FloatList(vec![i as f64, 0.0]))
                .serialize_to_string()
                .unwrap()
        })
        .collect()
}

#[test]
fn complete_regressor_flow() {
    let model_dir = tempfile::tempdir().unwrap();
    let export_base = tempfile::tempdir().unwrap();
    let (features, labels) = data();
    let input = |epochs| {
        ArrayInput::new(features.clone(), Some(Labels::Dense(Matrix::from_data(labels.clone()))))
            .unwrap()
            .batch_size(N)
            .unwrap()
            .num_epochs(epochs)
    };

    let mut est = BaselineEstimator::regressor(2).unwrap().with_model_dir(model_dir.path());

    // Train.
    est.train_steps(&mut input(None), 200).unwrap();

    // Evaluate.
    let m = est.evaluate(&mut input(Some(1)), None).unwrap();
    assert_eq!(m[keys::GLOBAL_STEP], 200.0);
    assert!(m.contains_key(keys::LOSS));
    assert_abs_diff_eq!(m[keys::LABEL_MEAN], (1.95 + 1.0) / 2.0, epsilon = 1e-9);

    // Predict: every example gets the same output, close to the label means.
    let preds = est.predict(&mut input(Some(1))).unwrap();
    assert_eq!(preds.len(), N);
    let first = preds[0].as_regression().unwrap().predictions.clone();
    assert!(preds.iter().all(|p| p.as_regression().unwrap().predictions == first));
    assert_abs_diff_eq!(first[0], 1.95, epsilon = 0.1);
    assert_abs_diff_eq!(first[1], 1.0, epsilon = 0.1);

    // Export.
    let spec = make_parse_example_spec(&[NumericColumn::new("x", vec![2])]);
    let receiver = build_parsing_serving_input_receiver(spec);
    let export_dir = est.export_saved_model(export_base.path(), &receiver).unwrap();
    assert!(export_dir.join("saved_model.json").is_file());
    assert!(export_dir.file_name().unwrap().to_str().unwrap().parse::<u64>().is_ok());

    // Serve.
    let saved = SavedModel::load(&export_dir).unwrap();
    assert_eq!(saved.global_step, 200);
    let served = saved.predict_serialized(&serialized_examples(3)).unwrap();
    assert_eq!(served.len(), 3);
    assert_eq!(served[0].as_regression().unwrap().predictions, first);
}

#[test]
fn complete_classifier_flow_with_vocabulary() {
    let model_dir = tempfile::tempdir().unwrap();
    let export_base = tempfile::tempdir().unwrap();

    let labels: Vec<String> = (0..N).map(|i| ["low", "mid", "high"][i % 3 / 2 * 2].to_string()).collect();
    let batch = Batch::new()
        .with_feature("x", Matrix::from_data(vec![vec![0.0, 0.0]; N]))
        .with_text_labels(labels);

    let mut est = BaselineEstimator::classifier(3)
        .unwrap()
        .with_model_dir(model_dir.path())
        .with_label_vocabulary(vec!["low".into(), "mid".into(), "high".into()])
        .unwrap();

    est.train_steps(&mut ferrite_baseline::input::repeat(batch.clone()), 100).unwrap();
    let m = est.evaluate(&mut once(batch), None).unwrap();
    assert_eq!(m[keys::GLOBAL_STEP], 100.0);

    let receiver = build_parsing_serving_input_receiver(make_parse_example_spec(&[
        NumericColumn::new("x", vec![2]),
    ]));
    let export_dir = est.export_saved_model(export_base.path(), &receiver).unwrap();
    let served = SavedModel::load(&export_dir).unwrap()
        .predict_serialized(&serialized_examples(1))
        .unwrap();

    let p = served[0].as_classification().unwrap();
    assert_eq!(p.classes, vec!["low".to_string()]);
    assert_eq!(p.all_classes, vec!["low".to_string(), "mid".to_string(), "high".to_string()]);
    assert!(p.probabilities[1] < p.probabilities[2]);
}

#[test]
fn repeated_exports_get_distinct_directories() {
    let model_dir = tempfile::tempdir().unwrap();
    let export_base = tempfile::tempdir().unwrap();
    save_checkpoint(model_dir.path(), &[1.0], 5);

    let est = BaselineEstimator::regressor(1).unwrap().with_model_dir(model_dir.path());
    let receiver = build_parsing_serving_input_receiver(make_parse_example_spec(&[
        NumericColumn::new("x", vec![1]),
    ]));
    let a = est.export_saved_model(export_base.path(), &receiver).unwrap();
    let b = est.export_saved_model(export_base.path(), &receiver).unwrap();
    assert_ne!(a, b);
    assert!(!std::fs::read_dir(export_base.path()).unwrap().any(|e| {
        e.unwrap().file_name().to_string_lossy().starts_with("temp-")
    }));
}

#[test]
fn export_requires_a_checkpoint() {
    let model_dir = tempfile::tempdir().unwrap();
    let export_base = tempfile::tempdir().unwrap();

    let est = BaselineEstimator::regressor(1).unwrap().with_model_dir(model_dir.path());
    let receiver = build_parsing_serving_input_receiver(make_parse_example_spec(&[]));
    let err = est.export_saved_model(export_base.path(), &receiver);
    assert!(matches!(err, Err(BaselineError::MissingCheckpoint(_))));
}

#[test]
fn serving_rejects_malformed_examples() {
    let model_dir = tempfile::tempdir().unwrap();
    let export_base = tempfile::tempdir().unwrap();
    save_checkpoint(model_dir.path(), &[1.0], 5);

    let est = BaselineEstimator::regressor(1).unwrap().with_model_dir(model_dir.path());
    let receiver = build_parsing_serving_input_receiver(make_parse_example_spec(&[
        NumericColumn::new("x", vec![1]),
    ]));
    let saved = SavedModel::load(est.export_saved_model(export_base.path(), &receiver).unwrap()).unwrap();

    let wrong_width = Example::new()
        .with_feature("x", Feature::FloatList(vec![1.0, 2.0]))
        .serialize_to_string()
        .unwrap();
    let err = saved.predict_serialized(&["not json".to_string(), wrong_width]);
    assert!(matches!(err, Err(BaselineError::MalformedExample { index: 0, .. })));
}

//! Names of the entries in an evaluation metrics bundle.

pub const LOSS: &str = "loss";
pub const LOSS_MEAN: &str = "average_loss";
pub const PREDICTION_MEAN: &str = "prediction/mean";
pub const LABEL_MEAN: &str = "label/mean";
pub const ACCURACY: &str = "accuracy";
pub const ACCURACY_BASELINE: &str = "accuracy_baseline";
pub const PRECISION: &str = "precision";
pub const RECALL: &str = "recall";
pub const AUC: &str = "auc";
pub const AUC_PR: &str = "auc_precision_recall";
pub const GLOBAL_STEP: &str = "global_step";

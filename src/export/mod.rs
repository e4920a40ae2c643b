pub mod parsing;
pub mod saved_model;

pub use parsing::{
    make_parse_example_spec, parse_examples, DType, Example, Feature, FixedLenFeature,
    NumericColumn, ParsingSpec,
};
pub use saved_model::{build_parsing_serving_input_receiver, SavedModel, ServingInputReceiver};

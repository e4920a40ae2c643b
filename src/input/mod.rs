pub mod batch;
pub mod input_fn;
pub mod array_input;

pub use batch::{Batch, FeatureMap, Labels};
pub use input_fn::{once, repeat, InputFn};
pub use array_input::ArrayInput;

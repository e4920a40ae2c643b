use crate::input::batch::Batch;

/// Supplies batches to `train`, `evaluate` and `predict`.
///
/// Returning `None` signals the end of input. Any `FnMut() -> Option<Batch>`
/// closure is an `InputFn`, so a constant batch can be fed with
/// `|| Some(batch.clone())`.
pub trait InputFn {
    fn next_batch(&mut self) -> Option<Batch>;
}

impl<F> InputFn for F
where
    F: FnMut() -> Option<Batch>,
{
    fn next_batch(&mut self) -> Option<Batch> {
        self()
    }
}

/// Yields `batch` exactly once.
pub fn once(batch: Batch) -> impl InputFn {
    let mut batch = Some(batch);
    move || batch.take()
}

/// Yields clones of `batch` forever.
pub fn repeat(batch: Batch) -> impl InputFn {
    move || Some(batch.clone())
}

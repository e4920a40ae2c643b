use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{BaselineError, Result};
use crate::input::batch::{Batch, FeatureMap, Labels};
use crate::input::input_fn::InputFn;

/// Batches in-memory arrays, optionally shuffling every epoch.
///
/// `num_epochs = None` repeats the data forever; the caller then bounds the
/// run with a step count. The last batch of an epoch may be smaller than
/// `batch_size`.
pub struct ArrayInput {
    source: Batch,
    n: usize,
    batch_size: usize,
    num_epochs: Option<usize>,
    shuffle: bool,
    rng: StdRng,
    order: Vec<usize>,
    cursor: usize,
    epoch: usize,
}

impl ArrayInput {
    pub fn new(features: FeatureMap, labels: Option<Labels>) -> Result<Self> {
        let source = Batch { features, labels };
        let n = source.batch_size()?;
        Ok(ArrayInput {
            source,
            n,
            batch_size: 128,
            num_epochs: Some(1),
            shuffle: false,
            rng: StdRng::from_entropy(),
            order: (0..n).collect(),
            cursor: 0,
            epoch: 0,
        })
    }

    pub fn batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(BaselineError::InvalidConfig("batch_size must be at least 1".into()));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    pub fn num_epochs(mut self, num_epochs: Option<usize>) -> Self {
        self.num_epochs = num_epochs;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        if shuffle {
            self.order.shuffle(&mut self.rng);
        }
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.order = (0..self.n).collect();
        if self.shuffle {
            self.order.shuffle(&mut self.rng);
        }
        self
    }
}

impl InputFn for ArrayInput {
    fn next_batch(&mut self) -> Option<Batch> {
        if self.cursor >= self.n {
            self.epoch += 1;
            self.cursor = 0;
            if self.shuffle {
                self.order.shuffle(&mut self.rng);
            }
            debug!("input epoch {} finished", self.epoch);
        }
        if self.num_epochs.is_some_and(|limit| self.epoch >= limit) {
            return None;
        }

        let end = (self.cursor + self.batch_size).min(self.n);
        let batch = self.source.select(&self.order[self.cursor..end]);
        self.cursor = end;
        Some(batch)
    }
}

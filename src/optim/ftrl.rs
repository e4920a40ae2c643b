use std::collections::BTreeMap;

use crate::optim::optimizer::Optimizer;

const ACCUMULATOR_SLOT: &str = "Ftrl";
const LINEAR_SLOT: &str = "Ftrl_1";

/// Follow-the-regularized-leader with per-coordinate learning rates
/// (learning-rate power −0.5).
pub struct Ftrl {
    pub learning_rate: f64,
    pub l1: f64,
    pub l2: f64,
    accumulator: Vec<f64>,
    linear: Vec<f64>,
}

impl Ftrl {
    pub const DEFAULT_LEARNING_RATE: f64 = 0.3;
    pub const INITIAL_ACCUMULATOR: f64 = 0.1;

    pub fn new(learning_rate: f64, n_params: usize) -> Ftrl {
        Ftrl {
            learning_rate,
            l1: 0.0,
            l2: 0.0,
            accumulator: vec![Ftrl::INITIAL_ACCUMULATOR; n_params],
            linear: vec![0.0; n_params],
        }
    }

    pub fn with_regularization(mut self, l1: f64, l2: f64) -> Ftrl {
        self.l1 = l1;
        self.l2 = l2;
        self
    }
}

impl Optimizer for Ftrl {
    fn name(&self) -> &str {
        "Ftrl"
    }

    fn apply_gradients(&mut self, _loss: f64, params: &mut [f64], grads: &[f64]) {
        let lr = self.learning_rate;
        for (i, (p, &g)) in params.iter_mut().zip(grads).enumerate() {
            let n = self.accumulator[i];
            let n_new = n + g * g;
            let sigma = (n_new.sqrt() - n.sqrt()) / lr;
            self.linear[i] += g - sigma * *p;
            self.accumulator[i] = n_new;

            let z = self.linear[i];
            let quadratic = n_new.sqrt() / lr + 2.0 * self.l2;
            *p = if z.abs() > self.l1 {
                (self.l1 * z.signum() - z) / quadratic
            } else {
                0.0
            };
        }
    }

    fn slots(&self) -> BTreeMap<String, Vec<f64>> {
        BTreeMap::from([
            (ACCUMULATOR_SLOT.to_string(), self.accumulator.clone()),
            (LINEAR_SLOT.to_string(), self.linear.clone()),
        ])
    }

    fn restore_slots(&mut self, slots: &BTreeMap<String, Vec<f64>>) {
        let n = self.accumulator.len();
        self.accumulator = match slots.get(ACCUMULATOR_SLOT) {
            Some(acc) if acc.len() == n => acc.clone(),
            _ => vec![Ftrl::INITIAL_ACCUMULATOR; n],
        };
        self.linear = match slots.get(LINEAR_SLOT) {
            Some(lin) if lin.len() == n => lin.clone(),
            _ => vec![0.0; n],
        };
    }
}

/// Streaming weighted mean: Σ w·x / Σ w, 0 while no weight has been seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedMean {
    total: f64,
    weight: f64,
}

impl WeightedMean {
    pub fn update(&mut self, value: f64, weight: f64) {
        self.total += weight * value;
        self.weight += weight;
    }

    pub fn result(&self) -> f64 {
        if self.weight > 0.0 { self.total / self.weight } else { 0.0 }
    }
}

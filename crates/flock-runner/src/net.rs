//! Fixed-topology feed-forward controller: 3 inputs → H hidden (tanh) → 1 output (sigmoid).

use rand::Rng;

use flock_core::controller::{Controller, OBSERVATION_LEN, Observation};

#[derive(Debug, Clone, PartialEq)]
pub struct FeedForward {
    /// Input→hidden weights, row-major by input.
    w_ih: Vec<f32>,
    b_h: Vec<f32>,
    w_ho: Vec<f32>,
    b_o: f32,
    /// Observations are divided by this before the first layer.
    input_scale: f32,
}

impl FeedForward {
    #[cfg(test)]
    pub fn weight_count(hidden: usize) -> usize {
        OBSERVATION_LEN * hidden + hidden + hidden + 1
    }

    /// Build from a flat parameter list in `w_ih, b_h, w_ho, b_o` order.
    /// `None` if the iterator runs short.
    #[cfg(test)]
    pub fn from_weights(
        hidden: usize,
        input_scale: f32,
        mut weights: impl Iterator<Item = f32>,
    ) -> Option<Self> {
        let mut take = |n: usize| -> Option<Vec<f32>> {
            let chunk: Vec<f32> = weights.by_ref().take(n).collect();
            (chunk.len() == n).then_some(chunk)
        };
        let w_ih = take(OBSERVATION_LEN * hidden)?;
        let b_h = take(hidden)?;
        let w_ho = take(hidden)?;
        let b_o = take(1)?.first().copied()?;
        Some(Self {
            w_ih,
            b_h,
            w_ho,
            b_o,
            input_scale,
        })
    }

    /// Uniform weights in [-1, 1).
    pub fn random<R: Rng + ?Sized>(rng: &mut R, hidden: usize, input_scale: f32) -> Self {
        let w_ih = (0..OBSERVATION_LEN * hidden)
            .map(|_| rng.random_range(-1.0..1.0))
            .collect();
        let b_h = (0..hidden).map(|_| rng.random_range(-1.0..1.0)).collect();
        let w_ho = (0..hidden).map(|_| rng.random_range(-1.0..1.0)).collect();
        Self {
            w_ih,
            b_h,
            w_ho,
            b_o: rng.random_range(-1.0..1.0),
            input_scale,
        }
    }

    pub fn hidden(&self) -> usize {
        self.b_h.len()
    }

    pub fn forward(&self, input: &[f32; OBSERVATION_LEN]) -> f32 {
        let hidden = self.hidden();
        let mut h = self.b_h.clone();
        for (i, &x) in input.iter().enumerate() {
            let x = x / self.input_scale;
            let row = &self.w_ih[i * hidden..(i + 1) * hidden];
            for (acc, &w) in h.iter_mut().zip(row) {
                *acc += x * w;
            }
        }

        let out = h
            .iter()
            .zip(&self.w_ho)
            .fold(self.b_o, |acc, (&h, &w)| acc + h.tanh() * w);
        sigmoid(out)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl Controller for FeedForward {
    fn decide(&self, observation: &Observation) -> f32 {
        self.forward(&observation.as_array())
    }
}

//! Injected randomness.
//!
//! Generation draws every random number through [`RandomSource`] so tests can
//! replay exact choices. Any `rand` generator is a source.

use rand::RngCore;

pub trait RandomSource {
    /// A uniform sample from `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// A uniform integer in `0..n`. `n` must be positive.
    fn below(&mut self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n - 1)
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.below(items.len()))
        }
    }
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        rand::Rng::gen::<f64>(self)
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    samples: Vec<f64>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples, next: 0 }
    }

    pub fn constant(sample: f64) -> Self {
        Self::new(vec![sample])
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sample = self.samples[self.next % self.samples.len()];
        self.next += 1;
        sample
    }
}

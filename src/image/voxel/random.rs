//! Random source for per-cell size jitter.

use rand::{Rng, SeedableRng, rngs::StdRng, rngs::ThreadRng};

/// Uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn uniform(&mut self) -> f64;
}

/// Unseeded thread-local generator (the default).
pub struct ThreadRandom(ThreadRng);

impl Default for ThreadRandom {
    fn default() -> Self {
        Self(rand::rng())
    }
}

impl RandomSource for ThreadRandom {
    fn uniform(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Seeded generator, for reproducible jitter (`--seed`).
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Pick the seeded generator when a seed is given.
pub fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom::default()),
    }
}

/// Replays a fixed sequence of samples, cycling when exhausted.
#[cfg(test)]
pub struct FixedRandom {
    samples: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl FixedRandom {
    pub fn new(samples: &[f64]) -> Self {
        assert!(!samples.is_empty());
        Self {
            samples: samples.to_vec(),
            next: 0,
        }
    }

    /// Number of samples drawn so far.
    pub fn drawn(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
impl RandomSource for FixedRandom {
    fn uniform(&mut self) -> f64 {
        let value = self.samples[self.next % self.samples.len()];
        self.next += 1;
        value
    }
}

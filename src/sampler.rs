// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Syntropic Grid Simulation Suite - Random Sources

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Amplitude of the per-node queue perturbation: noise ∈ [-0.1, 0.1).
pub const NOISE_AMPLITUDE: f64 = 0.1;
/// Upper bound of the flow-count and bandwidth jitter draws.
pub const JITTER_SPAN: f64 = 5.0;

/// Random draws consumed by the metrics generator, one call per node per tick.
///
/// Production code wraps a real RNG in [`RngSampler`]; tests pin the draws
/// with [`FixedSampler`] to reproduce exact snapshots.
pub trait NoiseSampler {
    /// Stochastic forcing term, uniform in [-0.1, 0.1).
    fn queue_noise(&mut self) -> f64;
    /// Uniform in [0, 1); the correction coin succeeds above 0.7.
    fn correction_roll(&mut self) -> f64;
    /// Uniform in [0, 5), added to the flow sinusoid.
    fn flow_jitter(&mut self) -> f64;
    /// Uniform in [0, 5), added to bandwidth usage.
    fn bandwidth_jitter(&mut self) -> f64;
}

impl<S: NoiseSampler + ?Sized> NoiseSampler for Box<S> {
    fn queue_noise(&mut self) -> f64 { (**self).queue_noise() }
    fn correction_roll(&mut self) -> f64 { (**self).correction_roll() }
    fn flow_jitter(&mut self) -> f64 { (**self).flow_jitter() }
    fn bandwidth_jitter(&mut self) -> f64 { (**self).bandwidth_jitter() }
}

// ─── RngSampler ──────────────────────────────────────────────────────────────

pub struct RngSampler<R: Rng> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSampler<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> NoiseSampler for RngSampler<R> {
    fn queue_noise(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * 2.0 * NOISE_AMPLITUDE
    }

    fn correction_roll(&mut self) -> f64 {
        self.rng.gen()
    }

    fn flow_jitter(&mut self) -> f64 {
        self.rng.gen::<f64>() * JITTER_SPAN
    }

    fn bandwidth_jitter(&mut self) -> f64 {
        self.rng.gen::<f64>() * JITTER_SPAN
    }
}

// ─── FixedSampler ────────────────────────────────────────────────────────────

/// Returns the same draw every time. Used to replay exact scenarios.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedSampler {
    pub noise: f64,
    pub roll: f64,
    pub flow_jitter: f64,
    pub bandwidth_jitter: f64,
}

impl FixedSampler {
    /// All draws at zero: no perturbation, coin never succeeds.
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn with_noise(noise: f64) -> Self {
        Self { noise, ..Self::default() }
    }

    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }
}

impl NoiseSampler for FixedSampler {
    fn queue_noise(&mut self) -> f64 { self.noise }
    fn correction_roll(&mut self) -> f64 { self.roll }
    fn flow_jitter(&mut self) -> f64 { self.flow_jitter }
    fn bandwidth_jitter(&mut self) -> f64 { self.bandwidth_jitter }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_draws_stay_in_range() {
        let mut s = RngSampler::seeded(42);
        for _ in 0..10_000 {
            let n = s.queue_noise();
            assert!((-NOISE_AMPLITUDE..NOISE_AMPLITUDE).contains(&n), "noise {} out of range", n);
            let r = s.correction_roll();
            assert!((0.0..1.0).contains(&r));
            assert!((0.0..JITTER_SPAN).contains(&s.flow_jitter()));
            assert!((0.0..JITTER_SPAN).contains(&s.bandwidth_jitter()));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RngSampler::seeded(7);
        let mut b = RngSampler::seeded(7);
        for _ in 0..100 {
            assert_eq!(a.queue_noise(), b.queue_noise());
            assert_eq!(a.correction_roll(), b.correction_roll());
        }
    }
}

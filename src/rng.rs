//! Call-scoped random number generation for reproducible synthesis.
//!
//! Every generator invocation owns its own [`NoiseSource`], seeded either from
//! OS entropy or from an explicit `u64`. There is deliberately no process-wide
//! generator: concurrent calls never share random state, and identical seeds
//! reproduce identical series bit for bit.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::f64::consts::PI;

/// Seedable noise source backing the fBm generator.
///
/// Wraps a ChaCha20 stream and layers a Box-Muller transform on top for
/// standard-normal draws. The transform produces values in pairs; the spare
/// value is cached so consecutive draws consume uniform inputs at half rate.
#[derive(Clone)]
pub struct NoiseSource {
    rng: ChaCha20Rng,
    /// Cached second output of the last Box-Muller pair.
    spare_normal: Option<f64>,
}

impl NoiseSource {
    /// Create a noise source seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
            spare_normal: None,
        }
    }

    /// Create a noise source with a specific seed for reproducibility.
    ///
    /// The `u64` is cryptographically expanded to the full 256-bit ChaCha20
    /// seed, so nearby seeds produce unrelated streams.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            spare_normal: None,
        }
    }

    /// Generate a standard-normal draw via the Box-Muller transform.
    pub fn standard_normal(&mut self) -> f64 {
        if let Some(spare) = self.spare_normal.take() {
            return spare;
        }

        // u is kept away from 0 so ln(u) stays finite.
        let mut u = self.rng.gen::<f64>();
        while u <= f64::MIN_POSITIVE {
            u = self.rng.gen::<f64>();
        }
        let v = self.rng.gen::<f64>();

        let mag = (-2.0 * u.ln()).sqrt();
        let angle = 2.0 * PI * v;

        self.spare_normal = Some(mag * angle.sin());
        mag * angle.cos()
    }

    /// Fill a buffer with independent standard-normal draws.
    pub fn fill_standard_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.standard_normal();
        }
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new()
    }
}

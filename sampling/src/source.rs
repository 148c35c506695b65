use std::f64::consts::TAU;
use std::time::{SystemTime, UNIX_EPOCH};

use rand_core::RngCore;

use crate::poisson::PoissonTable;

/// Output scrambling constant of the xorshift* generator.
pub const XORSHIFT_STAR_MUL: u64 = 2685821657736338717;

/// Seed used when the wall clock cannot provide one.
pub const FALLBACK_SEED: u64 = 234;

// 2^-64
const U64_TO_UNIT: f64 = 5.42101086242752217E-20;
// Largest f64 strictly below one.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;
const LOG_FLOOR: f64 = 1.0e-30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStatus {
    Ok,
    /// The clock could not seed the generator; the fixed fallback seed is in
    /// use and every run repeats the same sequence.
    Degraded,
}

/// Uniform, Gaussian and Poisson variates from a private 64-bit state.
///
/// One engine is one stream: methods take `&mut self` and the type is
/// deliberately not `Clone`. Use [`RngEngine::branch`] or
/// [`crate::SeedSequence`] to derive independent streams for workers or
/// frozen-phonon configurations.
#[derive(Debug)]
pub struct RngEngine {
    state: u64,
    init_seed: u64,
    status: SeedStatus,
    pub(crate) poisson: PoissonTable,
}

impl RngEngine {
    /// A non-zero `seed` gives a repeatable sequence; zero seeds from the
    /// wall clock.
    pub fn new(seed: u64) -> Self {
        if seed == 0 {
            return Self::from_clock();
        }
        Self::with_state(seed, SeedStatus::Ok)
    }

    pub fn from_clock() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) if elapsed.as_secs() != 0 => Self::with_state(elapsed.as_secs(), SeedStatus::Ok),
            _ => {
                tracing::warn!(seed = FALLBACK_SEED, "cannot seed from system time, using fixed fallback seed");
                Self::with_state(FALLBACK_SEED, SeedStatus::Degraded)
            }
        }
    }

    fn with_state(seed: u64, status: SeedStatus) -> Self {
        debug_assert!(seed != 0);
        Self {
            state: seed,
            init_seed: seed,
            status,
            poisson: PoissonTable::new(),
        }
    }

    pub fn init_seed(&self) -> u64 {
        self.init_seed
    }

    pub fn status(&self) -> SeedStatus {
        self.status
    }

    /// Overwrites the running state. Diagnostics only: the sequence no longer
    /// follows from [`RngEngine::init_seed`].
    pub fn reset_seed(&mut self, seed: u64) {
        if seed == 0 {
            tracing::warn!("zero seed rejected, using fallback seed {FALLBACK_SEED}");
            self.state = FALLBACK_SEED;
        } else {
            self.state = seed;
        }
    }

    /// Derives an independent engine seeded from this stream.
    pub fn branch(&mut self) -> RngEngine {
        let mut seed: u64 = self.next_u64();
        while seed == 0 {
            seed = self.next_u64();
        }
        RngEngine::new(seed)
    }

    #[inline(always)]
    fn step(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(XORSHIFT_STAR_MUL)
    }

    /// Uniform variate in the open interval (0, 1).
    #[inline(always)]
    pub fn ranflat(&mut self) -> f64 {
        (U64_TO_UNIT * self.step() as f64).min(BELOW_ONE)
    }

    /// Normal variate with zero mean and unit variance (Box-Muller, cosine
    /// branch only).
    pub fn rangauss(&mut self) -> f64 {
        let (x1, x2) = loop {
            let x1: f64 = self.ranflat();
            let x2: f64 = self.ranflat();
            if x1 >= LOG_FLOOR && x2 >= LOG_FLOOR {
                break (x1, x2);
            }
        };
        (-2.0 * x1.ln()).sqrt() * (TAU * x2).cos()
    }
}

impl RngCore for RngEngine {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dst)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn moments(values: &[f64]) -> (f64, f64) {
        let n: f64 = values.len() as f64;
        let mean: f64 = values.iter().sum::<f64>() / n;
        let var: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    #[test]
    fn ranflat_stays_in_open_unit_interval() {
        let mut rng: RngEngine = RngEngine::new(12345);
        let draws: Vec<f64> = (0..1_000_000).map(|_| rng.ranflat()).collect();
        assert!(draws.iter().all(|&x| x > 0.0 && x < 1.0));
        let (mean, var) = moments(&draws);
        assert!((mean - 0.5).abs() < 0.002, "mean={mean}");
        assert!((var - 1.0 / 12.0).abs() < 0.002, "var={var}");
        assert_ne!(rng.state, 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a: RngEngine = RngEngine::new(987654321);
        let mut b: RngEngine = RngEngine::new(987654321);
        (0..1000).for_each(|_| assert_eq!(a.ranflat().to_bits(), b.ranflat().to_bits()));
        assert_eq!(a.init_seed(), 987654321);
        assert_eq!(a.status(), SeedStatus::Ok);
    }

    #[test]
    fn first_draw_matches_reference_update() {
        let mut rng: RngEngine = RngEngine::new(1);
        let mut s: u64 = 1;
        s ^= s >> 12;
        s ^= s << 25;
        s ^= s >> 27;
        let expected: f64 = 5.42101086242752217E-20 * (s.wrapping_mul(2685821657736338717) as f64);
        assert_eq!(rng.ranflat(), expected);
    }

    #[test]
    fn rangauss_moments() {
        let mut rng: RngEngine = RngEngine::new(42);
        let draws: Vec<f64> = (0..400_000).map(|_| rng.rangauss()).collect();
        let (mean, var) = moments(&draws);
        assert!(mean.abs() < 0.01, "mean={mean}");
        assert!((var - 1.0).abs() < 0.02, "var={var}");
    }

    #[test]
    fn clock_seed_is_nonzero() {
        let rng: RngEngine = RngEngine::new(0);
        assert_ne!(rng.init_seed(), 0);
        assert_eq!(rng.status(), SeedStatus::Ok);
    }

    #[test]
    fn reset_seed_rejects_zero() {
        let mut rng: RngEngine = RngEngine::new(77);
        rng.reset_seed(0);
        let x: f64 = rng.ranflat();
        assert!(x > 0.0 && x < 1.0);
        assert_eq!(rng.init_seed(), 77);

        let mut a: RngEngine = RngEngine::new(5);
        let mut b: RngEngine = RngEngine::new(9);
        b.reset_seed(5);
        assert_eq!(a.ranflat(), b.ranflat());
    }

    #[test]
    fn branches_diverge() {
        let mut root: RngEngine = RngEngine::new(31);
        let mut a: RngEngine = root.branch();
        let mut b: RngEngine = root.branch();
        assert_ne!(a.init_seed(), b.init_seed());
        let same: usize = (0..100).filter(|_| a.ranflat() == b.ranflat()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn usable_as_rng_core() {
        let mut rng: RngEngine = RngEngine::new(2024);
        let mean: f64 = (0..100_000).map(|_| rng.random::<f64>()).sum::<f64>() / 100_000.0;
        assert!((mean - 0.5).abs() < 0.01);
        let mut bytes: [u8; 13] = [0u8; 13];
        rng.fill_bytes(&mut bytes);
        assert!(bytes.iter().any(|&b| b != 0));
    }
}

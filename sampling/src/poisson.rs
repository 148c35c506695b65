use std::f64::consts::PI;

use crate::source::RngEngine;

const LNF_LEN: usize = 256;

/// Means at or above this use the rejection method.
pub const SMALL_MEAN_LIMIT: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LargeMean {
    alpha: f64,
    beta: f64,
    k: f64,
}

/// Poisson working set: `ln(n!)` for small `n` and the constants of the last
/// requested mean.
#[derive(Debug, Clone)]
pub(crate) struct PoissonTable {
    lnf: [f64; LNF_LEN],
    mean: f64,
    exp_neg_mean: f64,
    large: LargeMean,
}

impl PoissonTable {
    pub(crate) fn new() -> Self {
        let mut lnf: [f64; LNF_LEN] = [0.0; LNF_LEN];
        (2..LNF_LEN).for_each(|i| lnf[i] = lnf[i - 1] + (i as f64).ln());
        Self {
            lnf,
            mean: -100.0,
            exp_neg_mean: 0.0,
            large: LargeMean::default(),
        }
    }

    // A mean selects exactly one branch, so one cache key serves both sets.
    fn exp_neg_mean(&mut self, mean: f64) -> f64 {
        if self.mean != mean {
            self.mean = mean;
            self.exp_neg_mean = (-mean).exp();
        }
        self.exp_neg_mean
    }

    fn large_mean(&mut self, mean: f64) -> LargeMean {
        if self.mean != mean {
            self.mean = mean;
            let beta: f64 = PI / (3.0 * mean).sqrt();
            let c: f64 = 0.767 - 3.36 / mean;
            self.large = LargeMean {
                alpha: beta * mean,
                beta,
                k: c.ln() - mean - beta.ln(),
            };
        }
        self.large
    }

    /// `ln(n!)`, Stirling series past the table.
    pub(crate) fn ln_factorial(&self, n: u64) -> f64 {
        if n < (LNF_LEN - 1) as u64 {
            self.lnf[n as usize]
        } else {
            let x: f64 = n as f64;
            0.5 * (2.0 * PI).ln() + (x + 0.5) * x.ln() - x + 1.0 / (12.0 * x)
        }
    }
}

impl RngEngine {
    /// Poisson variate with the given mean; zero for `mean <= 0`.
    ///
    /// Multiplication method below [`SMALL_MEAN_LIMIT`], Atkinson's PA
    /// rejection with a logistic envelope above (A. C. Atkinson, Applied
    /// Statistics 28 (1979) 29-35).
    pub fn ran_poisson(&mut self, mean: f64) -> u64 {
        if !(mean > 0.0) {
            return 0;
        }
        if mean < SMALL_MEAN_LIMIT {
            self.poisson_small(mean)
        } else {
            self.poisson_large(mean)
        }
    }

    fn poisson_small(&mut self, mean: f64) -> u64 {
        let limit: f64 = self.poisson.exp_neg_mean(mean);
        let mut n: u64 = 0;
        let mut s: f64 = self.ranflat();
        while s >= limit {
            n += 1;
            s *= self.ranflat();
        }
        n
    }

    fn poisson_large(&mut self, mean: f64) -> u64 {
        let LargeMean { alpha, beta, k } = self.poisson.large_mean(mean);
        let ln_mean: f64 = mean.ln();
        loop {
            let x: f64 = loop {
                let u1: f64 = self.ranflat();
                let x: f64 = (alpha - ((1.0 - u1) / u1).ln()) / beta;
                if x >= -0.5 {
                    break x;
                }
            };
            let n: i64 = (x + 0.5) as i64;
            let u2: f64 = self.ranflat();
            let y: f64 = alpha - beta * x;
            let temp: f64 = 1.0 + y.exp();
            let lhs: f64 = y + (u2 / (temp * temp)).ln();
            if n < 0 {
                continue;
            }
            let rhs: f64 = k + n as f64 * ln_mean - self.poisson.ln_factorial(n as u64);
            if lhs <= rhs {
                return n as u64;
            }
        }
    }
}

use std::fmt;
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use rustfft::{Fft, FftPlanner, FftPlannerScalar, num_complex::Complex32};

use crate::fft2d::{self, ZERO};
use crate::{Error, Result, checked_len};

/// Plan construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanMode {
    /// Slow setup: runtime SIMD kernel selection plus one warm-up pass,
    /// for faster repeated execution.
    #[default]
    Measured,
    /// Fast setup with portable scalar kernels.
    Estimate,
}

impl PlanMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "measure" | "measured" => Some(PlanMode::Measured),
            "estimate" => Some(PlanMode::Estimate),
            _ => None,
        }
    }
}

/// Initialization level of a buffer's transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLevel {
    Uninitialized,
    Estimate,
    Measured,
}

struct AxisPlan {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

/// Immutable 2-D transform plan for one `nx x ny` geometry.
///
/// Buffers hold it behind an `Arc`, so any number of equally sized buffers
/// (real/half-spectrum and full complex alike) can execute the same plan
/// without rebuilding it. Passes run on the plan's own worker pool.
pub struct TransformPlan {
    nx: usize,
    ny: usize,
    mode: PlanMode,
    threads: usize,
    x: AxisPlan,
    y: AxisPlan,
    pool: ThreadPool,
}

impl TransformPlan {
    pub fn new(nx: usize, ny: usize, mode: PlanMode, threads: usize) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(Error::Unallocated("TransformPlan::new()"));
        }
        let threads: usize = threads.max(1);

        let (x, y) = match mode {
            PlanMode::Measured => {
                let mut planner: FftPlanner<f32> = FftPlanner::new();
                (
                    AxisPlan {
                        forward: planner.plan_fft_forward(nx),
                        inverse: planner.plan_fft_inverse(nx),
                    },
                    AxisPlan {
                        forward: planner.plan_fft_forward(ny),
                        inverse: planner.plan_fft_inverse(ny),
                    },
                )
            }
            PlanMode::Estimate => {
                let mut planner: FftPlannerScalar<f32> = FftPlannerScalar::new();
                (
                    AxisPlan {
                        forward: planner.plan_fft_forward(nx),
                        inverse: planner.plan_fft_inverse(nx),
                    },
                    AxisPlan {
                        forward: planner.plan_fft_forward(ny),
                        inverse: planner.plan_fft_inverse(ny),
                    },
                )
            }
        };

        let pool: ThreadPool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("transform-{i}"))
            .build()
            .map_err(|err| Error::ThreadPool(err.to_string()))?;

        let plan: TransformPlan = Self {
            nx,
            ny,
            mode,
            threads,
            x,
            y,
            pool,
        };

        if mode == PlanMode::Measured {
            plan.warm_up()?;
        }

        tracing::debug!(nx, ny, ?mode, threads, "built transform plan");
        Ok(plan)
    }

    /// One forward/inverse pair on a zero buffer; starts the worker pool.
    fn warm_up(&self) -> Result<()> {
        let len: usize = checked_len(self.nx, self.ny)?;
        let mut probe: Vec<Complex32> = crate::try_alloc(len, ZERO, self.nx, self.ny)?;
        self.c2c_forward(&mut probe);
        self.c2c_inverse(&mut probe);
        Ok(())
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn mode(&self) -> PlanMode {
        self.mode
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn level(&self) -> PlanLevel {
        match self.mode {
            PlanMode::Measured => PlanLevel::Measured,
            PlanMode::Estimate => PlanLevel::Estimate,
        }
    }

    pub fn matches(&self, nx: usize, ny: usize) -> bool {
        self.nx == nx && self.ny == ny
    }

    pub(crate) fn r2c(&self, real: &[f32], half: &mut [Complex32]) {
        self.pool
            .install(|| fft2d::r2c(real, half, self.ny, &*self.x.forward, &*self.y.forward));
    }

    pub(crate) fn c2r(&self, half: &[Complex32], real: &mut [f32], scale: f32) {
        self.pool
            .install(|| fft2d::c2r(half, real, self.ny, scale, &*self.x.inverse, &*self.y.inverse));
    }

    pub(crate) fn c2c_forward(&self, data: &mut [Complex32]) {
        self.pool.install(|| {
            fft2d::rows(data, &*self.y.forward);
            fft2d::columns(data, self.nx, self.ny, &*self.x.forward);
        });
    }

    pub(crate) fn c2c_inverse(&self, data: &mut [Complex32]) {
        self.pool.install(|| {
            fft2d::rows(data, &*self.y.inverse);
            fft2d::columns(data, self.nx, self.ny, &*self.x.inverse);
        });
    }
}

impl fmt::Debug for TransformPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPlan")
            .field("nx", &self.nx)
            .field("ny", &self.ny)
            .field("mode", &self.mode)
            .field("threads", &self.threads)
            .finish()
    }
}

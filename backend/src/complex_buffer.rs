use std::fmt;
use std::sync::Arc;

use itertools::izip;
use num_complex::Complex32;
use rayon::prelude::*;
use utils::{Severity, message};

use crate::fft2d::ZERO;
use crate::{Error, PlanConfig, PlanLevel, PlanMode, Result, TransformPlan, checked_len, try_alloc};

/// Full complex `nx x ny` image with complex-to-complex transforms.
///
/// Both directions are unnormalized: a forward/inverse pair multiplies the
/// data by `nx*ny`. Pipelines fold the `1/(nx*ny)` into the bandwidth limit.
#[derive(Default, Clone)]
pub struct ComplexBuffer {
    nx: usize,
    ny: usize,
    data: Vec<Complex32>,
    plan: Option<Arc<TransformPlan>>,
}

impl ComplexBuffer {
    pub fn new(nx: usize, ny: usize) -> Result<Self> {
        let mut buf: ComplexBuffer = Self::default();
        buf.resize(nx, ny)?;
        Ok(buf)
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn resize(&mut self, nx: usize, ny: usize) -> Result<()> {
        if nx == self.nx && ny == self.ny {
            return Ok(());
        }
        self.data = Vec::new();
        self.plan = None;
        self.nx = 0;
        self.ny = 0;
        if nx == 0 || ny == 0 {
            return Ok(());
        }

        match checked_len(nx, ny).and_then(|len| try_alloc(len, ZERO, nx, ny)) {
            Ok(data) => {
                self.data = data;
                self.nx = nx;
                self.ny = ny;
                Ok(())
            }
            Err(err) => {
                message(Severity::Fatal, &format!("ComplexBuffer::resize(): {err}"));
                Err(err)
            }
        }
    }

    pub fn init(&mut self, mode: PlanMode, threads: usize) -> Result<()> {
        if self.is_empty() {
            return Err(Error::Unallocated("init()"));
        }
        self.plan = Some(Arc::new(TransformPlan::new(self.nx, self.ny, mode, threads)?));
        Ok(())
    }

    pub fn init_with(&mut self, config: &PlanConfig) -> Result<()> {
        self.init(config.mode, config.threads)
    }

    pub fn level(&self) -> PlanLevel {
        self.plan
            .as_ref()
            .map_or(PlanLevel::Uninitialized, |plan| plan.level())
    }

    pub fn plan(&self) -> Option<&Arc<TransformPlan>> {
        self.plan.as_ref()
    }

    pub fn share_plan(&mut self, plan: &Arc<TransformPlan>) -> bool {
        if !plan.matches(self.nx, self.ny) {
            return false;
        }
        self.plan = Some(Arc::clone(plan));
        true
    }

    pub fn copy_init(&mut self, other: &ComplexBuffer) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        self.plan = other.plan.clone();
        true
    }

    pub fn forward(&mut self) -> Result<()> {
        let plan: &TransformPlan = self.plan.as_deref().ok_or(Error::Uninitialized("forward()"))?;
        plan.c2c_forward(&mut self.data);
        Ok(())
    }

    pub fn inverse(&mut self) -> Result<()> {
        let plan: &TransformPlan = self.plan.as_deref().ok_or(Error::Uninitialized("inverse()"))?;
        plan.c2c_inverse(&mut self.data);
        Ok(())
    }

    #[inline(always)]
    fn idx(&self, ix: usize, iy: usize) -> usize {
        #[cfg(feature = "bounds-check")]
        {
            if ix >= self.nx || iy >= self.ny {
                utils::fatal(
                    &Error::OutOfRange {
                        ix,
                        iy,
                        nx: self.nx,
                        ny: self.ny,
                    }
                    .to_string(),
                );
            }
        }
        iy + ix * self.ny
    }

    #[inline]
    pub fn re(&self, ix: usize, iy: usize) -> f32 {
        self.data[self.idx(ix, iy)].re
    }

    #[inline]
    pub fn im(&self, ix: usize, iy: usize) -> f32 {
        self.data[self.idx(ix, iy)].im
    }

    #[inline]
    pub fn pix(&self, ix: usize, iy: usize) -> Complex32 {
        self.data[self.idx(ix, iy)]
    }

    #[inline]
    pub fn pix_mut(&mut self, ix: usize, iy: usize) -> &mut Complex32 {
        let i: usize = self.idx(ix, iy);
        &mut self.data[i]
    }

    pub fn try_pix(&self, ix: usize, iy: usize) -> Result<Complex32> {
        if ix >= self.nx || iy >= self.ny {
            return Err(Error::OutOfRange {
                ix,
                iy,
                nx: self.nx,
                ny: self.ny,
            });
        }
        Ok(self.data[iy + ix * self.ny])
    }

    pub fn data(&self) -> &[Complex32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [Complex32] {
        &mut self.data
    }

    pub fn assign(&mut self, other: &ComplexBuffer) -> Result<()> {
        Error::check_dims(self.dims(), other.dims())?;
        if self.is_empty() {
            return Err(Error::Unallocated("assign()"));
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    pub fn fill(&mut self, value: Complex32) -> Result<()> {
        if self.is_empty() {
            self.resize(1, 1)?;
        }
        self.data.fill(value);
        Ok(())
    }

    /// Element-wise `self *= other`.
    pub fn mul_assign(&mut self, other: &ComplexBuffer) -> Result<()> {
        Error::check_dims(self.dims(), other.dims())?;
        self.data
            .par_iter_mut()
            .zip(other.data.par_iter())
            .for_each(|(a, b)| *a *= *b);
        Ok(())
    }

    /// `(min, max)` of the sample magnitudes, `None` when empty.
    pub fn find_range(&self) -> Option<(f32, f32)> {
        let first: f32 = self.data.first()?.norm();
        Some(
            self.data
                .iter()
                .map(|c| c.norm())
                .fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))),
        )
    }

    /// Swaps quadrants so the zero frequency moves from the corner to
    /// `(nx/2, ny/2)`.
    pub fn invert_2d(&mut self) {
        if self.is_empty() {
            return;
        }
        let (nx, ny) = self.dims();
        let src: Vec<Complex32> = self.data.clone();
        self.data
            .par_chunks_mut(ny)
            .enumerate()
            .for_each(|(ix, row)| {
                let sx: usize = (ix + nx - nx / 2) % nx;
                let src_row: &[Complex32] = &src[sx * ny..(sx + 1) * ny];
                izip!(row.iter_mut(), 0..ny).for_each(|(v, iy)| *v = src_row[(iy + ny - ny / 2) % ny]);
            });
    }
}

impl fmt::Debug for ComplexBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexBuffer")
            .field("nx", &self.nx)
            .field("ny", &self.ny)
            .field("level", &self.level())
            .finish()
    }
}

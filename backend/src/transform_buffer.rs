use std::fmt;
use std::sync::Arc;

use num_complex::Complex32;
use utils::{Severity, message};

use crate::fft2d::ZERO;
use crate::{Error, PlanConfig, PlanLevel, PlanMode, Result, TransformPlan, checked_len, try_alloc};

/// Real `nx x ny` image paired with its `nx x (ny/2 + 1)` half spectrum.
///
/// The forward transform maps the real array onto the complex array, the
/// inverse maps it back and divides by `nx*ny`. Both arrays always share the
/// same `(nx, ny)`; resizing to a new geometry drops them together with the
/// plan, so [`TransformBuffer::init`] must run again.
#[derive(Default, Clone)]
pub struct TransformBuffer {
    nx: usize,
    ny: usize,
    nyc: usize,
    real: Vec<f32>,
    data: Vec<Complex32>,
    plan: Option<Arc<TransformPlan>>,
}

impl TransformBuffer {
    pub fn new(nx: usize, ny: usize) -> Result<Self> {
        let mut buf: TransformBuffer = Self::default();
        buf.resize(nx, ny)?;
        Ok(buf)
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Length of the compressed reciprocal axis, `ny/2 + 1`.
    pub fn nyc(&self) -> usize {
        self.nyc
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    fn release(&mut self) {
        self.real = Vec::new();
        self.data = Vec::new();
        self.plan = None;
        self.nx = 0;
        self.ny = 0;
        self.nyc = 0;
    }

    /// Reallocates both arrays for a new geometry; existing data is lost.
    /// A no-op when the geometry is unchanged. On allocation failure the
    /// buffer is left empty.
    pub fn resize(&mut self, nx: usize, ny: usize) -> Result<()> {
        if nx == self.nx && ny == self.ny {
            return Ok(());
        }
        self.release();
        if nx == 0 || ny == 0 {
            return Ok(());
        }

        let nyc: usize = ny / 2 + 1;
        let alloc = || -> Result<(Vec<f32>, Vec<Complex32>)> {
            let real: Vec<f32> = try_alloc(checked_len(nx, ny)?, 0.0, nx, ny)?;
            let data: Vec<Complex32> = try_alloc(checked_len(nx, nyc)?, ZERO, nx, ny)?;
            Ok((real, data))
        };

        match alloc() {
            Ok((real, data)) => {
                self.real = real;
                self.data = data;
                self.nx = nx;
                self.ny = ny;
                self.nyc = nyc;
                Ok(())
            }
            Err(err) => {
                message(Severity::Fatal, &format!("TransformBuffer::resize(): {err}"));
                Err(err)
            }
        }
    }

    /// Builds forward and inverse plans for the current geometry.
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

    /// Adopts a plan built elsewhere. Rejected (returns `false`) when the
    /// plan's geometry differs from this buffer's.
    pub fn share_plan(&mut self, plan: &Arc<TransformPlan>) -> bool {
        if !plan.matches(self.nx, self.ny) {
            return false;
        }
        self.plan = Some(Arc::clone(plan));
        true
    }

    /// Adopts `other`'s plan and initialization level without copying data.
    /// Silently returns `false` when the geometries differ.
    pub fn copy_init(&mut self, other: &TransformBuffer) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        self.plan = other.plan.clone();
        true
    }

    /// Real array to half spectrum (unnormalized).
    pub fn forward(&mut self) -> Result<()> {
        let plan: &TransformPlan = self.plan.as_deref().ok_or(Error::Uninitialized("forward()"))?;
        plan.r2c(&self.real, &mut self.data);
        Ok(())
    }

    /// Half spectrum to real array, divided by `nx*ny`.
    pub fn inverse(&mut self) -> Result<()> {
        let plan: &TransformPlan = self.plan.as_deref().ok_or(Error::Uninitialized("inverse()"))?;
        let scale: f32 = 1.0 / (self.nx * self.ny) as f32;
        plan.c2r(&self.data, &mut self.real, scale);
        Ok(())
    }

    #[inline(always)]
    fn cidx(&self, ix: usize, iy: usize) -> usize {
        #[cfg(feature = "bounds-check")]
        {
            if ix >= self.nx || iy >= self.nyc {
                utils::fatal(
                    &Error::OutOfRange {
                        ix,
                        iy,
                        nx: self.nx,
                        ny: self.nyc,
                    }
                    .to_string(),
                );
            }
        }
        iy + ix * self.nyc
    }

    #[inline(always)]
    fn ridx(&self, ix: usize, iy: usize) -> usize {
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

    /// Real part of the reciprocal sample `(ix, iy)`, `iy < nyc`.
    #[inline]
    pub fn re(&self, ix: usize, iy: usize) -> f32 {
        self.data[self.cidx(ix, iy)].re
    }

    #[inline]
    pub fn im(&self, ix: usize, iy: usize) -> f32 {
        self.data[self.cidx(ix, iy)].im
    }

    #[inline]
    pub fn re_mut(&mut self, ix: usize, iy: usize) -> &mut f32 {
        let i: usize = self.cidx(ix, iy);
        &mut self.data[i].re
    }

    #[inline]
    pub fn im_mut(&mut self, ix: usize, iy: usize) -> &mut f32 {
        let i: usize = self.cidx(ix, iy);
        &mut self.data[i].im
    }

    #[inline]
    pub fn pix(&self, ix: usize, iy: usize) -> Complex32 {
        self.data[self.cidx(ix, iy)]
    }

    #[inline]
    pub fn pix_mut(&mut self, ix: usize, iy: usize) -> &mut Complex32 {
        let i: usize = self.cidx(ix, iy);
        &mut self.data[i]
    }

    /// Real-space sample `(ix, iy)`, `iy < ny`.
    #[inline]
    pub fn rre(&self, ix: usize, iy: usize) -> f32 {
        self.real[self.ridx(ix, iy)]
    }

    #[inline]
    pub fn rre_mut(&mut self, ix: usize, iy: usize) -> &mut f32 {
        let i: usize = self.ridx(ix, iy);
        &mut self.real[i]
    }

    pub fn try_pix(&self, ix: usize, iy: usize) -> Result<Complex32> {
        if ix >= self.nx || iy >= self.nyc {
            return Err(Error::OutOfRange {
                ix,
                iy,
                nx: self.nx,
                ny: self.nyc,
            });
        }
        Ok(self.data[iy + ix * self.nyc])
    }

    pub fn try_rre(&self, ix: usize, iy: usize) -> Result<f32> {
        if ix >= self.nx || iy >= self.ny {
            return Err(Error::OutOfRange {
                ix,
                iy,
                nx: self.nx,
                ny: self.ny,
            });
        }
        Ok(self.real[iy + ix * self.ny])
    }

    pub fn real(&self) -> &[f32] {
        &self.real
    }

    pub fn real_mut(&mut self) -> &mut [f32] {
        &mut self.real
    }

    pub fn data(&self) -> &[Complex32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [Complex32] {
        &mut self.data
    }

    /// Element-wise copy of both arrays from an equally sized buffer; the
    /// plan is not copied.
    pub fn assign(&mut self, other: &TransformBuffer) -> Result<()> {
        Error::check_dims(self.dims(), other.dims())?;
        if self.is_empty() {
            return Err(Error::Unallocated("assign()"));
        }
        self.data.copy_from_slice(&other.data);
        self.real.copy_from_slice(&other.real);
        Ok(())
    }

    /// Fills the real array with `value` and zeroes the half spectrum. An
    /// unallocated buffer becomes `1 x 1` first.
    pub fn fill(&mut self, value: f32) -> Result<()> {
        if self.is_empty() {
            self.resize(1, 1)?;
        }
        self.data.fill(ZERO);
        self.real.fill(value);
        Ok(())
    }

    /// `(min, max)` of the real array, `None` when empty.
    pub fn find_range(&self) -> Option<(f32, f32)> {
        let first: f32 = *self.real.first()?;
        Some(
            self.real
                .iter()
                .fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x))),
        )
    }
}

impl fmt::Debug for TransformBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformBuffer")
            .field("nx", &self.nx)
            .field("ny", &self.ny)
            .field("nyc", &self.nyc)
            .field("level", &self.level())
            .finish()
    }
}

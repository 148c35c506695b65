use std::sync::Arc;

use backend::{ComplexBuffer, PlanConfig, TransformBuffer};

use crate::{
    AtomRecord, FrequencyCache, FrequencyGrid, PotentialParams, PotentialStats, Result, ScatteringTable,
    atomic_potential, bandwidth_limit_full, phase_grating, pix_mul_offset, propagator,
};

/// Buffers and frequency grids reused for every slice of one supercell.
///
/// All buffers share a single transform plan. Stages run strictly in order;
/// each one returns only after every sample it writes is final.
#[derive(Debug)]
pub struct SliceWorkspace {
    potential: TransformBuffer,
    trans: ComplexBuffer,
    prop: Option<ComplexBuffer>,
    kx: Arc<FrequencyGrid>,
    ky: Arc<FrequencyGrid>,
}

impl SliceWorkspace {
    pub fn new(nx: usize, ny: usize, ax: f32, by: f32, config: &PlanConfig) -> Result<Self> {
        let mut cache: FrequencyCache = FrequencyCache::new();
        Self::with_cache(nx, ny, ax, by, config, &mut cache)
    }

    pub fn with_cache(
        nx: usize,
        ny: usize,
        ax: f32,
        by: f32,
        config: &PlanConfig,
        cache: &mut FrequencyCache,
    ) -> Result<Self> {
        let mut potential: TransformBuffer = TransformBuffer::new(nx, ny)?;
        potential.init_with(config)?;
        let mut trans: ComplexBuffer = ComplexBuffer::new(nx, ny)?;
        if let Some(plan) = potential.plan() {
            trans.share_plan(plan);
        }
        tracing::debug!(nx, ny, ax, by, "slice workspace");
        Ok(Self {
            potential,
            trans,
            prop: None,
            kx: cache.get(nx, ax),
            ky: cache.get(ny, by),
        })
    }

    pub fn kx(&self) -> &FrequencyGrid {
        &self.kx
    }

    pub fn ky(&self) -> &FrequencyGrid {
        &self.ky
    }

    /// Real-space projected potential of the last slice.
    pub fn potential(&self) -> &TransformBuffer {
        &self.potential
    }

    /// Band-limited transmission function of the last slice.
    pub fn trans(&self) -> &ComplexBuffer {
        &self.trans
    }

    /// Computes the transmission function of one slice:
    /// potential, inverse transform, phase grating, forward transform,
    /// bandwidth limit, inverse transform.
    pub fn transmission(
        &mut self,
        atoms: &[AtomRecord],
        table: &ScatteringTable,
        params: &PotentialParams,
    ) -> Result<PotentialStats> {
        let stats: PotentialStats = atomic_potential(&mut self.potential, atoms, table, &self.kx, &self.ky, params)?;
        self.potential.inverse()?;
        phase_grating(&self.potential, &mut self.trans)?;
        self.trans.forward()?;
        bandwidth_limit_full(&mut self.trans, &self.kx, &self.ky, params.k2max)?;
        self.trans.inverse()?;
        Ok(stats)
    }

    /// Multiplies `probe` by the transmission function window at
    /// `(ixoff, iyoff)`.
    pub fn transmit(&self, probe: &mut ComplexBuffer, ixoff: isize, iyoff: isize) -> Result<()> {
        let (nxprobe, nyprobe) = probe.dims();
        pix_mul_offset(
            probe.data_mut(),
            nxprobe,
            nyprobe,
            self.trans.data(),
            self.trans.nx(),
            self.trans.ny(),
            ixoff,
            iyoff,
        )
    }

    /// Builds the Fresnel propagator for slices of thickness `dz`.
    pub fn set_propagator(&mut self, wavelength: f64, dz: f64, k2max: f32) -> Result<()> {
        let (nx, ny) = self.trans.dims();
        let mut prop: ComplexBuffer = ComplexBuffer::new(nx, ny)?;
        propagator(&mut prop, &self.kx, &self.ky, wavelength, dz, k2max)?;
        self.prop = Some(prop);
        Ok(())
    }

    /// Propagates a full-size probe to the next slice. The probe adopts the
    /// workspace plan when it has none.
    pub fn propagate(&self, probe: &mut ComplexBuffer) -> Result<()> {
        let prop: &ComplexBuffer = self
            .prop
            .as_ref()
            .ok_or(backend::Error::Uninitialized("propagate()"))?;
        if probe.dims() != prop.dims() {
            return Err(backend::Error::DimensionMismatch {
                expected: prop.dims(),
                found: probe.dims(),
            }
            .into());
        }
        if probe.plan().is_none() {
            if let Some(plan) = self.trans.plan() {
                probe.share_plan(plan);
            }
        }
        probe.forward()?;
        probe.mul_assign(prop)?;
        probe.inverse()?;
        Ok(())
    }
}

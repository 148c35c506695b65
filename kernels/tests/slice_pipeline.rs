use backend::{Complex32, ComplexBuffer, PlanConfig, PlanMode};
use kernels::{
    AtomRecord, DetectorGeometry, FrequencyGrid, KernelError, PotentialParams, PotentialStats, SCATTERING_PARAMS,
    ScatteringTable, SliceWorkspace, ThermalModel, integrate, mag_sq, probe_shift, wavelength,
};
use sampling::{RngEngine, SeedSequence};

const CARBON: [f64; SCATTERING_PARAMS] = [
    0.286977, 0.310240, 0.197713, 1.836120, 0.093210, 0.154963, 0.195290, 0.290960, 0.044200, 3.120150, 0.003660, 0.081980,
];

fn table() -> ScatteringTable {
    let mut table: ScatteringTable = ScatteringTable::new();
    table.insert(6, CARBON);
    table
}

fn config() -> PlanConfig {
    PlanConfig::new(PlanMode::Estimate, 1)
}

fn argmax(values: &[f32]) -> usize {
    let mut best: usize = 0;
    values.iter().enumerate().for_each(|(i, &v)| {
        if v > values[best] {
            best = i;
        }
    });
    best
}

fn norm_sqr(buf: &ComplexBuffer) -> f64 {
    buf.data().iter().map(|v| v.norm_sqr() as f64).sum()
}

#[test]
fn empty_slice_is_transparent() {
    utils::init_tracing();
    let mut ws: SliceWorkspace = SliceWorkspace::new(16, 8, 10.0, 5.0, &config()).unwrap();
    let params: PotentialParams = PotentialParams::for_energy(10.0, 5.0, 200.0, 4.0);
    let stats: PotentialStats = ws.transmission(&[], &table(), &params).unwrap();
    assert_eq!(stats.phase_sum, 0.0);
    ws.trans()
        .data()
        .iter()
        .for_each(|t| assert!((t - Complex32::new(1.0, 0.0)).norm() < 1e-5));
}

#[test]
fn single_atom_occupancy() {
    let mut ws: SliceWorkspace = SliceWorkspace::new(4, 4, 4.0, 4.0, &config()).unwrap();
    let params: PotentialParams = PotentialParams::new(4.0, 4.0, 1.0, 1.0);

    ws.transmission(&[AtomRecord::new(0.0, 0.0, 0.0, 6)], &table(), &params)
        .unwrap();
    assert!(ws.potential().real().iter().all(|&v| v == 0.0));

    ws.transmission(&[AtomRecord::new(0.0, 0.0, 1.0, 6)], &table(), &params)
        .unwrap();
    let real: &[f32] = ws.potential().real();
    assert_eq!(argmax(real), 0);
    assert!(real[0] > 0.0);
}

#[test]
fn mean_phase_is_independent_of_sampling() {
    let (ax, by) = (8.0f32, 8.0f32);
    let params: PotentialParams = PotentialParams::for_energy(ax, by, 200.0, 1.0e6);
    let atoms: Vec<AtomRecord> = vec![AtomRecord::new(2.0, 3.0, 1.0, 6), AtomRecord::new(6.5, 1.25, 0.5, 6)];
    let fe0: f64 = table().fe(6, 0.0).unwrap();
    let expected: f64 = params.scale as f64 * 1.5 * fe0 / (ax as f64 * by as f64);

    [16usize, 64].iter().for_each(|&n| {
        let mut ws: SliceWorkspace = SliceWorkspace::new(n, n, ax, by, &config()).unwrap();
        ws.transmission(&atoms, &table(), &params).unwrap();
        let real: &[f32] = ws.potential().real();
        let mean: f64 = real.iter().map(|&v| v as f64).sum::<f64>() / real.len() as f64;
        assert!((mean / expected - 1.0).abs() < 1e-4, "{n}x{n}: mean {mean} expected {expected}");
    });
}

#[test]
fn potential_peaks_at_atom() {
    let mut ws: SliceWorkspace = SliceWorkspace::new(8, 8, 8.0, 8.0, &config()).unwrap();
    let params: PotentialParams = PotentialParams::new(8.0, 8.0, 1.0, 1.0);
    ws.transmission(&[AtomRecord::new(1.0, 2.0, 1.0, 6)], &table(), &params)
        .unwrap();
    assert_eq!(argmax(ws.potential().real()), 2 + 8);
}

#[test]
fn unlimited_bandwidth_gives_phase_object() {
    let mut ws: SliceWorkspace = SliceWorkspace::new(8, 8, 8.0, 8.0, &config()).unwrap();
    let params: PotentialParams = PotentialParams::new(8.0, 8.0, 1.0, 1.0);
    let atoms: Vec<AtomRecord> = vec![AtomRecord::new(1.0, 2.0, 1.0, 6), AtomRecord::new(5.5, 4.25, 0.5, 6)];
    ws.transmission(&atoms, &table(), &params).unwrap();
    (0..8).for_each(|ix| {
        (0..8).for_each(|iy| {
            let v: f32 = ws.potential().rre(ix, iy);
            let t: Complex32 = ws.trans().pix(ix, iy);
            assert!((t.norm() - 1.0).abs() < 1e-4);
            assert!((t.arg() - v).abs() < 1e-4, "({ix}, {iy}): {} vs {v}", t.arg());
        })
    });
}

#[test]
fn transmit_and_propagate_conserve_intensity() {
    let (nx, ny) = (16usize, 16usize);
    let mut ws: SliceWorkspace = SliceWorkspace::new(nx, ny, 8.0, 8.0, &config()).unwrap();
    let params: PotentialParams = PotentialParams::for_energy(8.0, 8.0, 200.0, 4.0);
    ws.transmission(&[AtomRecord::new(4.0, 4.0, 1.0, 6)], &table(), &params)
        .unwrap();
    ws.set_propagator(wavelength(200.0), 2.0, 4.0).unwrap();

    let mut probe: ComplexBuffer = ComplexBuffer::new(nx, ny).unwrap();
    (0..nx).for_each(|ix| {
        (0..ny).for_each(|iy| {
            let r2: f32 = (ix as f32 - 8.0).powi(2) + (iy as f32 - 8.0).powi(2);
            *probe.pix_mut(ix, iy) = Complex32::new((-r2 / 8.0).exp(), 0.0);
        })
    });
    let before: f64 = norm_sqr(&probe);
    ws.transmit(&mut probe, 0, 0).unwrap();
    let transmitted: f64 = norm_sqr(&probe);
    assert!((transmitted / before - 1.0).abs() < 1e-3);

    ws.propagate(&mut probe).unwrap();
    let propagated: f64 = norm_sqr(&probe);
    assert!((propagated / before - 1.0).abs() < 1e-3);

    probe.forward().unwrap();
    let mut cbed: Vec<f32> = vec![0.0; nx * ny];
    mag_sq(&mut cbed, probe.data()).unwrap();
    let signal: f64 = integrate(&cbed, ws.kx(), ws.ky(), &DetectorGeometry::full_range()).unwrap();
    assert!((signal / (propagated * (nx * ny) as f64) - 1.0).abs() < 1e-3);
}

#[test]
fn propagate_requires_propagator() {
    let ws: SliceWorkspace = SliceWorkspace::new(4, 4, 4.0, 4.0, &config()).unwrap();
    let mut probe: ComplexBuffer = ComplexBuffer::new(4, 4).unwrap();
    assert!(ws.propagate(&mut probe).is_err());
}

#[test]
fn propagate_rejects_mismatched_wave() {
    let mut ws: SliceWorkspace = SliceWorkspace::new(8, 8, 4.0, 4.0, &config()).unwrap();
    ws.set_propagator(wavelength(200.0), 2.0, 4.0).unwrap();
    let mut wave: ComplexBuffer = ComplexBuffer::new(4, 8).unwrap();
    assert_eq!(
        ws.propagate(&mut wave),
        Err(KernelError::Buffer(backend::Error::DimensionMismatch {
            expected: (8, 8),
            found: (4, 8),
        }))
    );
    assert!(wave.plan().is_none());
}

#[test]
fn shifted_probe_moves_by_one_pixel() {
    let (nx, ny) = (8usize, 8usize);
    let kx: FrequencyGrid = FrequencyGrid::new(nx, 4.0);
    let ky: FrequencyGrid = FrequencyGrid::new(ny, 4.0);
    let mut probe: ComplexBuffer = ComplexBuffer::new(nx, ny).unwrap();
    probe.init_with(&config()).unwrap();
    *probe.pix_mut(0, 0) = Complex32::new(1.0, 0.0);
    probe.forward().unwrap();

    let mut shifted: ComplexBuffer = ComplexBuffer::new(nx, ny).unwrap();
    assert!(shifted.copy_init(&probe));
    probe_shift(shifted.data_mut(), probe.data(), &kx, &ky, 0.5, 0.0).unwrap();
    shifted.inverse().unwrap();

    let peak: f32 = shifted.pix(nx - 1, 0).norm();
    assert!((peak - (nx * ny) as f32).abs() < 1e-3);
    let rest: f32 = shifted.data().iter().map(|v| v.norm()).sum::<f32>() - peak;
    assert!(rest < 1e-3);
}

#[test]
fn frozen_phonon_configurations_repeat() {
    let model: ThermalModel = ThermalModel::new(300.0).with_amplitude(6, 0.08);
    let atoms: Vec<AtomRecord> = (0..16)
        .map(|i| AtomRecord::new((i % 4) as f32 * 2.0, (i / 4) as f32 * 2.0, 1.0, 6))
        .collect();
    let params: PotentialParams = PotentialParams::for_energy(8.0, 8.0, 200.0, 4.0);

    let run = |root: u64| -> Vec<f32> {
        let mut seeds: SeedSequence = SeedSequence::new(root);
        let mut ws: SliceWorkspace = SliceWorkspace::new(16, 16, 8.0, 8.0, &config()).unwrap();
        let mut out: Vec<f32> = Vec::new();
        seeds.engines(2).iter_mut().for_each(|rng: &mut RngEngine| {
            let moved: Vec<AtomRecord> = model.displace(&atoms, rng);
            ws.transmission(&moved, &table(), &params).unwrap();
            out.extend_from_slice(ws.potential().real());
        });
        out
    };

    let a: Vec<f32> = run(11);
    let b: Vec<f32> = run(11);
    let c: Vec<f32> = run(12);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a[..256], a[256..]);
}

use backend::{Complex32, ComplexBuffer, TransformBuffer};
use rayon::prelude::*;

use crate::{Result, check_len};

/// `trans[i] = (cos v[i], sin v[i])` for a real phase image `v`.
pub fn phase_grating_into(potential: &[f32], trans: &mut [Complex32]) -> Result<()> {
    check_len("trans", potential.len(), trans.len())?;
    trans
        .par_iter_mut()
        .zip(potential.par_iter())
        .for_each(|(t, &v)| {
            let (s, c) = v.sin_cos();
            *t = Complex32::new(c, s);
        });
    Ok(())
}

/// Phase grating of the real-space potential held by `potential`.
pub fn phase_grating(potential: &TransformBuffer, trans: &mut ComplexBuffer) -> Result<()> {
    if potential.dims() != trans.dims() {
        return Err(backend::Error::DimensionMismatch {
            expected: potential.dims(),
            found: trans.dims(),
        }
        .into());
    }
    phase_grating_into(potential.real(), trans.data_mut())
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn unit_modulus() {
        let v: Vec<f32> = vec![0.0, FRAC_PI_2, PI, -FRAC_PI_2, 12.5];
        let mut t: Vec<Complex32> = vec![Complex32::new(0.0, 0.0); 5];
        phase_grating_into(&v, &mut t).unwrap();
        assert_eq!(t[0], Complex32::new(1.0, 0.0));
        assert!((t[1] - Complex32::new(0.0, 1.0)).norm() < 1e-6);
        assert!((t[2] - Complex32::new(-1.0, 0.0)).norm() < 1e-6);
        assert!((t[3] - Complex32::new(0.0, -1.0)).norm() < 1e-6);
        t.iter().for_each(|t| assert!((t.norm() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn buffer_geometry_must_match() {
        let pot: TransformBuffer = TransformBuffer::new(4, 4).unwrap();
        let mut trans: ComplexBuffer = ComplexBuffer::new(4, 2).unwrap();
        assert!(phase_grating(&pot, &mut trans).is_err());
        let mut trans: ComplexBuffer = ComplexBuffer::new(4, 4).unwrap();
        phase_grating(&pot, &mut trans).unwrap();
        assert!(trans.data().iter().all(|&t| t == Complex32::new(1.0, 0.0)));
    }
}

use itertools::izip;
use rayon::prelude::*;
use rustfft::{Fft, Length, num_complex::Complex32};

pub(crate) const ZERO: Complex32 = Complex32::new(0.0, 0.0);

/// In-place transform of every contiguous run of `fft.len()` samples, one
/// run per worker.
pub(crate) fn rows(data: &mut [Complex32], fft: &dyn Fft<f32>) {
    let len: usize = fft.len();
    let scratch_len: usize = fft.get_inplace_scratch_len();
    data.par_chunks_mut(len)
        .for_each_init(|| vec![ZERO; scratch_len], |scratch, row| fft.process_with_scratch(row, scratch));
}

/// In-place transform along the slow axis of a row-major `nrows x ncols` array.
pub(crate) fn columns(data: &mut [Complex32], nrows: usize, ncols: usize, fft: &dyn Fft<f32>) {
    debug_assert_eq!(fft.len(), nrows);
    let mut work: Vec<Complex32> = vec![ZERO; data.len()];
    transpose(data, nrows, ncols, &mut work);
    rows(&mut work, fft);
    transpose(&work, ncols, nrows, data);
}

fn transpose(src: &[Complex32], nrows: usize, ncols: usize, dst: &mut [Complex32]) {
    dst.par_chunks_mut(nrows).enumerate().for_each(|(c, out)| {
        out.iter_mut()
            .enumerate()
            .for_each(|(r, v)| *v = src[c + r * ncols]);
    });
}

/// Real `nx x ny` to half-spectrum `nx x nyc`, unnormalized.
pub(crate) fn r2c(real: &[f32], half: &mut [Complex32], ny: usize, fft_x: &dyn Fft<f32>, fft_y: &dyn Fft<f32>) {
    let nx: usize = real.len() / ny;
    let nyc: usize = half.len() / nx;
    let scratch_len: usize = fft_y.get_inplace_scratch_len();

    half.par_chunks_mut(nyc).zip(real.par_chunks(ny)).for_each_init(
        || (vec![ZERO; ny], vec![ZERO; scratch_len]),
        |(buf, scratch), (out, row)| {
            izip!(buf.iter_mut(), row.iter()).for_each(|(b, &r)| *b = Complex32::new(r, 0.0));
            fft_y.process_with_scratch(buf, scratch);
            out.copy_from_slice(&buf[..nyc]);
        },
    );

    columns(half, nx, nyc, fft_x);
}

/// Half-spectrum `nx x nyc` to real `nx x ny`, every output multiplied by
/// `scale`. The missing half is rebuilt from Hermitian symmetry; `half` is
/// left untouched.
pub(crate) fn c2r(
    half: &[Complex32],
    real: &mut [f32],
    ny: usize,
    scale: f32,
    fft_x: &dyn Fft<f32>,
    fft_y: &dyn Fft<f32>,
) {
    let nx: usize = real.len() / ny;
    let nyc: usize = half.len() / nx;
    let scratch_len: usize = fft_y.get_inplace_scratch_len();

    let mut work: Vec<Complex32> = half.to_vec();
    columns(&mut work, nx, nyc, fft_x);

    real.par_chunks_mut(ny).zip(work.par_chunks(nyc)).for_each_init(
        || (vec![ZERO; ny], vec![ZERO; scratch_len]),
        |(buf, scratch), (out, row)| {
            buf[..nyc].copy_from_slice(row);
            (nyc..ny).for_each(|k| buf[k] = row[ny - k].conj());
            fft_y.process_with_scratch(buf, scratch);
            izip!(out.iter_mut(), buf.iter()).for_each(|(o, b)| *o = b.re * scale);
        },
    );
}

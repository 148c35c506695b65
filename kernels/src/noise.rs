use sampling::RngEngine;

/// Replaces each expected signal `s` by a Poisson count with mean
/// `s * dose`. Non-positive means give zero counts.
pub fn shot_noise(signal: &mut [f64], dose: f64, rng: &mut RngEngine) {
    signal
        .iter_mut()
        .for_each(|s| *s = rng.ran_poisson(*s * dose) as f64);
}

/// Image variant of [`shot_noise`].
pub fn shot_noise_image(image: &mut [f32], dose: f64, rng: &mut RngEngine) {
    image
        .iter_mut()
        .for_each(|s| *s = rng.ran_poisson(*s as f64 * dose) as f32);
}

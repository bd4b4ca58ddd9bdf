//! Deterministic test-signal generators.
//!
//! Randomness is always drawn from a caller-supplied generator so results
//! are reproducible under a seeded RNG.

use rand::Rng;
use std::f32::consts::PI;

/// Generate a unit-amplitude sine tone.
///
/// # Example
/// ```
/// use audiofeatures::synth::tone;
///
/// let y = tone(440.0, 16000, 0.5);
/// assert_eq!(y.len(), 8000);
/// ```
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect()
}

/// Generate a linear frequency sweep from `f0` to `f1` Hz.
pub fn chirp(f0: f32, f1: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    if duration <= 0.0 {
        return Vec::new();
    }
    let k = (f1 - f0) / duration;
    (0..n_samples)
        .map(|i| {
            let t = i as f32 / sr as f32;
            (2.0 * PI * (f0 * t + 0.5 * k * t * t)).sin()
        })
        .collect()
}

/// Uniform white noise in `[-amplitude, amplitude)`.
///
/// # Example
/// ```
/// use audiofeatures::synth::white_noise;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let y = white_noise(1024, 0.5, &mut rng);
/// assert!(y.iter().all(|v| v.abs() <= 0.5));
/// ```
pub fn white_noise<R: Rng + ?Sized>(len: usize, amplitude: f32, rng: &mut R) -> Vec<f32> {
    (0..len)
        .map(|_| rng.gen_range(-1.0f32..1.0) * amplitude)
        .collect()
}

use crate::contract::{self, FRAMES_LAST};
use crate::spectrum::{self, StftConfig};
use ndarray::{Array2, Axis};
use std::f32::consts::PI;

/// Number of pitch classes in a standard chromagram.
pub const N_CHROMA: usize = 12;

const CENTER_OCTAVE: f32 = 5.0;
const OCTAVE_WIDTH: f32 = 2.0;

/// Convert frequencies (Hz) to fractional octave numbers.
/// A440 is at octave 4.0.
pub fn hz_to_octs(frequencies: &[f32], tuning: f32, bins_per_octave: usize) -> Vec<f32> {
    let a440 = 440.0 * 2.0_f32.powf(tuning / bins_per_octave as f32);
    let ref_freq = a440 / 16.0;
    frequencies
        .iter()
        .map(|&f| if f > 0.0 { (f / ref_freq).log2() } else { f32::NEG_INFINITY })
        .collect()
}

/// Create a chroma filter bank projecting FFT bins onto pitch classes.
///
/// Each FFT bin contributes a Gaussian bump around its fractional pitch
/// class; columns are L2-normalized, then weighted by a Gaussian over
/// octaves centered on octave 5 (two octaves wide). The first row is C.
///
/// # Arguments
/// * `sr` - Sample rate
/// * `n_fft` - FFT size
/// * `n_chroma` - Number of chroma bins
/// * `tuning` - Tuning deviation from A440 in fractional chroma bins
///
/// # Returns
/// Filterbank of shape `(n_chroma, 1 + n_fft / 2)`
pub fn chroma_filterbank(sr: u32, n_fft: usize, n_chroma: usize, tuning: f32) -> Array2<f32> {
    let n_freq = n_fft / 2 + 1;
    let mut wts = Array2::<f32>::zeros((n_chroma, n_freq));
    if n_fft < 2 || n_chroma == 0 {
        return wts;
    }

    let frequencies: Vec<f32> = (1..n_fft)
        .map(|i| i as f32 * sr as f32 / n_fft as f32)
        .collect();
    let n_chroma_f = n_chroma as f32;
    let mut frqbins: Vec<f32> = hz_to_octs(&frequencies, tuning, n_chroma)
        .into_iter()
        .map(|o| o * n_chroma_f)
        .collect();
    // DC sits 1.5 octaves below the first bin
    frqbins.insert(0, frqbins[0] - 1.5 * n_chroma_f);

    let binwidths: Vec<f32> = (0..frqbins.len())
        .map(|i| {
            frqbins
                .get(i + 1)
                .map_or(1.0, |next| (next - frqbins[i]).max(1.0))
        })
        .collect();

    let half = (n_chroma_f / 2.0).round();
    for (fbin, mut column) in wts.axis_iter_mut(Axis(1)).enumerate() {
        for (chroma, w) in column.iter_mut().enumerate() {
            let d = (frqbins[fbin] - chroma as f32 + half + 10.0 * n_chroma_f).rem_euclid(n_chroma_f)
                - half;
            *w = (-0.5 * (2.0 * d / binwidths[fbin]).powi(2)).exp();
        }
        let norm = column.iter().map(|&v| (v as f64).powi(2)).sum::<f64>().sqrt();
        if norm > 0.0 {
            column.mapv_inplace(|v| (v as f64 / norm) as f32);
        }
        let octave = frqbins[fbin] / n_chroma_f;
        let weight = (-0.5 * ((octave - CENTER_OCTAVE) / OCTAVE_WIDTH).powi(2)).exp();
        column.mapv_inplace(|v| v * weight);
    }

    // Rows start at A; roll so the first row is C.
    let shift = 3 * (n_chroma / 12);
    if shift > 0 && shift < n_chroma {
        let mut rolled = Array2::<f32>::zeros((n_chroma, n_freq));
        for c in 0..n_chroma {
            rolled.row_mut(c).assign(&wts.row((c + shift) % n_chroma));
        }
        wts = rolled;
    }
    wts
}

/// Native `(n_chroma, n_frames)` chromagram of a native power spectrogram,
/// each frame scaled so its largest pitch class is 1.
pub(crate) fn chroma_from_power(
    power: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    n_chroma: usize,
) -> Array2<f32> {
    let fb = chroma_filterbank(sr, n_fft, n_chroma, 0.0);
    let mut chroma = fb.dot(power);
    for mut frame in chroma.axis_iter_mut(Axis(1)) {
        let peak = frame.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
        if peak > f32::MIN_POSITIVE {
            frame.mapv_inplace(|v| v / peak);
        }
    }
    chroma
}

/// Compute an STFT chromagram.
///
/// Tuning is fixed at A440 and not estimated from the signal, so detuned
/// input differs from a tuning-estimating chromagram.
///
/// # Returns
/// Feature matrix of shape `(n_frames, n_chroma)`, each frame max-normalized
///
/// # Example
/// ```
/// use audiofeatures::feature::chroma::chroma_stft;
/// use audiofeatures::spectrum::StftConfig;
/// use audiofeatures::synth::tone;
///
/// let y = tone(440.0, 22050, 0.5);
/// let chroma = chroma_stft(&y, 22050, &StftConfig::default(), 12).unwrap();
/// assert_eq!(chroma.ncols(), 12);
/// assert_eq!(chroma[(5, 9)], 1.0); // A
/// ```
pub fn chroma_stft(
    y: &[f32],
    sr: u32,
    config: &StftConfig,
    n_chroma: usize,
) -> crate::Result<Array2<f32>> {
    crate::utils::check_sr(sr)?;
    crate::utils::check_positive("n_chroma", n_chroma)?;
    let power = spectrum::magnitude(&spectrum::stft(y, config)?).mapv(|m| m * m);
    let chroma = chroma_from_power(&power, sr, config.n_fft, n_chroma);
    contract::to_feature_matrix(&chroma, FRAMES_LAST)
}

/// Tonal centroid features from a 12-bin chromagram.
///
/// Each frame is L1-normalized and projected onto three circles: fifths
/// (dimensions 0-1), minor thirds (2-3) and major thirds (4-5, radius 0.5).
///
/// # Arguments
/// * `chroma` - Canonical `(n_frames, 12)` chromagram starting at C
///
/// # Returns
/// Feature matrix of shape `(n_frames, 6)`
///
/// # Example
/// ```
/// use audiofeatures::feature::chroma::tonnetz;
/// use ndarray::Array2;
///
/// let mut chroma = Array2::<f32>::zeros((1, 12));
/// chroma[(0, 0)] = 1.0; // pure C
/// let t = tonnetz(&chroma).unwrap();
/// assert!((t[(0, 1)] - 1.0).abs() < 1e-6);
/// ```
pub fn tonnetz(chroma: &Array2<f32>) -> crate::Result<Array2<f32>> {
    if chroma.ncols() != N_CHROMA {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("(n_frames, {N_CHROMA}) chromagram"),
            got: format!("{:?}", chroma.shape()),
        });
    }

    const SCALE: [f32; 6] = [7.0 / 6.0, 7.0 / 6.0, 1.5, 1.5, 2.0 / 3.0, 2.0 / 3.0];
    const RADIUS: [f32; 6] = [1.0, 1.0, 1.0, 1.0, 0.5, 0.5];
    let mut phi = Array2::<f32>::zeros((N_CHROMA, 6));
    for ((c, d), p) in phi.indexed_iter_mut() {
        let offset = if d % 2 == 0 { 0.5 } else { 0.0 };
        *p = RADIUS[d] * (PI * (SCALE[d] * c as f32 - offset)).cos();
    }

    let mut normalized = chroma.clone();
    for mut frame in normalized.axis_iter_mut(Axis(0)) {
        let total: f32 = frame.iter().map(|v| v.abs()).sum();
        if total > f32::MIN_POSITIVE {
            frame.mapv_inplace(|v| v / total);
        }
    }
    Ok(normalized.dot(&phi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_filterbank_shape_and_range() {
        let fb = chroma_filterbank(22050, 2048, 12, 0.0);
        assert_eq!(fb.shape(), &[12, 1025]);
        assert!(fb.iter().all(|&w| (0.0..=1.0).contains(&w)));
    }

    #[test]
    fn test_detuned_tone_is_not_retuned() {
        let sr = 22050;
        let config = StftConfig::default();
        let in_tune = chroma_stft(&crate::synth::tone(440.0, sr, 0.5), sr, &config, 12).unwrap();
        // half a semitone sharp of A
        let sharp = 440.0 * 2.0f32.powf(0.5 / 12.0);
        let detuned = chroma_stft(&crate::synth::tone(sharp, sr, 0.5), sr, &config, 12).unwrap();
        assert!(in_tune[(8, 10)] < 0.5, "{}", in_tune[(8, 10)]);
        assert!(detuned[(8, 10)] > 0.5, "{}", detuned[(8, 10)]);
    }

    #[test]
    fn test_c_major_triad_peaks() {
        let sr = 22050;
        let mut y = crate::synth::tone(261.63, sr, 0.5);
        for f in [329.63f32, 392.0] {
            for (v, w) in y.iter_mut().zip(crate::synth::tone(f, sr, 0.5)) {
                *v += w;
            }
        }
        let chroma = chroma_stft(&y, sr, &StftConfig::default(), 12).unwrap();
        let frame = chroma.row(8);
        for pc in [0usize, 4, 7] {
            assert!(frame[pc] > 0.5, "pitch class {pc}: {}", frame[pc]);
        }
        assert!(frame[1] < 0.5);
    }

    #[test]
    fn test_tonnetz_shape_and_silence() {
        let chroma = Array2::<f32>::zeros((4, 12));
        let t = tonnetz(&chroma).unwrap();
        assert_eq!(t.shape(), &[4, 6]);
        assert!(t.iter().all(|&v| v == 0.0));
        assert!(tonnetz(&Array2::<f32>::zeros((4, 24))).is_err());
    }

    #[test]
    fn test_tonnetz_fifth_relation() {
        // each semitone turns 7/12 of a circle, so G lands a twelfth past C
        let mut chroma = Array2::<f32>::zeros((2, 12));
        chroma[(0, 0)] = 1.0;
        chroma[(1, 7)] = 1.0;
        let t = tonnetz(&chroma).unwrap();
        let angle_c = t[(0, 0)].atan2(t[(0, 1)]);
        let angle_g = t[(1, 0)].atan2(t[(1, 1)]);
        let diff = (angle_g - angle_c).rem_euclid(2.0 * PI);
        assert_relative_eq!(diff, PI / 6.0, epsilon = 1e-4);
    }
}

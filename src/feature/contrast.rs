use crate::contract;
use crate::spectrum::{self, StftConfig};
use ndarray::Array2;

/// Default number of octave bands above the base band.
pub const DEFAULT_N_BANDS: usize = 6;
/// Default upper edge of the base band, in Hz.
pub const DEFAULT_FMIN: f32 = 200.0;
/// Default fraction of bins averaged for peaks and valleys.
pub const DEFAULT_QUANTILE: f32 = 0.02;

const AMIN: f32 = 1e-10;
const TOP_DB: f32 = 80.0;

/// FFT bin indices of each band, plus the bin count that sets the quantile size.
fn band_bins(freqs: &[f32], edges: &[f32], n_bands: usize) -> Vec<(Vec<usize>, usize)> {
    let n_freq = freqs.len();
    (0..=n_bands)
        .map(|k| {
            let (lo, hi) = (edges[k], edges[k + 1]);
            let mut bins: Vec<usize> = (0..n_freq)
                .filter(|&i| freqs[i] >= lo && freqs[i] <= hi)
                .collect();
            let (Some(&first), Some(&last)) = (bins.first(), bins.last()) else {
                return (Vec::new(), 0);
            };
            if k > 0 && first > 0 {
                bins.insert(0, first - 1);
            }
            if k == n_bands {
                bins.extend(last + 1..n_freq);
            }
            let count = bins.len();
            if k < n_bands {
                bins.pop();
            }
            (bins, count)
        })
        .collect()
}

/// Spectral contrast of a canonical magnitude spectrum.
///
/// The spectrum is split into a base band `[0, fmin]` and `n_bands` octave
/// bands above it. In each band the mean of the top and bottom `quantile`
/// fraction of bins gives the peak and valley; the contrast is their
/// difference in dB (each floored 80 dB below its own maximum).
///
/// # Arguments
/// * `spec` - Magnitude spectrum, `(n_frames, 1 + n_fft / 2)`
/// * `sr` - Sample rate in Hz
/// * `n_fft` - FFT size used for `spec`
/// * `n_bands` - Number of octave bands
/// * `fmin` - Upper edge of the base band in Hz
/// * `quantile` - Fraction of bins averaged, in `(0, 1)`
///
/// # Returns
/// Contrast in dB, shape `(n_frames, n_bands + 1)`
///
/// # Errors
/// An octave edge at or above Nyquist is rejected.
pub fn spectral_contrast_from_spectrum(
    spec: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    n_bands: usize,
    fmin: f32,
    quantile: f32,
) -> crate::Result<Array2<f32>> {
    crate::utils::check_sr(sr)?;
    crate::utils::check_positive("n_fft", n_fft)?;
    crate::utils::check_positive("n_bands", n_bands)?;
    if fmin <= 0.0 {
        return Err(crate::Error::InvalidParameter {
            name: "fmin",
            value: fmin.to_string(),
            reason: "must be > 0".to_string(),
        });
    }
    if !(quantile > 0.0 && quantile < 1.0) {
        return Err(crate::Error::InvalidParameter {
            name: "quantile",
            value: quantile.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }
    let n_freq = n_fft / 2 + 1;
    if spec.ncols() != n_freq {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("(n_frames, {n_freq}) spectrum"),
            got: format!("{:?}", spec.shape()),
        });
    }

    let mut edges = vec![0.0f32; n_bands + 2];
    for (i, e) in edges.iter_mut().skip(1).enumerate() {
        *e = fmin * 2.0f32.powi(i as i32);
    }
    let nyquist = sr as f32 / 2.0;
    if edges[..=n_bands].iter().any(|&e| e >= nyquist) {
        return Err(crate::Error::InvalidParameter {
            name: "n_bands",
            value: n_bands.to_string(),
            reason: format!("octave bands from fmin = {fmin} exceed Nyquist ({nyquist} Hz)"),
        });
    }

    let freqs = spectrum::fft_frequencies(sr, n_fft);
    let bands = band_bins(&freqs, &edges, n_bands);
    let n_frames = spec.nrows();

    let mut peak = Array2::<f32>::zeros((n_frames, n_bands + 1));
    let mut valley = Array2::<f32>::zeros((n_frames, n_bands + 1));
    for (k, (bins, count)) in bands.iter().enumerate() {
        if bins.is_empty() {
            continue;
        }
        let q = ((quantile * *count as f32).round_ties_even() as usize).max(1);
        let mut mags = Vec::with_capacity(bins.len());
        for (t, frame) in spec.rows().into_iter().enumerate() {
            mags.clear();
            mags.extend(bins.iter().map(|&b| frame[b] as f64));
            mags.sort_by(f64::total_cmp);
            let take = q.min(mags.len());
            let low: f64 = mags[..take].iter().sum::<f64>() / take as f64;
            let high: f64 = mags[mags.len() - take..].iter().sum::<f64>() / take as f64;
            valley[(t, k)] = low as f32;
            peak[(t, k)] = high as f32;
        }
    }

    let peak_db = spectrum::power_to_db(&peak, 1.0, AMIN, Some(TOP_DB));
    let valley_db = spectrum::power_to_db(&valley, 1.0, AMIN, Some(TOP_DB));
    contract::to_feature_matrix(&(peak_db - valley_db), contract::FRAMES_FIRST)
}

/// Spectral contrast of a signal with the default band layout.
///
/// # Example
/// ```
/// use audiofeatures::feature::contrast::spectral_contrast;
/// use audiofeatures::spectrum::StftConfig;
/// use audiofeatures::synth::tone;
///
/// let y = tone(1000.0, 22050, 0.5);
/// let c = spectral_contrast(&y, 22050, &StftConfig::default()).unwrap();
/// assert_eq!(c.ncols(), 7);
/// ```
pub fn spectral_contrast(y: &[f32], sr: u32, config: &StftConfig) -> crate::Result<Array2<f32>> {
    let spec = spectrum::magnitude_spectrum(y, config)?;
    spectral_contrast_from_spectrum(&spec, sr, config.n_fft, DEFAULT_N_BANDS, DEFAULT_FMIN, DEFAULT_QUANTILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_layout_covers_spectrum() {
        let freqs = spectrum::fft_frequencies(22050, 2048);
        let edges = [0.0, 200.0, 400.0, 800.0];
        let bands = band_bins(&freqs, &edges, 2);
        assert_eq!(bands.len(), 3);
        // top band runs to Nyquist
        assert_eq!(bands[2].0.last().copied(), Some(1024));
        // bins are 10.77 Hz apart: 18 is the last bin below 200 Hz
        assert_eq!(bands[0].0.last().copied(), Some(17));
        assert_eq!(bands[0].1, 19);
        assert_eq!(bands[1].0[0], 18);
    }

    #[test]
    fn test_tone_has_more_contrast_than_noise() {
        use rand::SeedableRng;
        let sr = 22050;
        let cfg = StftConfig::default();
        let tone = crate::synth::tone(1000.0, sr, 0.5);
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let noise = crate::synth::white_noise(tone.len(), 1.0, &mut rng);

        let band = 3; // 800..1600 Hz holds the tone
        let c_tone = spectral_contrast(&tone, sr, &cfg).unwrap();
        let c_noise = spectral_contrast(&noise, sr, &cfg).unwrap();
        assert!(c_tone[(5, band)] > c_noise[(5, band)]);
    }

    #[test]
    fn test_rejects_bands_above_nyquist() {
        let spec = Array2::<f32>::ones((4, 257));
        let err = spectral_contrast_from_spectrum(&spec, 8000, 512, 6, 200.0, 0.02).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidParameter { name: "n_bands", .. }));
        assert!(spectral_contrast_from_spectrum(&spec, 8000, 512, 3, 200.0, 0.02).is_ok());
    }

    #[test]
    fn test_flat_spectrum_has_zero_contrast() {
        let spec = Array2::<f32>::ones((3, 1025));
        let c = spectral_contrast_from_spectrum(&spec, 22050, 2048, 6, 200.0, 0.02).unwrap();
        assert_eq!(c.shape(), &[3, 7]);
        assert!(c.iter().all(|&v| v.abs() < 1e-5));
    }
}

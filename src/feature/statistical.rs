//! Frame-wise descriptive statistics of a signal and its spectrum.

use crate::effects::hpss;
use crate::feature::{contrast, spectral};
use crate::frame;
use crate::spectrum::{self, StftConfig};
use crate::utils::stats;
use ndarray::{Array2, Axis};

/// Default frame length for [`signal_statistics`].
pub const DEFAULT_FRAME_LENGTH: usize = 2048;
/// Default hop length for [`signal_statistics`].
pub const DEFAULT_HOP_LENGTH: usize = 512;
/// Default separation margin for [`harmonic_percussive_ratio`].
pub const DEFAULT_HPR_MARGIN: f32 = 3.0;

/// Per-frame statistics of a signal; every field has one value per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalStatistics {
    pub mean: Vec<f32>,
    /// Population standard deviation.
    pub std: Vec<f32>,
    /// Bias-corrected skewness; NaN for constant frames.
    pub skewness: Vec<f32>,
    /// Bias-corrected excess kurtosis; NaN for constant frames.
    pub kurtosis: Vec<f32>,
    pub median: Vec<f32>,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
    pub range: Vec<f32>,
    pub rms: Vec<f32>,
}

impl SignalStatistics {
    /// Statistic names paired with their per-frame values.
    pub fn entries(&self) -> [(&'static str, &[f32]); 9] {
        [
            ("mean", &self.mean),
            ("std", &self.std),
            ("skewness", &self.skewness),
            ("kurtosis", &self.kurtosis),
            ("median", &self.median),
            ("min", &self.min),
            ("max", &self.max),
            ("range", &self.range),
            ("rms", &self.rms),
        ]
    }

    pub fn n_frames(&self) -> usize {
        self.mean.len()
    }
}

/// Compute descriptive statistics of each centered frame of a signal.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `frame_length` - Samples per frame
/// * `hop_length` - Samples between frame starts
///
/// # Example
/// ```
/// use audiofeatures::feature::statistical::signal_statistics;
///
/// let y: Vec<f32> = (0..4096).map(|i| (i % 7) as f32 - 3.0).collect();
/// let stats = signal_statistics(&y, 2048, 512).unwrap();
/// assert_eq!(stats.n_frames(), 9);
/// assert!(stats.range.iter().all(|&r| r <= 6.0));
/// ```
pub fn signal_statistics(
    y: &[f32],
    frame_length: usize,
    hop_length: usize,
) -> crate::Result<SignalStatistics> {
    let frames = frame::frame_signal(y, frame_length, hop_length, true)?;
    let mut out = SignalStatistics::default();
    for row in frames.axis_iter(Axis(0)) {
        let x: Vec<f32> = row.to_vec();
        let (lo, hi) = (stats::min(&x), stats::max(&x));
        out.mean.push(stats::mean(&x));
        out.std.push(stats::std(&x));
        out.skewness.push(stats::skewness(&x));
        out.kurtosis.push(stats::kurtosis(&x));
        out.median.push(stats::median(&x));
        out.min.push(lo);
        out.max.push(hi);
        out.range.push(hi - lo);
        out.rms.push(stats::rms(&x));
    }
    Ok(out)
}

/// Per-frame spectral shape statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectralStatistics {
    pub centroid: Vec<f32>,
    pub bandwidth: Vec<f32>,
    pub flatness: Vec<f32>,
    pub rolloff: Vec<f32>,
    /// L2 distance to the previous frame; 0 for the first frame.
    pub flux: Vec<f32>,
    /// Spectral contrast averaged over sub-bands.
    pub contrast: Vec<f32>,
}

impl SpectralStatistics {
    pub fn entries(&self) -> [(&'static str, &[f32]); 6] {
        [
            ("centroid", &self.centroid),
            ("bandwidth", &self.bandwidth),
            ("flatness", &self.flatness),
            ("rolloff", &self.rolloff),
            ("flux", &self.flux),
            ("contrast", &self.contrast),
        ]
    }
}

fn into_values(column: Array2<f32>) -> Vec<f32> {
    column.into_iter().collect()
}

/// Spectral flux: L2 norm of the frame-to-frame difference, leading 0.
fn spectral_flux(spec: &Array2<f32>) -> Vec<f32> {
    let mut flux = Vec::with_capacity(spec.nrows());
    if spec.nrows() > 0 {
        flux.push(0.0);
    }
    for pair in spec.axis_windows(Axis(0), 2) {
        let sq: f64 = pair
            .row(1)
            .iter()
            .zip(pair.row(0).iter())
            .map(|(&cur, &prev)| ((cur - prev) as f64).powi(2))
            .sum();
        flux.push(sq.sqrt() as f32);
    }
    flux
}

/// Compute spectral statistics of a canonical magnitude spectrum.
///
/// Centroid, bandwidth (p = 2), flatness and rolloff (85%) use the
/// descriptors of [`crate::feature::spectral`]; contrast is averaged over
/// its default seven bands, which needs `sr > 12800`.
///
/// # Arguments
/// * `spec` - Magnitude spectrum of shape `(n_frames, 1 + n_fft / 2)`
/// * `sr` - Sample rate in Hz
/// * `n_fft` - FFT size used for `spec`
pub fn spectral_statistics(
    spec: &Array2<f32>,
    sr: u32,
    n_fft: usize,
) -> crate::Result<SpectralStatistics> {
    let centroid = spectral::spectral_centroid_from_spectrum(spec, sr, n_fft)?;
    let bandwidth = spectral::spectral_bandwidth_from_spectrum(
        spec,
        sr,
        n_fft,
        spectral::DEFAULT_BANDWIDTH_P,
    )?;
    let flatness = spectral::spectral_flatness_from_spectrum(spec)?;
    let rolloff = spectral::spectral_rolloff_from_spectrum(
        spec,
        sr,
        n_fft,
        spectral::DEFAULT_ROLL_PERCENT,
    )?;
    let contrast = contrast::spectral_contrast_from_spectrum(
        spec,
        sr,
        n_fft,
        contrast::DEFAULT_N_BANDS,
        contrast::DEFAULT_FMIN,
        contrast::DEFAULT_QUANTILE,
    )?;
    let contrast_mean = contrast
        .axis_iter(Axis(0))
        .map(|row| row.mean().unwrap_or(f32::NAN))
        .collect();

    Ok(SpectralStatistics {
        centroid: into_values(centroid),
        bandwidth: into_values(bandwidth),
        flatness: into_values(flatness),
        rolloff: into_values(rolloff),
        flux: spectral_flux(spec),
        contrast: contrast_mean,
    })
}

/// Fraction of STFT energy assigned to the harmonic component.
///
/// The signal's default STFT (2048/512, Hann, centered) is split by
/// median-filtering HPSS; with `margin > 1` the residual belongs to neither
/// part. Returns 0 when both components are silent.
///
/// # Example
/// ```
/// use audiofeatures::feature::statistical::harmonic_percussive_ratio;
/// use audiofeatures::synth::tone;
///
/// let y = tone(440.0, 22050, 1.0);
/// let ratio = harmonic_percussive_ratio(&y, 22050, 3.0, 31).unwrap();
/// assert!(ratio > 0.9);
/// ```
pub fn harmonic_percussive_ratio(
    y: &[f32],
    sr: u32,
    margin: f32,
    kernel_size: usize,
) -> crate::Result<f32> {
    crate::utils::check_sr(sr)?;
    let stft = spectrum::stft(y, &StftConfig::default())?;
    let (harmonic, percussive) = hpss::hpss(&stft, (kernel_size, kernel_size), 2.0, margin)?;

    let energy = |s: &Array2<num_complex::Complex32>| -> f64 {
        s.iter().map(|c| c.norm_sqr() as f64).sum()
    };
    let h = energy(&harmonic);
    let total = h + energy(&percussive);
    if total == 0.0 {
        return Ok(0.0);
    }
    Ok((h / total) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_signal_statistics_ramp() {
        let y: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let s = signal_statistics(&y, 4, 4).unwrap();
        // centered: padded [0,0,0..7,0,0], frames start at 0, 4, 8
        assert_eq!(s.n_frames(), 3);
        assert_eq!(s.min[1], 2.0);
        assert_eq!(s.max[1], 5.0);
        assert_eq!(s.range[1], 3.0);
        assert_relative_eq!(s.mean[1], 3.5);
        assert_relative_eq!(s.median[1], 3.5);
        assert_relative_eq!(s.skewness[1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(s.kurtosis[1], -1.2, epsilon = 1e-5);
    }

    #[test]
    fn test_silent_frames_have_nan_shape() {
        let s = signal_statistics(&[0.0; 64], 16, 8).unwrap();
        assert!(s.skewness.iter().all(|v| v.is_nan()));
        assert!(s.rms.iter().all(|&v| v == 0.0));
        for (_, values) in s.entries() {
            assert_eq!(values.len(), s.n_frames());
        }
    }

    #[test]
    fn test_spectral_flux() {
        let spec = Array2::from_shape_vec((3, 2), vec![0.0, 0.0, 3.0, 4.0, 3.0, 4.0]).unwrap();
        assert_eq!(spectral_flux(&spec), vec![0.0, 5.0, 0.0]);
        assert!(spectral_flux(&Array2::zeros((0, 2))).is_empty());
    }

    #[test]
    fn test_spectral_statistics_lengths() {
        let y = crate::synth::tone(1000.0, 22050, 0.5);
        let spec = spectrum::magnitude_spectrum(&y, &StftConfig::default()).unwrap();
        let s = spectral_statistics(&spec, 22050, 2048).unwrap();
        for (name, values) in s.entries() {
            assert_eq!(values.len(), spec.nrows(), "{name}");
        }
        assert!((s.centroid[10] - 1000.0).abs() < 100.0);
        assert_eq!(s.flux[0], 0.0);
    }

    #[test]
    fn test_hpr_silence_is_zero() {
        assert_eq!(harmonic_percussive_ratio(&[0.0; 4096], 22050, 3.0, 31).unwrap(), 0.0);
    }

    #[test]
    fn test_hpr_clicks_are_percussive() {
        let mut y = vec![0.0f32; 22050];
        for i in (0..y.len()).step_by(11025) {
            y[i] = 1.0;
        }
        let ratio = harmonic_percussive_ratio(&y, 22050, 1.0, 31).unwrap();
        assert!(ratio < 0.2, "ratio = {ratio}");
    }
}

//! Spectral shape descriptors.
//!
//! Each descriptor has two entry points: one taking a raw signal (computing
//! its own STFT from a [`StftConfig`]) and a `*_from_spectrum` form taking a
//! canonical `(n_frames, 1 + n_fft / 2)` magnitude spectrum. Both return an
//! `(n_frames, 1)` feature matrix and agree for equal parameters.

use crate::contract;
use crate::spectrum::{self, StftConfig};
use ndarray::{Array2, ArrayView1, Axis};

/// Default exponent for [`spectral_bandwidth`].
pub const DEFAULT_BANDWIDTH_P: f32 = 2.0;
/// Default energy fraction for [`spectral_rolloff`].
pub const DEFAULT_ROLL_PERCENT: f32 = 0.85;

const FLATNESS_AMIN: f64 = 1e-10;

fn check_spectrum(spec: &Array2<f32>, n_fft: usize) -> crate::Result<()> {
    crate::utils::check_positive("n_fft", n_fft)?;
    let n_freq = n_fft / 2 + 1;
    if spec.ncols() != n_freq {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("(n_frames, {n_freq}) spectrum for n_fft = {n_fft}"),
            got: format!("{:?}", spec.shape()),
        });
    }
    if spec.iter().any(|&v| v < 0.0) {
        return Err(crate::Error::InvalidParameter {
            name: "spectrum",
            value: "negative entries".to_string(),
            reason: "spectral moments need non-negative magnitudes".to_string(),
        });
    }
    Ok(())
}

/// Frame weights normalized to sum 1; `None` for a silent frame.
fn normalized(frame: ArrayView1<'_, f32>) -> Option<Vec<f64>> {
    let total: f64 = frame.iter().map(|&v| v as f64).sum();
    if total <= f64::MIN_POSITIVE {
        return None;
    }
    Some(frame.iter().map(|&v| v as f64 / total).collect())
}

fn centroid_of(weights: &[f64], freqs: &[f32]) -> f64 {
    weights
        .iter()
        .zip(freqs)
        .map(|(&w, &f)| w * f as f64)
        .sum()
}

fn per_frame<F>(spec: &Array2<f32>, f: F) -> Array2<f32>
where
    F: Fn(ArrayView1<'_, f32>) -> f32,
{
    contract::column(spec.axis_iter(Axis(0)).map(f).collect())
}

/// Spectral centroid of a canonical magnitude spectrum.
///
/// Silent frames report 0.
pub fn spectral_centroid_from_spectrum(
    spec: &Array2<f32>,
    sr: u32,
    n_fft: usize,
) -> crate::Result<Array2<f32>> {
    crate::utils::check_sr(sr)?;
    check_spectrum(spec, n_fft)?;
    let freqs = spectrum::fft_frequencies(sr, n_fft);
    Ok(per_frame(spec, |frame| {
        normalized(frame).map_or(0.0, |w| centroid_of(&w, &freqs) as f32)
    }))
}

/// Spectral bandwidth of order `p` of a canonical magnitude spectrum.
///
/// `(Σ_k S[k] · |f[k] − centroid|^p)^(1/p)` with `S` normalized to sum 1
/// per frame. Silent frames report 0.
pub fn spectral_bandwidth_from_spectrum(
    spec: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    p: f32,
) -> crate::Result<Array2<f32>> {
    crate::utils::check_sr(sr)?;
    check_spectrum(spec, n_fft)?;
    if !(p.is_finite() && p > 0.0) {
        return Err(crate::Error::InvalidParameter {
            name: "p",
            value: p.to_string(),
            reason: "must be a positive finite exponent".to_string(),
        });
    }
    let freqs = spectrum::fft_frequencies(sr, n_fft);
    let p = p as f64;
    Ok(per_frame(spec, |frame| {
        let Some(w) = normalized(frame) else {
            return 0.0;
        };
        let c = centroid_of(&w, &freqs);
        let moment: f64 = w
            .iter()
            .zip(&freqs)
            .map(|(&wk, &f)| wk * (f as f64 - c).abs().powf(p))
            .sum();
        moment.powf(1.0 / p) as f32
    }))
}

/// Spectral rolloff of a canonical magnitude spectrum.
///
/// The lowest bin frequency at which the cumulative magnitude reaches
/// `roll_percent` of the frame total. `roll_percent` must lie strictly
/// between 0 and 1.
pub fn spectral_rolloff_from_spectrum(
    spec: &Array2<f32>,
    sr: u32,
    n_fft: usize,
    roll_percent: f32,
) -> crate::Result<Array2<f32>> {
    crate::utils::check_sr(sr)?;
    check_spectrum(spec, n_fft)?;
    if !(roll_percent > 0.0 && roll_percent < 1.0) {
        return Err(crate::Error::InvalidParameter {
            name: "roll_percent",
            value: roll_percent.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }
    let freqs = spectrum::fft_frequencies(sr, n_fft);
    Ok(per_frame(spec, |frame| {
        let total: f64 = frame.iter().map(|&v| v as f64).sum();
        let threshold = roll_percent as f64 * total;
        let mut cumsum = 0.0f64;
        for (&v, &f) in frame.iter().zip(&freqs) {
            cumsum += v as f64;
            if cumsum >= threshold {
                return f;
            }
        }
        freqs.last().copied().unwrap_or(0.0)
    }))
}

/// Spectral flatness of a canonical magnitude spectrum.
///
/// Ratio of geometric to arithmetic mean of the power spectrum, with each
/// power value floored at `1e-10`. A silent frame is perfectly flat (1.0).
pub fn spectral_flatness_from_spectrum(spec: &Array2<f32>) -> crate::Result<Array2<f32>> {
    if spec.ncols() == 0 {
        return Err(crate::Error::ShapeMismatch {
            expected: "at least one frequency bin".to_string(),
            got: format!("{:?}", spec.shape()),
        });
    }
    let n = spec.ncols() as f64;
    Ok(per_frame(spec, |frame| {
        let mut log_sum = 0.0f64;
        let mut sum = 0.0f64;
        for &m in frame.iter() {
            let p = ((m as f64) * (m as f64)).max(FLATNESS_AMIN);
            log_sum += p.ln();
            sum += p;
        }
        ((log_sum / n).exp() / (sum / n)) as f32
    }))
}

fn signal_spectrum(y: &[f32], sr: u32, config: &StftConfig) -> crate::Result<Array2<f32>> {
    crate::utils::check_sr(sr)?;
    spectrum::magnitude_spectrum(y, config)
}

/// Compute the spectral centroid of each STFT frame of a signal.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `sr` - Sample rate in Hz
/// * `config` - STFT parameters
///
/// # Returns
/// Centroid in Hz, shape `(n_frames, 1)`
///
/// # Example
/// ```
/// use audiofeatures::feature::spectral::spectral_centroid;
/// use audiofeatures::spectrum::StftConfig;
/// use audiofeatures::synth::tone;
///
/// let y = tone(1000.0, 16000, 0.5);
/// let c = spectral_centroid(&y, 16000, &StftConfig::new(1024, 256)).unwrap();
/// assert!((c[(8, 0)] - 1000.0).abs() < 50.0);
/// ```
pub fn spectral_centroid(y: &[f32], sr: u32, config: &StftConfig) -> crate::Result<Array2<f32>> {
    let spec = signal_spectrum(y, sr, config)?;
    spectral_centroid_from_spectrum(&spec, sr, config.n_fft)
}

/// Compute the order-`p` spectral bandwidth of each STFT frame.
pub fn spectral_bandwidth(
    y: &[f32],
    sr: u32,
    config: &StftConfig,
    p: f32,
) -> crate::Result<Array2<f32>> {
    let spec = signal_spectrum(y, sr, config)?;
    spectral_bandwidth_from_spectrum(&spec, sr, config.n_fft, p)
}

/// Compute the spectral rolloff frequency of each STFT frame.
pub fn spectral_rolloff(
    y: &[f32],
    sr: u32,
    config: &StftConfig,
    roll_percent: f32,
) -> crate::Result<Array2<f32>> {
    let spec = signal_spectrum(y, sr, config)?;
    spectral_rolloff_from_spectrum(&spec, sr, config.n_fft, roll_percent)
}

/// Compute the spectral flatness of each STFT frame.
pub fn spectral_flatness(y: &[f32], config: &StftConfig) -> crate::Result<Array2<f32>> {
    let spec = spectrum::magnitude_spectrum(y, config)?;
    spectral_flatness_from_spectrum(&spec)
}

//! Amplitude normalization.
//!
//! A degenerate input (near-zero RMS, peak, deviation or dynamic range)
//! is not an error: the function logs a warning and returns the input
//! unchanged (a midpoint fill for [`min_max_normalize`]).

use crate::utils::stats;

/// Default target level for [`normalize_amplitude`], in dBFS.
pub const DEFAULT_TARGET_DBFS: f32 = -20.0;
/// Default target peak for [`peak_normalize`].
pub const DEFAULT_TARGET_PEAK: f32 = 0.95;

fn near_zero(v: f32) -> bool {
    v.abs() <= f32::EPSILON
}

/// Scale a signal so its RMS level equals `target_dbfs`.
///
/// # Example
/// ```
/// use audiofeatures::preprocess::normalize_amplitude;
///
/// let y = normalize_amplitude(&[0.5, -0.5, 0.5, -0.5], -20.0);
/// assert!((y[0] - 0.1).abs() < 1e-6);
/// ```
pub fn normalize_amplitude(y: &[f32], target_dbfs: f32) -> Vec<f32> {
    if y.is_empty() {
        return Vec::new();
    }
    let rms = stats::rms(y);
    if near_zero(rms) {
        log::warn!("signal RMS is near zero; skipping dBFS normalization");
        return y.to_vec();
    }
    let current_dbfs = 20.0 * (rms as f64).log10();
    let gain = 10f64.powf((target_dbfs as f64 - current_dbfs) / 20.0);
    y.iter().map(|&v| (v as f64 * gain) as f32).collect()
}

/// Scale a signal so its largest absolute sample equals `target_peak`.
///
/// # Example
/// ```
/// use audiofeatures::preprocess::peak_normalize;
///
/// let y = peak_normalize(&[0.1, -0.5, 0.25], 0.95);
/// assert!((y[1] + 0.95).abs() < 1e-6);
/// ```
pub fn peak_normalize(y: &[f32], target_peak: f32) -> Vec<f32> {
    if y.is_empty() {
        return Vec::new();
    }
    let peak = y.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
    if near_zero(peak) {
        log::warn!("signal peak is near zero; skipping peak normalization");
        return y.to_vec();
    }
    let scale = target_peak / peak;
    y.iter().map(|&v| v * scale).collect()
}

/// Standardize a signal to zero mean and unit (population) variance.
pub fn z_normalize(y: &[f32]) -> Vec<f32> {
    if y.is_empty() {
        return Vec::new();
    }
    let (mean, std) = (stats::mean(y), stats::std(y));
    if near_zero(std) {
        log::warn!("signal standard deviation is near zero; skipping z-score normalization");
        return y.to_vec();
    }
    y.iter().map(|&v| (v - mean) / std).collect()
}

/// Linearly map a signal onto `[min_val, max_val]`.
///
/// A constant signal maps to the midpoint of the target range.
///
/// # Errors
/// [`crate::Error::InvalidParameter`] when `min_val >= max_val`.
///
/// # Example
/// ```
/// use audiofeatures::preprocess::min_max_normalize;
///
/// let y = min_max_normalize(&[2.0, 4.0, 3.0], 0.0, 1.0).unwrap();
/// assert_eq!(y, vec![0.0, 1.0, 0.5]);
/// ```
pub fn min_max_normalize(y: &[f32], min_val: f32, max_val: f32) -> crate::Result<Vec<f32>> {
    if !(min_val < max_val) {
        return Err(crate::Error::InvalidParameter {
            name: "min_val",
            value: min_val.to_string(),
            reason: format!("must be less than max_val ({max_val})"),
        });
    }
    if y.is_empty() {
        return Ok(Vec::new());
    }
    let (lo, hi) = (stats::min(y), stats::max(y));
    if near_zero(hi - lo) {
        log::warn!("signal is nearly constant; filling with the midpoint of the target range");
        return Ok(vec![(min_val + max_val) / 2.0; y.len()]);
    }
    let span = hi - lo;
    Ok(y.iter()
        .map(|&v| (v - lo) / span * (max_val - min_val) + min_val)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_amplitude_hits_target() {
        let y = crate::synth::tone(440.0, 8000, 0.5);
        let out = normalize_amplitude(&y, -12.0);
        let level = 20.0 * stats::rms(&out).log10();
        assert_relative_eq!(level, -12.0, epsilon = 1e-3);
    }

    #[test]
    fn test_degenerate_inputs_pass_through() {
        let silence = vec![0.0f32; 16];
        assert_eq!(normalize_amplitude(&silence, -20.0), silence);
        assert_eq!(peak_normalize(&silence, 0.95), silence);
        assert_eq!(z_normalize(&[0.3; 4]), vec![0.3; 4]);
        assert_eq!(min_max_normalize(&[0.3; 3], -1.0, 1.0).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn test_z_normalize_moments() {
        let out = z_normalize(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(stats::mean(&out), 0.0, epsilon = 1e-6);
        assert_relative_eq!(stats::std(&out), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_min_max_rejects_inverted_range() {
        assert!(min_max_normalize(&[1.0, 2.0], 1.0, 1.0).is_err());
        assert!(min_max_normalize(&[1.0, 2.0], 2.0, -2.0).is_err());
        let out = min_max_normalize(&[-1.0, 0.0, 1.0], -10.0, 10.0).unwrap();
        assert_eq!(out, vec![-10.0, 0.0, 10.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(peak_normalize(&[], 0.95).is_empty());
        assert!(z_normalize(&[]).is_empty());
    }
}

use crate::contract::{self, FRAMES_LAST};
use crate::feature::mel::{self, MelConfig};
use crate::spectrum;
use ndarray::{Array2, ArrayView1, Axis};

/// Default regression window for [`delta`].
pub const DEFAULT_DELTA_WIDTH: usize = 9;

const TOP_DB: f32 = 80.0;
const AMIN: f32 = 1e-10;

/// Configuration for MFCC computation.
///
/// # Example
/// ```
/// use audiofeatures::feature::mfcc::MfccConfig;
///
/// let config = MfccConfig::new(16000)
///     .with_n_mfcc(20)
///     .with_n_mels(40)
///     .with_fmax(7600.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MfccConfig {
    /// Sample rate
    pub sr: u32,
    /// FFT window size
    pub n_fft: usize,
    /// Number of samples between frames
    pub hop_length: usize,
    /// Number of MFCC coefficients to return
    pub n_mfcc: usize,
    /// Number of mel bands
    pub n_mels: usize,
    pub fmin: f32,
    /// `None` means `sr / 2`.
    pub fmax: Option<f32>,
}

impl MfccConfig {
    /// Create a new MFCC configuration with defaults.
    pub fn new(sr: u32) -> Self {
        Self {
            sr,
            n_fft: 2048,
            hop_length: 512,
            n_mfcc: 13,
            n_mels: 128,
            fmin: 0.0,
            fmax: None,
        }
    }

    pub fn with_n_fft(mut self, n_fft: usize) -> Self {
        self.n_fft = n_fft;
        self
    }

    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = hop_length;
        self
    }

    pub fn with_n_mfcc(mut self, n_mfcc: usize) -> Self {
        self.n_mfcc = n_mfcc;
        self
    }

    pub fn with_n_mels(mut self, n_mels: usize) -> Self {
        self.n_mels = n_mels;
        self
    }

    pub fn with_fmin(mut self, fmin: f32) -> Self {
        self.fmin = fmin;
        self
    }

    pub fn with_fmax(mut self, fmax: f32) -> Self {
        self.fmax = Some(fmax);
        self
    }

    /// The mel stage of this configuration.
    pub fn mel_config(&self) -> MelConfig {
        MelConfig {
            sr: self.sr,
            n_fft: self.n_fft,
            hop_length: self.hop_length,
            n_mels: self.n_mels,
            fmin: self.fmin,
            fmax: self.fmax,
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.mel_config().validate()?;
        crate::utils::check_positive("n_mfcc", self.n_mfcc)?;
        if self.n_mfcc > self.n_mels {
            return Err(crate::Error::InvalidParameter {
                name: "n_mfcc",
                value: self.n_mfcc.to_string(),
                reason: format!("cannot exceed n_mels = {}", self.n_mels),
            });
        }
        Ok(())
    }

    /// Compute MFCC with this configuration.
    pub fn compute(&self, y: &[f32]) -> crate::Result<Array2<f32>> {
        mfcc(y, self)
    }
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self::new(22050)
    }
}

/// Orthonormal DCT type II, keeping the first `n_out` coefficients.
///
/// # Example
/// ```
/// use audiofeatures::feature::mfcc::dct_type_ii;
///
/// let dct = dct_type_ii(&[1.0, 1.0, 1.0, 1.0], 2);
/// assert!((dct[0] - 2.0).abs() < 1e-6);
/// assert!(dct[1].abs() < 1e-6);
/// ```
pub fn dct_type_ii(x: &[f32], n_out: usize) -> Vec<f32> {
    let n = x.len();
    if n == 0 || n_out == 0 {
        return Vec::new();
    }
    let nf = n as f64;
    (0..n_out.min(n))
        .map(|k| {
            let sum: f64 = x
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let angle = std::f64::consts::PI / nf * (i as f64 + 0.5) * k as f64;
                    v as f64 * angle.cos()
                })
                .sum();
            let scale = if k == 0 { (1.0 / nf).sqrt() } else { (2.0 / nf).sqrt() };
            (sum * scale) as f32
        })
        .collect()
}

/// Compute Mel-Frequency Cepstral Coefficients.
///
/// The mel power spectrogram is converted to dB (floored 80 dB below its
/// peak) and each frame is transformed with an orthonormal DCT-II.
///
/// # Returns
/// Feature matrix of shape `(n_frames, n_mfcc)`
///
/// # Example
/// ```
/// use audiofeatures::feature::mfcc::{mfcc, MfccConfig};
///
/// let signal = vec![0.1f32; 22050];
/// let coeffs = mfcc(&signal, &MfccConfig::new(22050)).unwrap();
/// assert_eq!(coeffs.shape(), &[44, 13]);
/// ```
pub fn mfcc(y: &[f32], config: &MfccConfig) -> crate::Result<Array2<f32>> {
    config.validate()?;
    let mel_power = mel::mel_power(y, &config.mel_config())?;
    let log_mel = spectrum::power_to_db(&mel_power, 1.0, AMIN, Some(TOP_DB));

    let n_frames = log_mel.ncols();
    let mut native = Array2::<f32>::zeros((config.n_mfcc, n_frames));
    for (t, frame) in log_mel.axis_iter(Axis(1)).enumerate() {
        let coeffs = dct_type_ii(&frame.to_vec(), config.n_mfcc);
        for (k, c) in coeffs.into_iter().enumerate() {
            native[(k, t)] = c;
        }
    }
    contract::to_feature_matrix(&native, FRAMES_LAST)
}

/// Derivative of a degree-`order` least-squares fit over a window of `width`
/// consecutive samples, evaluated at the window center. The window is
/// symmetric, so the derivative of the fit is a fixed linear filter.
fn savgol_weights(width: usize, order: usize) -> Vec<f64> {
    let half = (width / 2) as f64;
    let xs: Vec<f64> = (0..width).map(|i| i as f64 - half).collect();
    if order == 1 {
        let denom: f64 = xs.iter().map(|x| x * x).sum();
        xs.iter().map(|x| x / denom).collect()
    } else {
        // Centered x² is orthogonal to 1 and x on a symmetric grid.
        let m = xs.iter().map(|x| x * x).sum::<f64>() / width as f64;
        let q: Vec<f64> = xs.iter().map(|x| x * x - m).collect();
        let denom: f64 = q.iter().map(|v| v * v).sum();
        q.iter().map(|v| 2.0 * v / denom).collect()
    }
}

fn delta_series(series: ArrayView1<'_, f32>, weights: &[f64]) -> Vec<f32> {
    let n = series.len();
    let width = weights.len();
    let half = width / 2;
    let apply = |start: usize| -> f32 {
        weights
            .iter()
            .enumerate()
            .map(|(j, &w)| w * series[start + j] as f64)
            .sum::<f64>() as f32
    };
    let head = apply(0);
    let tail = apply(n - width);
    (0..n)
        .map(|t| {
            if t < half {
                head
            } else if t + half >= n {
                tail
            } else {
                apply(t - half)
            }
        })
        .collect()
}

/// Local derivative of a feature matrix along its frame axis.
///
/// Interior frames use a Savitzky-Golay derivative filter of `width`
/// samples (a linear-regression slope for `order = 1`, the curvature of a
/// quadratic fit for `order = 2`). The first and last `width / 2` frames
/// take the derivative of the fit over the first or last full window.
///
/// # Arguments
/// * `data` - Canonical `(n_frames, n_features)` matrix
/// * `width` - Odd window length, at least 3 and at most `n_frames`
/// * `order` - 1 or 2
///
/// # Returns
/// Matrix with the same shape as `data`
///
/// # Example
/// ```
/// use audiofeatures::feature::mfcc::delta;
/// use ndarray::Array2;
///
/// let ramp = Array2::from_shape_fn((12, 2), |(t, _)| 3.0 * t as f32);
/// let d = delta(&ramp, 9, 1).unwrap();
/// assert!(d.iter().all(|&v| (v - 3.0).abs() < 1e-4));
/// ```
pub fn delta(data: &Array2<f32>, width: usize, order: usize) -> crate::Result<Array2<f32>> {
    if order != 1 && order != 2 {
        return Err(crate::Error::InvalidParameter {
            name: "order",
            value: order.to_string(),
            reason: "must be 1 or 2".to_string(),
        });
    }
    if width < 3 || width % 2 == 0 {
        return Err(crate::Error::InvalidParameter {
            name: "width",
            value: width.to_string(),
            reason: "must be an odd integer >= 3".to_string(),
        });
    }
    let n_frames = data.nrows();
    if width > n_frames {
        return Err(crate::Error::InvalidParameter {
            name: "width",
            value: width.to_string(),
            reason: format!("cannot exceed the number of frames ({n_frames})"),
        });
    }

    let weights = savgol_weights(width, order);
    let mut out = Array2::<f32>::zeros(data.raw_dim());
    for (src, mut dst) in data.axis_iter(Axis(1)).zip(out.axis_iter_mut(Axis(1))) {
        for (d, v) in dst.iter_mut().zip(delta_series(src, &weights)) {
            *d = v;
        }
    }
    Ok(out)
}

/// First- or second-order delta of an MFCC matrix; shape is preserved.
pub fn delta_mfcc(mfcc: &Array2<f32>, order: usize, width: usize) -> crate::Result<Array2<f32>> {
    delta(mfcc, width, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dct_matches_definition() {
        let x = [1.0f32, 2.0, 3.0, 4.0];
        let dct = dct_type_ii(&x, 4);
        assert_relative_eq!(dct[0], 5.0, epsilon = 1e-5);
        assert_relative_eq!(dct[1], -2.230_442, epsilon = 1e-5);
        assert_relative_eq!(dct[2], 0.0, epsilon = 1e-5);
        assert_relative_eq!(dct[3], -0.158_513_6, epsilon = 1e-5);
    }

    #[test]
    fn test_mfcc_shape_and_finite() {
        let y = crate::synth::chirp(100.0, 4000.0, 16000, 0.5);
        let cfg = MfccConfig::new(16000).with_n_fft(512).with_hop_length(160).with_n_mels(40);
        let m = cfg.compute(&y).unwrap();
        assert_eq!(m.shape(), &[8000 / 160 + 1, 13]);
        assert!(m.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_mfcc_rejects_too_many_coefficients() {
        let cfg = MfccConfig::new(16000).with_n_mels(10).with_n_mfcc(20);
        assert!(mfcc(&[0.1; 4096], &cfg).is_err());
    }

    #[test]
    fn test_second_order_delta_of_parabola() {
        let data = Array2::from_shape_fn((15, 1), |(t, _)| (t as f32).powi(2));
        let d2 = delta(&data, 5, 2).unwrap();
        for &v in d2.iter() {
            assert_relative_eq!(v, 2.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_delta_validation() {
        let data = Array2::<f32>::zeros((20, 3));
        assert!(delta(&data, 4, 1).is_err());
        assert!(delta(&data, 1, 1).is_err());
        assert!(delta(&data, 9, 3).is_err());
        assert!(delta(&Array2::<f32>::zeros((5, 3)), 9, 1).is_err());
        assert_eq!(delta_mfcc(&data, 2, 9).unwrap().shape(), &[20, 3]);
    }
}

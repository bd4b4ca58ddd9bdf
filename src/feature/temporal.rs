//! Time-domain frame features.
//!
//! Every function frames the signal itself and returns an `(n_frames, 1)`
//! feature matrix. A signal shorter than one frame yields a `(0, 1)` matrix.

use crate::contract;
use crate::fft;
use crate::frame;
use crate::window::{self, Sampling};
use ndarray::{Array2, ArrayView1, Axis};

/// Default `eps` added inside [`log_energy`].
pub const LOG_ENERGY_EPS: f32 = 1e-10;

const PITCH_MIN_FREQ: f32 = 50.0;
const PITCH_MAX_FREQ: f32 = 2000.0;
const SILENCE_ATOL: f32 = 1e-8;

/// Compute the zero-crossing rate of each (uncentered) frame.
///
/// A crossing is a change of sign bit between consecutive samples, so `0.0`
/// counts as non-negative. The count is divided by `frame_length - 1`, which
/// keeps every value in `[0, 1]`.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `frame_length` - Samples per frame, at least 2
/// * `hop_length` - Samples between frame starts
///
/// # Returns
/// Feature matrix of shape `(n_frames, 1)`
///
/// # Example
/// ```
/// use audiofeatures::feature::temporal::zero_crossing_rate;
///
/// let signal = vec![1.0, -1.0, 1.0, -1.0];
/// let zcr = zero_crossing_rate(&signal, 4, 1).unwrap();
/// assert_eq!(zcr[(0, 0)], 1.0);
/// ```
pub fn zero_crossing_rate(
    y: &[f32],
    frame_length: usize,
    hop_length: usize,
) -> crate::Result<Array2<f32>> {
    if frame_length < 2 {
        return Err(crate::Error::InvalidSize {
            name: "frame_length",
            value: frame_length,
            reason: "must be >= 2",
        });
    }
    let frames = frame::frame_signal(y, frame_length, hop_length, false)?;
    let denom = (frame_length - 1) as f32;
    let rates = frames
        .axis_iter(Axis(0))
        .map(|row| {
            let crossings = row
                .iter()
                .zip(row.iter().skip(1))
                .filter(|(a, b)| a.is_sign_negative() != b.is_sign_negative())
                .count();
            crossings as f32 / denom
        })
        .collect();
    Ok(contract::column(rates))
}

fn frame_energy(frame: ArrayView1<'_, f32>) -> f32 {
    frame.iter().map(|&v| (v as f64) * (v as f64)).sum::<f64>() as f32
}

/// Short-time energy: the sum of squared samples of each uncentered frame.
///
/// # Example
/// ```
/// use audiofeatures::feature::temporal::energy;
///
/// let e = energy(&[1.0, 2.0, 3.0, 4.0], 2, 1).unwrap();
/// assert_eq!(e.shape(), &[3, 1]);
/// assert_eq!(e.column(0).to_vec(), vec![5.0, 13.0, 25.0]);
/// ```
pub fn energy(y: &[f32], frame_length: usize, hop_length: usize) -> crate::Result<Array2<f32>> {
    let frames = frame::frame_signal(y, frame_length, hop_length, false)?;
    let values = frames.axis_iter(Axis(0)).map(frame_energy).collect();
    Ok(contract::column(values))
}

/// Natural log of [`energy`] with `eps` added to guard against `log(0)`.
pub fn log_energy(
    y: &[f32],
    frame_length: usize,
    hop_length: usize,
    eps: f32,
) -> crate::Result<Array2<f32>> {
    let mut e = energy(y, frame_length, hop_length)?;
    e.mapv_inplace(|v| (v + eps).ln());
    Ok(e)
}

/// Root-mean-square amplitude per frame.
///
/// # Example
/// ```
/// use audiofeatures::feature::temporal::rms;
///
/// let r = rms(&[0.5f32; 4096], 1024, 512, false).unwrap();
/// assert!((r[(0, 0)] - 0.5).abs() < 1e-6);
/// ```
pub fn rms(
    y: &[f32],
    frame_length: usize,
    hop_length: usize,
    center: bool,
) -> crate::Result<Array2<f32>> {
    let frames = frame::frame_signal(y, frame_length, hop_length, center)?;
    let n = frame_length as f32;
    let values = frames
        .axis_iter(Axis(0))
        .map(|row| (frame_energy(row) / n).sqrt())
        .collect();
    Ok(contract::column(values))
}

/// Autocorrelation pitch estimator variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitchMethod {
    /// Mean-removed frame, raw autocorrelation.
    #[default]
    Autocorr,
    /// Hann-windowed frame before correlating.
    ImprovedAutocorr,
}

impl PitchMethod {
    pub const SUPPORTED: &'static [&'static str] = &["autocorr", "improved_autocorr"];

    pub fn parse(name: &str) -> crate::Result<Self> {
        match name {
            "autocorr" => Ok(PitchMethod::Autocorr),
            "improved_autocorr" => Ok(PitchMethod::ImprovedAutocorr),
            _ => Err(crate::Error::Unsupported {
                kind: "pitch method",
                got: name.to_string(),
                supported: Self::SUPPORTED,
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PitchMethod::Autocorr => "autocorr",
            PitchMethod::ImprovedAutocorr => "improved_autocorr",
        }
    }
}

impl std::str::FromStr for PitchMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        PitchMethod::parse(s)
    }
}

/// Lag search range `[min_lag, max_lag)` for a given sample rate and frame length.
fn lag_range(sr: u32, frame_length: usize) -> (usize, usize) {
    let sr_f = sr as f32;
    let max_freq = PITCH_MAX_FREQ.min(sr_f / 2.0);
    let min_lag = ((sr_f / max_freq) as usize).max(1);
    let max_lag = frame_length
        .saturating_sub(1)
        .min((sr_f / PITCH_MIN_FREQ) as usize);
    (min_lag, max_lag)
}

/// Estimate the fundamental frequency of one prepared frame, 0 if none.
fn frame_pitch(frame: &[f32], sr: u32, min_lag: usize, max_lag: usize) -> f32 {
    if frame.iter().all(|v| v.abs() <= SILENCE_ATOL) || max_lag <= min_lag {
        return 0.0;
    }

    let ac = fft::autocorrelate(frame, Some(max_lag));
    let mut best_lag = min_lag;
    let mut best = f32::NEG_INFINITY;
    for (lag, &corr) in ac.iter().enumerate().skip(min_lag) {
        if corr > best {
            best = corr;
            best_lag = lag;
        }
    }
    sr as f32 / best_lag as f32
}

/// Estimate pitch per frame from the autocorrelation peak.
///
/// Frames are taken without centering. Each frame is mean-removed (and Hann
/// windowed for [`PitchMethod::ImprovedAutocorr`]); the strongest lag in
/// `[sr / min(2000, sr/2), min(frame_length - 1, sr / 50))` gives
/// `pitch = sr / lag`. Silent frames, and frames too short to hold the
/// search range, report 0.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `sr` - Sample rate in Hz
/// * `frame_length` - Samples per frame
/// * `hop_length` - Samples between frame starts
/// * `method` - Estimator variant
///
/// # Returns
/// Pitch in Hz, shape `(n_frames, 1)`
///
/// # Example
/// ```
/// use audiofeatures::feature::temporal::{pitch, PitchMethod};
/// use audiofeatures::synth::tone;
///
/// let y = tone(440.0, 16000, 0.5);
/// let f0 = pitch(&y, 16000, 1024, 512, PitchMethod::Autocorr).unwrap();
/// assert!((f0[(3, 0)] - 440.0).abs() < 30.0);
/// ```
pub fn pitch(
    y: &[f32],
    sr: u32,
    frame_length: usize,
    hop_length: usize,
    method: PitchMethod,
) -> crate::Result<Array2<f32>> {
    crate::utils::check_sr(sr)?;
    let frames = frame::frame_signal(y, frame_length, hop_length, false)?;
    if frames.nrows() == 0 {
        return Ok(contract::column(Vec::new()));
    }

    let (min_lag, max_lag) = lag_range(sr, frame_length);
    let hann = match method {
        PitchMethod::ImprovedAutocorr => Some(window::hann(frame_length, Sampling::Symmetric)),
        PitchMethod::Autocorr => None,
    };

    let mut pitches = vec![0.0f32; frames.nrows()];
    for (row, out) in frames.axis_iter(Axis(0)).zip(pitches.iter_mut()) {
        let mean = row.iter().map(|&v| v as f64).sum::<f64>() / frame_length as f64;
        let mut prepared: Vec<f32> = row.iter().map(|&v| (v as f64 - mean) as f32).collect();
        if let Some(w) = &hann {
            prepared.iter_mut().zip(w).for_each(|(v, &w)| *v *= w);
        }
        *out = frame_pitch(&prepared, sr, min_lag, max_lag);
    }
    Ok(contract::column(pitches))
}

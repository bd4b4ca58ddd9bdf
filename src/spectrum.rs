//! Short-time Fourier analysis.
//!
//! [`stft`] returns the native `(n_freq, n_frames)` complex matrix used
//! internally by the feature extractors. [`magnitude_spectrum`] and
//! [`power_spectrum`] are the public, canonical `(n_frames, n_freq)` views.

use crate::contract::{self, FRAMES_LAST};
use crate::fft::RealFftPlan;
use crate::window::{self, Sampling, WindowType};
use ndarray::Array2;
use num_complex::Complex32;

/// Configuration for the short-time Fourier transform.
#[derive(Debug, Clone)]
pub struct StftConfig {
    /// FFT size; output has `n_fft / 2 + 1` bins.
    pub n_fft: usize,
    /// Samples between successive frames.
    pub hop_length: usize,
    /// Window length; `None` means `n_fft`.
    pub win_length: Option<usize>,
    pub window: WindowType,
    /// Pad `n_fft / 2` samples on both ends so frame `t` is centered at `t * hop_length`.
    pub center: bool,
    pub pad_mode: PadMode,
}

/// Boundary extension used when `center` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadMode {
    #[default]
    Constant,
    Reflect,
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            win_length: None,
            window: WindowType::Hann,
            center: true,
            pad_mode: PadMode::Constant,
        }
    }
}

impl StftConfig {
    /// Default configuration with the given FFT size and hop.
    pub fn new(n_fft: usize, hop_length: usize) -> Self {
        Self {
            n_fft,
            hop_length,
            ..Self::default()
        }
    }

    pub fn with_win_length(mut self, win_length: usize) -> Self {
        self.win_length = Some(win_length);
        self
    }

    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn with_pad_mode(mut self, pad_mode: PadMode) -> Self {
        self.pad_mode = pad_mode;
        self
    }

    /// Effective window length.
    pub fn win_length(&self) -> usize {
        self.win_length.unwrap_or(self.n_fft)
    }

    /// Number of frequency bins, `1 + n_fft / 2`.
    pub fn n_freq(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Check that all sizes are positive and the window fits in the FFT.
    pub fn validate(&self) -> crate::Result<()> {
        if self.n_fft == 0 {
            return Err(crate::Error::non_positive("n_fft", 0));
        }
        if self.hop_length == 0 {
            return Err(crate::Error::non_positive("hop_length", 0));
        }
        let win_length = self.win_length();
        if win_length == 0 || win_length > self.n_fft {
            return Err(crate::Error::InvalidSize {
                name: "win_length",
                value: win_length,
                reason: "must be in 1..=n_fft",
            });
        }
        Ok(())
    }
}

fn pad_window(window: &[f32], n_fft: usize) -> Vec<f32> {
    if window.len() == n_fft {
        return window.to_vec();
    }
    let mut padded = vec![0.0f32; n_fft];
    let start = (n_fft - window.len()) / 2;
    padded[start..start + window.len()].copy_from_slice(window);
    padded
}

fn reflect_index(mut idx: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let last = len as isize - 1;
    while idx < 0 || idx > last {
        if idx < 0 {
            idx = -idx;
        }
        if idx > last {
            idx = 2 * last - idx;
        }
    }
    idx as usize
}

fn pad_center(y: &[f32], n_fft: usize, center: bool, pad_mode: PadMode) -> Vec<f32> {
    if !center {
        return y.to_vec();
    }
    let pad = n_fft / 2;
    let mut out = vec![0.0f32; y.len() + 2 * pad];
    match pad_mode {
        PadMode::Constant => {
            out[pad..pad + y.len()].copy_from_slice(y);
        }
        PadMode::Reflect => {
            for (i, out_val) in out.iter_mut().enumerate() {
                let src_idx = i as isize - pad as isize;
                *out_val = y[reflect_index(src_idx, y.len())];
            }
        }
    }
    out
}

#[inline]
fn compute_frame(
    frame: usize,
    padded: &[f32],
    window: &[f32],
    fft: &RealFftPlan,
    hop_length: usize,
) -> Vec<Complex32> {
    let start = frame * hop_length;
    let mut buffer: Vec<f32> = window
        .iter()
        .enumerate()
        .map(|(i, &w)| padded.get(start + i).copied().unwrap_or(0.0) * w)
        .collect();
    fft.forward(&mut buffer)
}

/// Compute the Short-Time Fourier Transform (STFT).
///
/// # Arguments
/// * `y` - Input audio signal
/// * `config` - STFT configuration (FFT size, hop length, window, etc.)
///
/// # Returns
/// Complex STFT matrix of shape `(n_freq, n_frames)` where `n_freq = n_fft / 2 + 1`
///
/// # Errors
/// Returns an error if the audio is empty or non-finite, or the config is invalid.
pub fn stft(y: &[f32], config: &StftConfig) -> crate::Result<Array2<Complex32>> {
    crate::utils::valid_audio(y)?;
    config.validate()?;

    let win = window::get_window(config.window, config.win_length(), Sampling::Periodic);
    let window = pad_window(&win, config.n_fft);
    let padded = pad_center(y, config.n_fft, config.center, config.pad_mode);
    let n_frames = if padded.len() < config.n_fft {
        0
    } else {
        (padded.len() - config.n_fft) / config.hop_length + 1
    };

    let fft = RealFftPlan::new(config.n_fft);
    let n_freq = fft.n_bins();

    let frame_results: Vec<Vec<Complex32>> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..n_frames)
                .into_par_iter()
                .map(|frame| compute_frame(frame, &padded, &window, &fft, config.hop_length))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..n_frames)
                .map(|frame| compute_frame(frame, &padded, &window, &fft, config.hop_length))
                .collect()
        }
    };

    let mut stft_matrix = Array2::<Complex32>::zeros((n_freq, n_frames));
    for (frame, result) in frame_results.iter().enumerate() {
        for (f, &val) in result.iter().enumerate() {
            stft_matrix[(f, frame)] = val;
        }
    }

    Ok(stft_matrix)
}

/// Elementwise magnitude of a complex spectrogram, keeping its layout.
pub fn magnitude(stft_matrix: &Array2<Complex32>) -> Array2<f32> {
    stft_matrix.mapv(|v| v.norm())
}

/// Short-time magnitude spectrum as an `(n_frames, 1 + n_fft / 2)` feature matrix.
///
/// # Example
/// ```
/// use audiofeatures::spectrum::{magnitude_spectrum, StftConfig};
///
/// let y = audiofeatures::synth::tone(440.0, 16000, 0.25);
/// let mag = magnitude_spectrum(&y, &StftConfig::new(512, 256)).unwrap();
/// assert_eq!(mag.shape(), &[16, 257]);
/// ```
pub fn magnitude_spectrum(y: &[f32], config: &StftConfig) -> crate::Result<Array2<f32>> {
    let stft_matrix = stft(y, config)?;
    contract::to_feature_matrix(&magnitude(&stft_matrix), FRAMES_LAST)
}

/// Short-time power spectrum (`magnitude²`) as an `(n_frames, 1 + n_fft / 2)` feature matrix.
pub fn power_spectrum(y: &[f32], config: &StftConfig) -> crate::Result<Array2<f32>> {
    let mut mag = magnitude_spectrum(y, config)?;
    mag.mapv_inplace(|m| m * m);
    Ok(mag)
}

/// Center frequency of each FFT bin, `k * sr / n_fft` for `k in 0..=n_fft / 2`.
pub fn fft_frequencies(sr: u32, n_fft: usize) -> Vec<f32> {
    (0..=n_fft / 2)
        .map(|k| k as f32 * sr as f32 / n_fft as f32)
        .collect()
}

/// Convert power spectrogram to dB scale.
/// S_db = 10 * log10(S / ref)
pub fn power_to_db(
    power: &Array2<f32>,
    ref_power: f32,
    amin: f32,
    top_db: Option<f32>,
) -> Array2<f32> {
    let log_ref = 10.0 * ref_power.max(amin).log10();
    let mut db = power.mapv(|p| 10.0 * p.max(amin).log10() - log_ref);

    if let Some(top) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let threshold = max_db - top;
        db.mapv_inplace(|v| v.max(threshold));
    }

    db
}

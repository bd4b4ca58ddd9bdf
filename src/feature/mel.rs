use crate::contract::{self, FRAMES_LAST};
use crate::spectrum::{self, StftConfig};
use ndarray::Array2;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;

fn logstep() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert frequency in Hz to the Slaney mel scale.
///
/// Linear below 1 kHz, logarithmic above.
///
/// # Example
/// ```
/// use audiofeatures::feature::mel::hz_to_mel;
///
/// let mel = hz_to_mel(440.0);
/// assert!((mel - 6.6).abs() < 1e-4);
/// ```
pub fn hz_to_mel(hz: f32) -> f32 {
    let hz = hz as f64;
    let mel = if hz < MIN_LOG_HZ {
        hz / F_SP
    } else {
        MIN_LOG_HZ / F_SP + (hz / MIN_LOG_HZ).ln() / logstep()
    };
    mel as f32
}

/// Inverse of [`hz_to_mel`].
pub fn mel_to_hz(mel: f32) -> f32 {
    let mel = mel as f64;
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let hz = if mel < min_log_mel {
        mel * F_SP
    } else {
        MIN_LOG_HZ * (logstep() * (mel - min_log_mel)).exp()
    };
    hz as f32
}

/// `n_mels` frequencies evenly spaced on the mel scale between `fmin` and `fmax`.
///
/// # Example
/// ```
/// use audiofeatures::feature::mel::mel_frequencies;
///
/// let f = mel_frequencies(10, 0.0, 8000.0);
/// assert_eq!(f.len(), 10);
/// assert_eq!(f[0], 0.0);
/// ```
pub fn mel_frequencies(n_mels: usize, fmin: f32, fmax: f32) -> Vec<f32> {
    if n_mels == 0 {
        return Vec::new();
    }
    let lo = hz_to_mel(fmin) as f64;
    let hi = hz_to_mel(fmax) as f64;
    let step = (hi - lo) / (n_mels.max(2) - 1) as f64;
    (0..n_mels)
        .map(|i| mel_to_hz((lo + step * i as f64) as f32))
        .collect()
}

/// Parameters of a mel-scaled power spectrogram.
#[derive(Debug, Clone)]
pub struct MelConfig {
    pub sr: u32,
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mels: usize,
    /// Lowest filter edge in Hz.
    pub fmin: f32,
    /// Highest filter edge in Hz; `None` means `sr / 2`.
    pub fmax: Option<f32>,
}

impl MelConfig {
    pub fn new(sr: u32) -> Self {
        Self {
            sr,
            n_fft: 2048,
            hop_length: 512,
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

    /// Effective upper frequency bound.
    pub fn fmax(&self) -> f32 {
        self.fmax.unwrap_or(self.sr as f32 / 2.0)
    }

    pub fn validate(&self) -> crate::Result<()> {
        crate::utils::check_sr(self.sr)?;
        crate::utils::check_positive("n_fft", self.n_fft)?;
        crate::utils::check_positive("hop_length", self.hop_length)?;
        crate::utils::check_positive("n_mels", self.n_mels)?;
        let fmax = self.fmax();
        if !(self.fmin >= 0.0 && fmax > self.fmin) {
            return Err(crate::Error::InvalidParameter {
                name: "fmin",
                value: format!("{} (fmax = {fmax})", self.fmin),
                reason: "need 0 <= fmin < fmax".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MelConfig {
    fn default() -> Self {
        Self::new(22050)
    }
}

/// Create a Slaney-normalized triangular mel filterbank.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `n_fft` - FFT size
/// * `n_mels` - Number of mel bands
/// * `fmin` - Lower edge of the first filter in Hz
/// * `fmax` - Upper edge of the last filter in Hz
///
/// # Returns
/// Filterbank of shape `(n_mels, 1 + n_fft / 2)`
///
/// # Example
/// ```
/// use audiofeatures::feature::mel::mel_filterbank;
///
/// let fb = mel_filterbank(22050, 2048, 128, 0.0, 11025.0);
/// assert_eq!(fb.shape(), &[128, 1025]);
/// ```
pub fn mel_filterbank(sr: u32, n_fft: usize, n_mels: usize, fmin: f32, fmax: f32) -> Array2<f32> {
    let n_freq = n_fft / 2 + 1;
    let mut fb = Array2::<f32>::zeros((n_mels, n_freq));
    if n_mels == 0 || n_fft == 0 {
        return fb;
    }

    let fft_freqs = spectrum::fft_frequencies(sr, n_fft);
    let edges: Vec<f64> = mel_frequencies(n_mels + 2, fmin, fmax)
        .into_iter()
        .map(f64::from)
        .collect();

    let mut empty = 0usize;
    for m in 0..n_mels {
        let (lo, mid, hi) = (edges[m], edges[m + 1], edges[m + 2]);
        let enorm = 2.0 / (hi - lo);
        let mut any = false;
        for (k, &f) in fft_freqs.iter().enumerate() {
            let f = f as f64;
            let rising = (f - lo) / (mid - lo);
            let falling = (hi - f) / (hi - mid);
            let w = rising.min(falling).max(0.0) * enorm;
            if w > 0.0 {
                any = true;
            }
            fb[(m, k)] = w as f32;
        }
        if !any {
            empty += 1;
        }
    }
    if empty > 0 {
        log::warn!("{empty} of {n_mels} mel filters are empty; n_mels may be too high for n_fft = {n_fft}");
    }

    fb
}

/// Native `(n_mels, n_frames)` mel power spectrogram.
pub(crate) fn mel_power(y: &[f32], config: &MelConfig) -> crate::Result<Array2<f32>> {
    config.validate()?;
    let stft_config = StftConfig::new(config.n_fft, config.hop_length);
    let power = spectrum::magnitude(&spectrum::stft(y, &stft_config)?).mapv(|m| m * m);
    let fb = mel_filterbank(config.sr, config.n_fft, config.n_mels, config.fmin, config.fmax());
    Ok(fb.dot(&power))
}

/// Compute a mel-scaled power spectrogram.
///
/// # Returns
/// Feature matrix of shape `(n_frames, n_mels)`
///
/// # Example
/// ```
/// use audiofeatures::feature::mel::{mel_spectrogram, MelConfig};
///
/// let signal = vec![0.1f32; 22050];
/// let mel = mel_spectrogram(&signal, &MelConfig::new(22050)).unwrap();
/// assert_eq!(mel.shape(), &[44, 128]);
/// ```
pub fn mel_spectrogram(y: &[f32], config: &MelConfig) -> crate::Result<Array2<f32>> {
    contract::to_feature_matrix(&mel_power(y, config)?, FRAMES_LAST)
}

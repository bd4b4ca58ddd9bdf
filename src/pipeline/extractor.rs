use super::source::SignalSource;
use crate::effects::hpss;
use crate::feature::{chroma, mfcc, spectral, tempo, temporal};
use crate::spectrum::{self, StftConfig};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::path::Path;

/// Named feature matrices, each `(n_frames, n_features)`.
pub type FeatureMap = BTreeMap<String, Array2<f32>>;

/// Shared analysis parameters of a [`FeatureExtractor`].
///
/// # Example
/// ```
/// use audiofeatures::pipeline::ExtractorConfig;
///
/// let config = ExtractorConfig::new(16000).with_n_fft(1024).with_hop_length(256);
/// assert!(config.validate().is_ok());
/// assert!(ExtractorConfig::new(16000).with_n_mfcc(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Sample rate
    pub sr: u32,
    /// FFT window size
    pub n_fft: usize,
    /// Number of samples between frames
    pub hop_length: usize,
    /// Number of mel bands for MFCC
    pub n_mels: usize,
    /// Number of MFCC coefficients
    pub n_mfcc: usize,
}

impl ExtractorConfig {
    pub fn new(sr: u32) -> Self {
        Self {
            sr,
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            n_mfcc: 13,
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

    pub fn with_n_mfcc(mut self, n_mfcc: usize) -> Self {
        self.n_mfcc = n_mfcc;
        self
    }

    pub fn validate(&self) -> crate::Result<()> {
        crate::utils::check_sr(self.sr)?;
        crate::utils::check_positive("n_fft", self.n_fft)?;
        crate::utils::check_positive("hop_length", self.hop_length)?;
        crate::utils::check_positive("n_mels", self.n_mels)?;
        crate::utils::check_positive("n_mfcc", self.n_mfcc)?;
        self.mfcc_config().validate()
    }

    pub fn stft_config(&self) -> StftConfig {
        StftConfig::new(self.n_fft, self.hop_length)
    }

    pub fn mfcc_config(&self) -> mfcc::MfccConfig {
        mfcc::MfccConfig::new(self.sr)
            .with_n_fft(self.n_fft)
            .with_hop_length(self.hop_length)
            .with_n_mels(self.n_mels)
            .with_n_mfcc(self.n_mfcc)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::new(22050)
    }
}

/// Features the extractor can compute by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKind {
    Mfcc,
    SpectralCentroid,
    SpectralBandwidth,
    SpectralRolloff,
    Zcr,
    Rms,
    Chroma,
    Tonnetz,
    Tempogram,
}

type ExtractFn = fn(&ExtractorConfig, &[f32]) -> crate::Result<Array2<f32>>;

impl FeatureKind {
    pub const ALL: [FeatureKind; 9] = [
        FeatureKind::Mfcc,
        FeatureKind::SpectralCentroid,
        FeatureKind::SpectralBandwidth,
        FeatureKind::SpectralRolloff,
        FeatureKind::Zcr,
        FeatureKind::Rms,
        FeatureKind::Chroma,
        FeatureKind::Tonnetz,
        FeatureKind::Tempogram,
    ];

    pub const SUPPORTED: &'static [&'static str] = &[
        "mfcc",
        "spectral_centroid",
        "spectral_bandwidth",
        "spectral_rolloff",
        "zcr",
        "rms",
        "chroma",
        "tonnetz",
        "tempogram",
    ];

    pub fn parse(name: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| crate::Error::Unsupported {
                kind: "feature",
                got: name.to_string(),
                supported: Self::SUPPORTED,
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Mfcc => "mfcc",
            FeatureKind::SpectralCentroid => "spectral_centroid",
            FeatureKind::SpectralBandwidth => "spectral_bandwidth",
            FeatureKind::SpectralRolloff => "spectral_rolloff",
            FeatureKind::Zcr => "zcr",
            FeatureKind::Rms => "rms",
            FeatureKind::Chroma => "chroma",
            FeatureKind::Tonnetz => "tonnetz",
            FeatureKind::Tempogram => "tempogram",
        }
    }

    fn extractor(self) -> ExtractFn {
        match self {
            FeatureKind::Mfcc => |c, y| mfcc::mfcc(y, &c.mfcc_config()),
            FeatureKind::SpectralCentroid => {
                |c, y| spectral::spectral_centroid(y, c.sr, &c.stft_config())
            }
            FeatureKind::SpectralBandwidth => |c, y| {
                spectral::spectral_bandwidth(y, c.sr, &c.stft_config(), spectral::DEFAULT_BANDWIDTH_P)
            },
            FeatureKind::SpectralRolloff => |c, y| {
                spectral::spectral_rolloff(y, c.sr, &c.stft_config(), spectral::DEFAULT_ROLL_PERCENT)
            },
            FeatureKind::Zcr => |c, y| temporal::zero_crossing_rate(y, c.n_fft, c.hop_length),
            FeatureKind::Rms => |c, y| temporal::rms(y, c.n_fft, c.hop_length, true),
            FeatureKind::Chroma => {
                |c, y| chroma::chroma_stft(y, c.sr, &c.stft_config(), chroma::N_CHROMA)
            }
            FeatureKind::Tonnetz => harmonic_tonnetz,
            FeatureKind::Tempogram => {
                |c, y| tempo::tempogram(y, c.sr, c.n_fft, c.hop_length, tempo::DEFAULT_WIN_LENGTH)
            }
        }
    }
}

impl std::str::FromStr for FeatureKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        FeatureKind::parse(s)
    }
}

/// Tonal centroids of the chroma of the harmonic part of the STFT.
fn harmonic_tonnetz(config: &ExtractorConfig, y: &[f32]) -> crate::Result<Array2<f32>> {
    let stft = spectrum::stft(y, &config.stft_config())?;
    let harmonic = hpss::harmonic(&stft, hpss::DEFAULT_KERNEL_SIZE)?;
    let power = spectrum::magnitude(&harmonic).mapv(|m| m * m);
    let native = chroma::chroma_from_power(&power, config.sr, config.n_fft, chroma::N_CHROMA);
    let chromagram = crate::contract::to_feature_matrix(&native, crate::contract::FRAMES_LAST)?;
    chroma::tonnetz(&chromagram)
}

/// Computes named features of a signal with one shared configuration.
///
/// Every output is an `(n_frames, n_features)` matrix keyed by feature name.
///
/// # Example
/// ```
/// use audiofeatures::pipeline::{ExtractorConfig, FeatureExtractor};
/// use audiofeatures::synth::tone;
///
/// let extractor = FeatureExtractor::new(ExtractorConfig::new(22050)).unwrap();
/// let y = tone(440.0, 22050, 1.0);
/// let features = extractor.extract(&y, &["mfcc", "zcr"]).unwrap();
/// assert_eq!(features["mfcc"].shape(), &[44, 13]);
/// assert_eq!(features["zcr"].ncols(), 1);
/// assert!(extractor.extract(&y, &["loudness"]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Create an extractor, rejecting an invalid configuration.
    pub fn new(config: ExtractorConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the features named in `names`.
    ///
    /// Every name is checked before any feature is computed.
    pub fn extract(&self, y: &[f32], names: &[&str]) -> crate::Result<FeatureMap> {
        let kinds = names
            .iter()
            .map(|name| FeatureKind::parse(name))
            .collect::<crate::Result<Vec<_>>>()?;
        self.extract_kinds(y, &kinds)
    }

    /// Extract the given features.
    pub fn extract_kinds(&self, y: &[f32], kinds: &[FeatureKind]) -> crate::Result<FeatureMap> {
        crate::utils::valid_audio(y)?;
        let mut features = FeatureMap::new();
        for &kind in kinds {
            log::debug!("extracting {} from {} samples", kind.as_str(), y.len());
            let matrix = (kind.extractor())(&self.config, y)?;
            features.insert(kind.as_str().to_string(), matrix);
        }
        Ok(features)
    }

    /// Extract every supported feature.
    pub fn extract_all(&self, y: &[f32]) -> crate::Result<FeatureMap> {
        self.extract_kinds(y, &FeatureKind::ALL)
    }

    /// Load a signal at the configured sample rate, then extract `names`.
    pub fn extract_from_source<S>(
        &self,
        source: &S,
        path: &Path,
        names: &[&str],
    ) -> crate::Result<FeatureMap>
    where
        S: SignalSource + ?Sized,
    {
        let y = source.load(path, self.config.sr)?;
        self.extract(&y, names)
    }
}

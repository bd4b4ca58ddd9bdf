//! Frame-level feature extractors.
//!
//! Every extractor returns a canonical `(n_frames, n_features)` matrix.

pub mod chroma;
pub mod contrast;
pub mod formant;
pub mod mel;
pub mod mfcc;
pub mod spectral;
pub mod statistical;
pub mod tempo;
pub mod temporal;

pub use chroma::{chroma_stft, tonnetz};
pub use contrast::spectral_contrast;
pub use formant::{formant_frequencies, lpc};
pub use mel::{MelConfig, mel_spectrogram};
pub use mfcc::{MfccConfig, delta_mfcc, mfcc};
pub use spectral::{spectral_bandwidth, spectral_centroid, spectral_flatness, spectral_rolloff};
pub use statistical::{harmonic_percussive_ratio, signal_statistics, spectral_statistics};
pub use tempo::{onset_strength, tempogram};
pub use temporal::{PitchMethod, energy, log_energy, pitch, rms, zero_crossing_rate};

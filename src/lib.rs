//! Frame-based audio feature extraction for Rust.
//!
//! `audiofeatures` turns a mono signal into frame-level feature matrices
//! (temporal, spectral, cepstral, tonal and statistical) and collapses them
//! into fixed-length summaries for classification or retrieval.
//!
//! # Features
//!
//! - **Framing and spectra**: framing, windows, STFT magnitude/power, dB scaling
//! - **Temporal**: zero-crossing rate, energy, log-energy, RMS, autocorrelation pitch
//! - **Spectral**: centroid, bandwidth, rolloff, flatness, contrast
//! - **Cepstral**: mel spectrogram, MFCC, delta features, LPC formants
//! - **Tonal and rhythmic**: chroma, tonnetz, onset strength, tempogram
//! - **Statistics**: per-frame signal and spectral statistics, harmonic/percussive ratio
//! - **Pipeline**: name-driven extraction and aggregation
//! - **Preprocessing**: amplitude normalization, energy/ZCR segmentation
//!
//! # Quick Start
//!
//! ```rust
//! use audiofeatures::pipeline::{ExtractorConfig, FeatureAggregator, FeatureExtractor};
//! use audiofeatures::synth;
//!
//! // 1 second 440 Hz tone at 22050 Hz
//! let signal = synth::tone(440.0, 22050, 1.0);
//!
//! let extractor = FeatureExtractor::new(ExtractorConfig::new(22050)).unwrap();
//! let features = extractor.extract(&signal, &["mfcc", "spectral_centroid"]).unwrap();
//! assert_eq!(features["mfcc"].shape(), &[44, 13]); // (n_frames, n_mfcc)
//!
//! let summary = FeatureAggregator::new().aggregate(&features, &["mean", "std"]).unwrap();
//! assert_eq!(summary["mfcc_mean"].len(), 13);
//! ```
//!
//! # Feature matrices
//!
//! Every extractor returns an `(n_frames, n_features)` `f32` matrix, with
//! scalar features as a single column. [`contract::to_feature_matrix`] is the
//! one place where natively feature-major results are reoriented.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`frame`] | Signal framing and frame windowing |
//! | [`window`] | Window functions (Hann, Hamming, Blackman, etc.) |
//! | [`fft`] | Cached FFT plans and autocorrelation |
//! | [`spectrum`] | STFT, magnitude/power spectra, dB conversion |
//! | [`contract`] | Feature-matrix orientation and precision |
//! | [`feature`] | Feature extractors |
//! | [`effects`] | Harmonic/percussive separation |
//! | [`preprocess`] | Normalization and segmentation |
//! | [`pipeline`] | Feature extractor façade and aggregator |
//! | [`synth`] | Test-signal generators |
//! | [`utils`] | Descriptive statistics and parameter validation |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. Invalid arguments are rejected before
//! any work is done. Degenerate signals (silence, constant input) are not
//! errors: they produce zero or NaN values and a `log` warning.
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]`.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `parallel` | Compute STFT frames on the rayon thread pool |

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod contract;
pub mod effects;
pub mod feature;
pub mod fft;
pub mod frame;
pub mod pipeline;
pub mod preprocess;
pub mod spectrum;
pub mod synth;
pub mod utils;
pub mod window;

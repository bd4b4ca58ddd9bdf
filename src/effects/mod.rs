//! Spectrogram-domain effects.

pub mod hpss;

pub use hpss::{harmonic, hpss};

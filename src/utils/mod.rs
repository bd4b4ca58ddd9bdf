//! Shared numeric helpers.

pub mod stats;
mod validation;

pub use validation::{check_fraction, check_positive, check_sr, valid_audio};

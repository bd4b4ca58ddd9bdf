//! Signal conditioning applied before feature extraction.

mod normalize;
mod segment;

pub use normalize::{
    DEFAULT_TARGET_DBFS, DEFAULT_TARGET_PEAK, min_max_normalize, normalize_amplitude,
    peak_normalize, z_normalize,
};
pub use segment::{
    DEFAULT_ENERGY_THRESHOLD, DEFAULT_MIN_LENGTH, DEFAULT_ZCR_FRAME_SECONDS,
    DEFAULT_ZCR_HOP_SECONDS, DEFAULT_ZCR_THRESHOLD, segment_by_energy, segment_by_zcr,
};

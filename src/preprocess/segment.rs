//! Activity segmentation of a signal.
//!
//! Segments are sample ranges into the input signal.

use crate::feature::temporal;
use std::ops::Range;

/// Default normalized-energy threshold for [`segment_by_energy`].
pub const DEFAULT_ENERGY_THRESHOLD: f32 = 0.05;
/// Default zero-crossing-rate threshold for [`segment_by_zcr`].
pub const DEFAULT_ZCR_THRESHOLD: f32 = 0.2;
/// Default minimum segment duration, in seconds.
pub const DEFAULT_MIN_LENGTH: f64 = 0.1;
/// Default analysis frame for [`segment_by_zcr`], in seconds.
pub const DEFAULT_ZCR_FRAME_SECONDS: f64 = 0.025;
/// Default analysis hop for [`segment_by_zcr`], in seconds.
pub const DEFAULT_ZCR_HOP_SECONDS: f64 = 0.010;

fn check_common(sr: u32, threshold: f32, min_length: f64) -> crate::Result<()> {
    crate::utils::check_sr(sr)?;
    crate::utils::check_fraction("threshold", threshold)?;
    if !(min_length >= 0.0) {
        return Err(crate::Error::InvalidParameter {
            name: "min_length",
            value: min_length.to_string(),
            reason: "must be >= 0".to_string(),
        });
    }
    Ok(())
}

/// Split a signal into runs of samples whose energy is above a threshold.
///
/// Instantaneous energy `y²` is normalized by its maximum; consecutive
/// samples above `threshold` form a run. A run from `start` to its last
/// sample `last` is kept when `(last - start) / sr >= min_length` and is
/// reported as `start..last + 1`.
///
/// # Arguments
/// * `y` - Input signal, ideally in `[-1, 1]`
/// * `sr` - Sample rate in Hz
/// * `threshold` - Normalized energy threshold in `[0, 1]`
/// * `min_length` - Minimum segment duration in seconds
///
/// # Example
/// ```
/// use audiofeatures::preprocess::segment_by_energy;
///
/// let mut y = vec![0.0f32; 100];
/// y[20..60].fill(0.8);
/// assert_eq!(segment_by_energy(&y, 100, 0.05, 0.1).unwrap(), vec![20..60]);
/// ```
pub fn segment_by_energy(
    y: &[f32],
    sr: u32,
    threshold: f32,
    min_length: f64,
) -> crate::Result<Vec<Range<usize>>> {
    check_common(sr, threshold, min_length)?;
    let max_energy = y.iter().fold(0.0f32, |m, &v| m.max(v * v));
    if max_energy <= f32::EPSILON {
        log::warn!("signal energy is near zero; no segments detected");
        return Ok(Vec::new());
    }

    let long_enough = |start: usize, last: usize| (last - start) as f64 / sr as f64 >= min_length;
    let mut segments = Vec::new();
    let mut run: Option<(usize, usize)> = None;
    for (i, &v) in y.iter().enumerate() {
        if v * v / max_energy <= threshold {
            continue;
        }
        run = match run {
            Some((start, last)) if i == last + 1 => Some((start, i)),
            Some((start, last)) => {
                if long_enough(start, last) {
                    segments.push(start..last + 1);
                }
                Some((i, i))
            }
            None => Some((i, i)),
        };
    }
    if let Some((start, last)) = run {
        if long_enough(start, last) {
            segments.push(start..last + 1);
        }
    }
    Ok(segments)
}

/// Split a signal into runs of frames whose zero-crossing rate is above a threshold.
///
/// Frames of `frame_seconds` advance by `hop_seconds`; only frames that
/// start strictly before `len - frame` samples are analyzed. Consecutive
/// active frames end at the first inactive frame `b` (or the frame count)
/// and form the segment `a·hop .. b·hop + frame`, kept when that span lasts
/// at least `min_length` seconds. The reported end is clamped to the
/// signal. A signal shorter than one frame yields no segments.
///
/// # Errors
/// Rejects `frame_seconds < hop_seconds`, and frame or hop durations that
/// round to fewer than 2 or 1 samples respectively.
pub fn segment_by_zcr(
    y: &[f32],
    sr: u32,
    threshold: f32,
    min_length: f64,
    frame_seconds: f64,
    hop_seconds: f64,
) -> crate::Result<Vec<Range<usize>>> {
    check_common(sr, threshold, min_length)?;
    if !(hop_seconds > 0.0 && frame_seconds >= hop_seconds) {
        return Err(crate::Error::InvalidParameter {
            name: "frame_seconds",
            value: format!("{frame_seconds} (hop {hop_seconds})"),
            reason: "frame and hop must be > 0 with frame >= hop".to_string(),
        });
    }
    let frame_length = (frame_seconds * sr as f64) as usize;
    let hop_length = (hop_seconds * sr as f64) as usize;
    crate::utils::check_positive("hop_length", hop_length)?;

    if y.len() < frame_length {
        log::warn!(
            "signal ({} samples) is shorter than one frame ({frame_length}); no segments detected",
            y.len()
        );
        return Ok(Vec::new());
    }
    let zcr = temporal::zero_crossing_rate(y, frame_length, hop_length)?;
    let n_frames = (y.len() - frame_length).div_ceil(hop_length);
    let active: Vec<bool> = zcr.iter().take(n_frames).map(|&r| r > threshold).collect();

    let mut segments = Vec::new();
    let mut emit = |first: usize, end_frame: usize| {
        let start = first * hop_length;
        let end = end_frame * hop_length + frame_length;
        if (end - start) as f64 / sr as f64 >= min_length {
            segments.push(start..end.min(y.len()));
        }
    };
    let mut start_frame = None;
    for (i, &is_active) in active.iter().enumerate() {
        match (is_active, start_frame) {
            (true, None) => start_frame = Some(i),
            (false, Some(first)) => {
                emit(first, i);
                start_frame = None;
            }
            _ => {}
        }
    }
    if let Some(first) = start_frame {
        emit(first, active.len());
    }
    Ok(segments)
}

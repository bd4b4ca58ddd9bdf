use crate::contract::{self, FRAMES_LAST};
use crate::feature::mel::{self, MelConfig};
use crate::fft;
use crate::spectrum;
use crate::window::{self, Sampling};
use ndarray::{Array2, Axis};

/// Default tempogram window, in onset frames.
pub const DEFAULT_WIN_LENGTH: usize = 384;

/// Compute the onset strength envelope of a signal.
///
/// The envelope is the mean positive first difference of a log-power
/// (dB, 80 dB range) mel spectrogram across mel bands. It is shifted so
/// each value lines up with the center of its STFT frame and has exactly
/// one value per frame.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `sr` - Sample rate
/// * `n_fft` - FFT size
/// * `hop_length` - Hop length
///
/// # Returns
/// One onset strength per STFT frame
///
/// # Example
/// ```
/// use audiofeatures::feature::tempo::onset_strength;
///
/// let signal = vec![0.1f32; 22050];
/// let env = onset_strength(&signal, 22050, 2048, 512).unwrap();
/// assert_eq!(env.len(), 44);
/// ```
pub fn onset_strength(
    y: &[f32],
    sr: u32,
    n_fft: usize,
    hop_length: usize,
) -> crate::Result<Vec<f32>> {
    let config = MelConfig::new(sr)
        .with_n_fft(n_fft)
        .with_hop_length(hop_length);
    let power = mel::mel_power(y, &config)?;
    let db = spectrum::power_to_db(&power, 1.0, 1e-10, Some(80.0));
    let n_frames = db.ncols();

    // lag 1, plus the frames the centered STFT shifted in
    let shift = 1 + n_fft / (2 * hop_length);
    let mut env = vec![0.0f32; n_frames];
    for t in 1..n_frames {
        let Some(slot) = env.get_mut(t - 1 + shift) else {
            break;
        };
        let flux: f64 = db
            .column(t)
            .iter()
            .zip(db.column(t - 1).iter())
            .map(|(&cur, &prev)| (cur - prev).max(0.0) as f64)
            .sum();
        *slot = (flux / db.nrows() as f64) as f32;
    }
    Ok(env)
}

/// Pad with `width` samples on each side, ramping linearly from zero to the edge values.
fn linear_ramp_pad(x: &[f32], width: usize) -> Vec<f32> {
    let (Some(&first), Some(&last)) = (x.first(), x.last()) else {
        return vec![0.0; 2 * width];
    };
    let w = width as f32;
    let mut padded = Vec::with_capacity(x.len() + 2 * width);
    padded.extend((0..width).map(|i| first * i as f32 / w));
    padded.extend_from_slice(x);
    padded.extend((0..width).map(|j| last * (width - 1 - j) as f32 / w));
    padded
}

/// Autocorrelation tempogram of an onset strength envelope.
///
/// The envelope is padded by half a window on each side (linear ramp to
/// zero), so there is one window per onset frame. Each window is
/// Hann-weighted and autocorrelated over lags `0..win_length`; each frame
/// is then scaled so its largest lag value is 1.
///
/// # Arguments
/// * `onset_env` - Onset strength envelope
/// * `win_length` - Window length in onset frames
///
/// # Returns
/// Feature matrix of shape `(onset_env.len(), win_length)`, lag on the
/// feature axis
pub fn tempogram_from_onset(onset_env: &[f32], win_length: usize) -> crate::Result<Array2<f32>> {
    crate::utils::check_positive("win_length", win_length)?;
    let n_frames = onset_env.len();
    let padded = linear_ramp_pad(onset_env, win_length / 2);
    let ac_window = window::hann(win_length, Sampling::Periodic);

    let mut tg = Array2::<f32>::zeros((win_length, n_frames));
    let mut buf = vec![0.0f32; win_length];
    for (t, mut column) in tg.axis_iter_mut(Axis(1)).enumerate() {
        for (i, (b, &w)) in buf.iter_mut().zip(&ac_window).enumerate() {
            *b = padded.get(t + i).copied().unwrap_or(0.0) * w;
        }
        let ac = fft::autocorrelate(&buf, Some(win_length));
        let peak = ac.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
        if peak > f32::MIN_POSITIVE {
            for (c, v) in column.iter_mut().zip(&ac) {
                *c = v / peak;
            }
        }
    }
    contract::to_feature_matrix(&tg, FRAMES_LAST)
}

/// Compute an autocorrelation tempogram from a signal.
///
/// # Returns
/// Feature matrix of shape `(n_frames, win_length)`, one row per STFT frame
///
/// # Example
/// ```
/// use audiofeatures::feature::tempo::{tempogram, DEFAULT_WIN_LENGTH};
///
/// let signal = vec![0.1f32; 22050];
/// let tg = tempogram(&signal, 22050, 2048, 512, DEFAULT_WIN_LENGTH).unwrap();
/// assert_eq!(tg.shape(), &[44, 384]);
/// ```
pub fn tempogram(
    y: &[f32],
    sr: u32,
    n_fft: usize,
    hop_length: usize,
    win_length: usize,
) -> crate::Result<Array2<f32>> {
    crate::utils::check_positive("win_length", win_length)?;
    let env = onset_strength(y, sr, n_fft, hop_length)?;
    tempogram_from_onset(&env, win_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn click_track(sr: u32, period: usize, seconds: f32) -> Vec<f32> {
        let len = (sr as f32 * seconds) as usize;
        let mut y = vec![0.0f32; len];
        for start in (0..len).step_by(period) {
            for (i, v) in y.iter_mut().skip(start).take(256).enumerate() {
                *v = 0.9 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sr as f32).sin();
            }
        }
        y
    }

    #[test]
    fn test_onset_strength_constant_signal_is_flat() {
        let env = onset_strength(&vec![0.1f32; 22050], 22050, 2048, 512).unwrap();
        assert_eq!(env.len(), 44);
        assert!(env.iter().all(|&v| v >= 0.0 && v.is_finite()));
        // leading frames are shifted in
        assert_eq!(env[0], 0.0);
        assert_eq!(env[1], 0.0);
    }

    #[test]
    fn test_onset_strength_peaks_on_clicks() {
        let sr = 22050;
        let y = click_track(sr, 11025, 2.0);
        let env = onset_strength(&y, sr, 2048, 512).unwrap();
        // a click at 0.5 s lands on frame 21.5
        let near = env[20..24].iter().copied().fold(0.0f32, f32::max);
        let between = env[30..36].iter().copied().fold(0.0f32, f32::max);
        assert!(near > between, "near={near} between={between}");
    }

    #[test]
    fn test_linear_ramp_pad() {
        let padded = linear_ramp_pad(&[4.0, 8.0], 2);
        assert_eq!(padded, vec![0.0, 2.0, 4.0, 8.0, 4.0, 0.0]);
    }

    #[test]
    fn test_tempogram_lag_zero_is_peak() {
        let env: Vec<f32> = (0..100).map(|i| if i % 10 == 0 { 1.0 } else { 0.0 }).collect();
        let tg = tempogram_from_onset(&env, 32).unwrap();
        assert_eq!(tg.shape(), &[100, 32]);
        for row in tg.rows() {
            assert_relative_eq!(row[0], 1.0, epsilon = 1e-4);
            assert!(row.iter().all(|&v| v <= 1.0 + 1e-4));
        }
        // periodicity at 10 frames shows up at lag 10 in the middle frames
        let mid = tg.row(50);
        assert!(mid[10] > mid[5]);
    }

    #[test]
    fn test_tempogram_silence_and_errors() {
        let tg = tempogram_from_onset(&[0.0; 8], 4).unwrap();
        assert!(tg.iter().all(|&v| v == 0.0));
        assert!(tempogram_from_onset(&[1.0], 0).is_err());
        assert_eq!(tempogram_from_onset(&[], 4).unwrap().shape(), &[0, 4]);
    }
}

use crate::window::{self, Sampling, WindowType};
use ndarray::{Array2, Axis};

fn check_sizes(frame_length: usize, hop_length: usize) -> crate::Result<()> {
    if frame_length == 0 {
        return Err(crate::Error::non_positive("frame_length", 0));
    }
    if hop_length == 0 {
        return Err(crate::Error::non_positive("hop_length", 0));
    }
    Ok(())
}

/// Number of frames produced by [`frame_signal`] for a signal of `len` samples.
///
/// With `center`, the signal is padded by `frame_length / 2` on each side first.
///
/// # Example
/// ```
/// use audiofeatures::frame::frame_count;
///
/// assert_eq!(frame_count(1000, 512, 256, false).unwrap(), 2);
/// assert_eq!(frame_count(100, 512, 256, false).unwrap(), 0);
/// ```
pub fn frame_count(
    len: usize,
    frame_length: usize,
    hop_length: usize,
    center: bool,
) -> crate::Result<usize> {
    check_sizes(frame_length, hop_length)?;
    let padded_len = if center {
        len + 2 * (frame_length / 2)
    } else {
        len
    };
    if padded_len < frame_length {
        return Ok(0);
    }
    Ok((padded_len - frame_length) / hop_length + 1)
}

/// Frame a signal into overlapping windows.
///
/// Row `i` covers samples `[i * hop_length, i * hop_length + frame_length)`
/// of the (possibly zero-padded) signal. A signal shorter than one frame
/// yields a `(0, frame_length)` matrix.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `frame_length` - Length of each frame
/// * `hop_length` - Number of samples to advance between frames
/// * `center` - If true, zero-pad `frame_length / 2` samples on both ends
///
/// # Returns
/// Frame batch of shape `(n_frames, frame_length)`
///
/// # Example
/// ```
/// use audiofeatures::frame::frame_signal;
///
/// let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let frames = frame_signal(&signal, 4, 2, false).unwrap();
/// assert_eq!(frames.shape(), &[2, 4]);
/// assert_eq!(frames[(1, 0)], 3.0);
/// ```
pub fn frame_signal(
    y: &[f32],
    frame_length: usize,
    hop_length: usize,
    center: bool,
) -> crate::Result<Array2<f32>> {
    let n_frames = frame_count(y.len(), frame_length, hop_length, center)?;

    let pad = if center { frame_length / 2 } else { 0 };
    let mut padded = vec![0.0f32; y.len() + 2 * pad];
    padded[pad..pad + y.len()].copy_from_slice(y);

    let mut frames = Array2::<f32>::zeros((n_frames, frame_length));
    for (i, mut row) in frames.axis_iter_mut(Axis(0)).enumerate() {
        let start = i * hop_length;
        for (dst, &src) in row.iter_mut().zip(&padded[start..start + frame_length]) {
            *dst = src;
        }
    }

    Ok(frames)
}

/// Multiply every frame of a batch by the named window.
///
/// The symmetric variant of the window is used, sized to the frame length.
///
/// # Example
/// ```
/// use audiofeatures::frame::apply_window;
/// use audiofeatures::window::WindowType;
/// use ndarray::Array2;
///
/// let frames = Array2::<f32>::ones((3, 8));
/// let windowed = apply_window(&frames, WindowType::Rectangular);
/// assert_eq!(windowed, frames);
/// ```
pub fn apply_window(frames: &Array2<f32>, window_type: WindowType) -> Array2<f32> {
    let frame_length = frames.ncols();
    let win = window::get_window(window_type, frame_length, Sampling::Symmetric);
    let mut out = frames.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        for (v, &w) in row.iter_mut().zip(win.iter()) {
            *v *= w;
        }
    }
    out
}

/// Apply a window given by name.
///
/// # Errors
/// Returns [`crate::Error::Unsupported`] for unknown window names.
pub fn apply_window_by_name(frames: &Array2<f32>, window_type: &str) -> crate::Result<Array2<f32>> {
    let wtype = WindowType::parse(window_type)?;
    Ok(apply_window(frames, wtype))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rows_cover_hops() {
        let y: Vec<f32> = (0..10).map(|v| v as f32).collect();
        let frames = frame_signal(&y, 4, 3, false).unwrap();
        assert_eq!(frames.shape(), &[3, 4]);
        assert_eq!(frames.row(2).to_vec(), vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_center_pads_half_frame() {
        let y = vec![1.0f32; 8];
        let frames = frame_signal(&y, 4, 2, true).unwrap();
        // padded length 12 -> (12 - 4) / 2 + 1
        assert_eq!(frames.nrows(), 5);
        assert_eq!(frames.row(0).to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(frames.row(4).to_vec(), vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_short_signal_yields_empty_batch() {
        let frames = frame_signal(&[1.0, 2.0], 4, 1, false).unwrap();
        assert_eq!(frames.shape(), &[0, 4]);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(frame_signal(&[1.0; 8], 0, 1, false).is_err());
        assert!(frame_signal(&[1.0; 8], 4, 0, false).is_err());
    }

    #[test]
    fn test_apply_window_by_name_rejects_unknown() {
        let frames = Array2::<f32>::ones((2, 4));
        let err = apply_window_by_name(&frames, "tukey").unwrap_err();
        assert!(matches!(err, crate::Error::Unsupported { .. }));
    }

    #[test]
    fn test_apply_window_tapers_edges() {
        let frames = Array2::<f32>::ones((2, 9));
        let windowed = apply_window(&frames, WindowType::Hann);
        assert!(windowed[(0, 0)].abs() < 1e-6);
        assert!((windowed[(1, 4)] - 1.0).abs() < 1e-6);
    }
}

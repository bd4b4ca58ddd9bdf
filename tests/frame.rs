use audiofeatures::frame::{apply_window, apply_window_by_name, frame_count, frame_signal};
use audiofeatures::window::{self, Sampling, WindowType};
use ndarray::Array2;

#[test]
fn uncentered_frame_count_matches_formula() {
    let y: Vec<f32> = (0..1000).map(|i| i as f32).collect();
    let frames = frame_signal(&y, 256, 100, false).unwrap();
    assert_eq!(frames.shape(), &[(1000 - 256) / 100 + 1, 256]);
    assert_eq!(frames[(3, 0)], 300.0);
    assert_eq!(frames[(3, 255)], 555.0);
}

#[test]
fn centered_frames_start_half_a_frame_early() {
    let y: Vec<f32> = (1..=10).map(|i| i as f32).collect();
    let frames = frame_signal(&y, 4, 2, true).unwrap();
    assert_eq!(frames.nrows(), frame_count(10, 4, 2, true).unwrap());
    assert_eq!(frames.row(0).to_vec(), vec![0.0, 0.0, 1.0, 2.0]);
    assert_eq!(frames.row(1).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn short_signal_gives_empty_batch() {
    let frames = frame_signal(&[1.0, 2.0, 3.0], 8, 2, false).unwrap();
    assert_eq!(frames.shape(), &[0, 8]);
    assert_eq!(frame_signal(&[], 4, 1, false).unwrap().shape(), &[0, 4]);
}

#[test]
fn zero_sizes_are_rejected() {
    assert!(frame_signal(&[1.0; 16], 0, 4, false).is_err());
    assert!(frame_signal(&[1.0; 16], 4, 0, false).is_err());
    assert!(frame_count(16, 4, 0, true).is_err());
}

#[test]
fn window_batch_uses_symmetric_windows() {
    let frames = Array2::<f32>::ones((2, 9));
    let windowed = apply_window(&frames, WindowType::Hann);
    let expected = window::hann(9, Sampling::Symmetric);
    assert_eq!(windowed.row(1).to_vec(), expected);
    assert!(windowed[(0, 0)].abs() < 1e-7);
    assert!((windowed[(0, 4)] - 1.0).abs() < 1e-6);
}

#[test]
fn every_supported_window_name_applies() {
    let frames = Array2::<f32>::ones((1, 16));
    for name in WindowType::SUPPORTED {
        let windowed = apply_window_by_name(&frames, name).unwrap();
        assert_eq!(windowed.shape(), &[1, 16]);
        assert!(windowed.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn unknown_window_lists_choices() {
    let frames = Array2::<f32>::ones((1, 16));
    let err = apply_window_by_name(&frames, "gaussian").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("gaussian"));
    for name in WindowType::SUPPORTED {
        assert!(msg.contains(name));
    }
}

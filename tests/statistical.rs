use approx::assert_relative_eq;
use audiofeatures::feature::statistical::{
    DEFAULT_HPR_MARGIN, harmonic_percussive_ratio, signal_statistics, spectral_statistics,
};
use audiofeatures::spectrum::{StftConfig, magnitude_spectrum};
use audiofeatures::synth;
use ndarray::Array2;

#[test]
fn signal_statistics_of_a_sine() {
    let y = synth::tone(441.0, 22050, 1.0);
    let s = signal_statistics(&y, 2048, 512).unwrap();
    assert_eq!(s.n_frames(), 1 + 22050 / 512);
    let mid = s.n_frames() / 2;
    assert_relative_eq!(s.rms[mid], std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-2);
    assert!(s.mean[mid].abs() < 0.02);
    assert!(s.max[mid] > 0.99 && s.min[mid] < -0.99);
    assert_relative_eq!(s.range[mid], s.max[mid] - s.min[mid]);
    // a sine's sample distribution has kurtosis -1.5
    assert_relative_eq!(s.kurtosis[mid], -1.5, epsilon = 0.05);
}

#[test]
fn signal_statistics_rejects_zero_hop() {
    assert!(signal_statistics(&[0.1; 100], 16, 0).is_err());
    assert!(signal_statistics(&[0.1; 100], 0, 4).is_err());
}

#[test]
fn spectral_statistics_lengths_match() {
    let y = synth::chirp(200.0, 6000.0, 22050, 1.0);
    let cfg = StftConfig::default();
    let spec = magnitude_spectrum(&y, &cfg).unwrap();
    let s = spectral_statistics(&spec, 22050, cfg.n_fft).unwrap();
    for (name, values) in s.entries() {
        assert_eq!(values.len(), spec.nrows(), "{name}");
        assert!(values.iter().all(|v| v.is_finite()), "{name}");
    }
    assert_eq!(s.flux[0], 0.0);
    assert!(s.flux[1..].iter().any(|&v| v > 0.0));
}

#[test]
fn flux_of_a_static_spectrum_is_zero() {
    let spec = Array2::from_elem((5, 1025), 0.5f32);
    let s = spectral_statistics(&spec, 22050, 2048).unwrap();
    assert!(s.flux.iter().all(|&v| v == 0.0));
    assert!(s.flatness.iter().all(|&v| (v - 1.0).abs() < 1e-4));
}

#[test]
fn spectral_statistics_need_wide_enough_band() {
    let spec = Array2::from_elem((3, 1025), 0.5f32);
    assert!(spectral_statistics(&spec, 8000, 2048).is_err());
}

#[test]
fn harmonic_ratio_orders_tone_and_clicks() {
    let sr = 22050;
    let tone = synth::tone(440.0, sr, 1.0);
    let mut clicks = vec![0.0f32; sr as usize];
    for i in (0..clicks.len()).step_by(11025) {
        clicks[i] = 1.0;
    }
    let h_tone = harmonic_percussive_ratio(&tone, sr, DEFAULT_HPR_MARGIN, 31).unwrap();
    let h_clicks = harmonic_percussive_ratio(&clicks, sr, DEFAULT_HPR_MARGIN, 31).unwrap();
    assert!(h_tone > 0.9, "{h_tone}");
    assert!(h_clicks < 0.2, "{h_clicks}");
}

#[test]
fn harmonic_ratio_of_silence_is_zero() {
    let ratio = harmonic_percussive_ratio(&[0.0; 4096], 22050, 1.0, 31).unwrap();
    assert_eq!(ratio, 0.0);
    assert!(harmonic_percussive_ratio(&[0.0; 4096], 22050, 0.5, 31).is_err());
}

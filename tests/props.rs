use audiofeatures::contract::{FRAMES_FIRST, FRAMES_LAST, to_feature_matrix};
use audiofeatures::feature::temporal::zero_crossing_rate;
use audiofeatures::frame::{frame_count, frame_signal};
use audiofeatures::spectrum::{StftConfig, magnitude_spectrum, power_spectrum};
use audiofeatures::utils::stats;
use ndarray::{Array1, Array2};
use proptest::prelude::*;

fn signal(max_len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..1.0, 1..max_len)
}

proptest! {
    #[test]
    fn frame_count_matches_formula(
        len in 0usize..5000,
        frame_length in 1usize..1024,
        hop_length in 1usize..512,
        center in any::<bool>(),
    ) {
        let n = frame_count(len, frame_length, hop_length, center).unwrap();
        let padded = if center { len + 2 * (frame_length / 2) } else { len };
        let expected = if padded < frame_length { 0 } else { 1 + (padded - frame_length) / hop_length };
        prop_assert_eq!(n, expected);
    }

    #[test]
    fn framed_rows_are_signal_slices(y in signal(2000), frame_length in 1usize..256, hop_length in 1usize..128) {
        let frames = frame_signal(&y, frame_length, hop_length, false).unwrap();
        prop_assert_eq!(frames.nrows(), frame_count(y.len(), frame_length, hop_length, false).unwrap());
        for (i, row) in frames.rows().into_iter().enumerate() {
            let start = i * hop_length;
            prop_assert_eq!(row.to_vec(), y[start..start + frame_length].to_vec());
        }
    }

    #[test]
    fn zcr_is_a_rate(y in signal(3000), frame_length in 2usize..256, hop_length in 1usize..128) {
        let zcr = zero_crossing_rate(&y, frame_length, hop_length).unwrap();
        prop_assert_eq!(zcr.ncols(), 1);
        prop_assert!(zcr.iter().all(|&r| (0.0..=1.0).contains(&r)));
    }

    #[test]
    fn power_is_magnitude_squared(y in signal(4000)) {
        let cfg = StftConfig::new(256, 64);
        let mag = magnitude_spectrum(&y, &cfg).unwrap();
        let pow = power_spectrum(&y, &cfg).unwrap();
        prop_assert_eq!(mag.shape(), pow.shape());
        prop_assert_eq!(mag.ncols(), cfg.n_freq());
        for (&m, &p) in mag.iter().zip(pow.iter()) {
            prop_assert!((p - m * m).abs() <= 1e-4 * p.max(1.0));
        }
    }

    #[test]
    fn vectors_become_columns(v in prop::collection::vec(-1e3f64..1e3, 0..200)) {
        let m = to_feature_matrix(&Array1::from(v.clone()), FRAMES_FIRST).unwrap();
        prop_assert_eq!(m.shape(), &[v.len(), 1]);
    }

    #[test]
    fn frames_last_transposes(rows in 1usize..20, cols in 1usize..20) {
        let native = Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f32);
        let m = to_feature_matrix(&native, FRAMES_LAST).unwrap();
        prop_assert_eq!(m.shape(), &[cols, rows]);
        prop_assert_eq!(m, native.t().to_owned());
    }

    #[test]
    fn quantiles_are_ordered(x in prop::collection::vec(-100.0f32..100.0, 1..300)) {
        let (lo, q1, med, q3, hi) = (
            stats::min(&x),
            stats::quantile(&x, 0.25),
            stats::median(&x),
            stats::quantile(&x, 0.75),
            stats::max(&x),
        );
        prop_assert!(lo <= q1 && q1 <= med && med <= q3 && q3 <= hi);
    }
}

use ndarray::{Array2, Axis};
use num_complex::Complex32;

/// Default median filter length (frames for harmonic, bins for percussive).
pub const DEFAULT_KERNEL_SIZE: usize = 31;

/// Harmonic-Percussive Source Separation using median filtering.
///
/// The magnitude spectrogram is median-filtered along time to enhance
/// harmonic (horizontal) structure and along frequency to enhance
/// percussive (vertical) structure. Each component is recovered from the
/// input with a soft mask `H^p / (H^p + (margin * P)^p)` and its mirror.
/// With `margin > 1` the two masks no longer sum to one and the residual
/// is discarded.
///
/// # Arguments
/// * `stft` - Complex STFT spectrogram `(n_freq, n_frames)`
/// * `kernel_size` - (harmonic_kernel, percussive_kernel) for median filtering
/// * `power` - Exponent for the soft masks
/// * `margin` - Separation margin, at least 1
///
/// # Returns
/// `(harmonic, percussive)` complex spectrograms, same shape as `stft`
pub fn hpss(
    stft: &Array2<Complex32>,
    kernel_size: (usize, usize),
    power: f32,
    margin: f32,
) -> crate::Result<(Array2<Complex32>, Array2<Complex32>)> {
    crate::utils::check_positive("kernel_size", kernel_size.0)?;
    crate::utils::check_positive("kernel_size", kernel_size.1)?;
    if !(power > 0.0 && power.is_finite()) {
        return Err(crate::Error::InvalidParameter {
            name: "power",
            value: power.to_string(),
            reason: "must be a positive finite number".to_string(),
        });
    }
    if !(margin >= 1.0) {
        return Err(crate::Error::InvalidParameter {
            name: "margin",
            value: margin.to_string(),
            reason: "must be >= 1".to_string(),
        });
    }

    let mag = stft.mapv(|c| c.norm());
    let harmonic = median_filter(&mag, Axis(1), kernel_size.0);
    let percussive = median_filter(&mag, Axis(0), kernel_size.1);

    // Bins where both filters vanish are split evenly only without a margin.
    let split_zeros = margin == 1.0;
    let mut stft_h = stft.clone();
    let mut stft_p = stft.clone();
    for ((idx, h_out), p_out) in stft_h.indexed_iter_mut().zip(stft_p.iter_mut()) {
        let (h, p) = (harmonic[idx], percussive[idx]);
        let mask_h = softmask(h, margin * p, power, split_zeros);
        let mask_p = softmask(p, margin * h, power, split_zeros);
        *h_out *= mask_h;
        *p_out *= mask_p;
    }

    Ok((stft_h, stft_p))
}

fn softmask(x: f32, x_ref: f32, power: f32, split_zeros: bool) -> f32 {
    let z = x.max(x_ref);
    if z < f32::MIN_POSITIVE {
        return if split_zeros { 0.5 } else { 0.0 };
    }
    let m = (x / z).powf(power);
    let r = (x_ref / z).powf(power);
    m / (m + r)
}

/// Median filter of odd or even `size` along one axis, reflecting at the edges.
fn median_filter(input: &Array2<f32>, axis: Axis, size: usize) -> Array2<f32> {
    let mut output = input.clone();
    if size <= 1 {
        return output;
    }
    let half = (size / 2) as isize;
    let mut window = vec![0.0f32; size];
    for (lane_in, mut lane_out) in input.lanes(axis).into_iter().zip(output.lanes_mut(axis)) {
        let n = lane_in.len() as isize;
        for (i, out) in lane_out.iter_mut().enumerate() {
            for (k, w) in window.iter_mut().enumerate() {
                let j = reflect(i as isize + k as isize - half, n);
                *w = lane_in[j];
            }
            let (_, median, _) = window.select_nth_unstable_by(size / 2, f32::total_cmp);
            *out = *median;
        }
    }
    output
}

/// Map an out-of-range index back into `0..n` by mirror reflection (edge sample repeated).
fn reflect(i: isize, n: isize) -> usize {
    let m = i.rem_euclid(2 * n);
    (if m < n { m } else { 2 * n - 1 - m }) as usize
}

/// Extract the harmonic component of an STFT (power 2, margin 1).
pub fn harmonic(stft: &Array2<Complex32>, kernel_size: usize) -> crate::Result<Array2<Complex32>> {
    Ok(hpss(stft, (kernel_size, kernel_size), 2.0, 1.0)?.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_stft() -> Array2<Complex32> {
        Array2::from_shape_vec(
            (10, 20),
            (0..200)
                .map(|i| Complex32::new((i as f32 * 0.1).sin(), (i as f32 * 0.05).cos()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_hpss_shape() {
        let stft = create_test_stft();
        let (h, p) = hpss(&stft, (31, 31), 2.0, 1.0).unwrap();

        assert_eq!(h.shape(), stft.shape());
        assert_eq!(p.shape(), stft.shape());
    }

    #[test]
    fn test_unit_margin_masks_sum_to_one() {
        let stft = create_test_stft();
        let (h, p) = hpss(&stft, (5, 5), 2.0, 1.0).unwrap();
        for ((x, hh), pp) in stft.iter().zip(h.iter()).zip(p.iter()) {
            assert_relative_eq!((hh + pp).re, x.re, epsilon = 1e-5);
            assert_relative_eq!((hh + pp).im, x.im, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_wider_margin_loses_energy() {
        let stft = create_test_stft();
        let energy = |a: &Array2<Complex32>| a.iter().map(|c| c.norm_sqr()).sum::<f32>();
        let (h1, p1) = hpss(&stft, (5, 5), 2.0, 1.0).unwrap();
        let (h3, p3) = hpss(&stft, (5, 5), 2.0, 3.0).unwrap();
        assert!(energy(&h3) + energy(&p3) < energy(&h1) + energy(&p1));
    }

    #[test]
    fn test_sustained_tone_is_harmonic() {
        // a constant row is harmonic, a constant column is percussive
        let mut stft = Array2::<Complex32>::zeros((9, 9));
        stft.row_mut(4).fill(Complex32::new(1.0, 0.0));
        stft.column_mut(2).fill(Complex32::new(0.0, 1.0));
        let (h, p) = hpss(&stft, (5, 5), 2.0, 1.0).unwrap();
        assert!(h[(4, 6)].norm() > 0.99);
        assert!(p[(7, 2)].norm() > 0.99);
    }

    #[test]
    fn test_hpss_rejects_bad_parameters() {
        let stft = create_test_stft();
        assert!(hpss(&stft, (0, 31), 2.0, 1.0).is_err());
        assert!(hpss(&stft, (31, 31), 2.0, 0.5).is_err());
        assert!(hpss(&stft, (31, 31), 0.0, 1.0).is_err());
    }

    #[test]
    fn test_hpss_empty() {
        let stft = Array2::<Complex32>::zeros((0, 0));
        let (h, p) = hpss(&stft, (31, 31), 2.0, 1.0).unwrap();

        assert_eq!(h.shape(), &[0, 0]);
        assert_eq!(p.shape(), &[0, 0]);
    }

    #[test]
    fn test_median_filter_reflects_edges() {
        let input =
            Array2::from_shape_vec((1, 5), vec![5.0, 1.0, 2.0, 3.0, 9.0]).unwrap();
        let filtered = median_filter(&input, Axis(1), 3);
        // edge windows: [5, 5, 1] and [3, 9, 9]
        assert_eq!(filtered.row(0).to_vec(), vec![5.0, 2.0, 2.0, 3.0, 9.0]);
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(12, 5), 2);
    }
}

//! LPC-based formant tracking.

use crate::contract;
use crate::frame;
use nalgebra::DMatrix;
use ndarray::{Array2, Axis};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Formant analysis window, in seconds.
pub const FORMANT_FRAME_SECONDS: f64 = 0.03;
/// Formant analysis hop, in seconds.
pub const FORMANT_HOP_SECONDS: f64 = 0.01;

const SILENCE_ATOL: f64 = 1e-8;
const SCHUR_EPS: f64 = 1e-12;
const SCHUR_MAX_ITER: usize = 500;

/// Linear prediction coefficients by Burg's method.
///
/// # Arguments
/// * `y` - Input signal; must be longer than `order` and finite
/// * `order` - Prediction order, at least 1
///
/// # Returns
/// `order + 1` coefficients `[1, a1, ..., a_order]` of the prediction-error
/// filter `1 + a1·z⁻¹ + ... + a_order·z⁻ᵒʳᵈᵉʳ`
///
/// # Errors
/// [`crate::Error::IllConditioned`] when the recursion yields non-finite
/// coefficients.
///
/// # Example
/// ```
/// use audiofeatures::feature::formant::lpc;
/// use audiofeatures::synth::tone;
///
/// // A sinusoid at w = pi/4 is predicted by 1 - 2cos(w) z⁻¹ + z⁻²
/// let a = lpc(&tone(1000.0, 8000, 0.1), 2).unwrap();
/// assert_eq!(a.len(), 3);
/// assert!((a[1] + 2.0f32.sqrt()).abs() < 0.05);
/// ```
pub fn lpc(y: &[f32], order: usize) -> crate::Result<Vec<f32>> {
    crate::utils::check_positive("order", order)?;
    crate::utils::valid_audio(y)?;
    if y.len() <= order {
        return Err(crate::Error::InvalidParameter {
            name: "order",
            value: order.to_string(),
            reason: format!("signal of {} samples is too short", y.len()),
        });
    }

    let y: Vec<f64> = y.iter().map(|&v| v as f64).collect();
    let mut coeffs = vec![0.0f64; order + 1];
    coeffs[0] = 1.0;
    let mut prev = coeffs.clone();

    let mut fwd: Vec<f64> = y[1..].to_vec();
    let mut bwd: Vec<f64> = y[..y.len() - 1].to_vec();
    let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
    let mut den = dot(&fwd, &fwd) + dot(&bwd, &bwd);

    for i in 0..order {
        let reflection = -2.0 * dot(&bwd, &fwd) / (den + f64::MIN_POSITIVE);

        std::mem::swap(&mut prev, &mut coeffs);
        for j in 1..=i + 1 {
            coeffs[j] = prev[j] + reflection * prev[i + 1 - j];
        }

        for (f, b) in fwd.iter_mut().zip(bwd.iter_mut()) {
            let f_old = *f;
            *f += reflection * *b;
            *b += reflection * f_old;
        }

        let q = 1.0 - reflection * reflection;
        let last_b = bwd.last().copied().unwrap_or(0.0);
        let first_f = fwd.first().copied().unwrap_or(0.0);
        den = q * den - last_b * last_b - first_f * first_f;

        if !fwd.is_empty() {
            fwd.remove(0);
        }
        bwd.pop();
    }

    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(crate::Error::IllConditioned { what: "lpc" });
    }
    Ok(coeffs.into_iter().map(|c| c as f32).collect())
}

/// Complex roots of the polynomial `c[0]·xⁿ + c[1]·xⁿ⁻¹ + ... + c[n]`.
///
/// Leading zero coefficients are ignored and trailing zeros contribute roots
/// at the origin. The remaining roots are the eigenvalues of the companion
/// matrix.
///
/// # Errors
/// [`crate::Error::IllConditioned`] for non-finite coefficients or if the
/// eigenvalue iteration does not converge.
///
/// # Example
/// ```
/// use audiofeatures::feature::formant::polynomial_roots;
///
/// // x² - 3x + 2 = (x - 1)(x - 2)
/// let mut roots: Vec<f64> = polynomial_roots(&[1.0, -3.0, 2.0])
///     .unwrap()
///     .iter()
///     .map(|r| r.re)
///     .collect();
/// roots.sort_by(f64::total_cmp);
/// assert!((roots[0] - 1.0).abs() < 1e-9 && (roots[1] - 2.0).abs() < 1e-9);
/// ```
pub fn polynomial_roots(coeffs: &[f32]) -> crate::Result<Vec<Complex64>> {
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(crate::Error::IllConditioned { what: "polynomial roots" });
    }
    let Some(first) = coeffs.iter().position(|&c| c != 0.0) else {
        return Ok(Vec::new());
    };
    let Some(last) = coeffs.iter().rposition(|&c| c != 0.0) else {
        return Ok(Vec::new());
    };
    let zeros_at_origin = coeffs.len() - 1 - last;
    let poly: Vec<f64> = coeffs[first..=last].iter().map(|&c| c as f64).collect();

    let degree = poly.len() - 1;
    let mut roots = Vec::with_capacity(degree + zeros_at_origin);
    if degree > 0 {
        let mut companion = DMatrix::<f64>::zeros(degree, degree);
        for j in 0..degree {
            companion[(0, j)] = -poly[j + 1] / poly[0];
        }
        for i in 1..degree {
            companion[(i, i - 1)] = 1.0;
        }
        let schur = companion
            .try_schur(SCHUR_EPS, SCHUR_MAX_ITER)
            .ok_or(crate::Error::IllConditioned { what: "polynomial roots" })?;
        roots.extend(
            schur
                .complex_eigenvalues()
                .iter()
                .map(|e| Complex64::new(e.re, e.im)),
        );
    }
    roots.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), zeros_at_origin));
    Ok(roots)
}

/// Formant candidates of one mean-removed frame, ascending, at most `n_formants`.
fn frame_formants(
    frame: &[f32],
    sr: u32,
    order: usize,
    n_formants: usize,
) -> crate::Result<Vec<f32>> {
    let a = lpc(frame, order)?;
    let nyquist = sr as f64 / 2.0;
    let mut freqs: Vec<f64> = polynomial_roots(&a)?
        .into_iter()
        .filter(|r| r.im >= 0.0)
        .map(|r| r.im.atan2(r.re) * sr as f64 / (2.0 * PI))
        .filter(|&f| f > 0.0 && f < nyquist)
        .collect();
    freqs.sort_by(f64::total_cmp);
    freqs.truncate(n_formants);
    Ok(freqs.into_iter().map(|f| f as f32).collect())
}

/// Estimate formant frequencies per frame from LPC polynomial roots.
///
/// The signal is framed with a 30 ms window and 10 ms hop (centered). Each
/// frame is mean-removed and fitted with an order-`order` LPC model; root
/// angles in `(0, sr/2)` become candidate formants, sorted ascending.
/// Silent frames and frames whose fit fails keep an all-zero row, as do
/// slots beyond the number of candidates found.
///
/// # Arguments
/// * `y` - Input audio signal
/// * `sr` - Sample rate in Hz
/// * `order` - LPC order (12 is typical for speech)
/// * `n_formants` - Number of formant slots per frame
///
/// # Returns
/// Formant frequencies in Hz, shape `(n_frames, n_formants)`
///
/// # Example
/// ```
/// use audiofeatures::feature::formant::formant_frequencies;
/// use audiofeatures::synth::tone;
///
/// let y = tone(700.0, 8000, 0.2);
/// let f = formant_frequencies(&y, 8000, 2, 2).unwrap();
/// assert_eq!(f.ncols(), 2);
/// assert!((f[(10, 0)] - 700.0).abs() < 50.0);
/// ```
pub fn formant_frequencies(
    y: &[f32],
    sr: u32,
    order: usize,
    n_formants: usize,
) -> crate::Result<Array2<f32>> {
    crate::utils::check_sr(sr)?;
    crate::utils::check_positive("order", order)?;
    crate::utils::check_positive("n_formants", n_formants)?;

    let frame_length = ((FORMANT_FRAME_SECONDS * sr as f64) as usize).max(3);
    let hop_length = ((FORMANT_HOP_SECONDS * sr as f64) as usize).max(1);
    let frames = frame::frame_signal(y, frame_length, hop_length, true)?;

    let mut formants = Array2::<f32>::zeros((frames.nrows(), n_formants));
    let mut failed = 0usize;
    for (i, row) in frames.axis_iter(Axis(0)).enumerate() {
        let mean = row.iter().map(|&v| v as f64).sum::<f64>() / frame_length as f64;
        let centered: Vec<f32> = row.iter().map(|&v| (v as f64 - mean) as f32).collect();
        if centered.iter().all(|v| (v.abs() as f64) <= SILENCE_ATOL) {
            continue;
        }
        match frame_formants(&centered, sr, order, n_formants) {
            Ok(freqs) => {
                for (slot, f) in formants.row_mut(i).iter_mut().zip(freqs) {
                    *slot = f;
                }
            }
            Err(err) => {
                failed += 1;
                log::debug!("formant frame {i} skipped: {err}");
            }
        }
    }
    if failed > 0 {
        log::debug!("{failed} of {} formant frames left empty", frames.nrows());
    }

    contract::to_feature_matrix(&formants, contract::FRAMES_FIRST)
}

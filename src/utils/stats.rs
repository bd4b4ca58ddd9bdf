//! Descriptive statistics over a sample slice.
//!
//! Accumulation is done in `f64`. Every function returns `NaN` for an empty
//! slice. Skewness and kurtosis use the bias-corrected estimators and are
//! `NaN` when the sample variance is numerically zero.

fn moments(x: &[f32]) -> (f64, f64, f64, f64) {
    let n = x.len() as f64;
    let mean = x.iter().map(|&v| v as f64).sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0f64, 0.0f64, 0.0f64);
    for &v in x {
        let d = v as f64 - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (mean, m2 / n, m3 / n, m4 / n)
}

fn variance_is_zero(mean: f64, m2: f64) -> bool {
    m2 <= (f64::EPSILON * 10.0 * mean).powi(2)
}

pub fn mean(x: &[f32]) -> f32 {
    if x.is_empty() {
        return f32::NAN;
    }
    (x.iter().map(|&v| v as f64).sum::<f64>() / x.len() as f64) as f32
}

/// Population standard deviation.
pub fn std(x: &[f32]) -> f32 {
    if x.is_empty() {
        return f32::NAN;
    }
    let (_, m2, _, _) = moments(x);
    m2.sqrt() as f32
}

pub fn min(x: &[f32]) -> f32 {
    if x.is_empty() {
        return f32::NAN;
    }
    x.iter().copied().fold(f32::INFINITY, f32::min)
}

pub fn max(x: &[f32]) -> f32 {
    if x.is_empty() {
        return f32::NAN;
    }
    x.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

pub fn rms(x: &[f32]) -> f32 {
    if x.is_empty() {
        return f32::NAN;
    }
    let sum: f64 = x.iter().map(|&v| (v as f64) * (v as f64)).sum();
    (sum / x.len() as f64).sqrt() as f32
}

/// Quantile `q` in `[0, 1]` with linear interpolation between order statistics.
pub fn quantile(x: &[f32], q: f32) -> f32 {
    if x.is_empty() {
        return f32::NAN;
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) as f64 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    (sorted[lo] as f64 + (sorted[hi] as f64 - sorted[lo] as f64) * frac) as f32
}

pub fn median(x: &[f32]) -> f32 {
    quantile(x, 0.5)
}

/// Bias-corrected sample skewness (adjusted Fisher-Pearson coefficient).
///
/// With fewer than three samples the uncorrected coefficient is returned.
pub fn skewness(x: &[f32]) -> f32 {
    if x.is_empty() {
        return f32::NAN;
    }
    let (mean, m2, m3, _) = moments(x);
    if variance_is_zero(mean, m2) {
        return f32::NAN;
    }
    let g1 = m3 / m2.powf(1.5);
    let n = x.len() as f64;
    if n > 2.0 {
        ((n * (n - 1.0)).sqrt() / (n - 2.0) * g1) as f32
    } else {
        g1 as f32
    }
}

/// Bias-corrected sample excess kurtosis.
///
/// With fewer than four samples the uncorrected excess kurtosis is returned.
pub fn kurtosis(x: &[f32]) -> f32 {
    if x.is_empty() {
        return f32::NAN;
    }
    let (mean, m2, _, m4) = moments(x);
    if variance_is_zero(mean, m2) {
        return f32::NAN;
    }
    let g2 = m4 / (m2 * m2);
    let n = x.len() as f64;
    if n > 3.0 {
        let corrected = ((n * n - 1.0) * g2 - 3.0 * (n - 1.0).powi(2)) / ((n - 2.0) * (n - 3.0));
        corrected as f32
    } else {
        (g2 - 3.0) as f32
    }
}

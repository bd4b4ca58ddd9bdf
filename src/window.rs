//! Window functions for framing and short-time analysis.
//!
//! Every window comes in two samplings: [`Sampling::Periodic`] (DFT-even,
//! used by the STFT) and [`Sampling::Symmetric`] (used when tapering a
//! batch of frames directly).

use std::f32::consts::PI;

/// Shape parameter used for the Kaiser window.
pub const KAISER_BETA: f32 = 14.0;

/// How the window endpoints are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// `n` samples of an `n + 1` point symmetric window, last point dropped.
    Periodic,
    /// Endpoints are mirror images of each other.
    Symmetric,
}

impl Sampling {
    fn denominator(self, n: usize) -> f32 {
        match self {
            Sampling::Periodic => n as f32,
            Sampling::Symmetric => (n - 1) as f32,
        }
    }
}

fn cosine_sum(n: usize, sampling: Sampling, coeffs: &[f32]) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = sampling.denominator(n);
    (0..n)
        .map(|i| {
            let a = 2.0 * PI * i as f32 / m;
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * c * (k as f32 * a).cos()
                })
                .sum()
        })
        .collect()
}

/// Compute a Hann (raised cosine) window.
///
/// The Hann window is one of the most commonly used windows in spectral
/// analysis. It has good frequency resolution and moderate spectral leakage.
pub fn hann(n: usize, sampling: Sampling) -> Vec<f32> {
    cosine_sum(n, sampling, &[0.5, 0.5])
}

/// Compute a Hamming window.
///
/// Similar to Hann but with coefficients that reduce the first side lobe.
pub fn hamming(n: usize, sampling: Sampling) -> Vec<f32> {
    cosine_sum(n, sampling, &[0.54, 0.46])
}

/// Compute a Blackman window.
///
/// Better side lobe suppression than Hann or Hamming, at the cost of a
/// wider main lobe.
pub fn blackman(n: usize, sampling: Sampling) -> Vec<f32> {
    cosine_sum(n, sampling, &[0.42, 0.5, 0.08])
}

/// Compute a Bartlett (triangular) window that reaches zero at the edges.
pub fn bartlett(n: usize, sampling: Sampling) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = sampling.denominator(n);
    (0..n)
        .map(|i| 1.0 - (2.0 * i as f32 / m - 1.0).abs())
        .collect()
}

/// Zeroth-order modified Bessel function of the first kind.
fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0f64;
    let mut term = 1.0f64;
    let half = x / 2.0;
    for k in 1..200 {
        term *= (half / k as f64) * (half / k as f64);
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}

/// Compute a Kaiser window with shape parameter `beta`.
pub fn kaiser(n: usize, beta: f32, sampling: Sampling) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = sampling.denominator(n) as f64;
    let beta = beta as f64;
    let norm = bessel_i0(beta);
    (0..n)
        .map(|i| {
            let r = 2.0 * i as f64 / m - 1.0;
            let arg = beta * (1.0 - r * r).max(0.0).sqrt();
            (bessel_i0(arg) / norm) as f32
        })
        .collect()
}

/// Named window shapes accepted throughout the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    #[default]
    Hann,
    Hamming,
    Blackman,
    Bartlett,
    Kaiser,
    Rectangular,
}

impl WindowType {
    /// Canonical names, in the order they are reported in errors.
    pub const SUPPORTED: &'static [&'static str] = &[
        "hann",
        "hamming",
        "blackman",
        "bartlett",
        "kaiser",
        "rectangular",
    ];

    /// Parse a window type from its name (case-insensitive).
    ///
    /// # Errors
    /// Returns [`crate::Error::Unsupported`] listing the supported names.
    ///
    /// # Example
    /// ```
    /// use audiofeatures::window::WindowType;
    ///
    /// assert_eq!(WindowType::parse("Hann").unwrap(), WindowType::Hann);
    /// assert!(WindowType::parse("gaussian").is_err());
    /// ```
    pub fn parse(name: &str) -> crate::Result<Self> {
        match name.to_lowercase().as_str() {
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "bartlett" => Ok(WindowType::Bartlett),
            "kaiser" => Ok(WindowType::Kaiser),
            "rectangular" | "boxcar" | "ones" => Ok(WindowType::Rectangular),
            _ => Err(crate::Error::Unsupported {
                kind: "window type",
                got: name.to_string(),
                supported: Self::SUPPORTED,
            }),
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::Bartlett => "bartlett",
            WindowType::Kaiser => "kaiser",
            WindowType::Rectangular => "rectangular",
        }
    }
}

impl std::str::FromStr for WindowType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        WindowType::parse(s)
    }
}

/// Get a window of the specified type and length.
///
/// # Example
/// ```
/// use audiofeatures::window::{get_window, Sampling, WindowType};
///
/// let w = get_window(WindowType::Hann, 512, Sampling::Periodic);
/// assert_eq!(w.len(), 512);
/// ```
pub fn get_window(window: WindowType, n: usize, sampling: Sampling) -> Vec<f32> {
    match window {
        WindowType::Hann => hann(n, sampling),
        WindowType::Hamming => hamming(n, sampling),
        WindowType::Blackman => blackman(n, sampling),
        WindowType::Bartlett => bartlett(n, sampling),
        WindowType::Kaiser => kaiser(n, KAISER_BETA, sampling),
        WindowType::Rectangular => vec![1.0; n],
    }
}

/// Get a window from a string specification.
pub fn get_window_from_str(name: &str, n: usize, sampling: Sampling) -> crate::Result<Vec<f32>> {
    WindowType::parse(name).map(|wtype| get_window(wtype, n, sampling))
}

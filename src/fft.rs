use num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// FFT plan for forward and inverse complex FFT operations.
///
/// This struct caches FFT plans for efficient reuse.
///
/// # Example
/// ```
/// use audiofeatures::fft::FftPlan;
/// use num_complex::Complex32;
///
/// let plan = FftPlan::new(512);
/// let mut buffer = vec![Complex32::new(1.0, 0.0); 512];
/// plan.forward(&mut buffer);
/// plan.inverse(&mut buffer);
/// assert!((buffer[3].re - 1.0).abs() < 1e-5);
/// ```
pub struct FftPlan {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    len: usize,
}

impl FftPlan {
    /// Create a new FFT plan for a given size.
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        Self {
            forward,
            inverse,
            len,
        }
    }

    /// Perform forward FFT in-place.
    pub fn forward(&self, buffer: &mut [Complex32]) {
        self.forward.process(buffer);
    }

    /// Perform inverse FFT in-place, scaled by `1 / len`.
    pub fn inverse(&self, buffer: &mut [Complex32]) {
        self.inverse.process(buffer);
        let scale = 1.0 / self.len as f32;
        for v in buffer.iter_mut() {
            *v *= scale;
        }
    }
}

/// Real-to-complex forward FFT plan.
///
/// Produces the `len / 2 + 1` non-redundant bins of a real input frame.
/// Shared across STFT frames.
pub struct RealFftPlan {
    r2c: Arc<dyn RealToComplex<f32>>,
    len: usize,
}

impl RealFftPlan {
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(len);
        Self { r2c, len }
    }

    /// Number of output bins.
    pub fn n_bins(&self) -> usize {
        self.len / 2 + 1
    }

    /// Transform one frame. `input` is used as scratch and must hold `len` samples.
    pub fn forward(&self, input: &mut [f32]) -> Vec<Complex32> {
        let mut out = self.r2c.make_output_vec();
        // Lengths always match the plan, which is the only failure mode.
        if self.r2c.process(input, &mut out).is_err() {
            out.iter_mut().for_each(|c| *c = Complex32::new(0.0, 0.0));
        }
        out
    }
}

#[cfg(feature = "parallel")]
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<FftPlan>();
        _assert_send_sync::<RealFftPlan>();
    }
};

/// Compute the real-to-complex FFT (rfft) of a real-valued input.
///
/// # Example
/// ```
/// use audiofeatures::fft::rfft;
///
/// let spectrum = rfft(&vec![1.0f32; 1024]);
/// assert_eq!(spectrum.len(), 513);
/// ```
pub fn rfft(input: &[f32]) -> Vec<Complex32> {
    if input.is_empty() {
        return Vec::new();
    }
    let plan = RealFftPlan::new(input.len());
    let mut in_buf = input.to_vec();
    plan.forward(&mut in_buf)
}

/// Compute autocorrelation using FFT.
///
/// Returns unnormalized autocorrelation values for lags `0..max_lag`.
pub fn autocorrelate(y: &[f32], max_lag: Option<usize>) -> Vec<f32> {
    if y.is_empty() {
        return Vec::new();
    }

    let n = y.len();
    let max_lag = max_lag.unwrap_or(n).min(n);
    let fft_size = n.next_power_of_two() * 2;

    let mut buffer = vec![Complex32::new(0.0, 0.0); fft_size];
    for (b, &v) in buffer.iter_mut().zip(y) {
        b.re = v;
    }

    let fft = FftPlan::new(fft_size);
    fft.forward(&mut buffer);

    for c in buffer.iter_mut() {
        *c = Complex32::new(c.norm_sqr(), 0.0);
    }

    fft.inverse(&mut buffer);

    buffer.iter().take(max_lag).map(|c| c.re).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rfft_dc() {
        let spectrum = rfft(&[1.0f32; 8]);
        assert_eq!(spectrum.len(), 5);
        assert_relative_eq!(spectrum[0].re, 8.0, epsilon = 1e-5);
        assert_relative_eq!(spectrum[1].norm(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_autocorrelate_matches_direct() {
        let y = [1.0f32, 2.0, -1.0, 0.5, 3.0];
        let ac = autocorrelate(&y, None);
        for lag in 0..y.len() {
            let direct: f32 = (0..y.len() - lag).map(|i| y[i] * y[i + lag]).sum();
            assert_relative_eq!(ac[lag], direct, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_autocorrelate_max_lag() {
        assert_eq!(autocorrelate(&[1.0; 16], Some(4)).len(), 4);
        assert!(autocorrelate(&[], None).is_empty());
    }
}

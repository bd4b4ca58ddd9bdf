use std::path::Path;

/// Supplies mono samples for a file path at a requested sample rate.
///
/// Decoding and resampling live outside this crate; implementations wrap
/// their own failures in [`crate::Error::Source`].
///
/// # Example
/// ```
/// use audiofeatures::pipeline::SignalSource;
/// use std::path::Path;
///
/// let silence = |_: &Path, sr: u32| -> audiofeatures::Result<Vec<f32>> {
///     Ok(vec![0.0; sr as usize])
/// };
/// assert_eq!(silence.load(Path::new("a.wav"), 8000).unwrap().len(), 8000);
/// ```
pub trait SignalSource {
    fn load(&self, path: &Path, sr: u32) -> crate::Result<Vec<f32>>;
}

impl<F> SignalSource for F
where
    F: Fn(&Path, u32) -> crate::Result<Vec<f32>>,
{
    fn load(&self, path: &Path, sr: u32) -> crate::Result<Vec<f32>> {
        self(path, sr)
    }
}

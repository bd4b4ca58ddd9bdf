/// Validate that audio data is non-empty and finite.
///
/// # Example
/// ```
/// use audiofeatures::utils::valid_audio;
///
/// assert!(valid_audio(&[0.0, 0.5, -0.5, 0.0]).is_ok());
/// assert!(valid_audio(&[]).is_err());
/// assert!(valid_audio(&[0.0, f32::NAN]).is_err());
/// ```
pub fn valid_audio(y: &[f32]) -> crate::Result<()> {
    if y.is_empty() {
        return Err(crate::Error::EmptyAudio);
    }

    if !y.iter().all(|&v| v.is_finite()) {
        return Err(crate::Error::NonFiniteAudio);
    }

    Ok(())
}

/// Reject a zero size parameter.
pub fn check_positive(name: &'static str, value: usize) -> crate::Result<()> {
    if value == 0 {
        return Err(crate::Error::non_positive(name, value));
    }
    Ok(())
}

/// Reject a zero sample rate.
pub fn check_sr(sr: u32) -> crate::Result<()> {
    if sr == 0 {
        return Err(crate::Error::InvalidParameter {
            name: "sr",
            value: sr.to_string(),
            reason: "sample rate must be > 0".to_string(),
        });
    }
    Ok(())
}

/// Require `value` to lie in the closed unit interval.
pub fn check_fraction(name: &'static str, value: f32) -> crate::Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(crate::Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be in [0, 1]".to_string(),
        });
    }
    Ok(())
}

//! Feature-matrix contract.
//!
//! Every extractor in [`crate::feature`] returns an `(n_frames, n_features)`
//! `f32` matrix. Extractors whose native layout is feature-major hand their
//! output to [`to_feature_matrix`] with `frame_axis = 1`; nothing else in the
//! crate deals with orientation.

use ndarray::{Array2, ArrayBase, Axis, Data, Dimension, Ix1, Ix2};
use num_traits::AsPrimitive;

/// Frames are already the leading axis.
pub const FRAMES_FIRST: usize = 0;
/// Frames are the trailing axis (e.g. `(n_mels, n_frames)`).
pub const FRAMES_LAST: usize = 1;

/// Convert a 1-D or 2-D array to a canonical `(n_frames, n_features)` `f32` matrix.
///
/// * 1-D input of length `n` becomes `(n, 1)`.
/// * 2-D input with `frame_axis = 0` passes through.
/// * 2-D input with `frame_axis = 1` is transposed.
///
/// # Errors
/// [`crate::Error::ShapeMismatch`] for any other dimensionality,
/// [`crate::Error::InvalidParameter`] for a `frame_axis` other than 0 or 1.
///
/// # Example
/// ```
/// use audiofeatures::contract::to_feature_matrix;
/// use ndarray::{Array1, Array2};
///
/// let column = to_feature_matrix(&Array1::from(vec![1.0f64, 2.0, 3.0]), 0).unwrap();
/// assert_eq!(column.shape(), &[3, 1]);
///
/// let mel = Array2::<f32>::zeros((40, 12));
/// assert_eq!(to_feature_matrix(&mel, 1).unwrap().shape(), &[12, 40]);
/// ```
pub fn to_feature_matrix<A, S, D>(values: &ArrayBase<S, D>, frame_axis: usize) -> crate::Result<Array2<f32>>
where
    A: AsPrimitive<f32>,
    S: Data<Elem = A>,
    D: Dimension,
{
    if frame_axis > FRAMES_LAST {
        return Err(crate::Error::InvalidParameter {
            name: "frame_axis",
            value: frame_axis.to_string(),
            reason: "must be 0 or 1".to_string(),
        });
    }

    let cast = values.mapv(|v| v.as_());
    match cast.ndim() {
        1 => {
            let column = cast
                .into_dimensionality::<Ix1>()
                .map_err(|e| shape_error("1-D array", e))?;
            Ok(column.insert_axis(Axis(1)))
        }
        2 => {
            let matrix = cast
                .into_dimensionality::<Ix2>()
                .map_err(|e| shape_error("2-D array", e))?;
            if frame_axis == FRAMES_LAST {
                Ok(matrix.reversed_axes().as_standard_layout().into_owned())
            } else {
                Ok(matrix)
            }
        }
        ndim => Err(crate::Error::ShapeMismatch {
            expected: "1-D or 2-D feature array".to_string(),
            got: format!("{ndim}-D array"),
        }),
    }
}

fn shape_error(expected: &str, err: ndarray::ShapeError) -> crate::Error {
    crate::Error::ShapeMismatch {
        expected: expected.to_string(),
        got: err.to_string(),
    }
}

/// Wrap a per-frame scalar sequence as an `(n, 1)` feature matrix.
pub(crate) fn column(values: Vec<f32>) -> Array2<f32> {
    ndarray::Array1::from(values).insert_axis(Axis(1))
}

/// Cast samples to `f32`, optionally clipping to `[-1, 1]`.
///
/// # Example
/// ```
/// use audiofeatures::contract::ensure_float32;
///
/// assert_eq!(ensure_float32(&[-2.0f64, 0.5, 2.0], true), vec![-1.0, 0.5, 1.0]);
/// assert_eq!(ensure_float32(&[0i16, 1, -1], false), vec![0.0, 1.0, -1.0]);
/// ```
pub fn ensure_float32<A: AsPrimitive<f32>>(values: &[A], clip: bool) -> Vec<f32> {
    values
        .iter()
        .map(|v| {
            let x: f32 = v.as_();
            if clip { x.clamp(-1.0, 1.0) } else { x }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3, array};

    #[test]
    fn test_1d_becomes_column() {
        let m = to_feature_matrix(&Array1::from(vec![1.0f32, 2.0, 3.0]), 0).unwrap();
        assert_eq!(m.shape(), &[3, 1]);
        assert_eq!(m[(2, 0)], 3.0);
    }

    #[test]
    fn test_frames_last_is_transposed() {
        let native = array![[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let m = to_feature_matrix(&native, FRAMES_LAST).unwrap();
        assert_eq!(m.shape(), &[3, 2]);
        assert_eq!(m[(0, 1)], 4.0);
        assert_eq!(m[(2, 0)], 3.0);
        assert!(m.is_standard_layout());
    }

    #[test]
    fn test_frames_first_passes_through() {
        let native = array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
        assert_eq!(to_feature_matrix(&native, FRAMES_FIRST).unwrap(), native);
    }

    #[test]
    fn test_invalid_axis_rejected() {
        let err = to_feature_matrix(&Array2::<f32>::zeros((2, 2)), 2).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidParameter { name: "frame_axis", .. }));
    }

    #[test]
    fn test_3d_rejected() {
        let err = to_feature_matrix(&Array3::<f32>::zeros((2, 2, 2)), 0).unwrap_err();
        assert!(matches!(err, crate::Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_empty_column() {
        assert_eq!(column(Vec::new()).shape(), &[0, 1]);
    }
}

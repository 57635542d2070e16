//! Copies between matrices and numpy arrays.
//!
//! Single-channel matrices map to `(rows, cols)` arrays, multi-channel ones
//! to `(rows, cols, channels)`. Both directions copy.

use cvmat_core::{Element, Mat};
use numpy::ndarray::{ArrayD, IxDyn};
use numpy::{Element as NpElement, IntoPyArray, PyReadonlyArrayDyn};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;

use crate::error::CvError;

fn array_from_mat<'py, T>(py: Python<'py>, mat: &Mat) -> PyResult<Bound<'py, PyAny>>
where
    T: Element + NpElement,
{
    let values = mat.to_vec::<T>().map_err(CvError)?;
    let shape = if mat.channels() == 1 {
        vec![mat.rows(), mat.cols()]
    } else {
        vec![mat.rows(), mat.cols(), mat.channels()]
    };
    let array = ArrayD::from_shape_vec(IxDyn(&shape), values)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(array.into_pyarray_bound(py).into_any())
}

pub fn to_numpy<'py>(py: Python<'py>, mat: &Mat) -> PyResult<Bound<'py, PyAny>> {
    cvmat_core::dispatch_depth!(mat.depth(), T => array_from_mat::<T>(py, mat))
}

fn mat_from_array<T>(array: PyReadonlyArrayDyn<'_, T>) -> PyResult<Mat>
where
    T: Element + NpElement,
{
    let view = array.as_array();
    let (rows, cols, cn) = match *view.shape() {
        [rows, cols] => (rows, cols, 1),
        [rows, cols, cn] => (rows, cols, cn),
        ref other => {
            return Err(PyValueError::new_err(format!(
                "expected a 2-D or 3-D array, got shape {other:?}"
            )))
        }
    };
    let values: Vec<T> = view.iter().copied().collect();
    Ok(Mat::from_vec(rows, cols, cn, values).map_err(CvError)?)
}

pub fn from_numpy(obj: &Bound<'_, PyAny>) -> PyResult<Mat> {
    macro_rules! try_dtypes {
        ($($t:ty),*) => {$(
            if let Ok(array) = obj.extract::<PyReadonlyArrayDyn<'_, $t>>() {
                return mat_from_array(array);
            }
        )*};
    }
    try_dtypes!(u8, i8, u16, i16, i32, f32, f64);
    Err(PyTypeError::new_err(
        "expected a numpy array of uint8, int8, uint16, int16, int32, float32 or float64",
    ))
}

use pyo3::create_exception;
use pyo3::exceptions::{
    PyException, PyIOError, PyIndexError, PyMemoryError, PyTypeError, PyValueError,
};
use pyo3::PyErr;

create_exception!(cvmat, Error, PyException, "Raised when a matrix operation fails.");

/// A library error on its way to becoming a Python exception.
#[derive(Debug)]
pub struct CvError(pub cvmat_core::Error);

impl From<cvmat_core::Error> for CvError {
    fn from(e: cvmat_core::Error) -> Self {
        CvError(e)
    }
}

impl From<CvError> for PyErr {
    fn from(err: CvError) -> Self {
        use cvmat_core::ErrorKind;
        let msg = err.0.to_string();
        match err.0.kind() {
            ErrorKind::Allocation => PyMemoryError::new_err(msg),
            ErrorKind::Index => PyIndexError::new_err(msg),
            ErrorKind::Type => PyTypeError::new_err(msg),
            ErrorKind::Value => PyValueError::new_err(msg),
            ErrorKind::Io => PyIOError::new_err(msg),
            ErrorKind::Computation => Error::new_err(msg),
        }
    }
}

//! Python value classes for `Scalar`, `Rect`, `Size` and `Point`, plus the
//! loose argument forms (numbers, tuples, lists) accepted in their place.

use cvmat_core::{Point, Rect, Scalar, Size};
use pyo3::exceptions::PyIndexError;
use pyo3::prelude::*;

#[pyclass(name = "Scalar", module = "cvmat")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyScalar {
    pub(crate) inner: Scalar,
}

#[pymethods]
impl PyScalar {
    #[new]
    #[pyo3(signature = (v0 = 0.0, v1 = 0.0, v2 = 0.0, v3 = 0.0))]
    fn new(v0: f64, v1: f64, v2: f64, v3: f64) -> Self {
        Self {
            inner: Scalar::new(v0, v1, v2, v3),
        }
    }

    #[staticmethod]
    fn all(v: f64) -> Self {
        Self {
            inner: Scalar::all(v),
        }
    }

    fn __len__(&self) -> usize {
        Scalar::LEN
    }

    fn __getitem__(&self, i: usize) -> PyResult<f64> {
        self.inner
            .0
            .get(i)
            .copied()
            .ok_or_else(|| PyIndexError::new_err(format!("scalar index {i} out of range")))
    }

    fn __setitem__(&mut self, i: usize, v: f64) -> PyResult<()> {
        let slot = self
            .inner
            .0
            .get_mut(i)
            .ok_or_else(|| PyIndexError::new_err(format!("scalar index {i} out of range")))?;
        *slot = v;
        Ok(())
    }

    fn __eq__(&self, other: &Self) -> bool {
        self == other
    }

    fn to_list(&self) -> Vec<f64> {
        self.inner.to_vec()
    }

    fn __repr__(&self) -> String {
        let [a, b, c, d] = self.inner.0;
        format!("Scalar({a}, {b}, {c}, {d})")
    }
}

impl From<Scalar> for PyScalar {
    fn from(inner: Scalar) -> Self {
        Self { inner }
    }
}

#[pyclass(name = "Rect", module = "cvmat", get_all, set_all)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[pymethods]
impl PyRect {
    #[new]
    #[pyo3(signature = (x = 0, y = 0, width = 0, height = 0))]
    fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn area(&self) -> i64 {
        Rect::from(*self).area()
    }

    fn __eq__(&self, other: &Self) -> bool {
        self == other
    }

    fn __repr__(&self) -> String {
        format!("Rect({}, {}, {}, {})", self.x, self.y, self.width, self.height)
    }
}

impl From<PyRect> for Rect {
    fn from(r: PyRect) -> Self {
        Rect::new(r.x, r.y, r.width, r.height)
    }
}

#[pyclass(name = "Size", module = "cvmat", get_all, set_all)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PySize {
    pub width: i32,
    pub height: i32,
}

#[pymethods]
impl PySize {
    #[new]
    #[pyo3(signature = (width = 0, height = 0))]
    fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    fn area(&self) -> i64 {
        Size::from(*self).area()
    }

    fn __eq__(&self, other: &Self) -> bool {
        self == other
    }

    fn __repr__(&self) -> String {
        format!("Size({}, {})", self.width, self.height)
    }
}

impl From<PySize> for Size {
    fn from(s: PySize) -> Self {
        Size::new(s.width, s.height)
    }
}

impl From<Size> for PySize {
    fn from(s: Size) -> Self {
        Self {
            width: s.width,
            height: s.height,
        }
    }
}

#[pyclass(name = "Point", module = "cvmat", get_all, set_all)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyPoint {
    pub x: i32,
    pub y: i32,
}

#[pymethods]
impl PyPoint {
    #[new]
    #[pyo3(signature = (x = 0, y = 0))]
    fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn __eq__(&self, other: &Self) -> bool {
        self == other
    }

    fn __repr__(&self) -> String {
        format!("Point({}, {})", self.x, self.y)
    }
}

impl From<PyPoint> for Point {
    fn from(p: PyPoint) -> Self {
        Point::new(p.x, p.y)
    }
}

/// A `Scalar`, a plain number (first channel only) or a sequence of up to
/// four numbers.
#[derive(FromPyObject)]
pub enum ScalarArg {
    Scalar(PyScalar),
    Number(f64),
    Sequence(Vec<f64>),
}

impl From<ScalarArg> for Scalar {
    fn from(arg: ScalarArg) -> Self {
        match arg {
            ScalarArg::Scalar(s) => s.inner,
            ScalarArg::Number(v) => Scalar::from(v),
            ScalarArg::Sequence(v) => Scalar::from_slice(&v),
        }
    }
}

#[derive(FromPyObject)]
pub enum RectArg {
    Rect(PyRect),
    Tuple((i32, i32, i32, i32)),
}

impl From<RectArg> for Rect {
    fn from(arg: RectArg) -> Self {
        match arg {
            RectArg::Rect(r) => r.into(),
            RectArg::Tuple((x, y, w, h)) => Rect::new(x, y, w, h),
        }
    }
}

#[derive(FromPyObject)]
pub enum SizeArg {
    Size(PySize),
    Tuple((i32, i32)),
}

impl From<SizeArg> for Size {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Size(s) => s.into(),
            SizeArg::Tuple((w, h)) => Size::new(w, h),
        }
    }
}

#[derive(FromPyObject)]
pub enum PointArg {
    Point(PyPoint),
    Tuple((i32, i32)),
}

impl From<PointArg> for Point {
    fn from(arg: PointArg) -> Self {
        match arg {
            PointArg::Point(p) => p.into(),
            PointArg::Tuple((x, y)) => Point::new(x, y),
        }
    }
}

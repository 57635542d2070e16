use cvmat_core::{Mat, MatType, Operand, Point, Scalar, Size};
use cvmat_imgproc::{AdaptiveMethod, BorderType, Interpolation, ThresholdType};
use cvmat_io::MatCodecExt;
use pyo3::exceptions::PyIndexError;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyTuple};

use crate::array;
use crate::error::CvError;
use crate::types::{PointArg, PyScalar, PySize, RectArg, ScalarArg, SizeArg};

/// Right-hand side of an arithmetic or bitwise method. A plain number stays
/// a number so that `mat * 2` scales every channel.
#[derive(FromPyObject)]
pub enum OperandArg<'py> {
    Mat(PyRef<'py, PyMat>),
    Scalar(PyScalar),
    Number(f64),
    Sequence(Vec<f64>),
}

impl OperandArg<'_> {
    fn apply<R>(&self, f: impl FnOnce(Operand<'_>) -> R) -> R {
        match self {
            OperandArg::Mat(m) => f(Operand::Mat(&m.inner)),
            OperandArg::Scalar(s) => f(Operand::Scalar(s.inner)),
            OperandArg::Number(v) => f(Operand::Number(*v)),
            OperandArg::Sequence(v) => f(Operand::Scalar(Scalar::from_slice(v))),
        }
    }
}

#[pyclass(name = "Mat", module = "cvmat")]
pub struct PyMat {
    pub(crate) inner: Mat,
}

impl From<Mat> for PyMat {
    fn from(inner: Mat) -> Self {
        Self { inner }
    }
}

fn wrap(result: cvmat_core::Result<Mat>) -> PyResult<PyMat> {
    Ok(PyMat::from(result.map_err(CvError)?))
}

fn border(code: i32) -> PyResult<BorderType> {
    Ok(BorderType::from_code(code).map_err(CvError)?)
}

fn shared(mats: &[PyRef<'_, PyMat>]) -> Vec<Mat> {
    mats.iter().map(|m| m.inner.share()).collect()
}

/// Python indices may be negative; those are out of range here.
fn element_index(idx: &Bound<'_, PyAny>) -> PyResult<Vec<usize>> {
    let raw: Vec<i64> = if let Ok(tuple) = idx.downcast::<PyTuple>() {
        tuple.extract()?
    } else {
        vec![idx.extract()?]
    };
    raw.into_iter()
        .map(|i| {
            usize::try_from(i).map_err(|_| PyIndexError::new_err(format!("negative index {i}")))
        })
        .collect()
}

#[pymethods]
impl PyMat {
    /// `Mat(rows, cols, type=CV_8UC1)` allocates; `Mat(mat, rect)` is a view
    /// on a region of `mat`.
    #[new]
    #[pyo3(signature = (rows_or_mat, cols_or_rect, mat_type = 0))]
    fn new(
        rows_or_mat: &Bound<'_, PyAny>,
        cols_or_rect: &Bound<'_, PyAny>,
        mat_type: i32,
    ) -> PyResult<Self> {
        if let Ok(src) = rows_or_mat.downcast::<PyMat>() {
            let rect: RectArg = cols_or_rect.extract()?;
            return wrap(src.borrow().inner.roi(rect.into()));
        }
        let rows: usize = rows_or_mat.extract()?;
        let cols: usize = cols_or_rect.extract()?;
        let mat_type = MatType::from_code(mat_type).map_err(CvError)?;
        wrap(Mat::new(rows, cols, mat_type))
    }

    #[staticmethod]
    fn zeros(rows: usize, cols: usize, mat_type: i32) -> PyResult<Self> {
        wrap(MatType::from_code(mat_type).and_then(|t| Mat::zeros(rows, cols, t)))
    }

    #[staticmethod]
    fn ones(rows: usize, cols: usize, mat_type: i32) -> PyResult<Self> {
        wrap(MatType::from_code(mat_type).and_then(|t| Mat::ones(rows, cols, t)))
    }

    #[staticmethod]
    fn eye(rows: usize, cols: usize, mat_type: i32) -> PyResult<Self> {
        wrap(MatType::from_code(mat_type).and_then(|t| Mat::eye(rows, cols, t)))
    }

    #[staticmethod]
    fn from_numpy(array: &Bound<'_, PyAny>) -> PyResult<Self> {
        Ok(array::from_numpy(array)?.into())
    }

    fn to_numpy<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        array::to_numpy(py, &self.inner)
    }

    #[getter]
    fn rows(&self) -> usize {
        self.inner.rows()
    }

    #[getter]
    fn height(&self) -> usize {
        self.inner.rows()
    }

    #[getter]
    fn cols(&self) -> usize {
        self.inner.cols()
    }

    #[getter]
    fn width(&self) -> usize {
        self.inner.cols()
    }

    #[getter]
    fn dims(&self) -> usize {
        self.inner.dims()
    }

    #[getter]
    fn depth(&self) -> i32 {
        self.inner.depth().code()
    }

    #[getter]
    fn channels(&self) -> usize {
        self.inner.channels()
    }

    #[getter]
    #[pyo3(name = "type")]
    fn mat_type(&self) -> i32 {
        self.inner.mat_type().code()
    }

    fn size(&self) -> PySize {
        self.inner.size().into()
    }

    fn total(&self) -> usize {
        self.inner.total()
    }

    fn elem_size(&self) -> usize {
        self.inner.elem_size()
    }

    fn is_continuous(&self) -> bool {
        self.inner.is_continuous()
    }

    /// Number of live handles on this matrix's buffer.
    fn ref_count(&self) -> usize {
        self.inner.ref_count()
    }

    fn clone(&self) -> Self {
        self.inner.clone().into()
    }

    fn roi(&self, rect: RectArg) -> PyResult<Self> {
        wrap(self.inner.roi(rect.into()))
    }

    #[pyo3(signature = (d = 0))]
    fn diag(&self, d: isize) -> PyResult<Self> {
        wrap(self.inner.diag(d))
    }

    fn __getitem__(&self, idx: &Bound<'_, PyAny>) -> PyResult<PyScalar> {
        let idx = element_index(idx)?;
        Ok(self.inner.at(&idx).map_err(CvError)?.into())
    }

    fn at(&self, idx: &Bound<'_, PyAny>) -> PyResult<PyScalar> {
        self.__getitem__(idx)
    }

    fn __setitem__(&mut self, idx: (usize, usize), value: ScalarArg) -> PyResult<()> {
        Ok(self.inner.set(idx.0, idx.1, value.into()).map_err(CvError)?)
    }

    #[pyo3(signature = (value, mask = None))]
    fn set_to(&mut self, value: ScalarArg, mask: Option<PyRef<'_, PyMat>>) -> PyResult<Self> {
        wrap(self.inner.set_to(value.into(), mask.as_deref().map(|m| &m.inner)))
    }

    #[pyo3(signature = (value = None))]
    fn set_identity(&mut self, value: Option<ScalarArg>) -> PyResult<()> {
        let s = value.map_or(Scalar::from(1.0), Scalar::from);
        Ok(self.inner.set_identity(s).map_err(CvError)?)
    }

    fn add(&self, other: OperandArg<'_>) -> PyResult<Self> {
        wrap(other.apply(|o| self.inner.add(o)))
    }

    fn sub(&self, other: OperandArg<'_>) -> PyResult<Self> {
        wrap(other.apply(|o| self.inner.sub(o)))
    }

    fn mul(&self, other: OperandArg<'_>) -> PyResult<Self> {
        wrap(other.apply(|o| self.inner.mul(o)))
    }

    fn div(&self, other: OperandArg<'_>) -> PyResult<Self> {
        wrap(other.apply(|o| self.inner.div(o)))
    }

    fn __add__(&self, other: OperandArg<'_>) -> PyResult<Self> {
        self.add(other)
    }

    fn __sub__(&self, other: OperandArg<'_>) -> PyResult<Self> {
        self.sub(other)
    }

    fn __mul__(&self, other: OperandArg<'_>) -> PyResult<Self> {
        self.mul(other)
    }

    fn __truediv__(&self, other: OperandArg<'_>) -> PyResult<Self> {
        self.div(other)
    }

    fn mul_elements(&self, other: PyRef<'_, PyMat>) -> PyResult<Self> {
        wrap(self.inner.mul_elements(&other.inner))
    }

    fn matmul(&self, other: PyRef<'_, PyMat>) -> PyResult<Self> {
        wrap(self.inner.matmul(&other.inner))
    }

    fn __matmul__(&self, other: PyRef<'_, PyMat>) -> PyResult<Self> {
        self.matmul(other)
    }

    fn absdiff(&self, other: OperandArg<'_>) -> PyResult<Self> {
        wrap(other.apply(|o| self.inner.absdiff(o)))
    }

    #[pyo3(signature = (other, mask = None))]
    fn bitwise_and(&self, other: OperandArg<'_>, mask: Option<PyRef<'_, PyMat>>) -> PyResult<Self> {
        let mask = mask.as_deref().map(|m| &m.inner);
        wrap(other.apply(|o| self.inner.bitwise_and(o, mask)))
    }

    #[pyo3(signature = (other, mask = None))]
    fn bitwise_or(&self, other: OperandArg<'_>, mask: Option<PyRef<'_, PyMat>>) -> PyResult<Self> {
        let mask = mask.as_deref().map(|m| &m.inner);
        wrap(other.apply(|o| self.inner.bitwise_or(o, mask)))
    }

    #[pyo3(signature = (other, mask = None))]
    fn bitwise_xor(&self, other: OperandArg<'_>, mask: Option<PyRef<'_, PyMat>>) -> PyResult<Self> {
        let mask = mask.as_deref().map(|m| &m.inner);
        wrap(other.apply(|o| self.inner.bitwise_xor(o, mask)))
    }

    #[pyo3(signature = (mask = None))]
    fn bitwise_not(&self, mask: Option<PyRef<'_, PyMat>>) -> PyResult<Self> {
        wrap(self.inner.bitwise_not(mask.as_deref().map(|m| &m.inner)))
    }

    fn __and__(&self, other: OperandArg<'_>) -> PyResult<Self> {
        self.bitwise_and(other, None)
    }

    fn __or__(&self, other: OperandArg<'_>) -> PyResult<Self> {
        self.bitwise_or(other, None)
    }

    fn __xor__(&self, other: OperandArg<'_>) -> PyResult<Self> {
        self.bitwise_xor(other, None)
    }

    fn __invert__(&self) -> PyResult<Self> {
        self.bitwise_not(None)
    }

    fn dot(&self, other: PyRef<'_, PyMat>) -> PyResult<f64> {
        Ok(self.inner.dot(&other.inner).map_err(CvError)?)
    }

    fn cross(&self, other: PyRef<'_, PyMat>) -> PyResult<Self> {
        wrap(self.inner.cross(&other.inner))
    }

    #[staticmethod]
    #[pyo3(signature = (src1, alpha, src2, beta, gamma, dtype = -1))]
    fn add_weighted(
        src1: PyRef<'_, PyMat>,
        alpha: f64,
        src2: PyRef<'_, PyMat>,
        beta: f64,
        gamma: f64,
        dtype: i32,
    ) -> PyResult<Self> {
        wrap(Mat::add_weighted(&src1.inner, alpha, &src2.inner, beta, gamma, dtype))
    }

    #[pyo3(signature = (alpha = 1.0, beta = 0.0))]
    fn convert_scale_abs(&self, alpha: f64, beta: f64) -> PyResult<Self> {
        wrap(self.inner.convert_scale_abs(alpha, beta))
    }

    #[pyo3(signature = (rtype, alpha = 1.0, beta = 0.0))]
    fn convert_to(&self, rtype: i32, alpha: f64, beta: f64) -> PyResult<Self> {
        wrap(self.inner.convert_to(rtype, alpha, beta))
    }

    fn split(&self) -> PyResult<Vec<Self>> {
        let planes = self.inner.split().map_err(CvError)?;
        Ok(planes.into_iter().map(PyMat::from).collect())
    }

    #[staticmethod]
    fn merge(mats: Vec<PyRef<'_, PyMat>>) -> PyResult<Self> {
        wrap(Mat::merge(&shared(&mats)))
    }

    #[staticmethod]
    fn hconcat(mats: Vec<PyRef<'_, PyMat>>) -> PyResult<Self> {
        wrap(Mat::hconcat(&shared(&mats)))
    }

    #[staticmethod]
    fn vconcat(mats: Vec<PyRef<'_, PyMat>>) -> PyResult<Self> {
        wrap(Mat::vconcat(&shared(&mats)))
    }

    #[allow(clippy::too_many_arguments)]
    #[pyo3(signature = (ddepth, dx, dy, ksize = 3, scale = 1.0, delta = 0.0, border_type = 4))]
    fn sobel(
        &self,
        ddepth: i32,
        dx: u32,
        dy: u32,
        ksize: i32,
        scale: f64,
        delta: f64,
        border_type: i32,
    ) -> PyResult<Self> {
        let border = border(border_type)?;
        wrap(cvmat_imgproc::sobel(&self.inner, ddepth, dx, dy, ksize, scale, delta, border))
    }

    #[pyo3(signature = (ddepth, dx, dy, scale = 1.0, delta = 0.0, border_type = 4))]
    fn scharr(
        &self,
        ddepth: i32,
        dx: u32,
        dy: u32,
        scale: f64,
        delta: f64,
        border_type: i32,
    ) -> PyResult<Self> {
        let border = border(border_type)?;
        wrap(cvmat_imgproc::scharr(&self.inner, ddepth, dx, dy, scale, delta, border))
    }

    #[pyo3(signature = (ddepth, ksize = 3, scale = 1.0, delta = 0.0, border_type = 4))]
    fn laplacian(
        &self,
        ddepth: i32,
        ksize: i32,
        scale: f64,
        delta: f64,
        border_type: i32,
    ) -> PyResult<Self> {
        let border = border(border_type)?;
        wrap(cvmat_imgproc::laplacian(&self.inner, ddepth, ksize, scale, delta, border))
    }

    #[pyo3(signature = (threshold1, threshold2, aperture_size = 3, l2gradient = false))]
    fn canny(
        &self,
        threshold1: f64,
        threshold2: f64,
        aperture_size: i32,
        l2gradient: bool,
    ) -> PyResult<Self> {
        wrap(cvmat_imgproc::canny(
            &self.inner,
            threshold1,
            threshold2,
            aperture_size,
            l2gradient,
        ))
    }

    #[pyo3(signature = (code, dcn = 0))]
    fn cvt_color(&self, code: i32, dcn: usize) -> PyResult<Self> {
        wrap(cvmat_imgproc::cvt_color(&self.inner, code, dcn))
    }

    /// `size` wins when given; otherwise `fx` and `fy` scale the matrix.
    #[pyo3(signature = (size = None, fx = 0.0, fy = 0.0, interpolation = 1))]
    fn resize(
        &self,
        size: Option<SizeArg>,
        fx: f64,
        fy: f64,
        interpolation: i32,
    ) -> PyResult<Self> {
        let interpolation = Interpolation::from_code(interpolation).map_err(CvError)?;
        let size: Size = size.map(Size::from).unwrap_or_default();
        wrap(cvmat_imgproc::resize(&self.inner, size, fx, fy, interpolation))
    }

    #[pyo3(signature = (ksize, anchor = None, border_type = 4))]
    fn blur(&self, ksize: SizeArg, anchor: Option<PointArg>, border_type: i32) -> PyResult<Self> {
        let anchor = anchor.map_or(Point::new(-1, -1), Into::into);
        wrap(cvmat_imgproc::blur(&self.inner, ksize.into(), anchor, border(border_type)?))
    }

    #[pyo3(signature = (ksize, sigma_x, sigma_y = 0.0, border_type = 4))]
    fn gaussian_blur(
        &self,
        ksize: SizeArg,
        sigma_x: f64,
        sigma_y: f64,
        border_type: i32,
    ) -> PyResult<Self> {
        let border = border(border_type)?;
        wrap(cvmat_imgproc::gaussian_blur(&self.inner, ksize.into(), sigma_x, sigma_y, border))
    }

    fn median_blur(&self, ksize: i32) -> PyResult<Self> {
        wrap(cvmat_imgproc::median_blur(&self.inner, ksize))
    }

    /// Returns `(dst, threshold_used)`.
    fn threshold(&self, thresh: f64, max_value: f64, threshold_type: i32) -> PyResult<(Self, f64)> {
        let (dst, used) = cvmat_imgproc::threshold(&self.inner, thresh, max_value, threshold_type)
            .map_err(CvError)?;
        Ok((dst.into(), used))
    }

    fn adaptive_threshold(
        &self,
        max_value: f64,
        adaptive_method: i32,
        threshold_type: i32,
        block_size: i32,
        delta: f64,
    ) -> PyResult<Self> {
        let method = AdaptiveMethod::from_code(adaptive_method).map_err(CvError)?;
        let typ = ThresholdType::from_code(threshold_type).map_err(CvError)?;
        wrap(cvmat_imgproc::adaptive_threshold(
            &self.inner,
            max_value,
            method,
            typ,
            block_size,
            delta,
        ))
    }

    #[pyo3(signature = (pt1, pt2, color, thickness = 1))]
    fn line(&self, pt1: PointArg, pt2: PointArg, color: ScalarArg, thickness: i32) -> PyResult<Self> {
        wrap(cvmat_imgproc::line(&self.inner, pt1.into(), pt2.into(), color.into(), thickness))
    }

    #[pyo3(signature = (pt1, pt2, color, thickness = 1))]
    fn line_mut(
        &mut self,
        pt1: PointArg,
        pt2: PointArg,
        color: ScalarArg,
        thickness: i32,
    ) -> PyResult<()> {
        let r = cvmat_imgproc::line_mut(&mut self.inner, pt1.into(), pt2.into(), color.into(), thickness);
        Ok(r.map_err(CvError)?)
    }

    #[pyo3(signature = (center, radius, color, thickness = 1))]
    fn circle(&self, center: PointArg, radius: i32, color: ScalarArg, thickness: i32) -> PyResult<Self> {
        wrap(cvmat_imgproc::circle(&self.inner, center.into(), radius, color.into(), thickness))
    }

    #[pyo3(signature = (center, radius, color, thickness = 1))]
    fn circle_mut(
        &mut self,
        center: PointArg,
        radius: i32,
        color: ScalarArg,
        thickness: i32,
    ) -> PyResult<()> {
        let r = cvmat_imgproc::circle_mut(&mut self.inner, center.into(), radius, color.into(), thickness);
        Ok(r.map_err(CvError)?)
    }

    #[pyo3(signature = (pt1, pt2, color, thickness = 1))]
    fn rectangle(&self, pt1: PointArg, pt2: PointArg, color: ScalarArg, thickness: i32) -> PyResult<Self> {
        wrap(cvmat_imgproc::rectangle(&self.inner, pt1.into(), pt2.into(), color.into(), thickness))
    }

    #[pyo3(signature = (pt1, pt2, color, thickness = 1))]
    fn rectangle_mut(
        &mut self,
        pt1: PointArg,
        pt2: PointArg,
        color: ScalarArg,
        thickness: i32,
    ) -> PyResult<()> {
        let r = cvmat_imgproc::rectangle_mut(&mut self.inner, pt1.into(), pt2.into(), color.into(), thickness);
        Ok(r.map_err(CvError)?)
    }

    #[staticmethod]
    #[pyo3(signature = (path, flags = 1))]
    fn imread(path: std::path::PathBuf, flags: i32) -> PyResult<Self> {
        wrap(Mat::load(path, flags))
    }

    #[staticmethod]
    #[pyo3(signature = (buf, flags = 1))]
    fn imdecode(buf: &[u8], flags: i32) -> PyResult<Self> {
        wrap(Mat::decode(buf, flags))
    }

    #[pyo3(signature = (path, params = None))]
    fn save(&self, path: std::path::PathBuf, params: Option<Vec<i32>>) -> PyResult<()> {
        let params = params.unwrap_or_default();
        Ok(self.inner.save(path, &params).map_err(CvError)?)
    }

    #[pyo3(signature = (ext, params = None))]
    fn imencode<'py>(
        &self,
        py: Python<'py>,
        ext: &str,
        params: Option<Vec<i32>>,
    ) -> PyResult<Bound<'py, PyBytes>> {
        let params = params.unwrap_or_default();
        let bytes = self.inner.encode(ext, &params).map_err(CvError)?;
        Ok(PyBytes::new_bound(py, &bytes))
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "<Mat:{}x{},type={}>",
            self.inner.rows(),
            self.inner.cols(),
            self.inner.mat_type()
        )
    }
}

use crate::depth::{Depth, Element, MatType, CV_8UC1};
use crate::geometry::{Rect, Size};
use crate::scalar::Scalar;
use crate::storage::{MatData, SharedBuffer};
use crate::{with_data, Error, Result};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// A 2-D, multi-channel matrix handle over a reference-counted buffer.
///
/// **Layout:** channel values are interleaved (`HWC`). The element at
/// `(row, col)`, channel `k`, lives at `offset + row * step + col * channels + k`
/// inside the shared buffer, where `offset` and `step` are counted in channel
/// values. A freshly allocated matrix has `offset == 0` and
/// `step == cols * channels`; views produced by [`Mat::roi`] and
/// [`Mat::diag`] keep the parent's buffer and only change the descriptor.
///
/// Cloning deep-copies. Use [`Mat::share`] for another handle on the same
/// memory.
pub struct Mat {
    buffer: Arc<SharedBuffer>,
    rows: usize,
    cols: usize,
    mat_type: MatType,
    offset: usize,
    step: usize,
}

/// Channel values in a `rows` x `cols` x `channels` buffer.
fn element_count(rows: usize, cols: usize, channels: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| {
            Error::Allocation(format!("{}x{}x{} overflows", rows, cols, channels))
        })
}

impl Mat {
    /// Allocates a zero-initialised `rows` x `cols` matrix.
    pub fn new(rows: usize, cols: usize, mat_type: MatType) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::Allocation(format!("empty shape {}x{}", rows, cols)));
        }
        let len = element_count(rows, cols, mat_type.channels())?;
        let data = MatData::zeroed(mat_type.depth(), len)?;
        tracing::debug!(rows, cols, mat_type = %mat_type, "allocated matrix");
        Ok(Self::from_data(rows, cols, mat_type, data))
    }

    fn from_data(rows: usize, cols: usize, mat_type: MatType, data: MatData) -> Self {
        Self {
            buffer: Arc::new(SharedBuffer::new(data)),
            rows,
            cols,
            mat_type,
            offset: 0,
            step: cols * mat_type.channels(),
        }
    }

    pub fn zeros(rows: usize, cols: usize, mat_type: MatType) -> Result<Self> {
        Self::new(rows, cols, mat_type)
    }

    /// First channel of every element is 1, the remaining channels 0.
    pub fn ones(rows: usize, cols: usize, mat_type: MatType) -> Result<Self> {
        let mut m = Self::new(rows, cols, mat_type)?;
        m.set_to(Scalar::from(1.0), None)?;
        Ok(m)
    }

    /// First channel of each diagonal element is 1, everything else 0.
    pub fn eye(rows: usize, cols: usize, mat_type: MatType) -> Result<Self> {
        let mut m = Self::new(rows, cols, mat_type)?;
        m.set_identity(Scalar::from(1.0))?;
        Ok(m)
    }

    /// Wraps interleaved channel values without copying them.
    pub fn from_vec<T: Element>(
        rows: usize,
        cols: usize,
        channels: usize,
        data: Vec<T>,
    ) -> Result<Self> {
        let mat_type = MatType::new(T::DEPTH, channels)?;
        if rows == 0 || cols == 0 {
            return Err(Error::Allocation(format!("empty shape {}x{}", rows, cols)));
        }
        let expected = element_count(rows, cols, channels)?;
        if data.len() != expected {
            return Err(Error::Argument(format!(
                "Data size mismatch: got {}, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self::from_data(rows, cols, mat_type, T::wrap(data)))
    }

    /// Builds a matrix from `f64` channel values, converting each one to
    /// `mat_type`'s depth with rounding and saturation.
    pub fn from_f64_slice(
        rows: usize,
        cols: usize,
        mat_type: MatType,
        values: &[f64],
    ) -> Result<Self> {
        let expected = element_count(rows, cols, mat_type.channels())?;
        if values.len() != expected {
            return Err(Error::Argument(format!(
                "Data size mismatch: got {}, expected {}",
                values.len(),
                expected
            )));
        }
        crate::dispatch_depth!(mat_type.depth(), T => {
            let data: Vec<T> = values.iter().map(|&v| T::from_f64(v)).collect();
            Self::from_vec(rows, cols, mat_type.channels(), data)
        })
    }

    /// A view aliasing `rect` of this matrix. No data is copied; writes
    /// through either handle are visible through the other.
    pub fn roi(&self, rect: Rect) -> Result<Self> {
        if !rect.fits_within(self.rows, self.cols) {
            return Err(Error::OutOfRange(format!(
                "region {:?} outside {}x{} matrix",
                rect, self.rows, self.cols
            )));
        }
        if rect.is_empty() {
            return Err(Error::Allocation(format!("empty region {:?}", rect)));
        }
        Ok(Self {
            buffer: Arc::clone(&self.buffer),
            rows: rect.height as usize,
            cols: rect.width as usize,
            mat_type: self.mat_type,
            offset: self.offset
                + rect.y as usize * self.step
                + rect.x as usize * self.channels(),
            step: self.step,
        })
    }

    /// Another handle on exactly the same memory and region.
    pub fn share(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            rows: self.rows,
            cols: self.cols,
            mat_type: self.mat_type,
            offset: self.offset,
            step: self.step,
        }
    }

    /// Column-vector view of the `d`-th diagonal: `d > 0` is below the main
    /// diagonal, `d < 0` above it.
    pub fn diag(&self, d: isize) -> Result<Self> {
        let (r0, c0) = if d >= 0 {
            (d.unsigned_abs(), 0)
        } else {
            (0, d.unsigned_abs())
        };
        if r0 >= self.rows || c0 >= self.cols {
            return Err(Error::OutOfRange(format!(
                "diagonal {} of a {}x{} matrix",
                d, self.rows, self.cols
            )));
        }
        let len = (self.rows - r0).min(self.cols - c0);
        Ok(Self {
            buffer: Arc::clone(&self.buffer),
            rows: len,
            cols: 1,
            mat_type: self.mat_type,
            offset: self.offset + r0 * self.step + c0 * self.channels(),
            step: self.step + self.channels(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> usize {
        2
    }

    pub fn depth(&self) -> Depth {
        self.mat_type.depth()
    }

    pub fn channels(&self) -> usize {
        self.mat_type.channels()
    }

    pub fn mat_type(&self) -> MatType {
        self.mat_type
    }

    pub fn size(&self) -> Size {
        Size::new(self.cols as i32, self.rows as i32)
    }

    /// Number of elements (not channel values).
    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    pub fn elem_size(&self) -> usize {
        self.mat_type.elem_size()
    }

    pub fn is_continuous(&self) -> bool {
        self.rows == 1 || self.step == self.cols * self.channels()
    }

    pub fn same_shape(&self, other: &Mat) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.mat_type == other.mat_type
    }

    pub fn shares_buffer_with(&self, other: &Mat) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    /// Number of live handles on this matrix's buffer.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.buffer)
    }

    /// Bytes held by the underlying buffer, shared or not.
    pub fn buffer_bytes(&self) -> usize {
        self.buffer.read().byte_len()
    }

    /// Ranges of channel values covering each row of this handle's region.
    pub(crate) fn row_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let width = self.cols * self.channels();
        (0..self.rows).map(move |r| {
            let start = self.offset + r * self.step;
            start..start + width
        })
    }

    /// Copies the region out as contiguous channel values of type `T`.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        let guard = self.buffer.read();
        let src = T::slice(&guard).ok_or_else(|| {
            Error::Type(format!(
                "matrix depth is {}, requested {}",
                self.depth(),
                T::DEPTH
            ))
        })?;
        let mut out = Vec::with_capacity(self.total() * self.channels());
        for range in self.row_ranges() {
            out.extend_from_slice(&src[range]);
        }
        Ok(out)
    }

    /// Copies the region out as contiguous `f64` channel values.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        let guard = self.buffer.read();
        let mut out = Vec::with_capacity(self.total() * self.channels());
        with_data!(&*guard, v => {
            for range in self.row_ranges() {
                out.extend(v[range].iter().map(|x| x.to_f64()));
            }
        });
        out
    }

    /// Overwrites the region with contiguous channel values of type `T`.
    pub fn write_slice<T: Element>(&mut self, values: &[T]) -> Result<()> {
        let expected = self.total() * self.channels();
        if values.len() != expected {
            return Err(Error::Argument(format!(
                "Data size mismatch: got {}, expected {}",
                values.len(),
                expected
            )));
        }
        let width = self.cols * self.channels();
        let ranges: Vec<Range<usize>> = self.row_ranges().collect();
        let mut guard = self.buffer.write();
        let dst = T::slice_mut(&mut guard).ok_or_else(|| {
            Error::Type(format!(
                "matrix depth is {}, got {}",
                self.mat_type.depth(),
                T::DEPTH
            ))
        })?;
        for (range, chunk) in ranges.into_iter().zip(values.chunks_exact(width)) {
            dst[range].copy_from_slice(chunk);
        }
        Ok(())
    }

    /// Overwrites the region with `f64` channel values, saturating to depth.
    pub fn write_f64(&mut self, values: &[f64]) -> Result<()> {
        crate::dispatch_depth!(self.depth(), T => {
            let typed: Vec<T> = values.iter().map(|&v| T::from_f64(v)).collect();
            self.write_slice(&typed)
        })
    }

    /// Copies `src` into this handle's region; shapes and types must match.
    pub fn copy_from(&mut self, src: &Mat) -> Result<()> {
        if !self.same_shape(src) {
            return Err(Error::Computation(format!(
                "copy_from: {}x{} {} into {}x{} {}",
                src.rows, src.cols, src.mat_type, self.rows, self.cols, self.mat_type
            )));
        }
        crate::dispatch_depth!(self.depth(), T => {
            let values = src.to_vec::<T>()?;
            self.write_slice(&values)
        })
    }

    fn resolve_index(&self, idx: &[usize]) -> Result<(usize, usize)> {
        let (row, col) = match *idx {
            [i] => {
                if i >= self.total() {
                    return Err(Error::OutOfRange(format!(
                        "linear index {} in {}x{} matrix",
                        i, self.rows, self.cols
                    )));
                }
                (i / self.cols, i % self.cols)
            }
            [r, c] => (r, c),
            _ => {
                return Err(Error::OutOfRange(format!(
                    "expected 1 or 2 indices for a 2-D matrix, got {}",
                    idx.len()
                )))
            }
        };
        self.check_bounds(row, col)?;
        Ok((row, col))
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::OutOfRange(format!(
                "({}, {}) in {}x{} matrix",
                row, col, self.rows, self.cols
            )));
        }
        Ok(())
    }

    fn element_start(&self, row: usize, col: usize) -> usize {
        self.offset + row * self.step + col * self.channels()
    }

    /// Reads one element. One index is row-major linear, two are
    /// `(row, col)`. Channels past the fourth are not reported.
    pub fn at(&self, idx: &[usize]) -> Result<Scalar> {
        let (row, col) = self.resolve_index(idx)?;
        let start = self.element_start(row, col);
        let n = self.channels().min(Scalar::LEN);
        let mut out = Scalar::default();
        let guard = self.buffer.read();
        with_data!(&*guard, v => {
            for (k, slot) in out.0.iter_mut().enumerate().take(n) {
                *slot = v[start + k].to_f64();
            }
        });
        Ok(out)
    }

    /// Writes one element from the leading `channels` components of
    /// `value`. Matrices with more channels than a scalar holds are rejected
    /// rather than padded.
    pub fn set(&mut self, row: usize, col: usize, value: Scalar) -> Result<()> {
        let cn = self.check_scalar_channels()?;
        self.check_bounds(row, col)?;
        let start = self.element_start(row, col);
        let mut guard = self.buffer.write();
        with_data!(&mut *guard, v => {
            for k in 0..cn {
                v[start + k] = Element::from_f64(value[k]);
            }
        });
        Ok(())
    }

    fn check_scalar_channels(&self) -> Result<usize> {
        let cn = self.channels();
        if cn > Scalar::LEN {
            return Err(Error::ChannelMismatch(format!(
                "a scalar holds {} values, matrix has {} channels",
                Scalar::LEN,
                cn
            )));
        }
        Ok(cn)
    }

    /// Assigns `value` to every element (or every element whose mask byte
    /// is non-zero) and returns a handle sharing this matrix.
    pub fn set_to(&mut self, value: Scalar, mask: Option<&Mat>) -> Result<Mat> {
        let cn = self.check_scalar_channels()?;
        let mask = read_mask(mask, self.rows, self.cols)?;
        let ranges: Vec<Range<usize>> = self.row_ranges().collect();
        let mut guard = self.buffer.write();
        with_data!(&mut *guard, v => {
            for (r, range) in ranges.into_iter().enumerate() {
                for (c, px) in v[range].chunks_exact_mut(cn).enumerate() {
                    if mask.as_ref().is_some_and(|m| m[r * self.cols + c] == 0) {
                        continue;
                    }
                    for (k, slot) in px.iter_mut().enumerate() {
                        *slot = Element::from_f64(value[k]);
                    }
                }
            }
        });
        drop(guard);
        Ok(self.share())
    }

    /// Scaled identity: `s` on the main diagonal, zero elsewhere.
    pub fn set_identity(&mut self, s: Scalar) -> Result<()> {
        let cn = self.check_scalar_channels()?;
        let mut values = vec![0.0; self.total() * cn];
        for i in 0..self.rows.min(self.cols) {
            let start = (i * self.cols + i) * cn;
            values[start..start + cn].copy_from_slice(&s.0[..cn]);
        }
        self.write_f64(&values)
    }
}

/// Validates an optional operation mask and copies it out.
pub(crate) fn read_mask(mask: Option<&Mat>, rows: usize, cols: usize) -> Result<Option<Vec<u8>>> {
    let Some(mask) = mask else {
        return Ok(None);
    };
    if mask.mat_type() != CV_8UC1 || mask.rows() != rows || mask.cols() != cols {
        return Err(Error::Computation(format!(
            "mask must be a {}x{} CV_8UC1 matrix, got {}x{} {}",
            rows,
            cols,
            mask.rows(),
            mask.cols(),
            mask.mat_type()
        )));
    }
    mask.to_vec::<u8>().map(Some)
}

impl Clone for Mat {
    /// Deep copy into a fresh, continuous buffer.
    fn clone(&self) -> Self {
        let guard = self.buffer.read();
        let data = with_data!(&*guard, v => {
            let mut out = Vec::with_capacity(self.total() * self.channels());
            for range in self.row_ranges() {
                out.extend_from_slice(&v[range]);
            }
            Element::wrap(out)
        });
        Self::from_data(self.rows, self.cols, self.mat_type, data)
    }
}

impl PartialEq for Mat {
    fn eq(&self, other: &Self) -> bool {
        self.same_shape(other) && self.to_f64_vec() == other.to_f64_vec()
    }
}

impl fmt::Debug for Mat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mat")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("type", &self.mat_type)
            .field("offset", &self.offset)
            .field("step", &self.step)
            .finish()
    }
}

impl fmt::Display for Mat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Mat:{}x{},depth={},channels={},\n[",
            self.rows,
            self.cols,
            self.depth().code(),
            self.channels()
        )?;
        let values = self.to_f64_vec();
        let width = self.cols * self.channels();
        for (r, row) in values.chunks(width).enumerate() {
            if r > 0 {
                f.write_str(";\n ")?;
            }
            for (i, v) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", v)?;
            }
        }
        f.write_str("]>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::*;

    #[test]
    fn new_is_zeroed() {
        let m = Mat::new(3, 4, CV_32FC2).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 4);
        assert_eq!(m.dims(), 2);
        assert_eq!(m.channels(), 2);
        assert_eq!(m.depth(), Depth::F32);
        assert!(m.to_f64_vec().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn new_rejects_empty_shape() {
        assert!(matches!(Mat::new(0, 4, CV_8UC1), Err(Error::Allocation(_))));
    }

    #[test]
    fn new_rejects_overflowing_shape() {
        let err = Mat::new(usize::MAX, 2, CV_8UC1).unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
    }

    #[test]
    fn wrapping_constructors_reject_overflowing_shape() {
        let err = Mat::from_vec(usize::MAX, 2, 1, vec![0u8; 4]).unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
        let err = Mat::from_f64_slice(2, usize::MAX, CV_8UC3, &[0.0; 6]).unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
    }

    #[test]
    fn ones_sets_first_channel() {
        let m = Mat::ones(2, 2, CV_8UC3).unwrap();
        assert_eq!(m.at(&[1, 1]).unwrap(), Scalar::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn eye_marks_diagonal() {
        let m = Mat::eye(2, 3, CV_64FC1).unwrap();
        assert_eq!(m.to_f64_vec(), vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn set_then_get_for_every_depth() {
        let value = Scalar::new(7.0, 100.0, 3.0, 0.0);
        for depth in Depth::ALL {
            let mut m = Mat::new(2, 3, MatType::new(depth, 3).unwrap()).unwrap();
            m.set(1, 2, value).unwrap();
            assert_eq!(m.at(&[1, 2]).unwrap(), value, "depth {}", depth);
        }
    }

    #[test]
    fn set_ignores_excess_scalar_components() {
        let mut m = Mat::new(1, 1, CV_16SC2).unwrap();
        m.set(0, 0, Scalar::new(-3.0, 4.0, 99.0, 99.0)).unwrap();
        assert_eq!(m.to_vec::<i16>().unwrap(), vec![-3, 4]);
    }

    #[test]
    fn set_rejects_more_than_four_channels() {
        let mut m = Mat::new(1, 1, MatType::new(Depth::U8, 5).unwrap()).unwrap();
        let err = m.set(0, 0, Scalar::all(1.0)).unwrap_err();
        assert!(matches!(err, Error::ChannelMismatch(_)));
    }

    #[test]
    fn set_saturates() {
        let mut m = Mat::new(1, 2, CV_8UC1).unwrap();
        m.set(0, 0, Scalar::from(300.0)).unwrap();
        m.set(0, 1, Scalar::from(-20.0)).unwrap();
        assert_eq!(m.to_vec::<u8>().unwrap(), vec![255, 0]);
    }

    #[test]
    fn linear_index() {
        let m = Mat::from_vec(2, 3, 1, vec![0i32, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(m.at(&[4]).unwrap()[0], 4.0);
        assert_eq!(m.at(&[1, 1]).unwrap()[0], 4.0);
        assert!(matches!(m.at(&[6]), Err(Error::OutOfRange(_))));
        assert!(matches!(m.at(&[0, 3]), Err(Error::OutOfRange(_))));
        assert!(matches!(m.at(&[0, 0, 0]), Err(Error::OutOfRange(_))));
        assert!(matches!(m.at(&[]), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn roi_aliases_parent() {
        let parent = Mat::new(4, 4, CV_8UC1).unwrap();
        let mut view = parent.roi(Rect::new(1, 2, 2, 2)).unwrap();
        assert_eq!(view.rows(), 2);
        assert_eq!(view.cols(), 2);
        assert!(!view.is_continuous());
        assert!(view.shares_buffer_with(&parent));

        view.set(0, 1, Scalar::from(9.0)).unwrap();
        assert_eq!(parent.at(&[2, 2]).unwrap()[0], 9.0);

        let mut parent = parent;
        parent.set(3, 1, Scalar::from(5.0)).unwrap();
        assert_eq!(view.at(&[1, 0]).unwrap()[0], 5.0);
    }

    #[test]
    fn roi_of_roi_composes_offsets() {
        let values: Vec<u8> = (0..25).collect();
        let parent = Mat::from_vec(5, 5, 1, values).unwrap();
        let outer = parent.roi(Rect::new(1, 1, 4, 4)).unwrap();
        let inner = outer.roi(Rect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(inner.to_vec::<u8>().unwrap(), vec![12, 13, 17, 18]);
    }

    #[test]
    fn roi_bounds() {
        let m = Mat::new(3, 3, CV_8UC1).unwrap();
        assert!(matches!(m.roi(Rect::new(2, 2, 2, 1)), Err(Error::OutOfRange(_))));
        assert!(matches!(m.roi(Rect::new(0, 0, 0, 1)), Err(Error::Allocation(_))));
    }

    #[test]
    fn clone_is_independent() {
        let mut original = Mat::new(2, 2, CV_32FC1).unwrap();
        original.set(0, 0, Scalar::from(1.5)).unwrap();
        let mut copy = original.clone();
        assert!(!copy.shares_buffer_with(&original));
        copy.set(0, 0, Scalar::from(-2.0)).unwrap();
        assert_eq!(original.at(&[0, 0]).unwrap()[0], 1.5);
        assert_eq!(copy.at(&[0, 0]).unwrap()[0], -2.0);
    }

    #[test]
    fn clone_of_view_is_continuous() {
        let parent = Mat::from_vec(3, 3, 1, (0..9).map(|v| v as f64).collect()).unwrap();
        let view = parent.roi(Rect::new(1, 0, 2, 3)).unwrap();
        let copy = view.clone();
        assert!(copy.is_continuous());
        assert_eq!(copy.to_f64_vec(), vec![1.0, 2.0, 4.0, 5.0, 7.0, 8.0]);
    }

    #[test]
    fn buffer_released_with_last_handle() {
        let parent = Mat::new(2, 2, CV_8UC1).unwrap();
        let view = parent.roi(Rect::new(0, 0, 1, 1)).unwrap();
        assert_eq!(parent.ref_count(), 2);
        drop(parent);
        assert_eq!(view.ref_count(), 1);
    }

    #[test]
    fn set_to_with_mask() {
        let mut m = Mat::new(1, 3, CV_8UC2).unwrap();
        let mask = Mat::from_vec(1, 3, 1, vec![1u8, 0, 1]).unwrap();
        let alias = m.set_to(Scalar::new(4.0, 5.0, 0.0, 0.0), Some(&mask)).unwrap();
        assert!(alias.shares_buffer_with(&m));
        assert_eq!(m.to_vec::<u8>().unwrap(), vec![4, 5, 0, 0, 4, 5]);
    }

    #[test]
    fn set_to_rejects_bad_mask() {
        let mut m = Mat::new(2, 2, CV_8UC1).unwrap();
        let mask = Mat::new(2, 2, CV_32FC1).unwrap();
        assert!(matches!(
            m.set_to(Scalar::all(1.0), Some(&mask)),
            Err(Error::Computation(_))
        ));
    }

    #[test]
    fn diag_is_a_view() {
        let m = Mat::from_vec(3, 3, 1, (1..=9).collect::<Vec<i32>>()).unwrap();
        assert_eq!(m.diag(0).unwrap().to_vec::<i32>().unwrap(), vec![1, 5, 9]);
        assert_eq!(m.diag(1).unwrap().to_vec::<i32>().unwrap(), vec![4, 8]);
        assert_eq!(m.diag(-2).unwrap().to_vec::<i32>().unwrap(), vec![3]);
        assert!(m.diag(3).is_err());

        let mut d = m.diag(0).unwrap();
        d.set(1, 0, Scalar::from(50.0)).unwrap();
        assert_eq!(m.at(&[1, 1]).unwrap()[0], 50.0);
    }

    #[test]
    fn to_vec_rejects_wrong_depth() {
        let m = Mat::new(1, 1, CV_8UC1).unwrap();
        assert!(matches!(m.to_vec::<f32>(), Err(Error::Type(_))));
    }

    #[test]
    fn copy_from_writes_into_view() {
        let parent = Mat::new(3, 3, CV_8UC1).unwrap();
        let mut view = parent.roi(Rect::new(1, 1, 2, 2)).unwrap();
        let src = Mat::from_vec(2, 2, 1, vec![1u8, 2, 3, 4]).unwrap();
        view.copy_from(&src).unwrap();
        assert_eq!(
            parent.to_vec::<u8>().unwrap(),
            vec![0, 0, 0, 0, 1, 2, 0, 3, 4]
        );
    }

    #[test]
    fn display_format() {
        let m = Mat::from_vec(2, 2, 1, vec![1u8, 2, 3, 4]).unwrap();
        assert_eq!(m.to_string(), "<Mat:2x2,depth=0,channels=1,\n[1, 2;\n 3, 4]>");
    }
}

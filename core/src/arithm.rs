//! Per-element arithmetic, bitwise logic and depth conversion.
//!
//! Every operation allocates its output. Values are combined in `f64` and
//! written back with the destination depth's rounding and saturation, so
//! integer results clamp instead of wrapping.

use crate::depth::{Depth, Element, MatType};
use crate::mat::{read_mask, Mat};
use crate::scalar::Scalar;
use crate::{Error, Result};
use nalgebra::{DMatrix, Vector3};

/// Right-hand side of a binary matrix operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Mat(&'a Mat),
    Scalar(Scalar),
    Number(f64),
}

impl<'a> From<&'a Mat> for Operand<'a> {
    fn from(m: &'a Mat) -> Self {
        Operand::Mat(m)
    }
}

impl From<Scalar> for Operand<'_> {
    fn from(s: Scalar) -> Self {
        Operand::Scalar(s)
    }
}

impl From<f64> for Operand<'_> {
    fn from(v: f64) -> Self {
        Operand::Number(v)
    }
}

impl From<i32> for Operand<'_> {
    fn from(v: i32) -> Self {
        Operand::Number(v as f64)
    }
}

fn check_same(op: &str, a: &Mat, b: &Mat) -> Result<()> {
    if a.same_shape(b) {
        return Ok(());
    }
    Err(Error::Computation(format!(
        "{}: operands differ in size or type ({}x{} {} vs {}x{} {})",
        op,
        a.rows(),
        a.cols(),
        a.mat_type(),
        b.rows(),
        b.cols(),
        b.mat_type()
    )))
}

fn check_scalar_operand(op: &str, a: &Mat) -> Result<usize> {
    let cn = a.channels();
    if cn > Scalar::LEN {
        return Err(Error::ChannelMismatch(format!(
            "{}: scalar operand cannot cover {} channels",
            op, cn
        )));
    }
    Ok(cn)
}

fn zip_values(op: &str, a: &Mat, b: &Mat, f: impl Fn(f64, f64) -> f64) -> Result<Mat> {
    check_same(op, a, b)?;
    let lhs = a.to_f64_vec();
    let rhs = b.to_f64_vec();
    let out: Vec<f64> = lhs.iter().zip(&rhs).map(|(&x, &y)| f(x, y)).collect();
    Mat::from_f64_slice(a.rows(), a.cols(), a.mat_type(), &out)
}

fn map_channels(op: &str, a: &Mat, s: Scalar, f: impl Fn(f64, f64) -> f64) -> Result<Mat> {
    let cn = check_scalar_operand(op, a)?;
    let out: Vec<f64> = a
        .to_f64_vec()
        .iter()
        .enumerate()
        .map(|(i, &x)| f(x, s[i % cn]))
        .collect();
    Mat::from_f64_slice(a.rows(), a.cols(), a.mat_type(), &out)
}

fn map_values(a: &Mat, mat_type: MatType, f: impl Fn(f64) -> f64) -> Result<Mat> {
    let out: Vec<f64> = a.to_f64_vec().into_iter().map(f).collect();
    Mat::from_f64_slice(a.rows(), a.cols(), mat_type, &out)
}

/// Division where an integer destination maps `x / 0` to zero.
fn div_rule(depth: Depth) -> impl Fn(f64, f64) -> f64 {
    let integer = !depth.is_float();
    move |x, y| if integer && y == 0.0 { 0.0 } else { x / y }
}

impl Mat {
    /// Per-element sum. A plain number only touches the first channel, the
    /// same as adding `Scalar::from(n)`.
    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mat> {
        match rhs.into() {
            Operand::Mat(m) => zip_values("add", self, m, |x, y| x + y),
            Operand::Scalar(s) => map_channels("add", self, s, |x, y| x + y),
            Operand::Number(n) => map_channels("add", self, Scalar::from(n), |x, y| x + y),
        }
    }

    /// Per-element difference; numbers behave as in [`Mat::add`].
    pub fn sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mat> {
        match rhs.into() {
            Operand::Mat(m) => zip_values("sub", self, m, |x, y| x - y),
            Operand::Scalar(s) => map_channels("sub", self, s, |x, y| x - y),
            Operand::Number(n) => map_channels("sub", self, Scalar::from(n), |x, y| x - y),
        }
    }

    /// Matrix product for a matrix operand, per-channel product for a
    /// scalar, uniform scaling for a number.
    pub fn mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mat> {
        match rhs.into() {
            Operand::Mat(m) => self.matmul(m),
            Operand::Scalar(s) => map_channels("mul", self, s, |x, y| x * y),
            Operand::Number(n) => map_values(self, self.mat_type(), |x| x * n),
        }
    }

    /// Per-element quotient for a matrix operand, per-channel for a scalar,
    /// uniform scaling by `1/n` for a number.
    pub fn div<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mat> {
        let rule = div_rule(self.depth());
        match rhs.into() {
            Operand::Mat(m) => zip_values("div", self, m, rule),
            Operand::Scalar(s) => map_channels("div", self, s, rule),
            Operand::Number(n) => map_values(self, self.mat_type(), |x| rule(x, n)),
        }
    }

    /// Element-wise product, whatever the operand kind.
    pub fn mul_elements(&self, other: &Mat) -> Result<Mat> {
        zip_values("mul_elements", self, other, |x, y| x * y)
    }

    /// Matrix product of two single-channel floating-point matrices.
    pub fn matmul(&self, other: &Mat) -> Result<Mat> {
        let t = self.mat_type();
        if !t.depth().is_float() || t.channels() != 1 || other.mat_type() != t {
            return Err(Error::Computation(format!(
                "matmul needs matching single-channel float operands, got {} and {}",
                t,
                other.mat_type()
            )));
        }
        if self.cols() != other.rows() {
            return Err(Error::Computation(format!(
                "matmul: {}x{} times {}x{}",
                self.rows(),
                self.cols(),
                other.rows(),
                other.cols()
            )));
        }
        let (n, k, m) = (self.rows(), self.cols(), other.cols());
        let a = DMatrix::from_row_slice(n, k, &self.to_f64_vec());
        let b = DMatrix::from_row_slice(k, m, &other.to_f64_vec());
        // nalgebra is column-major; the transpose's storage is our row order.
        let product = (a * b).transpose();
        Mat::from_f64_slice(n, m, t, product.as_slice())
    }

    /// Per-element `|self - rhs|`. Plain numbers are not accepted.
    pub fn absdiff<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Mat> {
        match rhs.into() {
            Operand::Mat(m) => zip_values("absdiff", self, m, |x, y| (x - y).abs()),
            Operand::Scalar(s) => map_channels("absdiff", self, s, |x, y| (x - y).abs()),
            Operand::Number(_) => Err(Error::Type(
                "no implicit conversion of a number into Mat or Scalar".into(),
            )),
        }
    }

    pub fn bitwise_and<'a>(&self, rhs: impl Into<Operand<'a>>, mask: Option<&Mat>) -> Result<Mat> {
        bitwise("bitwise_and", self, rhs.into(), mask, |a, b| a & b)
    }

    pub fn bitwise_or<'a>(&self, rhs: impl Into<Operand<'a>>, mask: Option<&Mat>) -> Result<Mat> {
        bitwise("bitwise_or", self, rhs.into(), mask, |a, b| a | b)
    }

    pub fn bitwise_xor<'a>(&self, rhs: impl Into<Operand<'a>>, mask: Option<&Mat>) -> Result<Mat> {
        bitwise("bitwise_xor", self, rhs.into(), mask, |a, b| a ^ b)
    }

    /// Inverts every bit; masked-out elements come back zero.
    pub fn bitwise_not(&self, mask: Option<&Mat>) -> Result<Mat> {
        bitwise("bitwise_not", self, Operand::Mat(self), mask, |a, _| !a)
    }

    /// Sum of per-element products over all channels.
    pub fn dot(&self, other: &Mat) -> Result<f64> {
        check_same("dot", self, other)?;
        let a = self.to_f64_vec();
        let b = other.to_f64_vec();
        Ok(a.iter().zip(&b).map(|(x, y)| x * y).sum())
    }

    /// Cross product of two 3-element floating-point vectors.
    pub fn cross(&self, other: &Mat) -> Result<Mat> {
        check_same("cross", self, other)?;
        if !self.depth().is_float() || self.total() * self.channels() != 3 {
            return Err(Error::Computation(format!(
                "cross needs 3-element float vectors, got {}x{} {}",
                self.rows(),
                self.cols(),
                self.mat_type()
            )));
        }
        let a = Vector3::from_column_slice(&self.to_f64_vec());
        let b = Vector3::from_column_slice(&other.to_f64_vec());
        let out = a.cross(&b);
        Mat::from_f64_slice(self.rows(), self.cols(), self.mat_type(), out.as_slice())
    }

    /// `src1 * alpha + src2 * beta + gamma`. A negative `dtype` keeps
    /// `src1`'s depth and then requires both inputs to share it.
    pub fn add_weighted(
        src1: &Mat,
        alpha: f64,
        src2: &Mat,
        beta: f64,
        gamma: f64,
        dtype: i32,
    ) -> Result<Mat> {
        if src1.rows() != src2.rows()
            || src1.cols() != src2.cols()
            || src1.channels() != src2.channels()
        {
            return Err(Error::Computation(format!(
                "add_weighted: {}x{}x{} vs {}x{}x{}",
                src1.rows(),
                src1.cols(),
                src1.channels(),
                src2.rows(),
                src2.cols(),
                src2.channels()
            )));
        }
        let depth = if dtype < 0 {
            if src1.depth() != src2.depth() {
                return Err(Error::Computation(
                    "add_weighted: inputs differ in depth and no output depth was given".into(),
                ));
            }
            src1.depth()
        } else {
            MatType::from_code(dtype)?.depth()
        };
        let a = src1.to_f64_vec();
        let b = src2.to_f64_vec();
        let out: Vec<f64> = a
            .iter()
            .zip(&b)
            .map(|(x, y)| x * alpha + y * beta + gamma)
            .collect();
        Mat::from_f64_slice(
            src1.rows(),
            src1.cols(),
            src1.mat_type().with_depth(depth),
            &out,
        )
    }

    /// `|x * alpha + beta|` saturated to 8-bit unsigned.
    pub fn convert_scale_abs(&self, alpha: f64, beta: f64) -> Result<Mat> {
        map_values(self, self.mat_type().with_depth(Depth::U8), |x| {
            (x * alpha + beta).abs()
        })
    }

    /// Converts to the depth of `rtype` (channels are kept) with
    /// `x * alpha + beta`. A negative `rtype` keeps the current depth.
    pub fn convert_to(&self, rtype: i32, alpha: f64, beta: f64) -> Result<Mat> {
        let depth = if rtype < 0 {
            self.depth()
        } else {
            MatType::from_code(rtype)?.depth()
        };
        map_values(self, self.mat_type().with_depth(depth), |x| x * alpha + beta)
    }
}

fn bitwise(
    op: &str,
    a: &Mat,
    rhs: Operand<'_>,
    mask: Option<&Mat>,
    f: impl Fn(u64, u64) -> u64,
) -> Result<Mat> {
    let mask = read_mask(mask, a.rows(), a.cols())?;
    let cn = a.channels();
    crate::dispatch_depth!(a.depth(), T => {
        let lhs = a.to_vec::<T>()?;
        let rhs: Vec<T> = match rhs {
            Operand::Mat(m) => {
                check_same(op, a, m)?;
                m.to_vec::<T>()?
            }
            Operand::Scalar(s) => {
                let scn = check_scalar_operand(op, a)?;
                (0..lhs.len()).map(|i| T::from_f64(s[i % scn])).collect()
            }
            Operand::Number(_) => {
                return Err(Error::Type(format!(
                    "{}: no implicit conversion of a number into Mat or Scalar",
                    op
                )))
            }
        };
        let out: Vec<T> = lhs
            .iter()
            .zip(&rhs)
            .enumerate()
            .map(|(i, (&x, &y))| {
                if mask.as_ref().is_some_and(|m| m[i / cn] == 0) {
                    T::default()
                } else {
                    <T as Element>::from_bits(f(
                        <T as Element>::to_bits(x),
                        <T as Element>::to_bits(y),
                    ))
                }
            })
            .collect();
        Mat::from_vec(a.rows(), a.cols(), cn, out)
    })
}

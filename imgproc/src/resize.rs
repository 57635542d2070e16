use cvmat_core::{Error, Mat, Result, Size};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use rayon::prelude::*;

pub const INTER_NEAREST: i32 = 0;
pub const INTER_LINEAR: i32 = 1;
pub const INTER_CUBIC: i32 = 2;
pub const INTER_AREA: i32 = 3;
pub const INTER_LANCZOS4: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    Nearest,
    #[default]
    Linear,
    Cubic,
    Area,
    Lanczos,
}

impl Interpolation {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            INTER_NEAREST => Ok(Interpolation::Nearest),
            INTER_LINEAR => Ok(Interpolation::Linear),
            INTER_CUBIC => Ok(Interpolation::Cubic),
            INTER_AREA => Ok(Interpolation::Area),
            INTER_LANCZOS4 => Ok(Interpolation::Lanczos),
            other => Err(Error::Argument(format!("unknown interpolation {other}"))),
        }
    }

    // Area averaging maps onto the triangle filter, whose support widens
    // with the downscale factor.
    fn filter(self) -> FilterType {
        match self {
            Interpolation::Nearest => FilterType::Nearest,
            Interpolation::Linear | Interpolation::Area => FilterType::Triangle,
            Interpolation::Cubic => FilterType::CatmullRom,
            Interpolation::Lanczos => FilterType::Lanczos3,
        }
    }
}

/// Target size: `dsize` when non-empty, otherwise the source scaled by
/// `fx` and `fy`.
fn target_size(src: &Mat, dsize: Size, fx: f64, fy: f64) -> Result<(u32, u32)> {
    if !dsize.is_empty() {
        return Ok((dsize.width as u32, dsize.height as u32));
    }
    if fx <= 0.0 || fy <= 0.0 {
        return Err(Error::Argument(
            "resize needs a non-empty size or positive scale factors".into(),
        ));
    }
    let w = (src.cols() as f64 * fx).round();
    let h = (src.rows() as f64 * fy).round();
    if w < 1.0 || h < 1.0 {
        return Err(Error::Argument(format!(
            "scale factors {fx}, {fy} shrink {}x{} to nothing",
            src.cols(),
            src.rows()
        )));
    }
    Ok((w as u32, h as u32))
}

fn alloc_values(len: usize) -> Result<Vec<f64>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|e| Error::Allocation(format!("{} resized values: {}", len, e)))?;
    Ok(v)
}

/// Resamples channel `c` of an interleaved buffer.
///
/// `image` clamps float samples to `0.0..=1.0` while filtering, so the plane
/// is mapped onto that range first and back afterwards.
fn resize_plane(
    values: &[f64],
    c: usize,
    cn: usize,
    from: (u32, u32),
    to: (u32, u32),
    plane_len: usize,
    filter: FilterType,
) -> Result<Vec<f64>> {
    let channel = values.iter().skip(c).step_by(cn).copied();
    let (lo, hi) = channel
        .clone()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if span <= 0.0 || !span.is_finite() {
        let mut flat = alloc_values(plane_len)?;
        flat.resize(plane_len, lo);
        return Ok(flat);
    }
    let plane: Vec<f32> = channel.map(|v| ((v - lo) / span) as f32).collect();
    let img = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(from.0, from.1, plane)
        .ok_or_else(|| Error::Computation("resize: plane size mismatch".into()))?;
    Ok(imageops::resize(&img, to.0, to.1, filter)
        .into_raw()
        .into_iter()
        .map(|v| lo + v as f64 * span)
        .collect())
}

/// Resamples every channel to the target size; depth and channel count are
/// kept.
pub fn resize(src: &Mat, dsize: Size, fx: f64, fy: f64, interpolation: Interpolation) -> Result<Mat> {
    let (width, height) = target_size(src, dsize, fx, fy)?;
    let (cols, rows, cn) = (src.cols() as u32, src.rows() as u32, src.channels());
    let filter = interpolation.filter();
    tracing::debug!(from_w = cols, from_h = rows, width, height, ?interpolation, "resize");

    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(cn))
        .ok_or_else(|| Error::Allocation(format!("{}x{}x{} overflows", width, height, cn)))?;
    let plane_len = len / cn;
    let mut out = alloc_values(len)?;
    out.resize(len, 0.0);

    let values = src.to_f64_vec();
    let planes: Vec<Vec<f64>> = (0..cn)
        .into_par_iter()
        .map(|c| resize_plane(&values, c, cn, (cols, rows), (width, height), plane_len, filter))
        .collect::<Result<_>>()?;

    for (c, plane) in planes.iter().enumerate() {
        for (i, &v) in plane.iter().enumerate() {
            out[i * cn + c] = v;
        }
    }
    Mat::from_f64_slice(height as usize, width as usize, src.mat_type(), &out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvmat_core::{Scalar, CV_8UC3};

    #[test]
    fn explicit_size() {
        let m = Mat::new(4, 6, CV_8UC3).unwrap();
        let out = resize(&m, Size::new(3, 2), 0.0, 0.0, Interpolation::Linear).unwrap();
        assert_eq!((out.rows(), out.cols()), (2, 3));
        assert_eq!(out.mat_type(), CV_8UC3);
    }

    #[test]
    fn scale_factors() {
        let m = Mat::new(4, 6, CV_8UC3).unwrap();
        let out = resize(&m, Size::default(), 0.5, 2.0, Interpolation::Nearest).unwrap();
        assert_eq!((out.rows(), out.cols()), (8, 3));
        assert!(resize(&m, Size::default(), 0.0, 0.0, Interpolation::Linear).is_err());
    }

    #[test]
    fn constant_colour_survives() {
        let mut m = Mat::new(5, 5, CV_8UC3).unwrap();
        m.set_to(Scalar::new(10.0, 100.0, 200.0, 0.0), None).unwrap();
        for interp in [Interpolation::Nearest, Interpolation::Linear, Interpolation::Area] {
            let out = resize(&m, Size::new(9, 7), 0.0, 0.0, interp).unwrap();
            assert_eq!(out.at(&[3, 4]).unwrap(), Scalar::new(10.0, 100.0, 200.0, 0.0));
        }
    }

    #[test]
    fn nearest_upscale_repeats_pixels() {
        let m = Mat::from_vec(1, 2, 1, vec![1u8, 9]).unwrap();
        let out = resize(&m, Size::new(4, 1), 0.0, 0.0, Interpolation::Nearest).unwrap();
        assert_eq!(out.to_vec::<u8>().unwrap(), vec![1, 1, 9, 9]);
    }

    #[test]
    fn oversized_target_is_an_allocation_error() {
        let m = Mat::new(1, 1, CV_8UC3).unwrap();
        let huge = Size::new(i32::MAX, i32::MAX);
        let err = resize(&m, huge, 0.0, 0.0, Interpolation::Nearest).unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
    }

    #[test]
    fn interpolation_codes() {
        assert_eq!(Interpolation::from_code(INTER_CUBIC).unwrap(), Interpolation::Cubic);
        assert!(Interpolation::from_code(9).is_err());
    }
}

use crate::filter::{filter_2d, output_type, sep_filter, BorderType, Planes};
use cvmat_core::{Error, Mat, Result};

/// `ksize` value selecting the 3x3 Scharr operator in [`sobel`].
pub const FILTER_SCHARR: i32 = -1;

fn convolve_small(a: &[i64], b: &[i64]) -> Vec<i64> {
    let mut out = vec![0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// 1-D Sobel kernel of length `ksize` for derivative `order`: binomial
/// smoothing `ksize - order - 1` times, then `order` finite differences.
pub fn sobel_kernel(order: u32, ksize: usize) -> Result<Vec<f64>> {
    if ksize % 2 == 0 || ksize > 31 {
        return Err(Error::Argument(format!(
            "kernel size must be odd and at most 31, got {ksize}"
        )));
    }
    if ksize <= order as usize && ksize > 1 {
        return Err(Error::Argument(format!(
            "kernel size {ksize} is too small for derivative order {order}"
        )));
    }
    if ksize == 1 {
        return match order {
            0 => Ok(vec![1.0]),
            _ => Err(Error::Argument(format!(
                "kernel size 1 is too small for derivative order {order}"
            ))),
        };
    }
    let mut k = vec![1i64];
    for _ in 0..(ksize - order as usize - 1) {
        k = convolve_small(&k, &[1, 1]);
    }
    for _ in 0..order {
        k = convolve_small(&k, &[-1, 1]);
    }
    Ok(k.into_iter().map(|v| v as f64).collect())
}

fn scharr_kernel(order: u32) -> Result<Vec<f64>> {
    match order {
        0 => Ok(vec![3.0, 10.0, 3.0]),
        1 => Ok(vec![-1.0, 0.0, 1.0]),
        _ => Err(Error::Argument("Scharr supports first derivatives only".into())),
    }
}

fn derivative_kernels(dx: u32, dy: u32, ksize: i32) -> Result<(Vec<f64>, Vec<f64>)> {
    if ksize == FILTER_SCHARR {
        if dx + dy != 1 {
            return Err(Error::Argument(
                "Scharr needs exactly one of dx, dy set to 1".into(),
            ));
        }
        return Ok((scharr_kernel(dx)?, scharr_kernel(dy)?));
    }
    if ksize <= 0 {
        return Err(Error::Argument(format!("invalid kernel size {ksize}")));
    }
    // Size 1 means no smoothing: a 3-tap difference along the derivative axis.
    let kx_size = if ksize == 1 && dx > 0 { 3 } else { ksize as usize };
    let ky_size = if ksize == 1 && dy > 0 { 3 } else { ksize as usize };
    Ok((sobel_kernel(dx, kx_size)?, sobel_kernel(dy, ky_size)?))
}

/// Sobel derivative `dx`, `dy` of every channel.
///
/// The result is `scale * d + delta`, stored at depth `ddepth` (negative
/// keeps the source depth) with saturation.
#[allow(clippy::too_many_arguments)]
pub fn sobel(
    src: &Mat,
    ddepth: i32,
    dx: u32,
    dy: u32,
    ksize: i32,
    scale: f64,
    delta: f64,
    border: BorderType,
) -> Result<Mat> {
    if dx + dy == 0 {
        return Err(Error::Argument("at least one of dx, dy must be positive".into()));
    }
    let out_type = output_type(src, ddepth)?;
    let (kx, ky) = derivative_kernels(dx, dy, ksize)?;
    let anchor = (kx.len() / 2, ky.len() / 2);
    tracing::debug!(dx, dy, ksize, ?border, "sobel");
    sep_filter(&Planes::from_mat(src), &kx, &ky, anchor, border)
        .map(|v| v * scale + delta)
        .into_mat(out_type)
}

/// 3x3 Scharr derivative; shorthand for [`sobel`] with [`FILTER_SCHARR`].
pub fn scharr(
    src: &Mat,
    ddepth: i32,
    dx: u32,
    dy: u32,
    scale: f64,
    delta: f64,
    border: BorderType,
) -> Result<Mat> {
    sobel(src, ddepth, dx, dy, FILTER_SCHARR, scale, delta, border)
}

/// Sum of the second derivatives in x and y.
///
/// Sizes 1 and 3 use fixed 3x3 apertures; larger sizes add two second-order
/// Sobel passes.
pub fn laplacian(
    src: &Mat,
    ddepth: i32,
    ksize: i32,
    scale: f64,
    delta: f64,
    border: BorderType,
) -> Result<Mat> {
    let out_type = output_type(src, ddepth)?;
    let planes = Planes::from_mat(src);
    let sum = match ksize {
        1 => filter_2d(
            &planes,
            &[0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0],
            3,
            3,
            (1, 1),
            border,
        ),
        3 => filter_2d(
            &planes,
            &[2.0, 0.0, 2.0, 0.0, -8.0, 0.0, 2.0, 0.0, 2.0],
            3,
            3,
            (1, 1),
            border,
        ),
        k if k > 3 => {
            let k = k as usize;
            let smooth = sobel_kernel(0, k)?;
            let second = sobel_kernel(2, k)?;
            let anchor = (k / 2, k / 2);
            let mut xx = sep_filter(&planes, &second, &smooth, anchor, border);
            let yy = sep_filter(&planes, &smooth, &second, anchor, border);
            for (a, b) in xx.data.iter_mut().zip(&yy.data) {
                *a += b;
            }
            xx
        }
        _ => return Err(Error::Argument(format!("invalid kernel size {ksize}"))),
    };
    sum.map(|v| v * scale + delta).into_mat(out_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvmat_core::{Scalar, CV_16SC1, CV_32FC1, CV_8UC1};

    #[test]
    fn sobel_kernels_match_binomial_construction() {
        assert_eq!(sobel_kernel(0, 3).unwrap(), vec![1.0, 2.0, 1.0]);
        assert_eq!(sobel_kernel(1, 3).unwrap(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(sobel_kernel(2, 3).unwrap(), vec![1.0, -2.0, 1.0]);
        assert_eq!(sobel_kernel(0, 5).unwrap(), vec![1.0, 4.0, 6.0, 4.0, 1.0]);
        assert_eq!(sobel_kernel(1, 5).unwrap(), vec![-1.0, -2.0, 0.0, 2.0, 1.0]);
        assert!(sobel_kernel(1, 4).is_err());
        assert!(sobel_kernel(1, 33).is_err());
    }

    fn ramp() -> Mat {
        // Each row is 0, 10, 20, 30, 40.
        let values: Vec<u8> = (0..5).flat_map(|_| (0..5).map(|c| c * 10)).collect();
        Mat::from_vec(5, 5, 1, values).unwrap()
    }

    #[test]
    fn sobel_x_on_horizontal_ramp() {
        let out = sobel(&ramp(), CV_16SC1.code(), 1, 0, 3, 1.0, 0.0, BorderType::Reflect101)
            .unwrap();
        assert_eq!(out.mat_type(), CV_16SC1);
        // Interior: (20 - 0) * (1 + 2 + 1) = 80.
        assert_eq!(out.at(&[2, 2]).unwrap()[0], 80.0);
        // Reflect101 mirrors the neighbour, so the edge derivative vanishes.
        assert_eq!(out.at(&[2, 0]).unwrap()[0], 0.0);
    }

    #[test]
    fn sobel_y_on_horizontal_ramp_is_zero() {
        let out = sobel(&ramp(), CV_32FC1.code(), 0, 1, 3, 1.0, 0.0, BorderType::Replicate)
            .unwrap();
        assert!(out.to_vec::<f32>().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn sobel_saturates_to_u8_and_applies_delta() {
        let out = sobel(&ramp(), -1, 1, 0, 3, 1.0, 10.0, BorderType::Reflect101).unwrap();
        assert_eq!(out.mat_type(), CV_8UC1);
        assert_eq!(out.at(&[2, 2]).unwrap()[0], 90.0);
    }

    #[test]
    fn sobel_ksize_one_has_no_smoothing() {
        let out = sobel(&ramp(), CV_16SC1.code(), 1, 0, 1, 1.0, 0.0, BorderType::Reflect101)
            .unwrap();
        assert_eq!(out.at(&[2, 2]).unwrap()[0], 20.0);
    }

    #[test]
    fn scharr_on_ramp() {
        let out = scharr(&ramp(), CV_16SC1.code(), 1, 0, 1.0, 0.0, BorderType::Reflect101)
            .unwrap();
        assert_eq!(out.at(&[2, 2]).unwrap()[0], 320.0);
        assert!(scharr(&ramp(), -1, 1, 1, 1.0, 0.0, BorderType::Reflect101).is_err());
    }

    #[test]
    fn sobel_rejects_zero_order() {
        assert!(sobel(&ramp(), -1, 0, 0, 3, 1.0, 0.0, BorderType::Reflect101).is_err());
    }

    #[test]
    fn laplacian_of_point() {
        let mut m = Mat::zeros(5, 5, CV_32FC1).unwrap();
        m.set(2, 2, Scalar::from(1.0)).unwrap();
        let out = laplacian(&m, -1, 1, 1.0, 0.0, BorderType::Reflect101).unwrap();
        assert_eq!(out.at(&[2, 2]).unwrap()[0], -4.0);
        assert_eq!(out.at(&[1, 2]).unwrap()[0], 1.0);
        assert_eq!(out.at(&[1, 1]).unwrap()[0], 0.0);

        let out3 = laplacian(&m, -1, 3, 1.0, 0.0, BorderType::Reflect101).unwrap();
        assert_eq!(out3.at(&[2, 2]).unwrap()[0], -8.0);
        assert_eq!(out3.at(&[1, 1]).unwrap()[0], 2.0);
    }

    #[test]
    fn laplacian_of_linear_ramp_is_flat() {
        let out = laplacian(&ramp(), CV_16SC1.code(), 5, 1.0, 0.0, BorderType::Replicate).unwrap();
        assert_eq!(out.at(&[2, 2]).unwrap()[0], 0.0);
        assert!(laplacian(&ramp(), -1, 2, 1.0, 0.0, BorderType::Replicate).is_err());
    }
}

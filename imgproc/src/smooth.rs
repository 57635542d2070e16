use crate::filter::{resolve_anchor, sep_filter, BorderType, Planes};
use cvmat_core::{Depth, Error, Mat, Point, Result, Size};
use image::{ImageBuffer, Luma, Pixel, Rgb, Rgba};

// Precomputed kernels for sizes 1, 3, 5 and 7 when no sigma is given.
const SMALL_GAUSSIAN: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

fn kernel_dims(ksize: Size) -> Result<(usize, usize)> {
    if ksize.width <= 0 || ksize.height <= 0 {
        return Err(Error::Argument(format!(
            "kernel size must be positive, got {}x{}",
            ksize.width, ksize.height
        )));
    }
    Ok((ksize.width as usize, ksize.height as usize))
}

/// Normalized box filter of size `ksize`. An anchor of `(-1, -1)` centres
/// the kernel.
pub fn blur(src: &Mat, ksize: Size, anchor: Point, border: BorderType) -> Result<Mat> {
    let (kw, kh) = kernel_dims(ksize)?;
    let anchor = resolve_anchor((anchor.x, anchor.y), kw, kh)?;
    let kx = vec![1.0 / kw as f64; kw];
    let ky = vec![1.0 / kh as f64; kh];
    sep_filter(&Planes::from_mat(src), &kx, &ky, anchor, border).into_mat(src.mat_type())
}

/// 1-D Gaussian of odd length `n`. A non-positive `sigma` is derived from
/// the size, and sizes up to 7 then use fixed tables.
pub fn gaussian_kernel(n: usize, sigma: f64) -> Result<Vec<f64>> {
    if n % 2 == 0 {
        return Err(Error::Argument(format!("Gaussian kernel size must be odd, got {n}")));
    }
    if sigma <= 0.0 && n <= 7 {
        return Ok(SMALL_GAUSSIAN[n / 2].to_vec());
    }
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        ((n as f64 - 1.0) * 0.5 - 1.0) * 0.3 + 0.8
    };
    let scale = -0.5 / (sigma * sigma);
    let centre = (n / 2) as f64;
    let mut k: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - centre;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    Ok(k)
}

// Kernel size covering +/- 3 sigma for 8-bit data, 4 sigma otherwise.
fn size_from_sigma(sigma: f64, depth: Depth) -> usize {
    let spread = if depth == Depth::U8 { 3.0 } else { 4.0 };
    (((sigma * spread * 2.0 + 1.0).round() as i64) | 1).max(1) as usize
}

/// Gaussian smoothing. Either the kernel size or the sigmas may be zero, in
/// which case one is derived from the other; `sigma_y == 0` reuses
/// `sigma_x`.
pub fn gaussian_blur(
    src: &Mat,
    ksize: Size,
    sigma_x: f64,
    sigma_y: f64,
    border: BorderType,
) -> Result<Mat> {
    let sigma_y = if sigma_y <= 0.0 { sigma_x } else { sigma_y };
    let kw = if ksize.width <= 0 && sigma_x > 0.0 {
        size_from_sigma(sigma_x, src.depth())
    } else {
        ksize.width.max(0) as usize
    };
    let kh = if ksize.height <= 0 && sigma_y > 0.0 {
        size_from_sigma(sigma_y, src.depth())
    } else {
        ksize.height.max(0) as usize
    };
    if kw == 0 || kh == 0 {
        return Err(Error::Argument(
            "Gaussian blur needs a kernel size or a positive sigma".into(),
        ));
    }
    let kx = gaussian_kernel(kw, sigma_x)?;
    let ky = gaussian_kernel(kh, sigma_y)?;
    tracing::debug!(kw, kh, sigma_x, sigma_y, "gaussian blur");
    sep_filter(&Planes::from_mat(src), &kx, &ky, (kw / 2, kh / 2), border)
        .into_mat(src.mat_type())
}

fn median_as<P>(src: &Mat, radius: u32) -> Result<Mat>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let img: ImageBuffer<P, Vec<u8>> =
        ImageBuffer::from_raw(src.cols() as u32, src.rows() as u32, src.to_vec::<u8>()?)
            .ok_or_else(|| Error::Computation("median blur: buffer size mismatch".into()))?;
    let out = imageproc::filter::median_filter(&img, radius, radius);
    Mat::from_vec(src.rows(), src.cols(), src.channels(), out.into_raw())
}

/// Median of the `ksize` x `ksize` neighbourhood of each channel. 8-bit
/// matrices with 1, 3 or 4 channels; `ksize` must be odd and above 1.
pub fn median_blur(src: &Mat, ksize: i32) -> Result<Mat> {
    if ksize <= 1 || ksize % 2 == 0 {
        return Err(Error::Argument(format!(
            "median kernel size must be odd and greater than 1, got {ksize}"
        )));
    }
    if src.depth() != Depth::U8 {
        return Err(Error::Computation(format!(
            "median blur supports 8-bit input only, got {}",
            src.mat_type()
        )));
    }
    let radius = (ksize / 2) as u32;
    match src.channels() {
        1 => median_as::<Luma<u8>>(src, radius),
        3 => median_as::<Rgb<u8>>(src, radius),
        4 => median_as::<Rgba<u8>>(src, radius),
        cn => Err(Error::Computation(format!(
            "median blur supports 1, 3 or 4 channels, got {cn}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvmat_core::{Scalar, CV_32FC1, CV_8UC1, CV_8UC3};

    #[test]
    fn blur_averages_neighbourhood() {
        let m = Mat::from_vec(1, 3, 1, vec![0.0f32, 3.0, 6.0]).unwrap();
        let out = blur(&m, Size::new(3, 1), Point::new(-1, -1), BorderType::Replicate).unwrap();
        assert_eq!(out.to_vec::<f32>().unwrap(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn blur_of_constant_is_constant() {
        let mut m = Mat::new(4, 4, CV_8UC3).unwrap();
        m.set_to(Scalar::new(7.0, 8.0, 9.0, 0.0), None).unwrap();
        let out = blur(&m, Size::new(3, 3), Point::new(-1, -1), BorderType::Reflect101).unwrap();
        assert_eq!(out, m);
    }

    #[test]
    fn blur_rejects_bad_size_and_anchor() {
        let m = Mat::new(3, 3, CV_8UC1).unwrap();
        assert!(blur(&m, Size::new(0, 3), Point::new(-1, -1), BorderType::Reflect101).is_err());
        assert!(blur(&m, Size::new(3, 3), Point::new(3, 0), BorderType::Reflect101).is_err());
    }

    #[test]
    fn gaussian_kernels() {
        assert_eq!(gaussian_kernel(3, 0.0).unwrap(), vec![0.25, 0.5, 0.25]);
        let k = gaussian_kernel(9, 0.0).unwrap();
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(k[0], k[8]);
        assert!(k[4] > k[3]);
        assert!(gaussian_kernel(4, 1.0).is_err());
    }

    #[test]
    fn gaussian_blur_preserves_mass() {
        let mut m = Mat::zeros(7, 7, CV_32FC1).unwrap();
        m.set(3, 3, Scalar::from(1.0)).unwrap();
        let out = gaussian_blur(&m, Size::new(3, 3), 0.0, 0.0, BorderType::Reflect101).unwrap();
        let sum: f32 = out.to_vec::<f32>().unwrap().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(out.at(&[3, 3]).unwrap()[0], 0.25);
    }

    #[test]
    fn gaussian_blur_size_from_sigma() {
        let m = Mat::zeros(5, 5, CV_8UC1).unwrap();
        assert!(gaussian_blur(&m, Size::new(0, 0), 1.0, 0.0, BorderType::Reflect101).is_ok());
        assert!(gaussian_blur(&m, Size::new(0, 0), 0.0, 0.0, BorderType::Reflect101).is_err());
        assert_eq!(size_from_sigma(1.0, Depth::U8), 7);
        assert_eq!(size_from_sigma(1.0, Depth::F32), 9);
    }

    #[test]
    fn median_removes_salt() {
        let mut values = vec![10u8; 25];
        values[12] = 255;
        let m = Mat::from_vec(5, 5, 1, values).unwrap();
        let out = median_blur(&m, 3).unwrap();
        assert_eq!(out.at(&[2, 2]).unwrap()[0], 10.0);
    }

    #[test]
    fn median_rejects_bad_input() {
        let m = Mat::new(3, 3, CV_32FC1).unwrap();
        assert!(matches!(median_blur(&m, 3), Err(Error::Computation(_))));
        let u = Mat::new(3, 3, CV_8UC1).unwrap();
        assert!(matches!(median_blur(&u, 4), Err(Error::Argument(_))));
    }
}

use cvmat_core::{Error, Mat, Result, CV_8UC1};

/// Canny edge map of a single-channel 8-bit matrix.
///
/// The thresholds may be given in either order; the smaller one is the
/// hysteresis low threshold. Only the 3x3 aperture is available and
/// `l2gradient` has no effect: gradients always use the L2 norm.
pub fn canny(
    src: &Mat,
    threshold1: f64,
    threshold2: f64,
    aperture_size: i32,
    l2gradient: bool,
) -> Result<Mat> {
    if src.mat_type() != CV_8UC1 {
        return Err(Error::Computation(format!(
            "canny expects {}, got {}",
            CV_8UC1,
            src.mat_type()
        )));
    }
    if aperture_size != 3 {
        return Err(Error::Argument(format!(
            "canny supports aperture size 3 only, got {aperture_size}"
        )));
    }
    let low = threshold1.min(threshold2) as f32;
    let high = threshold1.max(threshold2) as f32;
    tracing::debug!(low, high, l2gradient, "canny");

    let edges = imageproc::edges::canny(&src.to_gray_image()?, low, high);
    Mat::from_gray_image(&edges)
}

use cvmat_core::{Mat, Point, Rect, Scalar, Size, CV_16SC1, CV_8UC1, CV_8UC3};
use cvmat_imgproc::*;

fn bgr_square() -> Mat {
    let mut img = Mat::new(32, 32, CV_8UC3).unwrap();
    rectangle_mut(
        &mut img,
        Point::new(8, 8),
        Point::new(23, 23),
        Scalar::new(255.0, 255.0, 255.0, 0.0),
        FILLED,
    )
    .unwrap();
    img
}

#[test]
fn test_gray_blur_threshold_pipeline() {
    let gray = cvt_color(&bgr_square(), COLOR_BGR2GRAY, 0).unwrap();
    assert_eq!(gray.mat_type(), CV_8UC1);

    let blurred = gaussian_blur(&gray, Size::new(5, 5), 0.0, 0.0, BorderType::default()).unwrap();
    let (binary, t) = threshold(&blurred, 0.0, 255.0, THRESH_BINARY | THRESH_OTSU).unwrap();
    assert!(t > 0.0 && t < 255.0);
    assert_eq!(binary.at(&[16, 16]).unwrap()[0], 255.0);
    assert_eq!(binary.at(&[2, 2]).unwrap()[0], 0.0);
}

#[test]
fn test_edges_follow_square_outline() {
    let gray = cvt_color(&bgr_square(), COLOR_BGR2GRAY, 0).unwrap();
    let edges = canny(&gray, 50.0, 150.0, 3, false).unwrap();
    let inner = edges.roi(Rect::new(12, 12, 8, 8)).unwrap();
    assert!(inner.to_vec::<u8>().unwrap().iter().all(|&v| v == 0));
    let band = edges.roi(Rect::new(6, 14, 4, 1)).unwrap();
    assert!(band.to_vec::<u8>().unwrap().iter().any(|&v| v == 255));
}

#[test]
fn test_sobel_magnitude_on_square() {
    let gray = cvt_color(&bgr_square(), COLOR_BGR2GRAY, 0).unwrap();
    let gx = sobel(&gray, CV_16SC1.code(), 1, 0, 3, 1.0, 0.0, BorderType::default()).unwrap();
    let abs = gx.convert_scale_abs(1.0, 0.0).unwrap();
    // Left edge rises, right edge falls; both saturate after abs.
    assert_eq!(abs.at(&[16, 8]).unwrap()[0], 255.0);
    assert_eq!(abs.at(&[16, 23]).unwrap()[0], 255.0);
    assert_eq!(abs.at(&[16, 16]).unwrap()[0], 0.0);
    assert!(gx.at(&[16, 8]).unwrap()[0] > 0.0);
    assert!(gx.at(&[16, 23]).unwrap()[0] < 0.0);
}

#[test]
fn test_resize_then_median() {
    let img = bgr_square();
    let small = resize(&img, Size::new(16, 16), 0.0, 0.0, Interpolation::Nearest).unwrap();
    assert_eq!((small.rows(), small.cols(), small.channels()), (16, 16, 3));
    let smooth = median_blur(&small, 3).unwrap();
    assert_eq!(smooth.at(&[8, 8]).unwrap(), Scalar::new(255.0, 255.0, 255.0, 0.0));
    assert_eq!(smooth.at(&[0, 0]).unwrap(), Scalar::default());
}

#[test]
fn test_filters_on_roi_only_see_the_region() {
    let img = bgr_square();
    let corner = img.roi(Rect::new(0, 0, 8, 8)).unwrap();
    let out = blur(&corner, Size::new(3, 3), Point::new(-1, -1), BorderType::Replicate).unwrap();
    assert!(out.to_vec::<u8>().unwrap().iter().all(|&v| v == 0));
}

use cvmat_core::{Error, Mat, Rect, Scalar, CV_8UC1, CV_8UC3};
use cvmat_io::*;
use tempfile::tempdir;

fn checker() -> Mat {
    let mut m = Mat::new(8, 8, CV_8UC3).unwrap();
    for r in 0..8 {
        for c in 0..8 {
            if (r + c) % 2 == 0 {
                m.set(r, c, Scalar::new(255.0, 0.0, 10.0, 0.0)).unwrap();
            }
        }
    }
    m
}

#[test]
fn test_write_then_read_png() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checker.png");
    let m = checker();
    imwrite(&path, &m, &[]).unwrap();

    let back = imread(&path, IMREAD_COLOR).unwrap();
    assert_eq!(back, m);
    assert_eq!(back.at(&[0, 0]).unwrap(), Scalar::new(255.0, 0.0, 10.0, 0.0));
}

#[test]
fn test_save_and_load_through_the_trait() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gray.bmp");
    let mut m = Mat::new(3, 4, CV_8UC1).unwrap();
    m.set_to(Scalar::from(77.0), None).unwrap();
    m.save(&path, &[]).unwrap();

    let back = Mat::load(&path, IMREAD_GRAYSCALE).unwrap();
    assert_eq!(back.mat_type(), CV_8UC1);
    assert_eq!(back, m);
}

#[test]
fn test_writing_a_view_writes_only_the_region() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corner.png");
    let m = checker();
    let view = m.roi(Rect::new(1, 0, 3, 2)).unwrap();
    imwrite(&path, &view, &[]).unwrap();

    let back = imread(&path, IMREAD_UNCHANGED).unwrap();
    assert_eq!((back.rows(), back.cols()), (2, 3));
    assert_eq!(back, view);
}

#[test]
fn test_jpeg_file_is_lossy_but_close() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.jpg");
    let mut m = Mat::new(16, 16, CV_8UC3).unwrap();
    m.set_to(Scalar::new(40.0, 120.0, 200.0, 0.0), None).unwrap();
    imwrite(&path, &m, &[IMWRITE_JPEG_QUALITY, 90]).unwrap();

    let back = imread(&path, IMREAD_COLOR).unwrap();
    let px = back.at(&[8, 8]).unwrap();
    for (got, want) in [(px[0], 40.0), (px[1], 120.0), (px[2], 200.0)] {
        assert!((got - want).abs() <= 4.0, "{got} vs {want}");
    }
}

#[test]
fn test_missing_file_and_unknown_extension() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        imread(dir.path().join("absent.png"), IMREAD_COLOR),
        Err(Error::Io(_))
    ));
    assert!(matches!(
        imwrite(dir.path().join("out.unknownext"), &checker(), &[]),
        Err(Error::Io(_))
    ));
}

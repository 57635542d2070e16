use cvmat::prelude::*;
use std::thread;

#[test]
fn test_views_share_and_clones_detach() {
    let parent = Mat::new(6, 6, CV_8UC3).unwrap();
    let mut view = parent.roi(Rect::new(2, 1, 3, 3)).unwrap();
    assert_eq!(parent.ref_count(), 2);
    assert!(view.shares_buffer_with(&parent));

    view.set(0, 0, Scalar::new(1.0, 2.0, 3.0, 0.0)).unwrap();
    assert_eq!(parent.at(&[1, 2]).unwrap(), Scalar::new(1.0, 2.0, 3.0, 0.0));

    let mut copy = parent.clone();
    assert!(!copy.shares_buffer_with(&parent));
    copy.set(1, 2, Scalar::all(9.0)).unwrap();
    assert_eq!(parent.at(&[1, 2]).unwrap()[0], 1.0);

    drop(view);
    assert_eq!(parent.ref_count(), 1);
}

#[test]
fn test_every_depth_round_trips_through_set_and_at() {
    let samples = [
        (CV_8UC1, 200.0),
        (CV_8SC1, -100.0),
        (CV_16UC1, 60000.0),
        (CV_16SC1, -30000.0),
        (CV_32SC1, -2_000_000.0),
        (CV_32FC1, 1.5),
        (CV_64FC1, -0.125),
    ];
    for (t, v) in samples {
        let mut m = Mat::new(2, 2, t).unwrap();
        m.set(1, 1, Scalar::from(v)).unwrap();
        assert_eq!(m.at(&[1, 1]).unwrap()[0], v, "{t}");
        assert_eq!(m.at(&[3]).unwrap()[0], v, "{t}");
    }
}

#[test]
fn test_split_merge_and_concat() {
    let mut m = Mat::new(2, 3, CV_8UC3).unwrap();
    m.set_to(Scalar::new(10.0, 20.0, 30.0, 0.0), None).unwrap();
    let planes = m.split().unwrap();
    assert_eq!(planes.len(), 3);
    assert_eq!(planes[2].at(&[1, 2]).unwrap()[0], 30.0);
    assert_eq!(Mat::merge(&planes).unwrap(), m);

    let wide = Mat::hconcat(&[m.share(), m.share()]).unwrap();
    assert_eq!((wide.rows(), wide.cols()), (2, 6));
    let tall = Mat::vconcat(&[m.share(), m.share()]).unwrap();
    assert_eq!((tall.rows(), tall.cols()), (4, 3));
}

#[test]
fn test_arithmetic_errors() {
    let a = Mat::new(2, 2, CV_8UC1).unwrap();
    let b = Mat::new(3, 2, CV_8UC1).unwrap();
    assert!(matches!(a.add(&b), Err(Error::Computation(_))));
    assert!(matches!(a.absdiff(3.0), Err(Error::Type(_))));
    assert!(matches!(a.at(&[0, 0, 0]), Err(Error::OutOfRange(_))));
}

#[test]
fn test_handles_on_other_threads() {
    let m = Mat::new(4, 4, CV_32FC1).unwrap();
    let workers: Vec<_> = (0..4)
        .map(|r| {
            let mut row = m.roi(Rect::new(0, r, 4, 1)).unwrap();
            thread::spawn(move || {
                row.set_to(Scalar::from(r as f64), None).unwrap();
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    for r in 0..4 {
        assert_eq!(m.at(&[r, 3]).unwrap()[0], r as f64);
    }
}

#[test]
fn test_encode_process_decode() {
    let mut img = Mat::new(24, 24, CV_8UC3).unwrap();
    circle_mut(&mut img, Point::new(12, 12), 6, Scalar::new(0.0, 0.0, 255.0, 0.0), FILLED).unwrap();
    let bytes = imencode(".png", &img, &[]).unwrap();
    let back = imdecode(&bytes, IMREAD_COLOR).unwrap();
    assert_eq!(back, img);

    let gray = cvt_color(&back, COLOR_BGR2GRAY, 0).unwrap();
    let (mask, _) = threshold(&gray, 10.0, 255.0, THRESH_BINARY).unwrap();
    assert_eq!(mask.at(&[12, 12]).unwrap()[0], 255.0);
    assert_eq!(mask.at(&[0, 0]).unwrap()[0], 0.0);
}

#[test]
fn test_thread_pool_init_is_idempotent() {
    let first = cvmat::init_thread_pool(Some(2));
    assert_eq!(cvmat::init_thread_pool(Some(8)), first);
    assert!(cvmat::current_cpu_threads() >= 1);
}

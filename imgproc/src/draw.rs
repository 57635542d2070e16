//! Line, circle and rectangle drawing on 8-bit matrices.
//!
//! The colour is taken in matrix channel order, so `Scalar(255, 0, 0)` is
//! blue on a BGR matrix. A negative thickness fills the shape.

use cvmat_core::{Depth, Element, Error, Mat, Point, Result, Scalar};
use image::{ImageBuffer, Luma, Pixel, Rgb, Rgba};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
    draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::rect::Rect as PixelRect;

pub const FILLED: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Line { from: Point, to: Point },
    Circle { center: Point, radius: i32 },
    Rectangle { a: Point, b: Point },
}

impl Shape {
    fn draw<P>(&self, canvas: &mut ImageBuffer<P, Vec<u8>>, color: P, thickness: i32)
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        match *self {
            Shape::Line { from, to } => draw_line(canvas, from, to, color, thickness),
            Shape::Circle { center, radius } => {
                let c = (center.x, center.y);
                if thickness < 0 {
                    draw_filled_circle_mut(canvas, c, radius, color);
                } else {
                    let half = thickness / 2;
                    for r in (radius - half).max(0)..=radius + (thickness - 1 - half).max(0) {
                        draw_hollow_circle_mut(canvas, c, r, color);
                    }
                }
            }
            Shape::Rectangle { a, b } => {
                // Corners far outside the canvas are pulled in to just past
                // its edge, which leaves the visible outline unchanged and
                // keeps the extents within i32.
                let margin = i64::from(thickness.unsigned_abs()) + 1;
                let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
                let cx = |v: i32| i64::from(v).clamp(-margin, cw + margin);
                let cy = |v: i32| i64::from(v).clamp(-margin, ch + margin);
                let (ax, bx, ay, by) = (cx(a.x), cx(b.x), cy(a.y), cy(b.y));
                let (x0, y0) = (ax.min(bx), ay.min(by));
                // Both corners are inclusive.
                let w = (ax - bx).abs() + 1;
                let h = (ay - by).abs() + 1;
                if thickness < 0 {
                    let r = PixelRect::at(x0 as i32, y0 as i32).of_size(w as u32, h as u32);
                    draw_filled_rect_mut(canvas, r, color);
                    return;
                }
                let half = i64::from(thickness / 2);
                for t in -half..=(i64::from(thickness) - 1 - half).max(0) {
                    let (ww, hh) = (w + 2 * t, h + 2 * t);
                    if ww <= 0 || hh <= 0 {
                        continue;
                    }
                    let r = PixelRect::at((x0 - t) as i32, (y0 - t) as i32)
                        .of_size(ww as u32, hh as u32);
                    draw_hollow_rect_mut(canvas, r, color);
                }
            }
        }
    }
}

fn draw_line<P>(canvas: &mut ImageBuffer<P, Vec<u8>>, from: Point, to: Point, color: P, thickness: i32)
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let start = (from.x as f32, from.y as f32);
    let end = (to.x as f32, to.y as f32);
    if thickness <= 1 {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }

    // Thick lines: a quad along the segment plus round caps.
    let radius = thickness / 2;
    draw_filled_circle_mut(canvas, (from.x, from.y), radius, color);
    draw_filled_circle_mut(canvas, (to.x, to.y), radius, color);
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return;
    }
    let half = (thickness - 1) as f32 / 2.0;
    let (nx, ny) = ((-dy / len * half).round() as i32, (dx / len * half).round() as i32);
    if nx == 0 && ny == 0 {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }
    let quad = [
        imageproc::point::Point::new(from.x + nx, from.y + ny),
        imageproc::point::Point::new(to.x + nx, to.y + ny),
        imageproc::point::Point::new(to.x - nx, to.y - ny),
        imageproc::point::Point::new(from.x - nx, from.y - ny),
    ];
    draw_polygon_mut(canvas, &quad, color);
}

fn paint_as<P>(img: &mut Mat, shape: Shape, color: Scalar, thickness: i32) -> Result<()>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let cn = P::CHANNEL_COUNT as usize;
    let mut canvas: ImageBuffer<P, Vec<u8>> =
        ImageBuffer::from_raw(img.cols() as u32, img.rows() as u32, img.to_vec::<u8>()?)
            .ok_or_else(|| Error::Computation("drawing: buffer size mismatch".into()))?;
    let components: Vec<u8> = (0..cn).map(|c| u8::from_f64(color[c])).collect();
    let pixel = *P::from_slice(&components);
    shape.draw(&mut canvas, pixel, thickness);
    img.write_slice(canvas.as_raw())
}

fn paint(img: &mut Mat, shape: Shape, color: Scalar, thickness: i32) -> Result<()> {
    if thickness == 0 {
        return Err(Error::Argument("thickness must be non-zero".into()));
    }
    if img.depth() != Depth::U8 {
        return Err(Error::Computation(format!(
            "drawing supports 8-bit matrices only, got {}",
            img.mat_type()
        )));
    }
    tracing::debug!(?shape, thickness, "draw");
    match img.channels() {
        1 => paint_as::<Luma<u8>>(img, shape, color, thickness),
        3 => paint_as::<Rgb<u8>>(img, shape, color, thickness),
        4 => paint_as::<Rgba<u8>>(img, shape, color, thickness),
        cn => Err(Error::Computation(format!(
            "drawing supports 1, 3 or 4 channels, got {cn}"
        ))),
    }
}

/// Draws a segment from `pt1` to `pt2` in place.
pub fn line_mut(img: &mut Mat, pt1: Point, pt2: Point, color: Scalar, thickness: i32) -> Result<()> {
    paint(img, Shape::Line { from: pt1, to: pt2 }, color, thickness)
}

pub fn circle_mut(
    img: &mut Mat,
    center: Point,
    radius: i32,
    color: Scalar,
    thickness: i32,
) -> Result<()> {
    if radius < 0 {
        return Err(Error::Argument(format!("radius must be non-negative, got {radius}")));
    }
    paint(img, Shape::Circle { center, radius }, color, thickness)
}

/// Draws the rectangle with opposite corners `pt1` and `pt2` (both
/// inclusive) in place.
pub fn rectangle_mut(
    img: &mut Mat,
    pt1: Point,
    pt2: Point,
    color: Scalar,
    thickness: i32,
) -> Result<()> {
    paint(img, Shape::Rectangle { a: pt1, b: pt2 }, color, thickness)
}

/// Copy of `img` with a segment drawn on it.
pub fn line(img: &Mat, pt1: Point, pt2: Point, color: Scalar, thickness: i32) -> Result<Mat> {
    let mut out = img.clone();
    line_mut(&mut out, pt1, pt2, color, thickness)?;
    Ok(out)
}

pub fn circle(img: &Mat, center: Point, radius: i32, color: Scalar, thickness: i32) -> Result<Mat> {
    let mut out = img.clone();
    circle_mut(&mut out, center, radius, color, thickness)?;
    Ok(out)
}

pub fn rectangle(img: &Mat, pt1: Point, pt2: Point, color: Scalar, thickness: i32) -> Result<Mat> {
    let mut out = img.clone();
    rectangle_mut(&mut out, pt1, pt2, color, thickness)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvmat_core::{Rect, CV_32FC1, CV_8UC1, CV_8UC3};

    fn px(m: &Mat, r: usize, c: usize) -> Scalar {
        m.at(&[r, c]).unwrap()
    }

    #[test]
    fn horizontal_line_in_bgr_order() {
        let m = Mat::new(5, 5, CV_8UC3).unwrap();
        let blue = Scalar::new(255.0, 0.0, 0.0, 0.0);
        let out = line(&m, Point::new(0, 2), Point::new(4, 2), blue, 1).unwrap();
        for c in 0..5 {
            assert_eq!(px(&out, 2, c), blue);
        }
        assert_eq!(px(&out, 1, 2), Scalar::default());
        // The source is untouched.
        assert_eq!(px(&m, 2, 2), Scalar::default());
    }

    #[test]
    fn thick_line_covers_neighbours() {
        let m = Mat::new(9, 9, CV_8UC1).unwrap();
        let out = line(&m, Point::new(1, 4), Point::new(7, 4), Scalar::all(255.0), 3).unwrap();
        assert_eq!(px(&out, 3, 4)[0], 255.0);
        assert_eq!(px(&out, 5, 4)[0], 255.0);
        assert_eq!(px(&out, 0, 4)[0], 0.0);
    }

    #[test]
    fn filled_circle() {
        let m = Mat::new(11, 11, CV_8UC1).unwrap();
        let out = circle(&m, Point::new(5, 5), 3, Scalar::all(200.0), FILLED).unwrap();
        assert_eq!(px(&out, 5, 5)[0], 200.0);
        assert_eq!(px(&out, 5, 8)[0], 200.0);
        assert_eq!(px(&out, 0, 0)[0], 0.0);
    }

    #[test]
    fn hollow_circle_leaves_centre() {
        let m = Mat::new(11, 11, CV_8UC1).unwrap();
        let out = circle(&m, Point::new(5, 5), 3, Scalar::all(200.0), 1).unwrap();
        assert_eq!(px(&out, 5, 5)[0], 0.0);
        assert_eq!(px(&out, 5, 8)[0], 200.0);
    }

    #[test]
    fn rectangle_outline_and_fill() {
        let m = Mat::new(6, 6, CV_8UC1).unwrap();
        let outline = rectangle(&m, Point::new(1, 1), Point::new(4, 4), Scalar::all(9.0), 1).unwrap();
        assert_eq!(px(&outline, 1, 1)[0], 9.0);
        assert_eq!(px(&outline, 4, 4)[0], 9.0);
        assert_eq!(px(&outline, 2, 2)[0], 0.0);

        let filled = rectangle(&m, Point::new(4, 4), Point::new(1, 1), Scalar::all(9.0), FILLED).unwrap();
        assert_eq!(px(&filled, 2, 2)[0], 9.0);
        assert_eq!(px(&filled, 5, 5)[0], 0.0);
    }

    #[test]
    fn rectangle_with_extreme_corners() {
        let m = Mat::new(4, 4, CV_8UC1).unwrap();
        let far = (Point::new(i32::MIN, i32::MIN), Point::new(i32::MAX, i32::MAX));
        let filled = rectangle(&m, far.0, far.1, Scalar::all(5.0), FILLED).unwrap();
        assert_eq!(px(&filled, 0, 0)[0], 5.0);
        assert_eq!(px(&filled, 3, 3)[0], 5.0);

        // Only the left edge lies on the canvas.
        let outline = rectangle(&m, Point::new(1, i32::MIN), far.1, Scalar::all(5.0), 1).unwrap();
        assert_eq!(px(&outline, 2, 1)[0], 5.0);
        assert_eq!(px(&outline, 2, 2)[0], 0.0);
    }

    #[test]
    fn drawing_on_a_view_reaches_the_parent() {
        let parent = Mat::new(4, 4, CV_8UC1).unwrap();
        let mut view = parent.roi(Rect::new(2, 2, 2, 2)).unwrap();
        rectangle_mut(&mut view, Point::new(0, 0), Point::new(1, 1), Scalar::all(7.0), FILLED).unwrap();
        assert_eq!(px(&parent, 3, 3)[0], 7.0);
        assert_eq!(px(&parent, 1, 1)[0], 0.0);
    }

    #[test]
    fn rejects_unsupported_input() {
        let mut f = Mat::new(3, 3, CV_32FC1).unwrap();
        assert!(line_mut(&mut f, Point::new(0, 0), Point::new(2, 2), Scalar::all(1.0), 1).is_err());
        let mut g = Mat::new(3, 3, CV_8UC1).unwrap();
        assert!(circle_mut(&mut g, Point::new(1, 1), -1, Scalar::all(1.0), 1).is_err());
        assert!(line_mut(&mut g, Point::new(0, 0), Point::new(2, 2), Scalar::all(1.0), 0).is_err());
    }
}

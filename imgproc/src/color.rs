use cvmat_core::{Depth, Error, Mat, MatType, Result};
use rayon::prelude::*;

pub const COLOR_BGR2BGRA: i32 = 0;
pub const COLOR_RGB2RGBA: i32 = COLOR_BGR2BGRA;
pub const COLOR_BGRA2BGR: i32 = 1;
pub const COLOR_RGBA2RGB: i32 = COLOR_BGRA2BGR;
pub const COLOR_BGR2RGBA: i32 = 2;
pub const COLOR_RGB2BGRA: i32 = COLOR_BGR2RGBA;
pub const COLOR_RGBA2BGR: i32 = 3;
pub const COLOR_BGRA2RGB: i32 = COLOR_RGBA2BGR;
pub const COLOR_BGR2RGB: i32 = 4;
pub const COLOR_RGB2BGR: i32 = COLOR_BGR2RGB;
pub const COLOR_BGRA2RGBA: i32 = 5;
pub const COLOR_RGBA2BGRA: i32 = COLOR_BGRA2RGBA;
pub const COLOR_BGR2GRAY: i32 = 6;
pub const COLOR_RGB2GRAY: i32 = 7;
pub const COLOR_GRAY2BGR: i32 = 8;
pub const COLOR_GRAY2RGB: i32 = COLOR_GRAY2BGR;
pub const COLOR_GRAY2BGRA: i32 = 9;
pub const COLOR_GRAY2RGBA: i32 = COLOR_GRAY2BGRA;
pub const COLOR_BGRA2GRAY: i32 = 10;
pub const COLOR_RGBA2GRAY: i32 = 11;

/// What a colour code does to each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    /// Reorder and optionally add or drop alpha. `swap` exchanges the first
    /// and third channel.
    Reorder { scn: usize, dcn: usize, swap: bool },
    /// Weighted sum to one channel. `blue_first` is true for BGR input.
    ToGray { scn: usize, blue_first: bool },
    FromGray { dcn: usize },
}

impl Conversion {
    fn from_code(code: i32) -> Result<Self> {
        use Conversion::*;
        Ok(match code {
            COLOR_BGR2BGRA => Reorder { scn: 3, dcn: 4, swap: false },
            COLOR_BGRA2BGR => Reorder { scn: 4, dcn: 3, swap: false },
            COLOR_BGR2RGBA => Reorder { scn: 3, dcn: 4, swap: true },
            COLOR_RGBA2BGR => Reorder { scn: 4, dcn: 3, swap: true },
            COLOR_BGR2RGB => Reorder { scn: 3, dcn: 3, swap: true },
            COLOR_BGRA2RGBA => Reorder { scn: 4, dcn: 4, swap: true },
            COLOR_BGR2GRAY => ToGray { scn: 3, blue_first: true },
            COLOR_RGB2GRAY => ToGray { scn: 3, blue_first: false },
            COLOR_GRAY2BGR => FromGray { dcn: 3 },
            COLOR_GRAY2BGRA => FromGray { dcn: 4 },
            COLOR_BGRA2GRAY => ToGray { scn: 4, blue_first: true },
            COLOR_RGBA2GRAY => ToGray { scn: 4, blue_first: false },
            other => return Err(Error::Argument(format!("unknown color conversion code {other}"))),
        })
    }

    fn channels(&self) -> (usize, usize) {
        match *self {
            Conversion::Reorder { scn, dcn, .. } => (scn, dcn),
            Conversion::ToGray { scn, .. } => (scn, 1),
            Conversion::FromGray { dcn } => (1, dcn),
        }
    }
}

/// Value written into a freshly added alpha channel.
fn opaque(depth: Depth) -> Result<f64> {
    match depth {
        Depth::U8 => Ok(u8::MAX as f64),
        Depth::U16 => Ok(u16::MAX as f64),
        Depth::F32 => Ok(1.0),
        other => Err(Error::Computation(format!(
            "color conversion supports 8U, 16U and 32F, got {other}"
        ))),
    }
}

// 8-bit luma uses the 0.114/0.587/0.299 weights in Q14 fixed point,
// rounded to nearest.
const GRAY_SHIFT: u32 = 14;
const GRAY_B: u32 = 1868;
const GRAY_G: u32 = 9617;
const GRAY_R: u32 = 4899;

fn gray_u8(b: f64, g: f64, r: f64) -> f64 {
    let sum = b as u32 * GRAY_B + g as u32 * GRAY_G + r as u32 * GRAY_R;
    ((sum + (1 << (GRAY_SHIFT - 1))) >> GRAY_SHIFT) as f64
}

/// Converts between BGR, RGB, their alpha variants and grayscale.
///
/// `dcn` is the expected destination channel count; `0` accepts whatever
/// the code produces.
pub fn cvt_color(src: &Mat, code: i32, dcn: usize) -> Result<Mat> {
    let conversion = Conversion::from_code(code)?;
    let (scn, out_cn) = conversion.channels();
    if src.channels() != scn {
        return Err(Error::Computation(format!(
            "color code {} expects {} source channels, got {}",
            code,
            scn,
            src.channels()
        )));
    }
    if dcn != 0 && dcn != out_cn {
        return Err(Error::Argument(format!(
            "color code {code} produces {out_cn} channels, {dcn} requested"
        )));
    }
    let alpha = opaque(src.depth())?;
    let fixed_point = src.depth() == Depth::U8;
    tracing::debug!(code, scn, out_cn, "cvt_color");

    let input = src.to_f64_vec();
    let mut output = vec![0.0; src.total() * out_cn];
    output
        .par_chunks_mut(out_cn)
        .zip(input.par_chunks(scn))
        .for_each(|(d, s)| match conversion {
            Conversion::Reorder { swap, .. } => {
                let (c0, c2) = if swap { (s[2], s[0]) } else { (s[0], s[2]) };
                d[0] = c0;
                d[1] = s[1];
                d[2] = c2;
                if out_cn == 4 {
                    d[3] = if scn == 4 { s[3] } else { alpha };
                }
            }
            Conversion::ToGray { blue_first, .. } => {
                let (b, r) = if blue_first { (s[0], s[2]) } else { (s[2], s[0]) };
                d[0] = if fixed_point {
                    gray_u8(b, s[1], r)
                } else {
                    0.114 * b + 0.587 * s[1] + 0.299 * r
                };
            }
            Conversion::FromGray { .. } => {
                d[..3].fill(s[0]);
                if out_cn == 4 {
                    d[3] = alpha;
                }
            }
        });

    Mat::from_f64_slice(
        src.rows(),
        src.cols(),
        MatType::new(src.depth(), out_cn)?,
        &output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvmat_core::{CV_32FC3, CV_8UC1, CV_8UC4};

    fn bgr() -> Mat {
        Mat::from_vec(1, 2, 3, vec![255u8, 0, 0, 10, 20, 30]).unwrap()
    }

    #[test]
    fn bgr_to_gray_weights() {
        let gray = cvt_color(&bgr(), COLOR_BGR2GRAY, 0).unwrap();
        assert_eq!(gray.mat_type(), CV_8UC1);
        // Pure blue: 0.114 * 255 = 29.07.
        assert_eq!(gray.to_vec::<u8>().unwrap(), vec![29, 22]);
    }

    #[test]
    fn u8_gray_rounds_in_fixed_point() {
        // 0.587 * 20 + 0.299 * 240 falls just short of 83.5 in f64.
        let m = Mat::from_vec(1, 1, 3, vec![0u8, 20, 240]).unwrap();
        let gray = cvt_color(&m, COLOR_BGR2GRAY, 0).unwrap();
        assert_eq!(gray.to_vec::<u8>().unwrap(), vec![84]);

        let f = Mat::from_vec(1, 1, 3, vec![0.0f32, 20.0, 240.0]).unwrap();
        let gray = cvt_color(&f, COLOR_BGR2GRAY, 0).unwrap();
        assert!((gray.to_vec::<f32>().unwrap()[0] - 83.5).abs() < 1e-3);
    }

    #[test]
    fn rgb_to_gray_reads_red_first() {
        let gray = cvt_color(&bgr(), COLOR_RGB2GRAY, 0).unwrap();
        // Treated as pure red: 0.299 * 255 = 76.2.
        assert_eq!(gray.to_vec::<u8>().unwrap()[0], 76);
    }

    #[test]
    fn swap_and_alpha() {
        let rgb = cvt_color(&bgr(), COLOR_BGR2RGB, 3).unwrap();
        assert_eq!(rgb.to_vec::<u8>().unwrap(), vec![0, 0, 255, 30, 20, 10]);

        let bgra = cvt_color(&bgr(), COLOR_BGR2BGRA, 0).unwrap();
        assert_eq!(bgra.mat_type(), CV_8UC4);
        assert_eq!(bgra.to_vec::<u8>().unwrap(), vec![255, 0, 0, 255, 10, 20, 30, 255]);

        let back = cvt_color(&bgra, COLOR_BGRA2BGR, 0).unwrap();
        assert_eq!(back, bgr());
    }

    #[test]
    fn gray_to_bgr_float_alpha() {
        let g = Mat::from_vec(1, 1, 1, vec![0.5f32]).unwrap();
        let c = cvt_color(&g, COLOR_GRAY2BGRA, 0).unwrap();
        assert_eq!(c.to_vec::<f32>().unwrap(), vec![0.5, 0.5, 0.5, 1.0]);
        let c3 = cvt_color(&g, COLOR_GRAY2BGR, 0).unwrap();
        assert_eq!(c3.mat_type(), CV_32FC3);
    }

    #[test]
    fn rejects_bad_requests() {
        assert!(matches!(cvt_color(&bgr(), 99, 0), Err(Error::Argument(_))));
        assert!(matches!(cvt_color(&bgr(), COLOR_BGR2GRAY, 3), Err(Error::Argument(_))));
        let gray = Mat::new(2, 2, CV_8UC1).unwrap();
        assert!(matches!(cvt_color(&gray, COLOR_BGR2GRAY, 0), Err(Error::Computation(_))));
        let wide = Mat::new(2, 2, cvmat_core::CV_32SC3).unwrap();
        assert!(cvt_color(&wide, COLOR_BGR2GRAY, 0).is_err());
    }
}

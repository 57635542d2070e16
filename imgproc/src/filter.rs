use cvmat_core::{Depth, Error, Mat, MatType, Result};
use rayon::prelude::*;

/// Pixel extrapolation used when a kernel reaches past the image edge.
///
/// `Constant` pads with zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderType {
    Constant,
    Replicate,
    Reflect,
    Wrap,
    #[default]
    Reflect101,
}

pub const BORDER_CONSTANT: i32 = 0;
pub const BORDER_REPLICATE: i32 = 1;
pub const BORDER_REFLECT: i32 = 2;
pub const BORDER_WRAP: i32 = 3;
pub const BORDER_REFLECT_101: i32 = 4;
pub const BORDER_REFLECT101: i32 = BORDER_REFLECT_101;
pub const BORDER_DEFAULT: i32 = BORDER_REFLECT_101;
pub const BORDER_ISOLATED: i32 = 16;

impl BorderType {
    /// Decodes a `BORDER_*` code. The `BORDER_ISOLATED` flag is accepted and
    /// has no effect since filters never read outside the matrix they get.
    pub fn from_code(code: i32) -> Result<Self> {
        match code & !BORDER_ISOLATED {
            BORDER_CONSTANT => Ok(BorderType::Constant),
            BORDER_REPLICATE => Ok(BorderType::Replicate),
            BORDER_REFLECT => Ok(BorderType::Reflect),
            BORDER_WRAP => Ok(BorderType::Wrap),
            BORDER_REFLECT_101 => Ok(BorderType::Reflect101),
            other => Err(Error::Argument(format!("unsupported border type {other}"))),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            BorderType::Constant => BORDER_CONSTANT,
            BorderType::Replicate => BORDER_REPLICATE,
            BorderType::Reflect => BORDER_REFLECT,
            BorderType::Wrap => BORDER_WRAP,
            BorderType::Reflect101 => BORDER_REFLECT_101,
        }
    }
}

/// Maps a possibly out-of-range coordinate back into `0..len`. `None` means
/// the constant border value applies.
pub(crate) fn map_coord(coord: isize, len: usize, border: BorderType) -> Option<usize> {
    let n = len as isize;
    if n <= 0 {
        return None;
    }
    if (0..n).contains(&coord) {
        return Some(coord as usize);
    }

    match border {
        BorderType::Constant => None,
        BorderType::Replicate => Some(coord.clamp(0, n - 1) as usize),
        BorderType::Wrap => Some(coord.rem_euclid(n) as usize),
        BorderType::Reflect => {
            let period = 2 * n;
            let c = coord.rem_euclid(period);
            Some((if c >= n { period - c - 1 } else { c }) as usize)
        }
        BorderType::Reflect101 => {
            if n == 1 {
                return Some(0);
            }
            let period = 2 * n - 2;
            let c = coord.rem_euclid(period);
            Some((if c >= n { period - c } else { c }) as usize)
        }
    }
}

/// Interleaved `f64` copy of a matrix that the filters work on.
#[derive(Debug, Clone)]
pub(crate) struct Planes {
    pub rows: usize,
    pub cols: usize,
    pub cn: usize,
    pub data: Vec<f64>,
}

impl Planes {
    pub fn from_mat(src: &Mat) -> Self {
        Self {
            rows: src.rows(),
            cols: src.cols(),
            cn: src.channels(),
            data: src.to_f64_vec(),
        }
    }

    fn zeroed_like(&self) -> Self {
        Self {
            data: vec![0.0; self.data.len()],
            ..*self
        }
    }

    pub fn map(mut self, f: impl Fn(f64) -> f64 + Sync) -> Self {
        self.data.par_iter_mut().for_each(|v| *v = f(*v));
        self
    }

    pub fn into_mat(self, mat_type: MatType) -> Result<Mat> {
        Mat::from_f64_slice(self.rows, self.cols, mat_type, &self.data)
    }
}

/// Resolves a `ddepth` argument: negative keeps the source depth.
pub(crate) fn output_type(src: &Mat, ddepth: i32) -> Result<MatType> {
    let depth = if ddepth < 0 {
        src.depth()
    } else {
        Depth::from_code(ddepth)?
    };
    Ok(src.mat_type().with_depth(depth))
}

/// Resolves an anchor where negative coordinates mean the kernel centre.
pub(crate) fn resolve_anchor(anchor: (i32, i32), kw: usize, kh: usize) -> Result<(usize, usize)> {
    let ax = if anchor.0 < 0 { kw / 2 } else { anchor.0 as usize };
    let ay = if anchor.1 < 0 { kh / 2 } else { anchor.1 as usize };
    if ax >= kw || ay >= kh {
        return Err(Error::Argument(format!(
            "anchor ({}, {}) lies outside a {}x{} kernel",
            anchor.0, anchor.1, kw, kh
        )));
    }
    Ok((ax, ay))
}

/// Row pass with `kx` followed by a column pass with `ky`.
pub(crate) fn sep_filter(
    src: &Planes,
    kx: &[f64],
    ky: &[f64],
    anchor: (usize, usize),
    border: BorderType,
) -> Planes {
    let (rows, cols, cn) = (src.rows, src.cols, src.cn);
    let row_len = cols * cn;

    let mut tmp = src.zeroed_like();
    tmp.data
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(r, out)| {
            let line = &src.data[r * row_len..(r + 1) * row_len];
            for c in 0..cols {
                for (i, &w) in kx.iter().enumerate() {
                    let Some(sc) = map_coord(c as isize + i as isize - anchor.0 as isize, cols, border)
                    else {
                        continue;
                    };
                    for k in 0..cn {
                        out[c * cn + k] += w * line[sc * cn + k];
                    }
                }
            }
        });

    let mut dst = src.zeroed_like();
    dst.data
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(r, out)| {
            for (i, &w) in ky.iter().enumerate() {
                let Some(sr) = map_coord(r as isize + i as isize - anchor.1 as isize, rows, border)
                else {
                    continue;
                };
                let line = &tmp.data[sr * row_len..(sr + 1) * row_len];
                for (o, &v) in out.iter_mut().zip(line) {
                    *o += w * v;
                }
            }
        });
    dst
}

/// Correlation with a dense `kw` x `kh` kernel stored row-major.
pub(crate) fn filter_2d(
    src: &Planes,
    kernel: &[f64],
    kw: usize,
    kh: usize,
    anchor: (usize, usize),
    border: BorderType,
) -> Planes {
    let (rows, cols, cn) = (src.rows, src.cols, src.cn);
    let row_len = cols * cn;

    let mut dst = src.zeroed_like();
    dst.data
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(r, out)| {
            for ky in 0..kh {
                let Some(sr) = map_coord(r as isize + ky as isize - anchor.1 as isize, rows, border)
                else {
                    continue;
                };
                let line = &src.data[sr * row_len..(sr + 1) * row_len];
                for kx in 0..kw {
                    let w = kernel[ky * kw + kx];
                    if w == 0.0 {
                        continue;
                    }
                    for c in 0..cols {
                        let Some(sc) =
                            map_coord(c as isize + kx as isize - anchor.0 as isize, cols, border)
                        else {
                            continue;
                        };
                        for k in 0..cn {
                            out[c * cn + k] += w * line[sc * cn + k];
                        }
                    }
                }
            }
        });
    dst
}

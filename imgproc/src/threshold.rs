use crate::filter::{sep_filter, BorderType, Planes};
use crate::smooth::gaussian_kernel;
use cvmat_core::{Error, Mat, Result, CV_8UC1};

pub const THRESH_BINARY: i32 = 0;
pub const THRESH_BINARY_INV: i32 = 1;
pub const THRESH_TRUNC: i32 = 2;
pub const THRESH_TOZERO: i32 = 3;
pub const THRESH_TOZERO_INV: i32 = 4;
pub const THRESH_MASK: i32 = 7;
pub const THRESH_OTSU: i32 = 8;
pub const THRESH_TRIANGLE: i32 = 16;

pub const ADAPTIVE_THRESH_MEAN_C: i32 = 0;
pub const ADAPTIVE_THRESH_GAUSSIAN_C: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdType {
    Binary,
    BinaryInv,
    Trunc,
    ToZero,
    ToZeroInv,
}

impl ThresholdType {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            THRESH_BINARY => Ok(ThresholdType::Binary),
            THRESH_BINARY_INV => Ok(ThresholdType::BinaryInv),
            THRESH_TRUNC => Ok(ThresholdType::Trunc),
            THRESH_TOZERO => Ok(ThresholdType::ToZero),
            THRESH_TOZERO_INV => Ok(ThresholdType::ToZeroInv),
            other => Err(Error::Argument(format!("unknown threshold type {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptiveMethod {
    MeanC,
    GaussianC,
}

impl AdaptiveMethod {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            ADAPTIVE_THRESH_MEAN_C => Ok(AdaptiveMethod::MeanC),
            ADAPTIVE_THRESH_GAUSSIAN_C => Ok(AdaptiveMethod::GaussianC),
            other => Err(Error::Argument(format!("unknown adaptive method {other}"))),
        }
    }
}

fn apply_threshold(value: f64, thresh: f64, max_value: f64, typ: ThresholdType) -> f64 {
    match typ {
        ThresholdType::Binary => {
            if value > thresh {
                max_value
            } else {
                0.0
            }
        }
        ThresholdType::BinaryInv => {
            if value > thresh {
                0.0
            } else {
                max_value
            }
        }
        ThresholdType::Trunc => value.min(thresh),
        ThresholdType::ToZero => {
            if value > thresh {
                value
            } else {
                0.0
            }
        }
        ThresholdType::ToZeroInv => {
            if value > thresh {
                0.0
            } else {
                value
            }
        }
    }
}

fn histogram(values: &[u8]) -> [u32; 256] {
    let mut hist = [0u32; 256];
    for &px in values {
        hist[px as usize] += 1;
    }
    hist
}

/// Threshold maximising the between-class variance.
fn otsu_threshold(hist: &[u32; 256]) -> u8 {
    let total: f64 = hist.iter().map(|&c| c as f64).sum();
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut weight_background = 0.0f64;
    let mut sum_background = 0.0f64;
    let mut best_between = -1.0f64;
    let mut best_threshold = 0u8;

    for (t, &count) in hist.iter().enumerate() {
        weight_background += count as f64;
        if weight_background <= f64::EPSILON {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground <= f64::EPSILON {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background;
        let mean_foreground = (sum_all - sum_background) / weight_foreground;
        let diff = mean_background - mean_foreground;
        let between = weight_background * weight_foreground * diff * diff;

        if between > best_between {
            best_between = between;
            best_threshold = t as u8;
        }
    }
    best_threshold
}

/// Triangle method: the histogram bin furthest from the line joining the
/// peak to the far end of the distribution.
fn triangle_threshold(hist: &[u32; 256]) -> u8 {
    let Some(left_bound) = hist.iter().position(|&c| c > 0) else {
        return 0;
    };
    let right_bound = hist.iter().rposition(|&c| c > 0).unwrap_or(left_bound);
    // Step one bin outwards so the line starts on an empty bin.
    let mut left = left_bound.saturating_sub(1);
    let right = (right_bound + 1).min(255);

    let mut max_ind = 0;
    let mut max = 0;
    for (i, &c) in hist.iter().enumerate() {
        if c > max {
            max = c;
            max_ind = i;
        }
    }

    // Work on the longer tail; mirror the histogram when it lies to the left.
    let flip = max_ind - left < right - max_ind;
    let mut h = *hist;
    if flip {
        h.reverse();
        left = 255 - right;
        max_ind = 255 - max_ind;
    }

    let mut thresh = left;
    let a = h[max_ind] as f64;
    let b = (left as f64) - (max_ind as f64);
    let mut dist = 0.0;
    for (i, &c) in h.iter().enumerate().take(max_ind + 1).skip(left + 1) {
        let d = a * i as f64 + b * c as f64;
        if d > dist {
            dist = d;
            thresh = i;
        }
    }
    thresh = thresh.saturating_sub(1);
    if flip {
        thresh = 255 - thresh;
    }
    thresh as u8
}

/// Applies a fixed-level threshold to every channel value.
///
/// `typ` is one of the `THRESH_*` types, optionally combined with
/// `THRESH_OTSU` or `THRESH_TRIANGLE`, which compute the level from the
/// histogram of a single-channel 8-bit input and ignore `thresh`. Returns
/// the output and the level actually used.
pub fn threshold(src: &Mat, thresh: f64, max_value: f64, typ: i32) -> Result<(Mat, f64)> {
    let kind = ThresholdType::from_code(typ & THRESH_MASK)?;
    let auto = typ & (THRESH_OTSU | THRESH_TRIANGLE);
    if auto == THRESH_OTSU | THRESH_TRIANGLE {
        return Err(Error::Argument("THRESH_OTSU and THRESH_TRIANGLE are exclusive".into()));
    }

    let thresh = if auto != 0 {
        if src.mat_type() != CV_8UC1 {
            return Err(Error::Computation(format!(
                "automatic thresholds need {}, got {}",
                CV_8UC1,
                src.mat_type()
            )));
        }
        let hist = histogram(&src.to_vec::<u8>()?);
        let level = if auto == THRESH_OTSU {
            otsu_threshold(&hist)
        } else {
            triangle_threshold(&hist)
        };
        level as f64
    } else if src.depth().is_float() {
        thresh
    } else {
        // Integer data cannot fall between two levels.
        thresh.floor()
    };
    tracing::debug!(?kind, thresh, max_value, "threshold");

    let out: Vec<f64> = src
        .to_f64_vec()
        .into_iter()
        .map(|v| apply_threshold(v, thresh, max_value, kind))
        .collect();
    let dst = Mat::from_f64_slice(src.rows(), src.cols(), src.mat_type(), &out)?;
    Ok((dst, thresh))
}

/// Thresholds each pixel of a single-channel 8-bit matrix against the mean
/// (or Gaussian-weighted mean) of its `block_size` neighbourhood minus `c`.
/// Only `THRESH_BINARY` and `THRESH_BINARY_INV` are meaningful here.
pub fn adaptive_threshold(
    src: &Mat,
    max_value: f64,
    method: AdaptiveMethod,
    typ: ThresholdType,
    block_size: i32,
    c: f64,
) -> Result<Mat> {
    if block_size < 3 || block_size % 2 == 0 {
        return Err(Error::Argument(format!(
            "block size must be odd and at least 3, got {block_size}"
        )));
    }
    if !matches!(typ, ThresholdType::Binary | ThresholdType::BinaryInv) {
        return Err(Error::Argument(format!(
            "adaptive threshold supports Binary or BinaryInv, got {typ:?}"
        )));
    }
    if src.mat_type() != CV_8UC1 {
        return Err(Error::Computation(format!(
            "adaptive threshold needs {}, got {}",
            CV_8UC1,
            src.mat_type()
        )));
    }

    let n = block_size as usize;
    let kernel = match method {
        AdaptiveMethod::MeanC => vec![1.0 / n as f64; n],
        AdaptiveMethod::GaussianC => gaussian_kernel(n, 0.0)?,
    };
    let planes = Planes::from_mat(src);
    let local = sep_filter(&planes, &kernel, &kernel, (n / 2, n / 2), BorderType::Replicate);

    let max_value = max_value.round().clamp(0.0, 255.0);
    let idelta = match typ {
        ThresholdType::Binary => c.ceil(),
        _ => c.floor(),
    };
    let out: Vec<f64> = planes
        .data
        .iter()
        .zip(&local.data)
        .map(|(&v, &mean)| {
            let above = v - mean.round() > -idelta;
            match (typ, above) {
                (ThresholdType::Binary, true) | (ThresholdType::BinaryInv, false) => max_value,
                _ => 0.0,
            }
        })
        .collect();
    Mat::from_f64_slice(src.rows(), src.cols(), CV_8UC1, &out)
}

//! Channel splitting and merging, and side-by-side concatenation.

use crate::depth::{Element, MatType};
use crate::mat::Mat;
use crate::{Error, Result};

impl Mat {
    /// One single-channel matrix per channel, in channel order.
    pub fn split(&self) -> Result<Vec<Mat>> {
        let cn = self.channels();
        crate::dispatch_depth!(self.depth(), T => {
            let values = self.to_vec::<T>()?;
            (0..cn)
                .map(|c| {
                    let plane: Vec<T> = values.iter().skip(c).step_by(cn).copied().collect();
                    Mat::from_vec(self.rows(), self.cols(), 1, plane)
                })
                .collect()
        })
    }

    /// Interleaves the channels of `planes` into one matrix. Inputs may
    /// carry several channels each; they must agree on size and depth.
    pub fn merge(planes: &[Mat]) -> Result<Mat> {
        let first = planes
            .first()
            .ok_or_else(|| Error::Argument("merge needs at least one matrix".into()))?;
        let (rows, cols, depth) = (first.rows(), first.cols(), first.depth());
        for p in planes {
            if p.rows() != rows || p.cols() != cols || p.depth() != depth {
                return Err(Error::Computation(format!(
                    "merge: {}x{} {} does not match {}x{} {}",
                    p.rows(),
                    p.cols(),
                    p.mat_type(),
                    rows,
                    cols,
                    first.mat_type()
                )));
            }
        }
        let total_cn: usize = planes.iter().map(Mat::channels).sum();
        MatType::new(depth, total_cn)?;

        crate::dispatch_depth!(depth, T => {
            let sources = planes
                .iter()
                .map(|p| Ok((p.channels(), p.to_vec::<T>()?)))
                .collect::<Result<Vec<_>>>()?;
            let mut out: Vec<T> = Vec::with_capacity(rows * cols * total_cn);
            for i in 0..rows * cols {
                for (cn, values) in &sources {
                    out.extend_from_slice(&values[i * cn..(i + 1) * cn]);
                }
            }
            Mat::from_vec(rows, cols, total_cn, out)
        })
    }

    /// Places the inputs left to right. All must share row count and type.
    pub fn hconcat(mats: &[Mat]) -> Result<Mat> {
        let first = check_concat("hconcat", mats, |m, f| m.rows() == f.rows())?;
        let rows = first.rows();
        let cols: usize = mats.iter().map(Mat::cols).sum();
        let cn = first.channels();
        crate::dispatch_depth!(first.depth(), T => {
            let sources = collect_values::<T>(mats)?;
            let mut out: Vec<T> = Vec::with_capacity(rows * cols * cn);
            for r in 0..rows {
                for (m, values) in mats.iter().zip(&sources) {
                    let width = m.cols() * cn;
                    out.extend_from_slice(&values[r * width..(r + 1) * width]);
                }
            }
            Mat::from_vec(rows, cols, cn, out)
        })
    }

    /// Stacks the inputs top to bottom. All must share column count and type.
    pub fn vconcat(mats: &[Mat]) -> Result<Mat> {
        let first = check_concat("vconcat", mats, |m, f| m.cols() == f.cols())?;
        let rows: usize = mats.iter().map(Mat::rows).sum();
        crate::dispatch_depth!(first.depth(), T => {
            let out: Vec<T> = collect_values::<T>(mats)?.concat();
            Mat::from_vec(rows, first.cols(), first.channels(), out)
        })
    }
}

fn check_concat<'a>(
    op: &str,
    mats: &'a [Mat],
    aligned: impl Fn(&Mat, &Mat) -> bool,
) -> Result<&'a Mat> {
    let first = mats
        .first()
        .ok_or_else(|| Error::Argument(format!("{op} needs at least one matrix")))?;
    for m in mats {
        if m.mat_type() != first.mat_type() || !aligned(m, first) {
            return Err(Error::Computation(format!(
                "{}: {}x{} {} cannot be joined with {}x{} {}",
                op,
                m.rows(),
                m.cols(),
                m.mat_type(),
                first.rows(),
                first.cols(),
                first.mat_type()
            )));
        }
    }
    Ok(first)
}

fn collect_values<T: Element>(mats: &[Mat]) -> Result<Vec<Vec<T>>> {
    mats.iter().map(|m| m.to_vec::<T>()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::*;

    #[test]
    fn split_then_merge_restores_channels() {
        let m = Mat::from_vec(1, 2, 3, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
        let planes = m.split().unwrap();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].to_vec::<u8>().unwrap(), vec![1, 4]);
        assert_eq!(planes[2].to_vec::<u8>().unwrap(), vec![3, 6]);
        assert_eq!(Mat::merge(&planes).unwrap(), m);
    }

    #[test]
    fn merge_mixed_channel_counts() {
        let a = Mat::from_vec(1, 1, 2, vec![1i16, 2]).unwrap();
        let b = Mat::from_vec(1, 1, 1, vec![3i16]).unwrap();
        let m = Mat::merge(&[a, b]).unwrap();
        assert_eq!(m.mat_type(), CV_16SC3);
        assert_eq!(m.to_vec::<i16>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn merge_rejects_mismatch_and_empty() {
        let a = Mat::new(2, 2, CV_8UC1).unwrap();
        let b = Mat::new(2, 2, CV_32FC1).unwrap();
        assert!(matches!(Mat::merge(&[a, b]), Err(Error::Computation(_))));
        assert!(matches!(Mat::merge(&[]), Err(Error::Argument(_))));
    }

    #[test]
    fn hconcat_joins_rows() {
        let a = Mat::from_vec(2, 1, 1, vec![1u8, 2]).unwrap();
        let b = Mat::from_vec(2, 2, 1, vec![3u8, 4, 5, 6]).unwrap();
        let m = Mat::hconcat(&[a, b]).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.to_vec::<u8>().unwrap(), vec![1, 3, 4, 2, 5, 6]);
    }

    #[test]
    fn vconcat_stacks() {
        let a = Mat::from_vec(1, 2, 1, vec![1.0f32, 2.0]).unwrap();
        let b = Mat::from_vec(2, 2, 1, vec![3.0f32, 4.0, 5.0, 6.0]).unwrap();
        let m = Mat::vconcat(&[a, b]).unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 2));
        assert_eq!(m.to_vec::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn concat_rejects_misaligned_and_empty() {
        let a = Mat::new(2, 2, CV_8UC1).unwrap();
        let b = Mat::new(3, 2, CV_8UC1).unwrap();
        assert!(matches!(Mat::hconcat(&[a.clone(), b.clone()]), Err(Error::Computation(_))));
        assert!(Mat::vconcat(&[a, b]).is_ok());
        assert!(matches!(Mat::hconcat(&[]), Err(Error::Argument(_))));
        assert!(matches!(Mat::vconcat(&[]), Err(Error::Argument(_))));
    }

    #[test]
    fn concat_reads_through_views() {
        let parent = Mat::from_vec(2, 2, 1, vec![1u8, 2, 3, 4]).unwrap();
        let left = parent.roi(crate::Rect::new(0, 0, 1, 2)).unwrap();
        let m = Mat::hconcat(&[left.share(), left]).unwrap();
        assert_eq!(m.to_vec::<u8>().unwrap(), vec![1, 1, 3, 3]);
    }
}

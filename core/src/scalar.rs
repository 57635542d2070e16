use std::fmt;
use std::ops::{Index, IndexMut};

/// Per-channel pixel value: up to four components, missing ones are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scalar(pub [f64; 4]);

impl Scalar {
    pub const LEN: usize = 4;

    pub fn new(v0: f64, v1: f64, v2: f64, v3: f64) -> Self {
        Self([v0, v1, v2, v3])
    }

    /// Every component set to `v`.
    pub fn all(v: f64) -> Self {
        Self([v; 4])
    }

    /// Takes up to four leading values; anything beyond is dropped.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut s = Self::default();
        for (dst, &v) in s.0.iter_mut().zip(values) {
            *dst = v;
        }
        s
    }

    pub fn as_array(&self) -> &[f64; 4] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::new(v, 0.0, 0.0, 0.0)
    }
}

impl From<[f64; 4]> for Scalar {
    fn from(v: [f64; 4]) -> Self {
        Self(v)
    }
}

impl Index<usize> for Scalar {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Scalar {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

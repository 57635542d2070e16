use crate::storage::MatData;
use crate::{Error, Result};
use std::fmt;

/// Numeric representation of a single channel value.
///
/// The discriminants follow the `CV_8U` .. `CV_64F` numbering so that packed
/// type codes coming from scripting code can be decoded directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    U8 = 0,
    I8 = 1,
    U16 = 2,
    I16 = 3,
    I32 = 4,
    F32 = 5,
    F64 = 6,
}

impl Depth {
    pub const ALL: [Depth; 7] = [
        Depth::U8,
        Depth::I8,
        Depth::U16,
        Depth::I16,
        Depth::I32,
        Depth::F32,
        Depth::F64,
    ];

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Depth::U8),
            1 => Ok(Depth::I8),
            2 => Ok(Depth::U16),
            3 => Ok(Depth::I16),
            4 => Ok(Depth::I32),
            5 => Ok(Depth::F32),
            6 => Ok(Depth::F64),
            _ => Err(Error::InvalidDepth(code)),
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Size of one channel value in bytes.
    pub fn size(&self) -> usize {
        match self {
            Depth::U8 | Depth::I8 => 1,
            Depth::U16 | Depth::I16 => 2,
            Depth::I32 | Depth::F32 => 4,
            Depth::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Depth::F32 | Depth::F64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Depth::U8 => "8U",
            Depth::I8 => "8S",
            Depth::U16 => "16U",
            Depth::I16 => "16S",
            Depth::I32 => "32S",
            Depth::F32 => "32F",
            Depth::F64 => "64F",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Depth plus channel count, packed as `depth + ((channels - 1) << 3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatType {
    depth: Depth,
    channels: usize,
}

impl MatType {
    pub const CN_MAX: usize = 512;
    const CN_SHIFT: i32 = 3;

    pub fn new(depth: Depth, channels: usize) -> Result<Self> {
        if channels == 0 || channels > Self::CN_MAX {
            return Err(Error::Argument(format!(
                "channel count must be in 1..={}, got {}",
                Self::CN_MAX,
                channels
            )));
        }
        Ok(Self { depth, channels })
    }

    const fn of(depth: Depth, channels: usize) -> Self {
        Self { depth, channels }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        if code < 0 {
            return Err(Error::Argument(format!("negative matrix type: {code}")));
        }
        let depth = Depth::from_code(code & ((1 << Self::CN_SHIFT) - 1))?;
        let channels = (((code >> Self::CN_SHIFT) as usize) & (Self::CN_MAX - 1)) + 1;
        Ok(Self { depth, channels })
    }

    pub fn code(&self) -> i32 {
        self.depth.code() + (((self.channels - 1) as i32) << Self::CN_SHIFT)
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Size of one element (all channels) in bytes.
    pub fn elem_size(&self) -> usize {
        self.depth.size() * self.channels
    }

    pub fn with_depth(&self, depth: Depth) -> Self {
        Self { depth, ..*self }
    }
}

impl fmt::Display for MatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CV_{}C{}", self.depth.name(), self.channels)
    }
}

macro_rules! mat_type_consts {
    ($($name:ident = ($depth:ident, $cn:expr)),* $(,)?) => {
        $(pub const $name: MatType = MatType::of(Depth::$depth, $cn);)*
    };
}

mat_type_consts! {
    CV_8UC1 = (U8, 1), CV_8UC2 = (U8, 2), CV_8UC3 = (U8, 3), CV_8UC4 = (U8, 4),
    CV_8SC1 = (I8, 1), CV_8SC2 = (I8, 2), CV_8SC3 = (I8, 3), CV_8SC4 = (I8, 4),
    CV_16UC1 = (U16, 1), CV_16UC2 = (U16, 2), CV_16UC3 = (U16, 3), CV_16UC4 = (U16, 4),
    CV_16SC1 = (I16, 1), CV_16SC2 = (I16, 2), CV_16SC3 = (I16, 3), CV_16SC4 = (I16, 4),
    CV_32SC1 = (I32, 1), CV_32SC2 = (I32, 2), CV_32SC3 = (I32, 3), CV_32SC4 = (I32, 4),
    CV_32FC1 = (F32, 1), CV_32FC2 = (F32, 2), CV_32FC3 = (F32, 3), CV_32FC4 = (F32, 4),
    CV_64FC1 = (F64, 1), CV_64FC2 = (F64, 2), CV_64FC3 = (F64, 3), CV_64FC4 = (F64, 4),
}

/// A channel value type that a matrix buffer can hold.
///
/// Conversions from `f64` round half to even and saturate, so writing
/// `300.0` into an 8-bit matrix stores `255` and `-1.0` stores `0`.
pub trait Element: Copy + Default + PartialEq + Send + Sync + fmt::Debug + 'static {
    const DEPTH: Depth;

    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;

    /// Raw bit pattern, zero-extended.
    fn to_bits(self) -> u64;
    fn from_bits(bits: u64) -> Self;

    fn wrap(data: Vec<Self>) -> MatData;
    fn slice(data: &MatData) -> Option<&[Self]>;
    fn slice_mut(data: &mut MatData) -> Option<&mut [Self]>;
}

macro_rules! impl_int_element {
    ($($t:ty => $variant:ident, $bits:ty);* $(;)?) => {$(
        impl Element for $t {
            const DEPTH: Depth = Depth::$variant;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(v: f64) -> Self {
                // `as` saturates and maps NaN to zero.
                v.round_ties_even() as $t
            }

            fn to_bits(self) -> u64 {
                self as $bits as u64
            }

            fn from_bits(bits: u64) -> Self {
                bits as $bits as $t
            }

            fn wrap(data: Vec<Self>) -> MatData {
                MatData::$variant(data)
            }

            fn slice(data: &MatData) -> Option<&[Self]> {
                match data {
                    MatData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut MatData) -> Option<&mut [Self]> {
                match data {
                    MatData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    )*};
}

impl_int_element! {
    u8 => U8, u8;
    i8 => I8, u8;
    u16 => U16, u16;
    i16 => I16, u16;
    i32 => I32, u32;
}

macro_rules! impl_float_element {
    ($($t:ty => $variant:ident, $bits:ty);* $(;)?) => {$(
        impl Element for $t {
            const DEPTH: Depth = Depth::$variant;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(v: f64) -> Self {
                v as $t
            }

            fn to_bits(self) -> u64 {
                <$t>::to_bits(self) as u64
            }

            fn from_bits(bits: u64) -> Self {
                <$t>::from_bits(bits as $bits)
            }

            fn wrap(data: Vec<Self>) -> MatData {
                MatData::$variant(data)
            }

            fn slice(data: &MatData) -> Option<&[Self]> {
                match data {
                    MatData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut MatData) -> Option<&mut [Self]> {
                match data {
                    MatData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    )*};
}

impl_float_element! {
    f32 => F32, u32;
    f64 => F64, u64;
}

/// Runs `$body` with `$T` bound to the element type of `$depth`.
#[macro_export]
macro_rules! dispatch_depth {
    ($depth:expr, $T:ident => $body:expr) => {
        match $depth {
            $crate::Depth::U8 => {
                type $T = u8;
                $body
            }
            $crate::Depth::I8 => {
                type $T = i8;
                $body
            }
            $crate::Depth::U16 => {
                type $T = u16;
                $body
            }
            $crate::Depth::I16 => {
                type $T = i16;
                $body
            }
            $crate::Depth::I32 => {
                type $T = i32;
                $body
            }
            $crate::Depth::F32 => {
                type $T = f32;
                $body
            }
            $crate::Depth::F64 => {
                type $T = f64;
                $body
            }
        }
    };
}

use crate::depth::Depth;
use crate::{Error, Result};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Typed backing store for a matrix, one variant per supported depth.
#[derive(Debug, Clone, PartialEq)]
pub enum MatData {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Runs `$body` with `$v` bound to the vector inside a `MatData`, whatever
/// its depth. Works on both `&MatData` and `&mut MatData`.
#[macro_export]
macro_rules! with_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            $crate::MatData::U8($v) => $body,
            $crate::MatData::I8($v) => $body,
            $crate::MatData::U16($v) => $body,
            $crate::MatData::I16($v) => $body,
            $crate::MatData::I32($v) => $body,
            $crate::MatData::F32($v) => $body,
            $crate::MatData::F64($v) => $body,
        }
    };
}

impl MatData {
    /// Allocates `len` zeroed channel values, reporting allocator refusal
    /// instead of aborting.
    pub fn zeroed(depth: Depth, len: usize) -> Result<Self> {
        crate::dispatch_depth!(depth, T => {
            let mut v: Vec<T> = Vec::new();
            v.try_reserve_exact(len).map_err(|e| {
                Error::Allocation(format!("{} values of depth {}: {}", len, depth, e))
            })?;
            v.resize(len, T::default());
            Ok(<T as crate::Element>::wrap(v))
        })
    }

    pub fn depth(&self) -> Depth {
        match self {
            MatData::U8(_) => Depth::U8,
            MatData::I8(_) => Depth::I8,
            MatData::U16(_) => Depth::U16,
            MatData::I16(_) => Depth::I16,
            MatData::I32(_) => Depth::I32,
            MatData::F32(_) => Depth::F32,
            MatData::F64(_) => Depth::F64,
        }
    }

    pub fn len(&self) -> usize {
        with_data!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Heap footprint of the stored values in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * self.depth().size()
    }
}

/// The reference-counted allocation behind one or more matrix handles.
///
/// Handles hold it through an `Arc`; views over a sub-region clone the
/// `Arc` and keep their own offset and row step. Readers share the lock,
/// writers exclude, so aliasing handles on different threads never race.
#[derive(Debug)]
pub struct SharedBuffer {
    data: RwLock<MatData>,
}

impl SharedBuffer {
    pub fn new(data: MatData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, MatData> {
        self.data.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, MatData> {
        self.data.write()
    }

    pub fn depth(&self) -> Depth {
        self.read().depth()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

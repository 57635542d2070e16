//! Matrix handle with a shared, reference-counted buffer.
//!
//! A [`Mat`] is a 2-D, multi-channel array of one of seven element depths.
//! Handles created with [`Mat::roi`], [`Mat::diag`] or [`Mat::share`] alias
//! the same storage; [`Clone`] makes a deep copy.

pub mod arithm;
pub mod channels;
pub mod depth;
pub mod error;
pub mod geometry;
pub mod image;
pub mod mat;
pub mod runtime;
pub mod scalar;
pub mod storage;

pub use arithm::Operand;
pub use depth::*;
pub use error::{Error, ErrorKind, Result};
pub use geometry::{Point, Rect, Size};
pub use mat::Mat;
pub use scalar::Scalar;
pub use storage::{MatData, SharedBuffer};

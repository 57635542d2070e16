pub mod color;
pub mod derivatives;
pub mod draw;
pub mod edges;
pub mod filter;
pub mod resize;
pub mod smooth;
pub mod threshold;

pub use color::*;
pub use derivatives::*;
pub use draw::*;
pub use edges::*;
pub use filter::{
    BorderType, BORDER_CONSTANT, BORDER_DEFAULT, BORDER_ISOLATED, BORDER_REFLECT,
    BORDER_REFLECT101, BORDER_REFLECT_101, BORDER_REPLICATE, BORDER_WRAP,
};
pub use resize::*;
pub use smooth::*;
pub use threshold::*;

pub use cvmat_core::{Error, Result};

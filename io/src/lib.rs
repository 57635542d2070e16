//! Reading and writing images as `cvmat` matrices.
//!
//! PNG, JPEG, BMP, TIFF and the other formats enabled in the `image` crate
//! are supported. Colour images come back in BGR order.

pub mod codec;

pub use codec::{
    have_image_writer, imdecode, imencode, imread, imwrite, MatCodecExt, IMREAD_COLOR,
    IMREAD_GRAYSCALE, IMREAD_UNCHANGED, IMWRITE_JPEG_QUALITY, IMWRITE_PNG_COMPRESSION,
};

pub use cvmat_core::{Error, Result};

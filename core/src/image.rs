//! Conversion between `Mat` and the `image` crate's buffers.
//!
//! Matrices keep colour channels in BGR(A) order while `image` buffers are
//! RGB(A); every conversion here swaps the first and third channel.

use crate::depth::{Depth, Element, MatType};
use crate::mat::Mat;
use crate::{Error, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Pixel, Rgb, Rgba};

/// Swaps R and B in every pixel of an interleaved buffer with `cn` channels.
fn swap_red_blue<T>(values: &mut [T], cn: usize) {
    if cn >= 3 {
        for px in values.chunks_exact_mut(cn) {
            px.swap(0, 2);
        }
    }
}

fn from_buffer<P>(img: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<Mat>
where
    P: Pixel,
    P::Subpixel: Element,
{
    let cn = P::CHANNEL_COUNT as usize;
    let mut values = img.as_raw().clone();
    swap_red_blue(&mut values, cn);
    Mat::from_vec(img.height() as usize, img.width() as usize, cn, values)
}

fn to_buffer<P>(mat: &Mat) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel,
    P::Subpixel: Element,
{
    let mut values = mat.to_vec::<P::Subpixel>()?;
    swap_red_blue(&mut values, mat.channels());
    ImageBuffer::from_raw(mat.cols() as u32, mat.rows() as u32, values).ok_or_else(|| {
        Error::Computation(format!(
            "{}x{} {} does not fit an image buffer",
            mat.rows(),
            mat.cols(),
            mat.mat_type()
        ))
    })
}

impl Mat {
    /// Copies a decoded image into a new matrix.
    ///
    /// 8-bit and 16-bit gray, RGB and RGBA map to 1, 3 and 4 channels of the
    /// same depth; 32-bit float RGB(A) maps to `CV_32FC3`/`CV_32FC4`. Gray
    /// with alpha is widened to four channels.
    pub fn from_dynamic_image(img: &DynamicImage) -> Result<Mat> {
        match img {
            DynamicImage::ImageLuma8(b) => from_buffer(b),
            DynamicImage::ImageRgb8(b) => from_buffer(b),
            DynamicImage::ImageRgba8(b) => from_buffer(b),
            DynamicImage::ImageLuma16(b) => from_buffer(b),
            DynamicImage::ImageRgb16(b) => from_buffer(b),
            DynamicImage::ImageRgba16(b) => from_buffer(b),
            DynamicImage::ImageLumaA16(_) => from_buffer(&img.to_rgba16()),
            DynamicImage::ImageRgb32F(b) => from_buffer(b),
            DynamicImage::ImageRgba32F(b) => from_buffer(b),
            _ => from_buffer(&img.to_rgba8()),
        }
    }

    /// Copies the matrix into an image buffer for encoding.
    ///
    /// Supported: 8-bit and 16-bit unsigned with 1, 3 or 4 channels, and
    /// 32-bit float with 3 or 4 channels.
    pub fn to_dynamic_image(&self) -> Result<DynamicImage> {
        let img = match (self.depth(), self.channels()) {
            (Depth::U8, 1) => DynamicImage::ImageLuma8(to_buffer::<Luma<u8>>(self)?),
            (Depth::U8, 3) => DynamicImage::ImageRgb8(to_buffer::<Rgb<u8>>(self)?),
            (Depth::U8, 4) => DynamicImage::ImageRgba8(to_buffer::<Rgba<u8>>(self)?),
            (Depth::U16, 1) => DynamicImage::ImageLuma16(to_buffer::<Luma<u16>>(self)?),
            (Depth::U16, 3) => DynamicImage::ImageRgb16(to_buffer::<Rgb<u16>>(self)?),
            (Depth::U16, 4) => DynamicImage::ImageRgba16(to_buffer::<Rgba<u16>>(self)?),
            (Depth::F32, 3) => DynamicImage::ImageRgb32F(to_buffer::<Rgb<f32>>(self)?),
            (Depth::F32, 4) => DynamicImage::ImageRgba32F(to_buffer::<Rgba<f32>>(self)?),
            _ => {
                return Err(Error::Type(format!(
                    "{} has no image representation",
                    self.mat_type()
                )))
            }
        };
        Ok(img)
    }

    pub fn from_gray_image(img: &GrayImage) -> Result<Mat> {
        from_buffer(img)
    }

    /// Single-channel 8-bit matrices only.
    pub fn to_gray_image(&self) -> Result<GrayImage> {
        if self.mat_type() != MatType::new(Depth::U8, 1)? {
            return Err(Error::Type(format!(
                "expected CV_8UC1, got {}",
                self.mat_type()
            )));
        }
        to_buffer::<Luma<u8>>(self)
    }
}

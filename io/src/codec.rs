//! Image codecs for matrices.
//!
//! Decoding and encoding go through the `image` crate. Matrices hold colour
//! in BGR(A) order; the conversion in `cvmat_core` swaps to RGB(A) on the
//! way in and out.

use std::io::Cursor;
use std::path::Path;

use cvmat_core::{Depth, Error, Mat, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder, ImageFormat};

pub const IMREAD_UNCHANGED: i32 = -1;
pub const IMREAD_GRAYSCALE: i32 = 0;
pub const IMREAD_COLOR: i32 = 1;

pub const IMWRITE_JPEG_QUALITY: i32 = 1;
pub const IMWRITE_PNG_COMPRESSION: i32 = 16;

const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Options picked out of a flat `[key, value, ...]` parameter list.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WriteParams {
    jpeg_quality: u8,
    png_compression: Option<i32>,
}

impl WriteParams {
    fn parse(params: &[i32]) -> Result<Self> {
        if params.len() % 2 != 0 {
            return Err(Error::Argument(format!(
                "write parameters come in key/value pairs, got {} values",
                params.len()
            )));
        }
        let mut out = WriteParams {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_compression: None,
        };
        for pair in params.chunks_exact(2) {
            match pair[0] {
                IMWRITE_JPEG_QUALITY => out.jpeg_quality = pair[1].clamp(1, 100) as u8,
                IMWRITE_PNG_COMPRESSION => out.png_compression = Some(pair[1].clamp(0, 9)),
                key => tracing::debug!(key, "ignoring unknown write parameter"),
            }
        }
        Ok(out)
    }

    fn png_compression(&self) -> CompressionType {
        match self.png_compression {
            Some(0..=3) => CompressionType::Fast,
            Some(7..=9) => CompressionType::Best,
            _ => CompressionType::Default,
        }
    }
}

fn format_from_extension(ext: &str) -> Result<ImageFormat> {
    let trimmed = ext.trim_start_matches('.');
    ImageFormat::from_extension(trimmed)
        .ok_or_else(|| Error::Io(format!("no encoder for extension '{ext}'")))
}

/// Applies the read flags to a decoded image.
fn decoded_to_mat(img: DynamicImage, flags: i32) -> Result<Mat> {
    let img = match flags {
        f if f > 0 => DynamicImage::ImageRgb8(img.to_rgb8()),
        0 => DynamicImage::ImageLuma8(img.to_luma8()),
        _ => img,
    };
    Mat::from_dynamic_image(&img)
}

/// Decodes an in-memory image. The format is sniffed from the bytes.
pub fn imdecode(buf: &[u8], flags: i32) -> Result<Mat> {
    if buf.is_empty() {
        return Err(Error::Io("cannot decode an empty buffer".into()));
    }
    let img = image::load_from_memory(buf)?;
    tracing::debug!(bytes = buf.len(), width = img.width(), height = img.height(), flags, "imdecode");
    decoded_to_mat(img, flags)
}

/// Reads an image file.
///
/// `flags > 0` yields 8-bit BGR, `0` yields 8-bit gray and a negative value
/// keeps the stored layout (alpha and 16-bit samples included).
pub fn imread<P: AsRef<Path>>(path: P, flags: i32) -> Result<Mat> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| Error::Io(format!("cannot read {}: {e}", path.display())))?;
    imdecode(&bytes, flags)
}

fn encodable(mat: &Mat, format: ImageFormat) -> Result<DynamicImage> {
    let img = mat
        .to_dynamic_image()
        .map_err(|e| Error::Io(format!("{format:?}: {e}")))?;
    // JPEG carries 8-bit gray or RGB only.
    Ok(match format {
        ImageFormat::Jpeg if mat.channels() == 1 => DynamicImage::ImageLuma8(img.to_luma8()),
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    })
}

fn encode_as(mat: &Mat, format: ImageFormat, params: &[i32]) -> Result<Vec<u8>> {
    let params = WriteParams::parse(params)?;
    let img = encodable(mat, format)?;
    let (width, height) = (img.width(), img.height());
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, params.jpeg_quality);
            encoder.write_image(img.as_bytes(), width, height, img.color().into())?;
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, params.png_compression(), FilterType::Adaptive);
            encoder.write_image(img.as_bytes(), width, height, img.color().into())?;
        }
        _ => img.write_to(&mut Cursor::new(&mut buf), format)?,
    }
    tracing::debug!(?format, width, height, bytes = buf.len(), "encoded");
    Ok(buf)
}

/// Encodes the matrix into memory; `ext` is a file extension such as
/// `".png"` or `"jpg"`.
pub fn imencode(ext: &str, mat: &Mat, params: &[i32]) -> Result<Vec<u8>> {
    encode_as(mat, format_from_extension(ext)?, params)
}

/// Writes the matrix to `path`, choosing the format from its extension.
pub fn imwrite<P: AsRef<Path>>(path: P, mat: &Mat, params: &[i32]) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    let bytes = encode_as(mat, format, params)?;
    std::fs::write(path, bytes)
        .map_err(|e| Error::Io(format!("cannot write {}: {e}", path.display())))
}

/// Codec entry points as methods on `Mat`.
pub trait MatCodecExt: Sized {
    fn load<P: AsRef<Path>>(path: P, flags: i32) -> Result<Self>;
    fn decode(buf: &[u8], flags: i32) -> Result<Self>;
    fn save<P: AsRef<Path>>(&self, path: P, params: &[i32]) -> Result<()>;
    fn encode(&self, ext: &str, params: &[i32]) -> Result<Vec<u8>>;
}

impl MatCodecExt for Mat {
    fn load<P: AsRef<Path>>(path: P, flags: i32) -> Result<Self> {
        imread(path, flags)
    }

    fn decode(buf: &[u8], flags: i32) -> Result<Self> {
        imdecode(buf, flags)
    }

    fn save<P: AsRef<Path>>(&self, path: P, params: &[i32]) -> Result<()> {
        imwrite(path, self, params)
    }

    fn encode(&self, ext: &str, params: &[i32]) -> Result<Vec<u8>> {
        imencode(ext, self, params)
    }
}

/// True when `mat` can be written without losing precision or channels in
/// the format behind `ext`.
pub fn have_image_writer(ext: &str, mat: &Mat) -> bool {
    let Ok(format) = format_from_extension(ext) else {
        return false;
    };
    match (format, mat.depth(), mat.channels()) {
        (ImageFormat::Jpeg, Depth::U8, 1 | 3) => true,
        (ImageFormat::Png | ImageFormat::Tiff, Depth::U8 | Depth::U16, 1 | 3 | 4) => true,
        (ImageFormat::Bmp, Depth::U8, 1 | 3 | 4) => true,
        (ImageFormat::OpenExr, Depth::F32, 3 | 4) => true,
        _ => false,
    }
}

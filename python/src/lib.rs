//! The `cvmat` Python module.
//!
//! Build with `maturin develop -m python/Cargo.toml --features extension-module`.

mod array;
mod error;
mod mat;
mod types;

use cvmat_core::{Depth, MatType};
use pyo3::prelude::*;

pub use error::{CvError, Error};
pub use mat::PyMat;
pub use types::{PyPoint, PyRect, PyScalar, PySize};

fn add_type_constants(m: &Bound<'_, PyModule>) -> PyResult<()> {
    for depth in Depth::ALL {
        let bits = depth.size() * 8;
        let kind = match depth {
            Depth::U8 | Depth::U16 => "U",
            Depth::I8 | Depth::I16 | Depth::I32 => "S",
            Depth::F32 | Depth::F64 => "F",
        };
        m.add(format!("CV_{bits}{kind}").as_str(), depth.code())?;
        for cn in 1..=4 {
            let t = MatType::new(depth, cn).map_err(CvError)?;
            m.add(format!("CV_{bits}{kind}C{cn}").as_str(), t.code())?;
        }
    }
    Ok(())
}

fn add_constants(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use cvmat_imgproc as ip;
    use cvmat_io as io;

    add_type_constants(m)?;

    let ints: &[(&str, i32)] = &[
        ("IMREAD_UNCHANGED", io::IMREAD_UNCHANGED),
        ("IMREAD_GRAYSCALE", io::IMREAD_GRAYSCALE),
        ("IMREAD_COLOR", io::IMREAD_COLOR),
        ("IMWRITE_JPEG_QUALITY", io::IMWRITE_JPEG_QUALITY),
        ("IMWRITE_PNG_COMPRESSION", io::IMWRITE_PNG_COMPRESSION),
        ("BORDER_CONSTANT", ip::BORDER_CONSTANT),
        ("BORDER_REPLICATE", ip::BORDER_REPLICATE),
        ("BORDER_REFLECT", ip::BORDER_REFLECT),
        ("BORDER_WRAP", ip::BORDER_WRAP),
        ("BORDER_REFLECT_101", ip::BORDER_REFLECT_101),
        ("BORDER_REFLECT101", ip::BORDER_REFLECT101),
        ("BORDER_DEFAULT", ip::BORDER_DEFAULT),
        ("BORDER_ISOLATED", ip::BORDER_ISOLATED),
        ("INTER_NEAREST", ip::INTER_NEAREST),
        ("INTER_LINEAR", ip::INTER_LINEAR),
        ("INTER_CUBIC", ip::INTER_CUBIC),
        ("INTER_AREA", ip::INTER_AREA),
        ("INTER_LANCZOS4", ip::INTER_LANCZOS4),
        ("THRESH_BINARY", ip::THRESH_BINARY),
        ("THRESH_BINARY_INV", ip::THRESH_BINARY_INV),
        ("THRESH_TRUNC", ip::THRESH_TRUNC),
        ("THRESH_TOZERO", ip::THRESH_TOZERO),
        ("THRESH_TOZERO_INV", ip::THRESH_TOZERO_INV),
        ("THRESH_MASK", ip::THRESH_MASK),
        ("THRESH_OTSU", ip::THRESH_OTSU),
        ("THRESH_TRIANGLE", ip::THRESH_TRIANGLE),
        ("ADAPTIVE_THRESH_MEAN_C", ip::ADAPTIVE_THRESH_MEAN_C),
        ("ADAPTIVE_THRESH_GAUSSIAN_C", ip::ADAPTIVE_THRESH_GAUSSIAN_C),
        ("FILTER_SCHARR", ip::FILTER_SCHARR),
        ("FILLED", ip::FILLED),
        ("COLOR_BGR2BGRA", ip::COLOR_BGR2BGRA),
        ("COLOR_RGB2RGBA", ip::COLOR_RGB2RGBA),
        ("COLOR_BGRA2BGR", ip::COLOR_BGRA2BGR),
        ("COLOR_RGBA2RGB", ip::COLOR_RGBA2RGB),
        ("COLOR_BGR2RGBA", ip::COLOR_BGR2RGBA),
        ("COLOR_RGB2BGRA", ip::COLOR_RGB2BGRA),
        ("COLOR_RGBA2BGR", ip::COLOR_RGBA2BGR),
        ("COLOR_BGRA2RGB", ip::COLOR_BGRA2RGB),
        ("COLOR_BGR2RGB", ip::COLOR_BGR2RGB),
        ("COLOR_RGB2BGR", ip::COLOR_RGB2BGR),
        ("COLOR_BGRA2RGBA", ip::COLOR_BGRA2RGBA),
        ("COLOR_RGBA2BGRA", ip::COLOR_RGBA2BGRA),
        ("COLOR_BGR2GRAY", ip::COLOR_BGR2GRAY),
        ("COLOR_RGB2GRAY", ip::COLOR_RGB2GRAY),
        ("COLOR_GRAY2BGR", ip::COLOR_GRAY2BGR),
        ("COLOR_GRAY2RGB", ip::COLOR_GRAY2RGB),
        ("COLOR_GRAY2BGRA", ip::COLOR_GRAY2BGRA),
        ("COLOR_GRAY2RGBA", ip::COLOR_GRAY2RGBA),
        ("COLOR_BGRA2GRAY", ip::COLOR_BGRA2GRAY),
        ("COLOR_RGBA2GRAY", ip::COLOR_RGBA2GRAY),
    ];
    for (name, value) in ints {
        m.add(*name, *value)?;
    }
    Ok(())
}

/// Sizes the global worker pool; see `cvmat::init_thread_pool`.
#[pyfunction]
#[pyo3(signature = (threads = None))]
fn init_thread_pool(threads: Option<usize>) -> PyResult<usize> {
    cvmat_core::runtime::init_global_thread_pool(threads).map_err(CvError)?;
    Ok(cvmat_core::runtime::current_cpu_threads())
}

#[pyfunction]
#[pyo3(signature = (path, flags = 1))]
fn imread(path: std::path::PathBuf, flags: i32) -> PyResult<PyMat> {
    Ok(cvmat_io::imread(path, flags).map_err(CvError)?.into())
}

#[pyfunction]
#[pyo3(signature = (buf, flags = 1))]
fn imdecode(buf: &[u8], flags: i32) -> PyResult<PyMat> {
    Ok(cvmat_io::imdecode(buf, flags).map_err(CvError)?.into())
}

#[pymodule]
fn cvmat(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMat>()?;
    m.add_class::<PyScalar>()?;
    m.add_class::<PyRect>()?;
    m.add_class::<PySize>()?;
    m.add_class::<PyPoint>()?;
    m.add("Error", m.py().get_type_bound::<Error>())?;
    m.add_function(wrap_pyfunction!(init_thread_pool, m)?)?;
    m.add_function(wrap_pyfunction!(imread, m)?)?;
    m.add_function(wrap_pyfunction!(imdecode, m)?)?;
    add_constants(m)
}

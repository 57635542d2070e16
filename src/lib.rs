//! `cvmat`: reference-counted multi-channel matrices, image processing on
//! top of them and image codecs.
//!
//! ```no_run
//! use cvmat::prelude::*;
//!
//! # fn main() -> cvmat::Result<()> {
//! let img = imread("input.png", IMREAD_COLOR)?;
//! let gray = cvt_color(&img, COLOR_BGR2GRAY, 0)?;
//! let edges = canny(&gray, 50.0, 150.0, 3, false)?;
//! imwrite("edges.png", &edges, &[])?;
//! # Ok(())
//! # }
//! ```

pub use cvmat_core as core;
pub use cvmat_imgproc as imgproc;
pub use cvmat_io as io;

pub use cvmat_core::{Error, Mat, MatType, Operand, Point, Rect, Result, Scalar, Size};

pub mod prelude {
    pub use cvmat_core::*;
    pub use cvmat_imgproc::*;
    pub use cvmat_io::*;
}

/// Initialize a single global Rayon thread pool for all CPU-parallel routines.
///
/// Call this once at application startup. Repeated calls are idempotent and
/// return the first initialization result.
///
/// Priority order:
/// 1. explicit `num_threads`
/// 2. `CVMAT_CPU_THREADS` env var
/// 3. Rayon default
pub fn init_thread_pool(num_threads: Option<usize>) -> Result<()> {
    cvmat_core::runtime::init_global_thread_pool(num_threads)
}

/// Threads in the global pool.
pub fn current_cpu_threads() -> usize {
    cvmat_core::runtime::current_cpu_threads()
}

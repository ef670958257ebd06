//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use std::path::PathBuf;
use ndarray as nd;
use ndarray_npy::{ ReadNpzError, WriteNpzError };
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A, T, B>(
        a: &nd::ArrayBase<S, nd::Ix1>,
        b: &nd::ArrayBase<T, nd::Ix1>,
    ) -> Result<(), Self>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = B>,
    {
        let na = a.len();
        let nb = b.len();
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Returned from operations on serialized parameter and snapshot archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Returned when an archive file cannot be opened or created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when an archive cannot be parsed.
    #[error("npz read error: {0}")]
    Read(#[from] ReadNpzError),

    /// Returned when an archive cannot be written.
    #[error("npz write error: {0}")]
    Write(#[from] WriteNpzError),

    /// Returned when a named array is absent from an archive.
    #[error("missing array '{name}' in archive: {source}")]
    MissingEntry { name: String, source: ReadNpzError },

    /// Returned when a named array is present but holds no elements.
    #[error("array '{0}' in archive holds no elements")]
    EmptyEntry(String),
}

/// Returned from the fixed-step solvers.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Returned when a non-positive time step is encountered.
    #[error("time steps must be greater than 0; got {0}")]
    BadDt(f64),

    /// Returned when the integration state stops being finite, i.e. the run
    /// has diverged numerically.
    #[error("non-finite field values after iteration {iteration} (t = {sim_time:e})")]
    NonFinite { iteration: usize, sim_time: f64 },
}

impl SolverError {
    pub(crate) fn check_dt(dt: f64) -> Result<(), Self> {
        (dt > 0.0).then_some(()).ok_or(Self::BadDt(dt))
    }
}

/// Returned from snapshot handling, shard merging, and time-series loading.
#[derive(Debug, Error)]
pub enum OutputError {
    /// [`ArchiveError`]
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Returned when per-run snapshot buffers cannot be assembled into a
    /// single time series.
    #[error("shape error: {0}")]
    Shape(#[from] nd::ShapeError),

    /// Returned when a merge finds no shard files to combine.
    #[error("no shard files named '{name}_p*.npz' in {dir}")]
    NoShards { dir: PathBuf, name: String },

    /// Returned when shard files cannot be listed or removed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returned from post-processing diagnostics.
#[derive(Debug, Error)]
pub enum PostError {
    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),

    /// Returned from
    /// [`interface_width`][crate::post::interface_width] when no point of an
    /// indicator field falls below the threshold, e.g. when the two
    /// populations have fully merged.
    #[error("no indicator values below threshold {0}; populations have no resolvable interface")]
    NoInterface(f64),
}

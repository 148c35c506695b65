use thiserror::Error;

/// Precondition and resource failures of the buffer layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0} called before init()")]
    Uninitialized(&'static str),
    #[error("{0} called on an unallocated buffer")]
    Unallocated(&'static str),
    #[error("unequal sizes: {expected:?} and {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("cannot allocate {len} samples for a {nx}x{ny} buffer")]
    Allocation { nx: usize, ny: usize, len: usize },
    #[error("out of bounds index ({ix}, {iy}) in a {nx}x{ny} array")]
    OutOfRange {
        ix: usize,
        iy: usize,
        nx: usize,
        ny: usize,
    },
    #[error("cannot build transform thread pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn check_dims(expected: (usize, usize), found: (usize, usize)) -> Result<()> {
        if expected != found {
            return Err(Error::DimensionMismatch { expected, found });
        }
        Ok(())
    }
}

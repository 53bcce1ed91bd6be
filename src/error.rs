use ndarray::ShapeError;
use std::error::Error as StdError;
use std::fmt;

/// An error rejecting the inputs of an analysis function.
///
/// Errors are raised before any computation takes place, so a failed call
/// never leaves partial results behind. Data that merely falls outside an
/// expected range is reported through a `tracing` warning instead.
#[derive(Debug)]
pub enum Error {
    /// A numeric parameter outside of its allowed (inclusive) range.
    ParamRange {
        name: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
    /// A named option that is not one of the supported choices.
    ParamOption {
        name: &'static str,
        value: String,
        options: Vec<String>,
    },
    /// A spatial bin definition that is malformed or doesn't match the
    /// dimensionality of the position data.
    SpatialBins(String),
    /// Position data that isn't 1d or 2d.
    Position { n_dims: usize },
    /// An array with more dimensions than the function supports.
    Ndim { max: usize, found: usize },
    /// Arrays that must be co-indexed (e.g. with the timestamps) have
    /// different lengths.
    LengthMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// Arrays that must have the same shape don't.
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// Bin edges that are not strictly increasing.
    BinEdges,
    /// Two or more spikes fall into the same sampling period.
    SamplingCollision { index: usize },
    /// A time range requested to be dropped still contains spikes.
    NonEmptyRange { start: f64, stop: f64, count: usize },
    /// An error reshaping an array.
    Shape(ShapeError),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Shape(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParamRange {
                name,
                value,
                low,
                high,
            } => write!(
                f,
                "parameter {} has value {}, which is outside the range [{}, {}]",
                name, value, low, high
            ),
            Error::ParamOption {
                name,
                value,
                options,
            } => write!(
                f,
                "parameter {} has value {:?}, which is not one of {:?}",
                name, value, options
            ),
            Error::SpatialBins(msg) => write!(f, "invalid spatial bins: {}", msg),
            Error::Position { n_dims } => write!(
                f,
                "position data must be 1d or 2d, but has {} dimensions",
                n_dims
            ),
            Error::Ndim { max, found } => write!(
                f,
                "expected an array with at most {} dimensions, found {}",
                max, found
            ),
            Error::LengthMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "{} has length {}, expected length {}",
                name, found, expected
            ),
            Error::ShapeMismatch { expected, found } => write!(
                f,
                "arrays must have the same shape: {:?} vs. {:?}",
                expected, found
            ),
            Error::BinEdges => write!(f, "bin edges must be monotonically increasing"),
            Error::SamplingCollision { index } => write!(
                f,
                "two or more spikes occur within the same sampling period (sample {}); \
                 increase the sampling rate",
                index
            ),
            Error::NonEmptyRange { start, stop, count } => write!(
                f,
                "extracted range [{}, {}] is not empty ({} spikes)",
                start, stop, count
            ),
            Error::Shape(err) => write!(f, "shape error: {}", err),
        }
    }
}

impl From<ShapeError> for Error {
    fn from(err: ShapeError) -> Error {
        Error::Shape(err)
    }
}

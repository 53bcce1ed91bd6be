//! Checks for analysis parameters and data ranges.

use crate::Error;
use ndarray::prelude::*;
use ndarray::Data;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Check a numeric parameter against an inclusive `[low, high]` range.
///
/// # Example
///
/// ```
/// use spiketools::utils::checks::check_param_range;
///
/// assert!(check_param_range(0.5, "alpha", [0., 1.]).is_ok());
/// assert!(check_param_range(1.5, "alpha", [0., 1.]).is_err());
/// ```
pub fn check_param_range(value: f64, name: &'static str, range: [f64; 2]) -> Result<(), Error> {
    let [low, high] = range;
    if value >= low && value <= high {
        Ok(())
    } else {
        Err(Error::ParamRange {
            name,
            value,
            low,
            high,
        })
    }
}

/// Check that a named parameter is one of the supported options.
pub fn check_param_options(value: &str, name: &'static str, options: &[&str]) -> Result<(), Error> {
    if options.contains(&value) {
        Ok(())
    } else {
        Err(Error::ParamOption {
            name,
            value: value.to_owned(),
            options: options.iter().map(|&opt| opt.to_owned()).collect(),
        })
    }
}

/// Check that every element of a list of named parameters is a supported option.
pub fn check_list_options(
    values: &[&str],
    name: &'static str,
    options: &[&str],
) -> Result<(), Error> {
    values
        .iter()
        .try_for_each(|value| check_param_options(value, name, options))
}

/// Layout of the data in an array, relative to its last two axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// A 1d array.
    Vector,
    /// Samples run along the last axis (more columns than rows).
    Row,
    /// Samples run along the second to last axis.
    Column,
}

/// Determine whether an array holds a vector, or rows or columns of samples.
///
/// The longer of the last two axes is taken to be the sample axis.
pub fn check_array_orientation<S, D>(arr: &ArrayBase<S, D>) -> Orientation
where
    S: Data,
    D: Dimension,
{
    let shape = arr.shape();
    match shape.len() {
        0 | 1 => Orientation::Vector,
        n if shape[n - 1] > shape[n - 2] => Orientation::Row,
        _ => Orientation::Column,
    }
}

/// The extent of `values` beyond the outer bin `edges`, if any.
struct RangeViolation {
    data_min: f64,
    data_max: f64,
    edge_min: f64,
    edge_max: f64,
}

impl RangeViolation {
    fn find<S, T>(values: &ArrayBase<S, Ix1>, edges: &ArrayBase<T, Ix1>) -> Option<RangeViolation>
    where
        S: Data<Elem = f64>,
        T: Data<Elem = f64>,
    {
        let (&edge_min, &edge_max) = (edges.first()?, edges.last()?);
        let (data_min, data_max) = values
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });
        if data_min < edge_min || data_max > edge_max {
            Some(RangeViolation {
                data_min,
                data_max,
                edge_min,
                edge_max,
            })
        } else {
            None
        }
    }

    fn warn(&self) {
        warn!(
            data_min = self.data_min,
            data_max = self.data_max,
            edge_min = self.edge_min,
            edge_max = self.edge_max,
            "the data values extend beyond the given bin definition; \
             values outside the range will be dropped"
        );
    }
}

/// Check whether `values` lie within the outer bin `edges`.
///
/// Values beyond the edges are not an error: they are dropped from any
/// binning, so this only emits a warning. NaN values are ignored. Returns
/// `true` iff all values are in range.
pub fn check_bin_range<S, T>(values: &ArrayBase<S, Ix1>, edges: &ArrayBase<T, Ix1>) -> bool
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
{
    match RangeViolation::find(values, edges) {
        Some(violation) => {
            violation.warn();
            false
        }
        None => true,
    }
}

/// Tracks whether an out-of-range warning was already emitted for a batch
/// of related computations (e.g. the trials of one call), so that it's only
/// reported once.
#[derive(Debug, Default)]
pub(crate) struct RangeWarnings {
    enabled: bool,
    emitted: AtomicBool,
}

impl RangeWarnings {
    pub(crate) fn new(enabled: bool) -> RangeWarnings {
        RangeWarnings {
            enabled,
            emitted: AtomicBool::new(false),
        }
    }

    /// Checks `values` against `edges`, warning only if no warning was
    /// emitted yet.
    pub(crate) fn check(&self, values: ArrayView1<'_, f64>, edges: ArrayView1<'_, f64>) {
        if !self.enabled || self.emitted() {
            return;
        }
        if let Some(violation) = RangeViolation::find(&values, &edges) {
            if !self.emitted.swap(true, Ordering::Relaxed) {
                violation.warn();
            }
        }
    }

    pub(crate) fn emitted(&self) -> bool {
        self.emitted.load(Ordering::Relaxed)
    }
}

/// A time bin definition.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeBins {
    /// Bins of a fixed width, in seconds, spanning a time range.
    Width(f64),
    /// Precomputed bin edges, in seconds.
    Edges(Array1<f64>),
}

impl From<f64> for TimeBins {
    fn from(width: f64) -> TimeBins {
        TimeBins::Width(width)
    }
}

impl From<Array1<f64>> for TimeBins {
    fn from(edges: Array1<f64>) -> TimeBins {
        TimeBins::Edges(edges)
    }
}

/// Resolve a time bin definition into bin edges.
///
/// For [`TimeBins::Width`], the edges start at `time_range[0]` and cover
/// `time_range[1]`; without a time range they span from 0 to the last
/// value. A given time range must be finite with `start < stop`. Explicit
/// edges must be strictly increasing. If `check_range`,
/// values outside the edges trigger a warning.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::checks::{check_time_bins, TimeBins};
///
/// let spikes = array![0.2, 0.7, 1.4];
/// let edges = check_time_bins(&TimeBins::Width(0.5), &spikes, Some([0., 1.5]), true)?;
/// assert_eq!(edges, array![0., 0.5, 1.0, 1.5]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn check_time_bins<S>(
    bins: &TimeBins,
    values: &ArrayBase<S, Ix1>,
    time_range: Option<[f64; 2]>,
    check_range: bool,
) -> Result<Array1<f64>, Error>
where
    S: Data<Elem = f64>,
{
    let edges = match bins {
        TimeBins::Width(width) => {
            if !(*width > 0.) {
                return Err(Error::ParamRange {
                    name: "bins",
                    value: *width,
                    low: 0.,
                    high: f64::INFINITY,
                });
            }
            let [start, stop] = match time_range {
                Some([start, stop]) if start < stop && start.is_finite() && stop.is_finite() => {
                    [start, stop]
                }
                Some(_) => return Err(Error::BinEdges),
                None => {
                    let stop = values.iter().cloned().fold(0., f64::max);
                    if !stop.is_finite() {
                        return Err(Error::BinEdges);
                    }
                    [0., stop]
                }
            };
            let n_bins = ((stop - start) / width).ceil().max(1.);
            if !(n_bins < usize::MAX as f64) {
                return Err(Error::ParamRange {
                    name: "bins",
                    value: *width,
                    low: (stop - start) / usize::MAX as f64,
                    high: f64::INFINITY,
                });
            }
            Array1::from_shape_fn(n_bins as usize + 1, |i| start + i as f64 * width)
        }
        TimeBins::Edges(edges) => {
            if edges.len() < 2 || edges.windows(2).into_iter().any(|w| w[1] <= w[0]) {
                return Err(Error::BinEdges);
            }
            edges.clone()
        }
    };
    if check_range && !values.is_empty() {
        check_bin_range(values, &edges);
    }
    Ok(edges)
}

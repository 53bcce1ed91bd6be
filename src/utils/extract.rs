//! Extraction of data segments by time or value.
//!
//! Time ranges are closed: a window `[t_min, t_max]` includes values equal
//! to either bound. Values (positions, speeds, ...) are co-indexed with
//! their timestamps along their last axis, so a 2d position array of shape
//! `[2, n_samples]` is sliced column-wise.
//!
//! Functions that match query times to timestamps expect the timestamps to
//! be sorted in increasing order.

use crate::Error;
use ndarray::prelude::*;
use ndarray::{Data, RemoveAxis};
use std::borrow::Cow;
use std::str::FromStr;

/// Create a mask selecting values within `[min_value, max_value]`.
///
/// A missing bound is unbounded.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::create_mask;
///
/// let data = array![1., 2., 3., 4., 5., 6., 7., 8.];
/// let mask = create_mask(&data, Some(3.), Some(6.));
/// assert_eq!(mask, array![false, false, true, true, true, true, false, false]);
/// ```
pub fn create_mask<S>(
    data: &ArrayBase<S, Ix1>,
    min_value: Option<f64>,
    max_value: Option<f64>,
) -> Array1<bool>
where
    S: Data<Elem = f64>,
{
    let min_value = min_value.unwrap_or(f64::NEG_INFINITY);
    let max_value = max_value.unwrap_or(f64::INFINITY);
    data.mapv(|v| v >= min_value && v <= max_value)
}

fn mask_indices(mask: &Array1<bool>) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(ind, &keep)| if keep { Some(ind) } else { None })
        .collect()
}

/// Select `values` at `indices` along their last axis.
fn take_last_axis<S, D>(values: &ArrayBase<S, D>, indices: &[usize]) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: RemoveAxis,
{
    values.select(Axis(values.ndim() - 1), indices)
}

/// Get the values of `data` within `[min_value, max_value]`, optionally
/// shifted by `-reset`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::get_range;
///
/// let data = array![5., 10., 15., 20., 25., 30.];
/// assert_eq!(get_range(&data, Some(10.), Some(20.), None), array![10., 15., 20.]);
/// assert_eq!(get_range(&data, None, Some(10.), Some(5.)), array![0., 5.]);
/// ```
pub fn get_range<S>(
    data: &ArrayBase<S, Ix1>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    reset: Option<f64>,
) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    let min_value = min_value.unwrap_or(f64::NEG_INFINITY);
    let max_value = max_value.unwrap_or(f64::INFINITY);
    let reset = reset.unwrap_or(0.);
    data.iter()
        .filter(|&&v| v >= min_value && v <= max_value)
        .map(|&v| v - reset)
        .collect()
}

/// Select `data` values within `[min_value, max_value]`, together with
/// their timestamps. Timestamps are optionally shifted by `-reset`.
pub fn get_value_range<S, T>(
    timestamps: &ArrayBase<S, Ix1>,
    data: &ArrayBase<T, Ix1>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    reset: Option<f64>,
) -> (Array1<f64>, Array1<f64>)
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
{
    let inds = mask_indices(&create_mask(data, min_value, max_value));
    let reset = reset.unwrap_or(0.);
    let times = timestamps.select(Axis(0), &inds).mapv_into(|t| t - reset);
    (times, data.select(Axis(0), &inds))
}

fn as_slice<S>(timestamps: &ArrayBase<S, Ix1>) -> Cow<'_, [f64]>
where
    S: Data<Elem = f64>,
{
    match timestamps.as_slice() {
        Some(slice) => Cow::Borrowed(slice),
        None => Cow::Owned(timestamps.to_vec()),
    }
}

/// Index of the timestamp nearest to `timepoint` in sorted `timestamps`,
/// preferring the earliest index on ties.
fn nearest_index(timestamps: &[f64], timepoint: f64, threshold: Option<f64>) -> Option<usize> {
    if timestamps.is_empty() {
        return None;
    }
    let after = timestamps.partition_point(|&t| t < timepoint);
    let ind = if after == timestamps.len() {
        after - 1
    } else if after > 0 && timepoint - timestamps[after - 1] <= timestamps[after] - timepoint {
        after - 1
    } else {
        after
    };
    // Move to the first of any repeated timestamps.
    let ind = timestamps.partition_point(|&t| t < timestamps[ind]).min(ind);
    match threshold {
        Some(threshold) if (timestamps[ind] - timepoint).abs() > threshold => None,
        _ => Some(ind),
    }
}

/// Get the index of the timestamp closest to `timepoint`.
///
/// Returns `None` if `timestamps` is empty or the closest timestamp is
/// further than `threshold` from `timepoint`. A threshold of `Some(0.)`
/// only accepts exact matches; use `None` for no threshold.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::get_ind_by_time;
///
/// let timestamps = array![0.5, 1., 1.5, 2., 2.5, 3.];
/// assert_eq!(get_ind_by_time(&timestamps, 2.5, None), Some(4));
/// assert_eq!(get_ind_by_time(&timestamps, 4., Some(0.5)), None);
/// ```
pub fn get_ind_by_time<S>(
    timestamps: &ArrayBase<S, Ix1>,
    timepoint: f64,
    threshold: Option<f64>,
) -> Option<usize>
where
    S: Data<Elem = f64>,
{
    nearest_index(&as_slice(timestamps), timepoint, threshold)
}

/// Get the closest timestamp index for each of `timepoints`.
///
/// Entries are `None` where no timestamp is within `threshold`.
pub fn get_inds_by_times<S, T>(
    timestamps: &ArrayBase<S, Ix1>,
    timepoints: &ArrayBase<T, Ix1>,
    threshold: Option<f64>,
) -> Vec<Option<usize>>
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
{
    let timestamps = as_slice(timestamps);
    timepoints
        .iter()
        .map(|&time| nearest_index(&timestamps, time, threshold))
        .collect()
}

/// Get the value(s) at the timestamp closest to `timepoint`.
///
/// For 1d `values` this is a 0d array; for 2d `values` (e.g. x/y
/// positions) it holds one value per row.
///
/// **Panics** if the last axis of `values` is shorter than `timestamps`.
pub fn get_value_by_time<S, T, D>(
    timestamps: &ArrayBase<S, Ix1>,
    values: &ArrayBase<T, D>,
    timepoint: f64,
    threshold: Option<f64>,
) -> Option<Array<f64, D::Smaller>>
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
    D: RemoveAxis,
{
    let axis = Axis(values.ndim() - 1);
    get_ind_by_time(timestamps, timepoint, threshold)
        .map(|ind| values.index_axis(axis, ind).to_owned())
}

/// Get the values at the timestamps closest to each of `timepoints`.
///
/// Timepoints without a timestamp within `threshold` are dropped, so the
/// last axis of the output may be shorter than `timepoints`. As with
/// [`get_ind_by_time`], `Some(0.)` keeps exact matches only.
///
/// **Panics** if the last axis of `values` is shorter than `timestamps`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::get_values_by_times;
///
/// let timestamps = array![0.5, 1., 1.5, 2., 2.5, 3.];
/// let values = array![1., 2., 3., 4., 5., 6.];
/// let out = get_values_by_times(&timestamps, &values, &array![1., 2., 3.], None);
/// assert_eq!(out, array![2., 4., 6.]);
/// ```
pub fn get_values_by_times<S, T, U, D>(
    timestamps: &ArrayBase<S, Ix1>,
    values: &ArrayBase<T, D>,
    timepoints: &ArrayBase<U, Ix1>,
    threshold: Option<f64>,
) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
    U: Data<Elem = f64>,
    D: RemoveAxis,
{
    let inds: Vec<usize> = get_inds_by_times(timestamps, timepoints, threshold)
        .into_iter()
        .flatten()
        .collect();
    take_last_axis(values, &inds)
}

/// Extract the timestamps and values within `[t_min, t_max]`.
///
/// **Panics** if the last axis of `values` is shorter than `timestamps`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::get_values_by_time_range;
///
/// let timestamps = array![1., 2., 3., 4., 5., 6., 7.];
/// let values = array![0.5, 1., 1.5, 2., 2.5, 3., 3.5];
/// let (times, out) = get_values_by_time_range(&timestamps, &values, 2., 6.);
/// assert_eq!(times, array![2., 3., 4., 5., 6.]);
/// assert_eq!(out, array![1., 1.5, 2., 2.5, 3.]);
/// ```
pub fn get_values_by_time_range<S, T, D>(
    timestamps: &ArrayBase<S, Ix1>,
    values: &ArrayBase<T, D>,
    t_min: f64,
    t_max: f64,
) -> (Array1<f64>, Array<f64, D>)
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
    D: RemoveAxis,
{
    let inds = mask_indices(&create_mask(timestamps, Some(t_min), Some(t_max)));
    (
        timestamps.select(Axis(0), &inds),
        take_last_axis(values, &inds),
    )
}

/// Keep the spikes that are strictly closer than `threshold` to at least
/// one timestamp.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::threshold_spikes_by_times;
///
/// let spikes = array![0.76, 1.12, 1.72, 2.05, 2.32, 2.92, 3.11, 3.63, 3.91];
/// let timestamps = array![1.0, 1.25, 1.5, 1.75, 2.0, 3.5, 3.75, 4.0];
/// let out = threshold_spikes_by_times(&spikes, &timestamps, 0.25);
/// assert_eq!(out, array![0.76, 1.12, 1.72, 2.05, 3.63, 3.91]);
/// ```
pub fn threshold_spikes_by_times<S, T>(
    spikes: &ArrayBase<S, Ix1>,
    timestamps: &ArrayBase<T, Ix1>,
    threshold: f64,
) -> Array1<f64>
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
{
    let slice = as_slice(timestamps);
    spikes
        .iter()
        .filter(|&&spike| {
            nearest_index(&slice, spike, None)
                .map_or(false, |ind| (slice[ind] - spike).abs() < threshold)
        })
        .cloned()
        .collect()
}

/// How a data value is compared against a threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// Keep values strictly greater than the threshold.
    Greater,
    /// Keep values strictly less than the threshold.
    Less,
}

impl Comparison {
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Greater => value > threshold,
            Comparison::Less => value < threshold,
        }
    }
}

impl Default for Comparison {
    fn default() -> Comparison {
        Comparison::Greater
    }
}

impl FromStr for Comparison {
    type Err = Error;

    fn from_str(s: &str) -> Result<Comparison, Error> {
        match s {
            "greater" => Ok(Comparison::Greater),
            "less" => Ok(Comparison::Less),
            other => Err(Error::ParamOption {
                name: "data_comparison",
                value: other.to_owned(),
                options: vec!["greater".to_owned(), "less".to_owned()],
            }),
        }
    }
}

/// Keep the spikes whose associated data value (e.g. running speed at the
/// closest timestamp) passes `comparison` against `data_threshold`.
///
/// Spikes with no timestamp within `time_threshold` are dropped.
///
/// **Panics** if `values` is shorter than `timestamps`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::{threshold_spikes_by_values, Comparison};
///
/// let spikes = array![0.1, 0.3, 0.4, 0.5, 1., 1.2, 1.6, 1.8];
/// let timestamps = array![0.5, 1., 1.5, 2., 2.5, 3., 3.5, 4.];
/// let values = array![1., 2., 3., 4., 5., 6., 7., 8.];
/// let greater = Comparison::Greater;
/// let out = threshold_spikes_by_values(&spikes, &timestamps, &values, 2., None, greater);
/// assert_eq!(out, array![1.6, 1.8]);
/// ```
pub fn threshold_spikes_by_values<S, T, U>(
    spikes: &ArrayBase<S, Ix1>,
    timestamps: &ArrayBase<T, Ix1>,
    values: &ArrayBase<U, Ix1>,
    data_threshold: f64,
    time_threshold: Option<f64>,
    comparison: Comparison,
) -> Array1<f64>
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
    U: Data<Elem = f64>,
{
    get_inds_by_times(timestamps, spikes, time_threshold)
        .into_iter()
        .zip(spikes.iter())
        .filter_map(|(ind, &spike)| match ind {
            Some(ind) if comparison.compare(values[ind], data_threshold) => Some(spike),
            _ => None,
        })
        .collect()
}

/// Drop time ranges from spike times, shifting later spikes back to close
/// each gap.
///
/// Each range is `[start, stop]` in the original time base; ranges must be
/// given in increasing order. If `check_empty`, a range that contains any
/// spikes is an error.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::drop_range;
///
/// let spikes = array![0.24, 0.73, 1.22, 1.65, 10.15, 10.95, 11.52, 11.84];
/// let out = drop_range(&spikes, &[[2., 10.]], true)?;
/// let expected = array![0.24, 0.73, 1.22, 1.65, 2.15, 2.95, 3.52, 3.84];
/// assert!((&out - &expected).iter().all(|diff| diff.abs() < 1e-12));
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn drop_range<S>(
    spikes: &ArrayBase<S, Ix1>,
    time_ranges: &[[f64; 2]],
    check_empty: bool,
) -> Result<Array1<f64>, Error>
where
    S: Data<Elem = f64>,
{
    let mut out = spikes.to_owned();
    let mut total_len = 0.;
    for &[start, stop] in time_ranges {
        let (start, stop) = (start - total_len, stop - total_len);
        if check_empty {
            let count = get_range(&out, Some(start), Some(stop), None).len();
            if count > 0 {
                return Err(Error::NonEmptyRange { start, stop, count });
            }
        }
        let range_len = stop - start;
        out = out
            .iter()
            .filter_map(|&t| {
                if t <= start {
                    Some(t)
                } else if t >= stop {
                    Some(t - range_len)
                } else {
                    None
                }
            })
            .collect();
        total_len += range_len;
    }
    Ok(out)
}

/// Reinstate dropped time ranges into spike times, the inverse of
/// [`drop_range`].
///
/// Works on 1d spike times, or on 2d arrays with one set of spike times
/// per row (e.g. shuffled surrogates).
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::utils::extract::reinstate_range;
///
/// let spikes = array![0.24, 0.73, 1.22, 1.65, 2.15, 2.95, 3.52, 3.84];
/// let out = reinstate_range(&spikes, &[[2., 10.]])?;
/// let expected = array![0.24, 0.73, 1.22, 1.65, 10.15, 10.95, 11.52, 11.84];
/// assert!((&out - &expected).iter().all(|diff| diff.abs() < 1e-12));
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn reinstate_range<S, D>(
    spikes: &ArrayBase<S, D>,
    time_ranges: &[[f64; 2]],
) -> Result<Array<f64, D>, Error>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if spikes.ndim() > 2 {
        return Err(Error::Ndim {
            max: 2,
            found: spikes.ndim(),
        });
    }
    let mut out = spikes.to_owned();
    for &[start, stop] in time_ranges {
        let range_len = stop - start;
        out.mapv_inplace(|t| if t > start { t + range_len } else { t });
    }
    Ok(out)
}

//! Helpers for spatial computations.

use super::checks::{check_position, IntoSpatialBins};
use super::PositionData;
use crate::Error;
use ndarray::prelude::*;
use ndarray::Data;

/// Compute the total number of spatial bins.
///
/// # Example
///
/// ```
/// use spiketools::spatial::utils::compute_nbins;
///
/// assert_eq!(compute_nbins(5)?, 5);
/// assert_eq!(compute_nbins([5, 4])?, 20);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn compute_nbins<B: IntoSpatialBins>(bins: B) -> Result<usize, Error> {
    Ok(bins.into_spatial_bins()?.n_bins())
}

/// Compute the `[min, max]` range of each position dimension.
///
/// NaN values are ignored. A dimension without any values has range
/// `[NaN, NaN]`.
pub fn compute_pos_ranges<P>(position: &P) -> Result<Vec<[f64; 2]>, Error>
where
    P: PositionData + ?Sized,
{
    Ok(check_position(position)?
        .outer_iter()
        .map(|values| nan_range(values.iter().copied()))
        .collect())
}

pub(crate) fn nan_range(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let [min, max] = values
        .filter(|v| !v.is_nan())
        .fold([f64::INFINITY, f64::NEG_INFINITY], |[min, max], v| {
            [min.min(v), max.max(v)]
        });
    if min > max {
        [f64::NAN, f64::NAN]
    } else {
        [min, max]
    }
}

/// Compute the duration of each position sample.
///
/// The duration of a sample is the time until the next sample. The last
/// sample has no successor and gets a duration of 0.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::utils::compute_sample_durations;
///
/// let timestamps = array![0., 0.5, 1.5, 1.75];
/// assert_eq!(compute_sample_durations(&timestamps), array![0.5, 1., 0.25, 0.]);
/// ```
pub fn compute_sample_durations<S>(timestamps: &ArrayBase<S, Ix1>) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    let n_samples = timestamps.len();
    Array1::from_shape_fn(n_samples, |ind| {
        if ind + 1 < n_samples {
            timestamps[ind + 1] - timestamps[ind]
        } else {
            0.
        }
    })
}

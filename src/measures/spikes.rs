//! Measures computed directly from spike times or spike trains.

use ndarray::prelude::*;
use ndarray::Data;

/// Compute inter-spike intervals.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::measures::spikes::compute_isis;
///
/// let spikes = array![0.5, 0.75, 1.5, 2.];
/// assert_eq!(compute_isis(&spikes), array![0.25, 0.75, 0.5]);
/// ```
pub fn compute_isis<S>(spikes: &ArrayBase<S, Ix1>) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    spikes.windows(2).into_iter().map(|w| w[1] - w[0]).collect()
}

/// Compute the firing rate, in spikes per second.
///
/// The rate is computed over `time_range` if given, otherwise over the span
/// from the first to the last spike. Returns 0 without spikes, and NaN if
/// the time range has no duration.
pub fn compute_firing_rate<S>(spikes: &ArrayBase<S, Ix1>, time_range: Option<[f64; 2]>) -> f64
where
    S: Data<Elem = f64>,
{
    let [start, stop] = match (time_range, spikes.first(), spikes.last()) {
        (Some(range), _, _) => range,
        (None, Some(&first), Some(&last)) => [first, last],
        (None, _, _) => return 0.,
    };
    if spikes.is_empty() {
        0.
    } else if stop > start {
        spikes.len() as f64 / (stop - start)
    } else {
        f64::NAN
    }
}

/// Compute the coefficient of variation of inter-spike intervals.
///
/// NaN for fewer than one interval.
pub fn compute_cv<S>(isis: &ArrayBase<S, Ix1>) -> f64
where
    S: Data<Elem = f64>,
{
    match isis.mean() {
        Some(mean) => isis.std(0.) / mean,
        None => f64::NAN,
    }
}

/// Compute the Fano factor (variance over mean) of a binned spike train.
pub fn compute_fano_factor<S>(spike_train: &ArrayBase<S, Ix1>) -> f64
where
    S: Data<Elem = f64>,
{
    match spike_train.mean() {
        Some(mean) => spike_train.var(0.) / mean,
        None => f64::NAN,
    }
}

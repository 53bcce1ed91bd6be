//! Conversions between spike representations.

use crate::utils::bin_index;
use crate::utils::checks::{check_param_range, check_time_bins, TimeBins};
use crate::Error;
use ndarray::prelude::*;
use ndarray::Data;
use num_traits::Zero;

fn check_sampling_rate(fs: f64) -> Result<(), Error> {
    if fs > 0. && fs.is_finite() {
        Ok(())
    } else {
        Err(Error::ParamRange {
            name: "fs",
            value: fs,
            low: 0.,
            high: f64::INFINITY,
        })
    }
}

/// Convert spike times into a binary spike train.
///
/// Each spike at time `t` sets sample `floor(t * fs)`. The train has
/// `length` samples, or just enough to hold the last spike.
///
/// # Errors
///
/// Fails if `fs` is not positive, if a spike time is negative or not
/// finite, if two spikes fall into the same sample, or if `length` is too
/// short.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::measures::conversions::convert_times_to_train;
///
/// let train = convert_times_to_train(&array![0.0025, 0.0041], 1000., None)?;
/// assert_eq!(train, array![0u8, 0, 1, 0, 1]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn convert_times_to_train<S>(
    spikes: &ArrayBase<S, Ix1>,
    fs: f64,
    length: Option<usize>,
) -> Result<Array1<u8>, Error>
where
    S: Data<Elem = f64>,
{
    check_sampling_rate(fs)?;
    let mut inds = Vec::with_capacity(spikes.len());
    for &spike in spikes {
        check_param_range(spike, "spikes", [0., f64::INFINITY])?;
        if !spike.is_finite() {
            return Err(Error::ParamRange {
                name: "spikes",
                value: spike,
                low: 0.,
                high: f64::INFINITY,
            });
        }
        inds.push((spike * fs).floor() as usize);
    }

    let mut sorted = inds.clone();
    sorted.sort_unstable();
    if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(Error::SamplingCollision { index: w[0] });
    }

    let needed = match sorted.last() {
        Some(&last) => last.checked_add(1).ok_or(Error::ParamRange {
            name: "spikes",
            value: last as f64 / fs,
            low: 0.,
            high: usize::MAX as f64 / fs,
        })?,
        None => 0,
    };
    let length = match length {
        Some(length) if length < needed => {
            return Err(Error::ParamRange {
                name: "length",
                value: length as f64,
                low: needed as f64,
                high: f64::INFINITY,
            })
        }
        Some(length) => length,
        None => needed,
    };

    let mut train = Array1::zeros(length);
    for ind in inds {
        train[ind] = 1;
    }
    Ok(train)
}

/// Convert a spike train into spike times.
///
/// Every non-zero sample `i` gives a spike at `(i + 1) / fs`, i.e. at the
/// end of its sampling period.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::measures::conversions::convert_train_to_times;
///
/// let spikes = convert_train_to_times(&array![0, 1, 0, 0, 1], 1000.)?;
/// assert_eq!(spikes, array![0.002, 0.005]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn convert_train_to_times<A, S>(
    train: &ArrayBase<S, Ix1>,
    fs: f64,
) -> Result<Array1<f64>, Error>
where
    A: Zero,
    S: Data<Elem = A>,
{
    check_sampling_rate(fs)?;
    Ok(train
        .iter()
        .enumerate()
        .filter(|(_, sample)| !sample.is_zero())
        .map(|(ind, _)| (ind + 1) as f64 / fs)
        .collect())
}

/// Convert inter-spike intervals into spike times.
///
/// Spike times are the cumulative sum of the intervals plus `offset`. If
/// `add_offset`, `offset` itself is prepended as the first spike, so that
/// the intervals of `spikes` with `offset = spikes[0]` reproduce `spikes`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::measures::conversions::convert_isis_to_times;
///
/// let isis = array![0.25, 0.5, 0.25];
/// assert_eq!(convert_isis_to_times(&isis, 1., true), array![1., 1.25, 1.75, 2.]);
/// assert_eq!(convert_isis_to_times(&isis, 0., false), array![0.25, 0.75, 1.]);
/// ```
pub fn convert_isis_to_times<S>(
    isis: &ArrayBase<S, Ix1>,
    offset: f64,
    add_offset: bool,
) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    let mut spikes = Vec::with_capacity(isis.len() + 1);
    if add_offset {
        spikes.push(offset);
    }
    let mut time = offset;
    for &isi in isis {
        time += isi;
        spikes.push(time);
    }
    Array1::from(spikes)
}

/// Convert spike times into firing rates per time bin.
///
/// `bins` is resolved with [`check_time_bins`]. Each rate is the spike
/// count in the bin divided by the bin width. If `smooth` is given, the
/// rates are smoothed with a Gaussian kernel of that standard deviation,
/// in bins.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::measures::conversions::convert_times_to_rates;
/// use spiketools::utils::checks::TimeBins;
///
/// let spikes = array![0.25, 0.5, 0.75, 1.25, 1.75, 2.25, 2.5, 2.75];
/// let bins = TimeBins::Edges(array![0., 1., 1.5, 2., 3.]);
/// let rates = convert_times_to_rates(&spikes, &bins, None, None)?;
/// assert_eq!(rates, array![3., 2., 2., 3.]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn convert_times_to_rates<S>(
    spikes: &ArrayBase<S, Ix1>,
    bins: &TimeBins,
    time_range: Option<[f64; 2]>,
    smooth: Option<f64>,
) -> Result<Array1<f64>, Error>
where
    S: Data<Elem = f64>,
{
    let edges = check_time_bins(bins, spikes, time_range, true)?;
    let edges = edges.to_vec();
    let mut counts = Array1::<f64>::zeros(edges.len() - 1);
    for &spike in spikes {
        if let Some(ind) = bin_index(&edges, spike) {
            counts[ind] += 1.;
        }
    }
    let widths: Array1<f64> = edges.windows(2).map(|w| w[1] - w[0]).collect();
    let rates = counts / widths;

    match smooth {
        Some(sigma) => {
            if !(sigma > 0.) {
                return Err(Error::ParamRange {
                    name: "smooth",
                    value: sigma,
                    low: 0.,
                    high: f64::INFINITY,
                });
            }
            Ok(gaussian_filter1d(&rates, sigma))
        }
        None => Ok(rates),
    }
}

/// Gaussian smoothing with a kernel truncated at 4 standard deviations,
/// reflecting the data at its boundaries.
fn gaussian_filter1d(data: &Array1<f64>, sigma: f64) -> Array1<f64> {
    let n = data.len() as isize;
    if n == 0 {
        return data.clone();
    }
    let radius = (4. * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|weight| *weight /= total);

    let reflect = |ind: isize| -> usize {
        let period = 2 * n;
        let ind = ind.rem_euclid(period);
        (if ind >= n { period - 1 - ind } else { ind }) as usize
    };
    Array1::from_shape_fn(data.len(), |i| {
        kernel
            .iter()
            .zip(-radius..=radius)
            .map(|(w, offset)| w * data[reflect(i as isize + offset)])
            .sum()
    })
}

//! Spatially binned spiking activity ("place bins").

use super::checks::{check_bins_for_dims, check_position, IntoSpatialBins, SpatialBins};
use super::occupancy::{
    check_co_indexed, compute_bin_counts_pos, occupancy_with_warnings, OccupancyOptions,
};
use super::PositionData;
use crate::utils::checks::RangeWarnings;
use crate::utils::extract::{
    get_range, get_values_by_time_range, get_values_by_times, threshold_spikes_by_values,
    Comparison,
};
use crate::Error;
use ndarray::prelude::*;
use ndarray::Data;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Options for selecting the data that contributes to spatial bins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaceBinOptions {
    /// Edges of the area to bin, as `[x_min, x_max]` and optionally
    /// `[y_min, y_max]`. Defaults to the range of the data.
    pub area_range: Option<Vec<[f64; 2]>>,
    /// With speed data, only spikes and position samples with a speed
    /// above this threshold are used.
    pub speed_threshold: Option<f64>,
    /// The maximum time between a spike and its matched position sample,
    /// and the maximum duration of a position sample.
    pub time_threshold: Option<f64>,
}

impl PlaceBinOptions {
    pub fn area_range(mut self, area_range: Vec<[f64; 2]>) -> Self {
        self.area_range = Some(area_range);
        self
    }

    pub fn speed_threshold(mut self, speed_threshold: f64) -> Self {
        self.speed_threshold = Some(speed_threshold);
        self
    }

    pub fn time_threshold(mut self, time_threshold: f64) -> Self {
        self.time_threshold = Some(time_threshold);
        self
    }
}

/// Options for [`compute_trial_place_bins`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrialOptions {
    pub place: PlaceBinOptions,
    /// Normalize each trial by its own occupancy. Defaults to `true`.
    pub normalize: bool,
    /// Flatten the spatial bins of each trial, giving `[n_trials, n_bins]`.
    pub flatten: bool,
    /// Options for the per-trial occupancy.
    pub occupancy: OccupancyOptions,
}

impl Default for TrialOptions {
    fn default() -> TrialOptions {
        TrialOptions {
            place: PlaceBinOptions::default(),
            normalize: true,
            flatten: false,
            occupancy: OccupancyOptions::default(),
        }
    }
}

impl TrialOptions {
    pub fn place(mut self, place: PlaceBinOptions) -> Self {
        self.place = place;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn occupancy(mut self, occupancy: OccupancyOptions) -> Self {
        self.occupancy = occupancy;
        self
    }
}

/// Compute the spatially binned spiking activity.
///
/// If `speed` and a speed threshold are given, spikes at a speed not above
/// the threshold are dropped. Each remaining spike is matched to the
/// position sample with the nearest timestamp, dropping spikes further than
/// the time threshold from any sample. The matched positions are then
/// counted per spatial bin, and normalized by `occupancy` if given (see
/// [`normalize_bin_counts`](super::occupancy::normalize_bin_counts)).
///
/// The output has shape `[n_x]` or `[n_y, n_x]` regardless of the spikes.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::place::{compute_place_bins, PlaceBinOptions};
///
/// let spikes = array![0.2, 0.25, 0.3, 0.38, 0.41, 0.5, 0.59, 0.77, 0.95, 0.96];
/// let position = array![
///     [0.1, 0.3, 0.35, 0.36, 0.37, 0.4, 0.45, 0.46, 0.55, 0.7],
///     [1.0, 1.5, 1.55, 1.65, 1.66, 2.0, 3.0, 4.0, 5.5, 7.0],
/// ];
/// let timestamps = array![0.01, 0.03, 0.2, 0.25, 0.45, 0.46, 0.47, 0.49, 0.5, 0.65];
/// let place_bins = compute_place_bins(
///     &spikes,
///     &position,
///     &timestamps,
///     [3, 2],
///     None,
///     &PlaceBinOptions::default(),
///     None,
/// )?;
/// assert_eq!(place_bins, array![[5., 0., 0.], [0., 1., 4.]].into_dyn());
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn compute_place_bins<S, P, T, B>(
    spikes: &ArrayBase<S, Ix1>,
    position: &P,
    timestamps: &ArrayBase<T, Ix1>,
    bins: B,
    speed: Option<ArrayView1<'_, f64>>,
    options: &PlaceBinOptions,
    occupancy: Option<&ArrayD<f64>>,
) -> Result<ArrayD<f64>, Error>
where
    S: Data<Elem = f64>,
    P: PositionData + ?Sized,
    T: Data<Elem = f64>,
    B: IntoSpatialBins,
{
    let position = check_position(position)?;
    let bins = bins.into_spatial_bins()?;
    check_bins_for_dims(bins, position.nrows())?;
    place_bins(
        spikes.view(),
        position,
        timestamps.view(),
        bins,
        speed,
        options,
        occupancy,
    )
}

fn place_bins(
    spikes: ArrayView1<'_, f64>,
    position: ArrayView2<'_, f64>,
    timestamps: ArrayView1<'_, f64>,
    bins: SpatialBins,
    speed: Option<ArrayView1<'_, f64>>,
    options: &PlaceBinOptions,
    occupancy: Option<&ArrayD<f64>>,
) -> Result<ArrayD<f64>, Error> {
    check_co_indexed("position", position.ncols(), timestamps)?;
    let spikes = match (speed, options.speed_threshold) {
        (Some(speed), Some(threshold)) => {
            check_co_indexed("speed", speed.len(), timestamps)?;
            threshold_spikes_by_values(
                &spikes,
                &timestamps,
                &speed,
                threshold,
                options.time_threshold,
                Comparison::Greater,
            )
        }
        _ => spikes.to_owned(),
    };
    let spike_positions =
        get_values_by_times(&timestamps, &position, &spikes, options.time_threshold);
    compute_bin_counts_pos(
        &spike_positions,
        bins,
        options.area_range.as_deref(),
        occupancy,
    )
}

/// Compute the spatially binned spiking activity, across trials.
///
/// Each trial `i` covers the closed window `[start_times[i], stop_times[i]]`.
/// Per trial, the spikes, timestamps, positions and speed are restricted to
/// the window and passed to [`compute_place_bins`]. With
/// `options.normalize`, each trial is normalized by its own occupancy,
/// computed with `options.occupancy` over the same window.
///
/// The output has shape `[n_trials, n_x]` or `[n_trials, n_y, n_x]`, or
/// `[n_trials, n_x * n_y]` with `options.flatten`. Trials without spikes
/// give rows of zeros. An out-of-range warning is emitted at most once per
/// call.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::place::{compute_trial_place_bins, TrialOptions};
///
/// let spikes = array![0.2, 0.25, 0.3, 0.38, 0.41, 0.5, 0.59, 0.77, 0.95];
/// let position = array![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];
/// let timestamps = array![0.1, 0.2, 0.25, 0.4, 0.45, 0.46, 0.6, 0.7, 1.0];
/// let place_bins = compute_trial_place_bins(
///     &spikes,
///     &position,
///     &timestamps,
///     2,
///     &array![0., 0.4],
///     &array![0.3, 1.],
///     None,
///     &TrialOptions::default(),
/// )?;
/// let expected = array![[10., 40.], [10., 7.5]].into_dyn();
/// assert!((&place_bins - &expected).iter().all(|diff| diff.abs() < 1e-9));
/// # Ok::<_, spiketools::Error>(())
/// ```
#[allow(clippy::too_many_arguments)]
#[instrument(level = "debug", skip_all, fields(n_trials = start_times.len()))]
pub fn compute_trial_place_bins<S, P, T, B, U, V>(
    spikes: &ArrayBase<S, Ix1>,
    position: &P,
    timestamps: &ArrayBase<T, Ix1>,
    bins: B,
    start_times: &ArrayBase<U, Ix1>,
    stop_times: &ArrayBase<V, Ix1>,
    speed: Option<ArrayView1<'_, f64>>,
    options: &TrialOptions,
) -> Result<ArrayD<f64>, Error>
where
    S: Data<Elem = f64>,
    P: PositionData + ?Sized,
    T: Data<Elem = f64>,
    B: IntoSpatialBins,
    U: Data<Elem = f64>,
    V: Data<Elem = f64>,
{
    let position = check_position(position)?;
    let bins = bins.into_spatial_bins()?;
    check_bins_for_dims(bins, position.nrows())?;
    if stop_times.len() != start_times.len() {
        return Err(Error::LengthMismatch {
            name: "stop_times",
            expected: start_times.len(),
            found: stop_times.len(),
        });
    }
    let (spikes, timestamps) = (spikes.view(), timestamps.view());
    check_co_indexed("position", position.ncols(), timestamps)?;
    if let Some(speed) = speed {
        check_co_indexed("speed", speed.len(), timestamps)?;
    }

    let n_trials = start_times.len();
    let mut shape = vec![n_trials];
    shape.extend(bins.shape());
    let mut place_bins_trial = ArrayD::<f64>::zeros(shape);

    let warnings = RangeWarnings::new(options.occupancy.check_range);
    let trial = |ind: usize, start: f64, stop: f64| -> Result<ArrayD<f64>, Error> {
        let t_spikes = get_range(&spikes, Some(start), Some(stop), None);
        let (t_times, t_pos) = get_values_by_time_range(&timestamps, &position, start, stop);
        let t_speed = speed.map(|s| get_values_by_time_range(&timestamps, &s, start, stop).1);
        debug!(
            trial = ind,
            start,
            stop,
            n_spikes = t_spikes.len(),
            n_samples = t_times.len(),
            "computing trial place bins"
        );

        let t_occ = if options.normalize {
            Some(occupancy_with_warnings(
                t_pos.view(),
                t_times.view(),
                bins,
                t_speed.as_ref().map(|speed| speed.view()),
                &options.place,
                &options.occupancy,
                &warnings,
            )?)
        } else {
            None
        };
        place_bins(
            t_spikes.view(),
            t_pos.view(),
            t_times.view(),
            bins,
            t_speed.as_ref().map(|speed| speed.view()),
            &options.place,
            t_occ.as_ref(),
        )
    };

    let windows: Vec<(usize, f64, f64)> = start_times
        .iter()
        .zip(stop_times)
        .enumerate()
        .map(|(ind, (&start, &stop))| (ind, start, stop))
        .collect();
    #[cfg(feature = "rayon")]
    let rows = windows
        .par_iter()
        .map(|&(ind, start, stop)| trial(ind, start, stop))
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let rows = windows
        .iter()
        .map(|&(ind, start, stop)| trial(ind, start, stop))
        .collect::<Result<Vec<_>, _>>()?;

    for (mut out, row) in place_bins_trial.outer_iter_mut().zip(&rows) {
        out.assign(row);
    }

    if options.flatten {
        Ok(place_bins_trial
            .into_shape((n_trials, bins.n_bins()))?
            .into_dyn())
    } else {
        Ok(place_bins_trial)
    }
}

//! Place bins, per session and per trial.

use crate::assert_all_close;
use ndarray::prelude::*;
use ndarray::{array, s};
use spiketools::spatial::occupancy::compute_bin_counts_pos;
use spiketools::{
    compute_occupancy, compute_place_bins, compute_trial_place_bins, OccupancyOptions,
    PlaceBinOptions, TrialOptions,
};

fn data_2d() -> (Array1<f64>, Array2<f64>, Array1<f64>) {
    (
        array![0.2, 0.25, 0.3, 0.38, 0.41, 0.5, 0.59, 0.77, 0.95, 0.96],
        array![
            [0.1, 0.3, 0.35, 0.36, 0.37, 0.4, 0.45, 0.46, 0.55, 0.7],
            [1.0, 1.5, 1.55, 1.65, 1.66, 2.0, 3.0, 4.0, 5.5, 7.0],
        ],
        array![0.01, 0.03, 0.2, 0.25, 0.45, 0.46, 0.47, 0.49, 0.5, 0.65],
    )
}

fn data_1d() -> (Array1<f64>, Array1<f64>, Array1<f64>) {
    (
        array![0.2, 0.25, 0.3, 0.38, 0.41, 0.5, 0.59, 0.77, 0.95],
        array![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0],
        array![0.1, 0.2, 0.25, 0.4, 0.45, 0.46, 0.6, 0.7, 1.0],
    )
}

#[test]
fn place_bins_2d() {
    let (spikes, position, timestamps) = data_2d();
    let place_bins = compute_place_bins(
        &spikes,
        &position,
        &timestamps,
        [3, 2],
        None,
        &PlaceBinOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(place_bins, array![[5., 0., 0.], [0., 1., 4.]].into_dyn());
    assert_eq!(place_bins.sum(), spikes.len() as f64);
}

#[test]
fn place_bins_shape_depends_on_bins_only() {
    let (spikes, position, timestamps) = data_2d();
    let options = PlaceBinOptions::default().area_range(vec![[0., 1.], [0., 8.]]);
    for n_spikes in 0..spikes.len() {
        let some_spikes = spikes.slice(s![..n_spikes]);
        let place_bins = compute_place_bins(
            &some_spikes,
            &position,
            &timestamps,
            [5, 4],
            None,
            &options,
            None,
        )
        .unwrap();
        assert_eq!(place_bins.shape(), &[4, 5]);
        assert_eq!(place_bins.sum(), n_spikes as f64);
    }
}

#[test]
fn place_bins_do_not_modify_inputs() {
    let (spikes, position, timestamps) = data_2d();
    let (spikes_before, position_before) = (spikes.clone(), position.clone());
    let first = compute_place_bins(
        &spikes,
        &position,
        &timestamps,
        [3, 2],
        None,
        &PlaceBinOptions::default(),
        None,
    )
    .unwrap();
    let second = compute_place_bins(
        &spikes,
        &position,
        &timestamps,
        [3, 2],
        None,
        &PlaceBinOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(first, second);
    assert_eq!(spikes, spikes_before);
    assert_eq!(position, position_before);
}

#[test]
fn place_bins_normalized_by_occupancy() {
    let position = array![0.1, 0.2, 0.8, 0.9, 0.9];
    let timestamps = array![0., 1., 2., 6., 7.];
    let spikes = array![0.1, 1.9, 2.1, 6.2];
    let place_options = PlaceBinOptions::default().area_range(vec![[0., 1.]]);
    let occupancy = compute_occupancy(
        &position,
        &timestamps,
        2,
        None,
        &place_options,
        &OccupancyOptions::default(),
    )
    .unwrap();
    assert_eq!(occupancy, array![2., 5.].into_dyn());

    let place_bins = compute_place_bins(
        &spikes,
        &position,
        &timestamps,
        2,
        None,
        &place_options,
        Some(&occupancy),
    )
    .unwrap();
    assert_all_close(&place_bins, &array![0.5, 0.6].into_dyn());
}

#[test]
fn trial_place_bins_1d() {
    let (spikes, position, timestamps) = data_1d();
    let place_bins = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        2,
        &array![0., 0.4],
        &array![0.3, 1.],
        None,
        &TrialOptions::default(),
    )
    .unwrap();
    assert_all_close(&place_bins, &array![[10., 40.], [10., 7.5]].into_dyn());
}

#[test]
fn trial_place_bins_first_dim_is_n_trials() {
    let (spikes, position, timestamps) = data_2d();
    for n_trials in 0..4 {
        let starts = Array1::from_shape_fn(n_trials, |ind| 0.2 * ind as f64);
        let stops = &starts + 0.3;
        let place_bins = compute_trial_place_bins(
            &spikes,
            &position,
            &timestamps,
            [3, 2],
            &starts,
            &stops,
            None,
            &TrialOptions::default(),
        )
        .unwrap();
        assert_eq!(place_bins.shape(), &[n_trials, 2, 3]);
    }
}

#[test]
fn trial_without_spikes_is_all_zero() {
    let (spikes, position, timestamps) = data_2d();
    for normalize in [true, false] {
        let place_bins = compute_trial_place_bins(
            &spikes,
            &position,
            &timestamps,
            [3, 2],
            &array![0.21, 5.],
            &array![0.24, 6.],
            None,
            &TrialOptions::default().normalize(normalize),
        )
        .unwrap();
        assert_eq!(place_bins, Array3::<f64>::zeros((2, 2, 3)).into_dyn());
    }
}

#[test]
fn trial_place_bins_flatten() {
    let (spikes, position, timestamps) = data_2d();
    let options = TrialOptions::default().normalize(false);
    let starts = array![0., 0.4];
    let stops = array![0.4, 1.];
    let grid = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        [3, 2],
        &starts,
        &stops,
        None,
        &options,
    )
    .unwrap();
    let flat = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        [3, 2],
        &starts,
        &stops,
        None,
        &options.flatten(true),
    )
    .unwrap();
    assert_eq!(flat.shape(), &[2, 6]);
    assert_eq!(flat, grid.into_shape((2, 6)).unwrap().into_dyn());

    let (spikes, position, timestamps) = data_1d();
    let flat_1d = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        2,
        &starts,
        &stops,
        None,
        &TrialOptions::default().flatten(true),
    )
    .unwrap();
    assert_eq!(flat_1d.shape(), &[2, 2]);
}

#[test]
fn trial_matches_place_bins_over_window() {
    let (spikes, position, timestamps) = data_2d();
    let options = TrialOptions::default().normalize(false);
    let place_bins = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        [3, 2],
        &array![0.],
        &array![1.],
        None,
        &options,
    )
    .unwrap();
    let direct = compute_place_bins(
        &spikes,
        &position,
        &timestamps,
        [3, 2],
        None,
        &options.place,
        None,
    )
    .unwrap();
    assert_eq!(place_bins.index_axis(Axis(0), 0), direct);
}

#[test]
fn zero_occupancy_policy() {
    let (spikes, position, timestamps) = data_1d();
    let (starts, stops) = (array![0.], array![0.3]);
    let place_bins = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        4,
        &starts,
        &stops,
        None,
        &TrialOptions::default(),
    )
    .unwrap();
    assert_all_close(&place_bins, &array![[10., 0., 0., 0.]].into_dyn());

    let with_nan = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        4,
        &starts,
        &stops,
        None,
        &TrialOptions::default().occupancy(OccupancyOptions::default().set_nan(true)),
    )
    .unwrap();
    assert_all_close(&with_nan, &array![[10., f64::NAN, 0., f64::NAN]].into_dyn());
}

#[test]
fn trial_speed_threshold() {
    let (spikes, position, timestamps) = data_1d();
    let speed = Array1::from_elem(timestamps.len(), 1.);
    let fast = TrialOptions::default()
        .normalize(false)
        .place(PlaceBinOptions::default().speed_threshold(0.5));
    let slow = TrialOptions::default()
        .normalize(false)
        .place(PlaceBinOptions::default().speed_threshold(2.));
    let (starts, stops) = (array![0., 0.4], array![0.3, 1.]);

    let kept = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        2,
        &starts,
        &stops,
        Some(speed.view()),
        &fast,
    )
    .unwrap();
    assert_eq!(kept, array![[1., 2.], [2., 3.]].into_dyn());

    let dropped = compute_trial_place_bins(
        &spikes,
        &position,
        &timestamps,
        2,
        &starts,
        &stops,
        Some(speed.view()),
        &slow,
    )
    .unwrap();
    assert_eq!(dropped, Array2::<f64>::zeros((2, 2)).into_dyn());
}

#[test]
fn bin_counts_of_positions() {
    let position = array![[0., 0.5, 1., 1.], [0., 0.5, 1., 0.]];
    let counts = compute_bin_counts_pos(&position, [2, 2], None, None).unwrap();
    assert_eq!(counts, array![[1., 1.], [0., 2.]].into_dyn());
}

// Trials run on other threads with the `rayon` feature, where the counting
// subscriber isn't installed.
#[cfg(not(feature = "rayon"))]
#[test]
fn out_of_range_warns_once_per_call() {
    use crate::WarningCounter;

    let (spikes, position, timestamps) = data_1d();
    let options = TrialOptions::default()
        .place(PlaceBinOptions::default().area_range(vec![[0., 2.]]));
    let counter = WarningCounter::default();
    let place_bins = counter.run(|| {
        compute_trial_place_bins(
            &spikes,
            &position,
            &timestamps,
            2,
            &array![0.3, 0.4, 0.6],
            &array![0.5, 0.7, 1.],
            None,
            &options,
        )
    });
    assert_eq!(place_bins.unwrap().shape(), &[3, 2]);
    assert_eq!(counter.count(), 1);

    let counter = WarningCounter::default();
    counter.run(|| {
        compute_trial_place_bins(
            &spikes,
            &position,
            &timestamps,
            2,
            &array![0.3],
            &array![0.5],
            None,
            &options
                .clone()
                .occupancy(OccupancyOptions::default().check_range(false)),
        )
        .unwrap()
    });
    assert_eq!(counter.count(), 0);
}

//! Conversions between spike representations.

use crate::assert_all_close;
use ndarray::{array, Array1};
use spiketools::measures::conversions::{
    convert_isis_to_times, convert_times_to_rates, convert_times_to_train, convert_train_to_times,
};
use spiketools::measures::spikes::{compute_firing_rate, compute_isis};
use spiketools::utils::checks::TimeBins;
use spiketools::Error;

#[test]
fn train_round_trip_within_sampling_period() {
    let spikes = array![0.0105, 0.12, 0.3333, 0.5, 0.98765, 1.5];
    for &fs in &[100., 1000., 20000.] {
        let train = convert_times_to_train(&spikes, fs, None).unwrap();
        let recovered = convert_train_to_times(&train, fs).unwrap();
        assert_eq!(recovered.len(), spikes.len());
        for (orig, rec) in spikes.iter().zip(&recovered) {
            assert!((rec - orig).abs() <= 1. / fs + 1e-12, "fs {}: {} vs {}", fs, orig, rec);
        }
    }
}

#[test]
fn train_rejects_colliding_spikes() {
    let spikes = array![0.5, 0.501];
    assert!(matches!(
        convert_times_to_train(&spikes, 100., None),
        Err(Error::SamplingCollision { index: 50 })
    ));
    assert!(convert_times_to_train(&spikes, 10000., None).is_ok());
}

#[test]
fn isis_reconstruct_spikes() {
    let spikes = array![0.125, 0.5, 1.25, 1.375, 3.];
    let isis = compute_isis(&spikes);
    assert_eq!(convert_isis_to_times(&isis, spikes[0], true), spikes);

    let irregular = array![0.013, 0.27, 0.31, 0.95, 1.4];
    let rebuilt = convert_isis_to_times(&compute_isis(&irregular), irregular[0], true);
    assert_all_close(&rebuilt, &irregular);
}

#[test]
fn rates_match_firing_rate() {
    let spikes: Array1<f64> = (0..20).map(|ind| 0.05 + 0.1 * ind as f64).collect();
    let rates =
        convert_times_to_rates(&spikes, &TimeBins::Width(0.5), Some([0., 2.]), None).unwrap();
    assert_all_close(&rates, &array![10., 10., 10., 10.]);
    assert!((compute_firing_rate(&spikes, Some([0., 2.])) - 10.).abs() < 1e-12);
}

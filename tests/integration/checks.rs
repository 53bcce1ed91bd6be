//! Parameter, bin and range checks.

use crate::WarningCounter;
use ndarray::array;
use spiketools::spatial::checks::check_position;
use spiketools::utils::checks::{check_bin_range, check_time_bins, TimeBins};
use spiketools::utils::select::{get_avg_func, get_var_func};
use spiketools::{
    check_spatial_bins, compute_occupancy, Error, OccupancyOptions, PlaceBinOptions, SpatialBins,
};

#[test]
fn spatial_bins_scalar_equals_list() {
    let scalar = check_spatial_bins(12, None).unwrap();
    let list = check_spatial_bins([12], None).unwrap();
    assert_eq!(scalar, list);
    assert_eq!(scalar.to_vec(), vec![12]);
    assert_eq!(scalar, SpatialBins::OneD(12));
}

#[test]
fn spatial_bins_must_match_position() {
    let position = array![[1., 2.], [3., 4.]];
    assert!(matches!(
        check_spatial_bins(12, Some(&position)),
        Err(Error::SpatialBins(_))
    ));
    assert!(check_position(&array![1., 2.]).is_ok());
}

#[test]
fn out_of_range_warns_instead_of_failing() {
    let counter = WarningCounter::default();
    let in_range = counter.run(|| check_bin_range(&array![0.5, 1.5], &array![0., 1., 2.]));
    assert!(in_range);
    assert_eq!(counter.count(), 0);

    let (values, edges) = (array![-1., 0.5, 2.5], array![0., 1., 2.]);
    let in_range = counter.run(|| check_bin_range(&values, &edges));
    assert!(!in_range);
    assert_eq!(counter.count(), 1);

    let occupancy = counter.run(|| {
        compute_occupancy(
            &array![0.5, 1.5, 3.5],
            &array![0., 1., 2.],
            2,
            None,
            &PlaceBinOptions::default().area_range(vec![[0., 2.]]),
            &OccupancyOptions::default(),
        )
    });
    assert_eq!(occupancy.unwrap(), array![1., 1.].into_dyn());
    assert_eq!(counter.count(), 2);
}

#[test]
fn time_bins() {
    let edges = check_time_bins(&TimeBins::Width(0.5), &array![0.1, 1.9], None, false).unwrap();
    assert_eq!(edges, array![0., 0.5, 1., 1.5, 2.]);
    let decreasing = TimeBins::from(array![0., 2., 1.]);
    assert!(matches!(
        check_time_bins(&decreasing, &array![0.5], None, false),
        Err(Error::BinEdges)
    ));
}

#[test]
fn named_statistics() {
    let data = array![[1., 2., 6.], [3., 4., 8.]];
    let mean = get_avg_func("mean").unwrap();
    assert_eq!(mean(data.view(), ndarray::Axis(0)), array![2., 3., 7.]);
    let median = get_avg_func("median").unwrap();
    assert_eq!(median(data.view(), ndarray::Axis(1)), array![2., 4.]);
    let var = get_var_func("var").unwrap();
    assert_eq!(var(data.view(), ndarray::Axis(0)), array![1., 1., 1.]);
    assert!(matches!(get_avg_func("mode"), Err(Error::ParamOption { .. })));
    assert!(get_var_func("range").is_err());
}

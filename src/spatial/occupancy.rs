//! Spatial bin edges, bin assignment, bin counts and occupancy.

use super::checks::{check_bins_for_dims, check_position, IntoSpatialBins, SpatialBins};
use super::place::PlaceBinOptions;
use super::utils::{compute_sample_durations, nan_range};
use super::PositionData;
use crate::utils::bin_index;
use crate::utils::checks::RangeWarnings;
use crate::Error;
use ndarray::prelude::*;
use ndarray::{Data, Zip};

/// The edges of spatial bins, per dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct BinEdges {
    edges: Vec<Array1<f64>>,
}

impl BinEdges {
    /// Creates bin edges from explicit, strictly increasing edges for x and
    /// optionally y.
    pub fn new(x_edges: Array1<f64>, y_edges: Option<Array1<f64>>) -> Result<BinEdges, Error> {
        let edges: Vec<Array1<f64>> = std::iter::once(x_edges).chain(y_edges).collect();
        for dim_edges in &edges {
            let increasing = dim_edges.windows(2).into_iter().all(|w| w[0] < w[1]);
            if dim_edges.len() < 2 || !increasing {
                return Err(Error::BinEdges);
            }
        }
        Ok(BinEdges { edges })
    }

    /// The x edges.
    pub fn x(&self) -> ArrayView1<'_, f64> {
        self.edges[0].view()
    }

    /// The y edges, for 2d bins.
    pub fn y(&self) -> Option<ArrayView1<'_, f64>> {
        self.edges.get(1).map(|edges| edges.view())
    }

    pub fn n_dims(&self) -> usize {
        self.edges.len()
    }

    /// The number of bins described by the edges.
    pub fn bins(&self) -> SpatialBins {
        let n_x = self.edges[0].len() - 1;
        match self.y() {
            Some(y) => SpatialBins::TwoD(n_x, y.len() - 1),
            None => SpatialBins::OneD(n_x),
        }
    }
}

/// The spatial bin of a position sample.
///
/// `y` is always 0 for 1d bins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BinIndex {
    pub x: usize,
    pub y: usize,
}

impl BinIndex {
    /// Index of the bin into the flattened, row-major `[n_y, n_x]` output.
    fn flat(&self, n_x: usize) -> usize {
        self.y * n_x + self.x
    }
}

/// Evenly spaced edges over `[first, last]`, with the last edge placed
/// exactly at `last`.
fn linspace_edges(name: &str, range: [f64; 2], n_bins: usize) -> Result<Array1<f64>, Error> {
    let [mut first, mut last] = range;
    if !(first.is_finite() && last.is_finite()) {
        return Err(Error::SpatialBins(format!(
            "{} range [{}, {}] is not finite",
            name, first, last
        )));
    }
    if first > last {
        return Err(Error::SpatialBins(format!(
            "{} range [{}, {}] must be increasing",
            name, first, last
        )));
    }
    if first == last {
        first -= 0.5;
        last += 0.5;
    }
    let step = (last - first) / n_bins as f64;
    Ok(Array1::from_shape_fn(n_bins + 1, |ind| {
        if ind == n_bins {
            last
        } else {
            first + ind as f64 * step
        }
    }))
}

/// Compute evenly spaced bin edges for each position dimension.
///
/// Each dimension gets `n + 1` edges spanning its `area_range` entry, or
/// otherwise the min/max of the position values. A range of zero width is
/// widened by 0.5 on either side, and a dimension without any (non-NaN)
/// values spans `[0, 1]`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::occupancy::compute_bin_edges;
///
/// let position = array![[1., 2., 3., 5.], [6., 7., 8., 10.]];
/// let edges = compute_bin_edges(&position, [4, 2], None)?;
/// assert_eq!(edges.x(), array![1., 2., 3., 4., 5.]);
/// assert_eq!(edges.y().unwrap(), array![6., 8., 10.]);
///
/// let edges = compute_bin_edges(&position, [2, 2], Some(&[[0., 10.], [0., 20.]]))?;
/// assert_eq!(edges.x(), array![0., 5., 10.]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn compute_bin_edges<P, B>(
    position: &P,
    bins: B,
    area_range: Option<&[[f64; 2]]>,
) -> Result<BinEdges, Error>
where
    P: PositionData + ?Sized,
    B: IntoSpatialBins,
{
    let position = check_position(position)?;
    let bins = bins.into_spatial_bins()?;
    check_bins_for_dims(bins, position.nrows())?;
    if let Some(area_range) = area_range {
        if area_range.len() != bins.n_dims() {
            return Err(Error::SpatialBins(format!(
                "area_range has {} dimensions, but the bins have {}",
                area_range.len(),
                bins.n_dims()
            )));
        }
    }

    let edges = position
        .outer_iter()
        .zip(bins.to_vec())
        .enumerate()
        .map(|(dim, (values, n_bins))| {
            let name = ["x", "y"][dim];
            let range = match area_range {
                Some(area_range) => area_range[dim],
                None => match nan_range(values.iter().copied()) {
                    [min, max] if min.is_nan() || max.is_nan() => [0., 1.],
                    range => range,
                },
            };
            linspace_edges(name, range, n_bins)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BinEdges { edges })
}

pub(crate) fn assign_bins(
    position: ArrayView2<'_, f64>,
    edges: &BinEdges,
    warnings: &RangeWarnings,
) -> Result<Vec<Option<BinIndex>>, Error> {
    if position.nrows() != edges.n_dims() {
        return Err(Error::SpatialBins(format!(
            "{}d bin edges don't match {}d position data",
            edges.n_dims(),
            position.nrows()
        )));
    }
    let x = position.row(0);
    let x_edges = edges.x();
    warnings.check(x, x_edges);
    let x_edges = x_edges.to_vec();
    let x_bins = x.iter().map(|&value| bin_index(&x_edges, value));

    match edges.y() {
        None => Ok(x_bins.map(|x| x.map(|x| BinIndex { x, y: 0 })).collect()),
        Some(y_edges) => {
            let y = position.row(1);
            warnings.check(y, y_edges);
            let y_edges = y_edges.to_vec();
            Ok(x_bins
                .zip(y.iter().map(|&value| bin_index(&y_edges, value)))
                .map(|bins| match bins {
                    (Some(x), Some(y)) => Some(BinIndex { x, y }),
                    _ => None,
                })
                .collect())
        }
    }
}

/// Compute the spatial bin of each position sample.
///
/// Bins are half-open, except that the last edge of each dimension is
/// inclusive. Samples outside the edges (or with a NaN coordinate) get
/// `None`. With `check_range`, values outside the edges emit a warning.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::occupancy::{compute_bin_assignment, compute_bin_edges, BinIndex};
///
/// let position = array![0., 1., 2.5, 4.];
/// let edges = compute_bin_edges(&position, 2, None)?;
/// let assignment = compute_bin_assignment(&array![0., 2.5, 4., 5.], &edges, false)?;
/// let (low, high) = (BinIndex { x: 0, y: 0 }, BinIndex { x: 1, y: 0 });
/// assert_eq!(assignment, vec![Some(low), Some(high), Some(high), None]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn compute_bin_assignment<P>(
    position: &P,
    edges: &BinEdges,
    check_range: bool,
) -> Result<Vec<Option<BinIndex>>, Error>
where
    P: PositionData + ?Sized,
{
    let position = check_position(position)?;
    assign_bins(position, edges, &RangeWarnings::new(check_range))
}

/// Count bin assignments into an array of the bins' shape, optionally
/// normalized by `occupancy` (see [`normalize_bin_counts`]).
pub fn compute_bin_counts_assgn<B>(
    bins: B,
    assignments: &[Option<BinIndex>],
    occupancy: Option<&ArrayD<f64>>,
) -> Result<ArrayD<f64>, Error>
where
    B: IntoSpatialBins,
{
    let bins = bins.into_spatial_bins()?;
    let n_x = bins.to_vec()[0];
    let n_y = bins.to_vec().get(1).copied().unwrap_or(1);
    let mut counts = vec![0.; bins.n_bins()];
    for bin in assignments.iter().flatten() {
        if bin.x >= n_x || bin.y >= n_y {
            return Err(Error::SpatialBins(format!(
                "bin index {:?} is out of range for bins {:?}",
                bin,
                bins.to_vec()
            )));
        }
        counts[bin.flat(n_x)] += 1.;
    }
    let counts = ArrayD::from_shape_vec(bins.shape(), counts)?;
    match occupancy {
        Some(occupancy) => normalize_bin_counts(&counts, occupancy),
        None => Ok(counts),
    }
}

/// Compute a histogram of positions over spatial bins.
///
/// Edges are computed with [`compute_bin_edges`]; positions outside the
/// edges are ignored. If `occupancy` is given, the counts are normalized
/// by it.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::occupancy::compute_bin_counts_pos;
///
/// let position = array![[0.1, 0.2, 0.9, 0.8, 0.85], [0.1, 0.3, 0.9, 0.2, 0.95]];
/// let counts = compute_bin_counts_pos(&position, [2, 2], Some(&[[0., 1.], [0., 1.]]), None)?;
/// assert_eq!(counts.into_dimensionality::<ndarray::Ix2>()?, array![[2., 1.], [0., 2.]]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn compute_bin_counts_pos<P, B>(
    position: &P,
    bins: B,
    area_range: Option<&[[f64; 2]]>,
    occupancy: Option<&ArrayD<f64>>,
) -> Result<ArrayD<f64>, Error>
where
    P: PositionData + ?Sized,
    B: IntoSpatialBins,
{
    let position = check_position(position)?;
    let bins = bins.into_spatial_bins()?;
    let edges = compute_bin_edges(&position, bins, area_range)?;
    let assignments = assign_bins(position, &edges, &RangeWarnings::new(false))?;
    compute_bin_counts_assgn(bins, &assignments, occupancy)
}

/// Normalize bin counts by occupancy, elementwise.
///
/// Bins with zero occupancy give 0, and bins with NaN occupancy give NaN.
///
/// # Errors
///
/// Fails with [`Error::ShapeMismatch`] if the shapes differ.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::occupancy::normalize_bin_counts;
///
/// let counts = array![[2., 4.], [3., 1.]];
/// let occupancy = array![[4., 0.], [1.5, f64::NAN]];
/// let normalized = normalize_bin_counts(&counts, &occupancy)?;
/// assert_eq!(normalized.row(0), array![0.5, 0.]);
/// assert_eq!(normalized[[1, 0]], 2.);
/// assert!(normalized[[1, 1]].is_nan());
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn normalize_bin_counts<S, T, D>(
    counts: &ArrayBase<S, D>,
    occupancy: &ArrayBase<T, D>,
) -> Result<Array<f64, D>, Error>
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
    D: Dimension,
{
    if counts.shape() != occupancy.shape() {
        return Err(Error::ShapeMismatch {
            expected: occupancy.shape().to_vec(),
            found: counts.shape().to_vec(),
        });
    }
    Ok(Zip::from(counts)
        .and(occupancy)
        .map_collect(|&count, &occ| if occ == 0. { 0. } else { count / occ }))
}

/// Options for post-processing occupancy.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyOptions {
    /// Warn if positions fall outside the bin edges. Defaults to `true`.
    pub check_range: bool,
    /// Bins with less occupancy than this are set to 0.
    pub minimum: Option<f64>,
    /// Divide the occupancy by its total, so that it sums to 1.
    pub normalize: bool,
    /// Set bins with zero occupancy to NaN.
    pub set_nan: bool,
}

impl Default for OccupancyOptions {
    fn default() -> OccupancyOptions {
        OccupancyOptions {
            check_range: true,
            minimum: None,
            normalize: false,
            set_nan: false,
        }
    }
}

impl OccupancyOptions {
    pub fn check_range(mut self, check_range: bool) -> Self {
        self.check_range = check_range;
        self
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn set_nan(mut self, set_nan: bool) -> Self {
        self.set_nan = set_nan;
        self
    }
}

/// Compute occupancy: the time spent in each spatial bin.
///
/// Each position sample contributes its duration, the time until the next
/// sample, to the bin it falls in; the last sample contributes nothing.
/// Samples are excluded if `speed` is given with a `speed_threshold` and
/// the speed is not above the threshold, or if their duration exceeds the
/// `time_threshold`. Bin edges follow [`compute_bin_edges`] with the
/// `area_range` of `options`.
///
/// # Errors
///
/// Fails if the position data or bins are invalid, or if `position` or
/// `speed` aren't co-indexed with `timestamps`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::occupancy::{compute_occupancy, OccupancyOptions};
/// use spiketools::spatial::place::PlaceBinOptions;
///
/// let position = array![0.1, 0.2, 0.8, 0.9, 0.9];
/// let timestamps = array![0., 1., 2., 6., 7.];
/// let occupancy = compute_occupancy(
///     &position,
///     &timestamps,
///     2,
///     None,
///     &PlaceBinOptions::default().area_range(vec![[0., 1.]]),
///     &OccupancyOptions::default(),
/// )?;
/// assert_eq!(occupancy.into_dimensionality::<ndarray::Ix1>()?, array![2., 5.]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn compute_occupancy<P, S, B>(
    position: &P,
    timestamps: &ArrayBase<S, Ix1>,
    bins: B,
    speed: Option<ArrayView1<'_, f64>>,
    place_options: &PlaceBinOptions,
    options: &OccupancyOptions,
) -> Result<ArrayD<f64>, Error>
where
    P: PositionData + ?Sized,
    S: Data<Elem = f64>,
    B: IntoSpatialBins,
{
    let position = check_position(position)?;
    let bins = bins.into_spatial_bins()?;
    check_bins_for_dims(bins, position.nrows())?;
    let warnings = RangeWarnings::new(options.check_range);
    occupancy_with_warnings(
        position,
        timestamps.view(),
        bins,
        speed,
        place_options,
        options,
        &warnings,
    )
}

pub(crate) fn check_co_indexed(
    name: &'static str,
    found: usize,
    timestamps: ArrayView1<'_, f64>,
) -> Result<(), Error> {
    if found == timestamps.len() {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            name,
            expected: timestamps.len(),
            found,
        })
    }
}

pub(crate) fn occupancy_with_warnings(
    position: ArrayView2<'_, f64>,
    timestamps: ArrayView1<'_, f64>,
    bins: SpatialBins,
    speed: Option<ArrayView1<'_, f64>>,
    place_options: &PlaceBinOptions,
    options: &OccupancyOptions,
    warnings: &RangeWarnings,
) -> Result<ArrayD<f64>, Error> {
    check_co_indexed("position", position.ncols(), timestamps)?;
    if let Some(speed) = speed {
        check_co_indexed("speed", speed.len(), timestamps)?;
    }

    let edges = compute_bin_edges(&position, bins, place_options.area_range.as_deref())?;
    let assignments = assign_bins(position, &edges, warnings)?;
    let durations = compute_sample_durations(&timestamps);

    let n_x = bins.to_vec()[0];
    let mut occupancy = vec![0.; bins.n_bins()];
    for (ind, (bin, &duration)) in assignments.iter().zip(&durations).enumerate() {
        if let (Some(speed), Some(threshold)) = (speed, place_options.speed_threshold) {
            if !(speed[ind] > threshold) {
                continue;
            }
        }
        if let Some(threshold) = place_options.time_threshold {
            if duration > threshold {
                continue;
            }
        }
        if let Some(bin) = bin {
            occupancy[bin.flat(n_x)] += duration;
        }
    }
    let mut occupancy = ArrayD::from_shape_vec(bins.shape(), occupancy)?;

    if let Some(minimum) = options.minimum {
        occupancy.mapv_inplace(|occ| if occ < minimum { 0. } else { occ });
    }
    if options.normalize {
        let total = occupancy.sum();
        if total > 0. {
            occupancy /= total;
        }
    }
    if options.set_nan {
        occupancy.mapv_inplace(|occ| if occ == 0. { f64::NAN } else { occ });
    }
    Ok(occupancy)
}

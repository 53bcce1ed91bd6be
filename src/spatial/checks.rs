//! Checks for position data and spatial bin definitions.

use super::PositionData;
use crate::Error;
use ndarray::ArrayView2;

/// The number of spatial bins per dimension.
///
/// Bins are usually given through [`IntoSpatialBins`], which rejects
/// zero bins. 2d bins are given as `(n_x, n_y)`, while binned outputs have shape
/// `[n_y, n_x]` (see [`SpatialBins::shape`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpatialBins {
    OneD(usize),
    TwoD(usize, usize),
}

impl SpatialBins {
    fn new(bins: &[usize]) -> Result<SpatialBins, Error> {
        if bins.contains(&0) {
            return Err(Error::SpatialBins(format!(
                "the number of bins must be positive, got {:?}",
                bins
            )));
        }
        match *bins {
            [n_x] => Ok(SpatialBins::OneD(n_x)),
            [n_x, n_y] => Ok(SpatialBins::TwoD(n_x, n_y)),
            _ => Err(Error::SpatialBins(format!(
                "bins must have 1 or 2 elements, got {}",
                bins.len()
            ))),
        }
    }

    /// The number of spatial dimensions.
    pub fn n_dims(&self) -> usize {
        match self {
            SpatialBins::OneD(_) => 1,
            SpatialBins::TwoD(..) => 2,
        }
    }

    /// The number of bins per dimension, in `[n_x, n_y]` order.
    pub fn to_vec(&self) -> Vec<usize> {
        match *self {
            SpatialBins::OneD(n_x) => vec![n_x],
            SpatialBins::TwoD(n_x, n_y) => vec![n_x, n_y],
        }
    }

    /// The shape of binned outputs: `[n_x]` or `[n_y, n_x]`.
    pub fn shape(&self) -> Vec<usize> {
        match *self {
            SpatialBins::OneD(n_x) => vec![n_x],
            SpatialBins::TwoD(n_x, n_y) => vec![n_y, n_x],
        }
    }

    /// The total number of bins.
    pub fn n_bins(&self) -> usize {
        self.to_vec().iter().product()
    }
}

/// Conversion into a checked [`SpatialBins`].
///
/// Implemented for a number of bins (`usize`), for lists of one or two
/// numbers of bins, and for `SpatialBins` itself.
pub trait IntoSpatialBins {
    fn into_spatial_bins(self) -> Result<SpatialBins, Error>;
}

impl IntoSpatialBins for SpatialBins {
    fn into_spatial_bins(self) -> Result<SpatialBins, Error> {
        SpatialBins::new(&self.to_vec())
    }
}

impl IntoSpatialBins for usize {
    fn into_spatial_bins(self) -> Result<SpatialBins, Error> {
        SpatialBins::new(&[self])
    }
}

impl IntoSpatialBins for [usize; 1] {
    fn into_spatial_bins(self) -> Result<SpatialBins, Error> {
        SpatialBins::new(&self)
    }
}

impl IntoSpatialBins for [usize; 2] {
    fn into_spatial_bins(self) -> Result<SpatialBins, Error> {
        SpatialBins::new(&self)
    }
}

impl<'a> IntoSpatialBins for &'a [usize] {
    fn into_spatial_bins(self) -> Result<SpatialBins, Error> {
        SpatialBins::new(self)
    }
}

impl IntoSpatialBins for Vec<usize> {
    fn into_spatial_bins(self) -> Result<SpatialBins, Error> {
        SpatialBins::new(&self)
    }
}

/// Check position data, returning it as a `[n_dims, n_samples]` view.
///
/// Fails with [`Error::Position`] unless the data has 1 or 2 spatial
/// dimensions.
pub fn check_position<P>(position: &P) -> Result<ArrayView2<'_, f64>, Error>
where
    P: PositionData + ?Sized,
{
    let view = position.position_view()?;
    match view.nrows() {
        1 | 2 => Ok(view),
        n_dims => Err(Error::Position { n_dims }),
    }
}

/// Check a spatial bin definition, optionally against position data.
///
/// A single number of bins is equivalent to a one-element list, so `12`
/// and `[12]` both give `SpatialBins::OneD(12)`. With `position`, the
/// number of bin dimensions must match the position dimensions.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use spiketools::spatial::checks::check_spatial_bins;
/// use spiketools::spatial::SpatialBins;
///
/// assert_eq!(check_spatial_bins(12, None)?, SpatialBins::OneD(12));
/// assert_eq!(check_spatial_bins([12], None)?.to_vec(), vec![12]);
///
/// let position = array![[1., 2., 3.], [4., 5., 6.]];
/// assert_eq!(check_spatial_bins([3, 2], Some(&position))?.shape(), vec![2, 3]);
/// assert!(check_spatial_bins(3, Some(&position)).is_err());
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn check_spatial_bins<B>(
    bins: B,
    position: Option<&dyn PositionData>,
) -> Result<SpatialBins, Error>
where
    B: IntoSpatialBins,
{
    let bins = bins.into_spatial_bins()?;
    if let Some(position) = position {
        let n_dims = check_position(position)?.nrows();
        check_bins_for_dims(bins, n_dims)?;
    }
    Ok(bins)
}

pub(crate) fn check_bins_for_dims(bins: SpatialBins, n_dims: usize) -> Result<(), Error> {
    if bins.n_dims() == n_dims {
        Ok(())
    } else {
        Err(Error::SpatialBins(format!(
            "{}d bins don't match {}d position data",
            bins.n_dims(),
            n_dims
        )))
    }
}

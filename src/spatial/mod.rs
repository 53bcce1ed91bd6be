//! Spatial analyses: occupancy and place bins of position data.
//!
//! Position data is either 1d (`[n_samples]`, x only) or 2d
//! (`[2, n_samples]`, with rows x and y). Any array of such a shape can be
//! used through the [`PositionData`] trait.
//!
//! Binned outputs have shape `[n_x]` for 1d bins and `[n_y, n_x]` for 2d
//! bins, so that rows correspond to y and columns to x.

use crate::Error;
use ndarray::prelude::*;
use ndarray::Data;

pub mod checks;
pub mod occupancy;
pub mod place;
pub mod utils;

pub use self::checks::SpatialBins;

/// Position samples that can be viewed as a `[n_dims, n_samples]` array.
///
/// This is implemented for 1d arrays (a single x row), 2d arrays, and
/// dynamic-dimensional arrays of 1 or 2 dimensions.
pub trait PositionData {
    /// Returns a `[n_dims, n_samples]` view of the positions.
    ///
    /// Fails with [`Error::Position`] for arrays with more than two
    /// dimensions.
    fn position_view(&self) -> Result<ArrayView2<'_, f64>, Error>;
}

impl<S> PositionData for ArrayBase<S, Ix1>
where
    S: Data<Elem = f64>,
{
    fn position_view(&self) -> Result<ArrayView2<'_, f64>, Error> {
        Ok(self.view().insert_axis(Axis(0)))
    }
}

impl<S> PositionData for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64>,
{
    fn position_view(&self) -> Result<ArrayView2<'_, f64>, Error> {
        Ok(self.view())
    }
}

impl<S> PositionData for ArrayBase<S, IxDyn>
where
    S: Data<Elem = f64>,
{
    fn position_view(&self) -> Result<ArrayView2<'_, f64>, Error> {
        match self.ndim() {
            1 => Ok(self
                .view()
                .into_dimensionality::<Ix1>()?
                .insert_axis(Axis(0))),
            2 => Ok(self.view().into_dimensionality::<Ix2>()?),
            n_dims => Err(Error::Position { n_dims }),
        }
    }
}

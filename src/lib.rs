//! This crate provides spike-train and spatial (place-cell) analyses over
//! [`ndarray`] arrays.
//!
//! [`ndarray`]: https://github.com/rust-ndarray/ndarray
//!
//! * [`utils`]: parameter checks, time-range extraction and matching of
//!   spikes to co-recorded data, and named summary statistics.
//! * [`measures`]: inter-spike intervals, firing rates, and conversions
//!   between spike times, spike trains and rates.
//! * [`spatial`]: bin edges, occupancy and occupancy-normalized place bins,
//!   per session or per trial.
//! * [`session`]: reading and writing session arrays as `.npz` files
//!   (requires the `npz` feature, enabled by default).
//!
//! Time values are in seconds. Functions reject invalid inputs with an
//! [`Error`] before computing anything; data that merely falls outside a
//! binning range is reported as a [`tracing`] warning and dropped.
//!
//! [`tracing`]: https://docs.rs/tracing
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use spiketools::{compute_trial_place_bins, TrialOptions};
//!
//! let spikes = array![0.2, 0.25, 0.3, 0.38, 0.41, 0.5, 0.59, 0.77, 0.95];
//! let position = array![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];
//! let timestamps = array![0.1, 0.2, 0.25, 0.4, 0.45, 0.46, 0.6, 0.7, 1.0];
//!
//! let counts = compute_trial_place_bins(
//!     &spikes,
//!     &position,
//!     &timestamps,
//!     2,
//!     &array![0., 0.4],
//!     &array![0.3, 1.],
//!     None,
//!     &TrialOptions::default().normalize(false),
//! )?;
//! assert_eq!(counts, array![[1., 2.], [2., 3.]].into_dyn());
//! # Ok::<_, spiketools::Error>(())
//! ```
//!
//! # Features
//!
//! * `npz` (default): the [`session`] module.
//! * `compressed_npz`: writing compressed session archives.
//! * `rayon`: computing the trials of [`compute_trial_place_bins`] in
//!   parallel.

mod error;
pub mod measures;
#[cfg(feature = "npz")]
pub mod session;
pub mod spatial;
pub mod utils;

pub use crate::error::Error;
pub use crate::spatial::checks::{check_spatial_bins, IntoSpatialBins};
pub use crate::spatial::occupancy::{compute_occupancy, OccupancyOptions};
pub use crate::spatial::place::{
    compute_place_bins, compute_trial_place_bins, PlaceBinOptions, TrialOptions,
};
pub use crate::spatial::{PositionData, SpatialBins};

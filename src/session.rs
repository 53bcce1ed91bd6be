//! Reading and writing recording sessions as `.npz` files.
//!
//! A session archive holds the arrays `spikes`, `timestamps`, `position`
//! and, optionally, `speed`, stored as `.npy` files named after them (the
//! layout written by `numpy.savez`).

use crate::spatial::checks::{check_position, IntoSpatialBins};
use crate::spatial::occupancy::{compute_occupancy, OccupancyOptions};
use crate::spatial::place::{
    compute_place_bins, compute_trial_place_bins, PlaceBinOptions, TrialOptions,
};
use crate::spatial::PositionData;
use crate::Error;
use ndarray::prelude::*;
use ndarray::Data;
use ndarray_npy::{NpzReader, NpzWriter, ReadNpzError, WriteNpzError};
use std::error::Error as StdError;
use std::fmt;
use std::io::{Read, Seek, Write};
use tracing::debug;

const SPIKES: &str = "spikes.npy";
const TIMESTAMPS: &str = "timestamps.npy";
const POSITION: &str = "position.npy";
const SPEED: &str = "speed.npy";

fn is_speed(name: &str) -> bool {
    name == SPEED || name == "speed"
}

/// An error reading a session from a `.npz` file.
#[derive(Debug)]
pub enum ReadSessionError {
    /// An error reading the archive or one of its arrays.
    Npz(ReadNpzError),
    /// The arrays in the archive don't form a valid session.
    Invalid(Error),
}

impl StdError for ReadSessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ReadSessionError::Npz(err) => Some(err),
            ReadSessionError::Invalid(err) => Some(err),
        }
    }
}

impl fmt::Display for ReadSessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadSessionError::Npz(err) => write!(f, "error reading session archive: {}", err),
            ReadSessionError::Invalid(err) => write!(f, "invalid session data: {}", err),
        }
    }
}

impl From<ReadNpzError> for ReadSessionError {
    fn from(err: ReadNpzError) -> ReadSessionError {
        ReadSessionError::Npz(err)
    }
}

impl From<Error> for ReadSessionError {
    fn from(err: Error) -> ReadSessionError {
        ReadSessionError::Invalid(err)
    }
}

/// The spike times and tracked position of one recording session.
///
/// `position` is stored as `[n_dims, n_samples]`, co-indexed with
/// `timestamps` (and `speed`, if present).
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    spikes: Array1<f64>,
    timestamps: Array1<f64>,
    position: Array2<f64>,
    speed: Option<Array1<f64>>,
}

impl Session {
    /// Creates a session, checking that the position data is 1d or 2d and
    /// that position and speed are co-indexed with the timestamps.
    pub fn new<P>(
        spikes: Array1<f64>,
        timestamps: Array1<f64>,
        position: &P,
        speed: Option<Array1<f64>>,
    ) -> Result<Session, Error>
    where
        P: PositionData + ?Sized,
    {
        let position = check_position(position)?.to_owned();
        let n_samples = timestamps.len();
        if position.ncols() != n_samples {
            return Err(Error::LengthMismatch {
                name: "position",
                expected: n_samples,
                found: position.ncols(),
            });
        }
        if let Some(speed) = &speed {
            if speed.len() != n_samples {
                return Err(Error::LengthMismatch {
                    name: "speed",
                    expected: n_samples,
                    found: speed.len(),
                });
            }
        }
        Ok(Session {
            spikes,
            timestamps,
            position,
            speed,
        })
    }

    pub fn spikes(&self) -> ArrayView1<'_, f64> {
        self.spikes.view()
    }

    pub fn timestamps(&self) -> ArrayView1<'_, f64> {
        self.timestamps.view()
    }

    /// The position as `[n_dims, n_samples]`.
    pub fn position(&self) -> ArrayView2<'_, f64> {
        self.position.view()
    }

    pub fn speed(&self) -> Option<ArrayView1<'_, f64>> {
        self.speed.as_ref().map(|speed| speed.view())
    }

    /// Reads a session from a `.npz` archive.
    ///
    /// The position array may be 1d or 2d. The speed array is optional.
    pub fn read_npz<R: Read + Seek>(reader: R) -> Result<Session, ReadSessionError> {
        let mut npz = NpzReader::new(reader)?;
        let names = npz.names()?;
        let spikes: Array1<f64> = npz.by_name(SPIKES)?;
        let timestamps: Array1<f64> = npz.by_name(TIMESTAMPS)?;
        let position: ArrayD<f64> = npz.by_name(POSITION)?;
        let speed: Option<Array1<f64>> = match names.iter().find(|name| is_speed(name)) {
            Some(name) => Some(npz.by_name(name)?),
            None => None,
        };
        debug!(
            n_spikes = spikes.len(),
            n_samples = timestamps.len(),
            has_speed = speed.is_some(),
            "read session"
        );
        Ok(Session::new(spikes, timestamps, &position, speed)?)
    }

    /// Writes the session to a `.npz` archive, returning the writer.
    ///
    /// 1d position data is written as a 1d array.
    pub fn write_npz<W: Write + Seek>(&self, writer: W) -> Result<W, WriteNpzError> {
        self.write_arrays(NpzWriter::new(writer))
    }

    /// Writes the session to a compressed `.npz` archive, returning the
    /// writer.
    #[cfg(feature = "compressed_npz")]
    pub fn write_npz_compressed<W: Write + Seek>(&self, writer: W) -> Result<W, WriteNpzError> {
        self.write_arrays(NpzWriter::new_compressed(writer))
    }

    fn write_arrays<W: Write + Seek>(&self, mut npz: NpzWriter<W>) -> Result<W, WriteNpzError> {
        npz.add_array(SPIKES, &self.spikes)?;
        npz.add_array(TIMESTAMPS, &self.timestamps)?;
        if self.position.nrows() == 1 {
            npz.add_array(POSITION, &self.position.row(0))?;
        } else {
            npz.add_array(POSITION, &self.position)?;
        }
        if let Some(speed) = &self.speed {
            npz.add_array(SPEED, speed)?;
        }
        npz.finish()
    }

    /// Computes the occupancy of the session. See
    /// [`compute_occupancy`].
    pub fn occupancy<B: IntoSpatialBins>(
        &self,
        bins: B,
        place_options: &PlaceBinOptions,
        options: &OccupancyOptions,
    ) -> Result<ArrayD<f64>, Error> {
        compute_occupancy(
            &self.position,
            &self.timestamps,
            bins,
            self.speed(),
            place_options,
            options,
        )
    }

    /// Computes the place bins of the session. See [`compute_place_bins`].
    pub fn place_bins<B: IntoSpatialBins>(
        &self,
        bins: B,
        options: &PlaceBinOptions,
        occupancy: Option<&ArrayD<f64>>,
    ) -> Result<ArrayD<f64>, Error> {
        compute_place_bins(
            &self.spikes,
            &self.position,
            &self.timestamps,
            bins,
            self.speed(),
            options,
            occupancy,
        )
    }

    /// Computes the place bins of each trial. See
    /// [`compute_trial_place_bins`].
    pub fn trial_place_bins<B, S, T>(
        &self,
        bins: B,
        start_times: &ArrayBase<S, Ix1>,
        stop_times: &ArrayBase<T, Ix1>,
        options: &TrialOptions,
    ) -> Result<ArrayD<f64>, Error>
    where
        B: IntoSpatialBins,
        S: Data<Elem = f64>,
        T: Data<Elem = f64>,
    {
        compute_trial_place_bins(
            &self.spikes,
            &self.position,
            &self.timestamps,
            bins,
            start_times,
            stop_times,
            self.speed(),
            options,
        )
    }
}

/// Writes named place-bin arrays to a `.npz` archive, returning the writer.
///
/// Each array is stored as `<name>.npy`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use ndarray_npy::NpzReader;
/// use spiketools::session::write_place_bins;
/// use std::io::Cursor;
///
/// let unit_a = array![[1., 2.], [3., 4.]].into_dyn();
/// let unit_b = array![0., 5.].into_dyn();
/// let entries = [("unit_a", &unit_a), ("unit_b", &unit_b)];
/// let buf = write_place_bins(Cursor::new(Vec::new()), &entries)?;
///
/// let mut npz = NpzReader::new(Cursor::new(buf.into_inner()))?;
/// let read: ndarray::ArrayD<f64> = npz.by_name("unit_b.npy")?;
/// assert_eq!(read, unit_b);
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn write_place_bins<W: Write + Seek>(
    writer: W,
    place_bins: &[(&str, &ArrayD<f64>)],
) -> Result<W, WriteNpzError> {
    let mut npz = NpzWriter::new(writer);
    for (name, bins) in place_bins {
        npz.add_array(format!("{}.npy", name), *bins)?;
    }
    npz.finish()
}

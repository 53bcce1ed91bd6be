//! Session `.npz` files.

use crate::assert_all_close;
use ndarray::{array, ArrayD};
use ndarray_npy::{NpzReader, NpzWriter};
use spiketools::session::{write_place_bins, ReadSessionError, Session};
use spiketools::{compute_trial_place_bins, Error, TrialOptions};
use std::error::Error as StdError;
use std::fs::File;

fn session_1d() -> Session {
    Session::new(
        array![0.2, 0.25, 0.3, 0.38, 0.41, 0.5, 0.59, 0.77, 0.95],
        array![0.1, 0.2, 0.25, 0.4, 0.45, 0.46, 0.6, 0.7, 1.0],
        &array![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0],
        Some(array![1., 1., 1., 1., 1., 1., 1., 1., 1.]),
    )
    .unwrap()
}

#[test]
fn session_file_round_trip() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.npz");
    let session = session_1d();
    session.write_npz(File::create(&path)?)?;

    let read = Session::read_npz(File::open(&path)?)?;
    assert_eq!(read, session);
    assert_eq!(read.position().shape(), &[1, 9]);

    let (starts, stops) = (array![0., 0.4], array![0.3, 1.]);
    let from_session = read.trial_place_bins(2, &starts, &stops, &TrialOptions::default())?;
    let direct = compute_trial_place_bins(
        &read.spikes(),
        &read.position(),
        &read.timestamps(),
        2,
        &starts,
        &stops,
        read.speed(),
        &TrialOptions::default(),
    )?;
    assert_eq!(from_session, direct);
    assert_all_close(&from_session, &array![[10., 40.], [10., 7.5]].into_dyn());
    Ok(())
}

#[cfg(feature = "compressed_npz")]
#[test]
fn compressed_session_round_trip() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.npz");
    let session = session_1d();
    session.write_npz_compressed(File::create(&path)?)?;
    assert_eq!(Session::read_npz(File::open(&path)?)?, session);
    Ok(())
}

#[test]
fn session_archive_from_other_writers() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("recording.npz");
    {
        let mut npz = NpzWriter::new(File::create(&path)?);
        npz.add_array("spikes.npy", &array![0.5, 1.5])?;
        npz.add_array("timestamps.npy", &array![0., 1., 2.])?;
        npz.add_array("position.npy", &array![[0., 1., 2.], [3., 4., 5.]])?;
        npz.finish()?;
    }
    let session = Session::read_npz(File::open(&path)?)?;
    assert_eq!(session.position(), array![[0., 1., 2.], [3., 4., 5.]]);
    assert!(session.speed().is_none());
    Ok(())
}

#[test]
fn invalid_session_archive() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("invalid.npz");
    {
        let mut npz = NpzWriter::new(File::create(&path)?);
        npz.add_array("spikes.npy", &array![0.5])?;
        npz.add_array("timestamps.npy", &array![0., 1.])?;
        npz.add_array("position.npy", &array![0., 1., 2.])?;
        npz.finish()?;
    }
    let err = Session::read_npz(File::open(&path)?).unwrap_err();
    assert!(matches!(
        err,
        ReadSessionError::Invalid(Error::LengthMismatch {
            name: "position",
            ..
        })
    ));
    assert!(err.source().is_some());

    let path = dir.path().join("missing.npz");
    {
        let mut npz = NpzWriter::new(File::create(&path)?);
        npz.add_array("spikes.npy", &array![0.5])?;
        npz.finish()?;
    }
    assert!(matches!(
        Session::read_npz(File::open(&path)?),
        Err(ReadSessionError::Npz(_))
    ));
    Ok(())
}

#[test]
fn place_bins_archive() -> Result<(), Box<dyn StdError>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("place_bins.npz");
    let session = session_1d();
    let unit_a = session.trial_place_bins(2, &array![0.], &array![1.], &TrialOptions::default())?;
    let unit_b = session.place_bins(3, &Default::default(), None)?;
    let entries = [("unit_a", &unit_a), ("unit_b", &unit_b)];
    write_place_bins(File::create(&path)?, &entries)?;

    let mut npz = NpzReader::new(File::open(&path)?)?;
    assert_eq!(npz.names()?, vec!["unit_a.npy".to_string(), "unit_b.npy".to_string()]);
    let read: ArrayD<f64> = npz.by_name("unit_a.npy")?;
    assert_eq!(read, unit_a);
    let read: ArrayD<f64> = npz.by_name("unit_b.npy")?;
    assert_eq!(read, unit_b);
    Ok(())
}

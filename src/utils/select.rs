//! Selection of named summary statistics.

use crate::Error;
use ndarray::prelude::*;
use std::cmp::Ordering;
use std::str::FromStr;

/// A reduction of a 2d array along one axis.
pub type Reduction = fn(ArrayView2<'_, f64>, Axis) -> Array1<f64>;

/// Measures of central tendency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Average {
    Mean,
    Median,
}

/// Measures of dispersion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variance {
    /// Population standard deviation.
    Std,
    /// Population variance.
    Var,
    /// Standard error of the mean, using the sample standard deviation.
    Sem,
}

impl Average {
    const NAMES: [&'static str; 2] = ["mean", "median"];

    pub fn func(self) -> Reduction {
        match self {
            Average::Mean => mean,
            Average::Median => median,
        }
    }
}

impl Variance {
    const NAMES: [&'static str; 3] = ["std", "var", "sem"];

    pub fn func(self) -> Reduction {
        match self {
            Variance::Std => std_dev,
            Variance::Var => var,
            Variance::Sem => sem,
        }
    }
}

impl FromStr for Average {
    type Err = Error;

    fn from_str(s: &str) -> Result<Average, Error> {
        match s {
            "mean" => Ok(Average::Mean),
            "median" => Ok(Average::Median),
            other => Err(option_error("average", other, &Average::NAMES)),
        }
    }
}

impl FromStr for Variance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Variance, Error> {
        match s {
            "std" => Ok(Variance::Std),
            "var" => Ok(Variance::Var),
            "sem" => Ok(Variance::Sem),
            other => Err(option_error("variance", other, &Variance::NAMES)),
        }
    }
}

fn option_error(name: &'static str, value: &str, options: &[&str]) -> Error {
    Error::ParamOption {
        name,
        value: value.to_owned(),
        options: options.iter().map(|&opt| opt.to_owned()).collect(),
    }
}

/// Get the reduction function for a named average (`"mean"` or `"median"`).
///
/// # Example
///
/// ```
/// use ndarray::{array, Axis};
/// use spiketools::utils::select::get_avg_func;
///
/// let trials = array![[1., 2., 3.], [3., 4., 5.]];
/// let avg = get_avg_func("mean")?;
/// assert_eq!(avg(trials.view(), Axis(0)), array![2., 3., 4.]);
/// # Ok::<_, spiketools::Error>(())
/// ```
pub fn get_avg_func(name: &str) -> Result<Reduction, Error> {
    Ok(name.parse::<Average>()?.func())
}

/// Get the reduction function for a named variance measure (`"std"`,
/// `"var"` or `"sem"`).
pub fn get_var_func(name: &str) -> Result<Reduction, Error> {
    Ok(name.parse::<Variance>()?.func())
}

/// Applies `f` to every lane along `axis`, giving NaN for empty lanes.
fn reduce_lanes<F>(data: ArrayView2<'_, f64>, axis: Axis, f: F) -> Array1<f64>
where
    F: Fn(ArrayView1<'_, f64>) -> f64,
{
    if data.len_of(axis) == 0 {
        return Array1::from_elem(data.len_of(Axis(1 - axis.index())), f64::NAN);
    }
    data.lanes(axis).into_iter().map(f).collect()
}

fn mean(data: ArrayView2<'_, f64>, axis: Axis) -> Array1<f64> {
    reduce_lanes(data, axis, |lane| lane.sum() / lane.len() as f64)
}

fn median(data: ArrayView2<'_, f64>, axis: Axis) -> Array1<f64> {
    reduce_lanes(data, axis, |lane| {
        let mut sorted = lane.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.
        } else {
            sorted[mid]
        }
    })
}

fn var(data: ArrayView2<'_, f64>, axis: Axis) -> Array1<f64> {
    reduce_lanes(data, axis, |lane| lane.var(0.))
}

fn std_dev(data: ArrayView2<'_, f64>, axis: Axis) -> Array1<f64> {
    reduce_lanes(data, axis, |lane| lane.std(0.))
}

fn sem(data: ArrayView2<'_, f64>, axis: Axis) -> Array1<f64> {
    reduce_lanes(data, axis, |lane| {
        let n = lane.len() as f64;
        if n < 2. {
            f64::NAN
        } else {
            lane.std(1.) / n.sqrt()
        }
    })
}

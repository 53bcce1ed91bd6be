//! Shared utilities: parameter checks, data extraction and statistic selection.

pub mod checks;
pub mod extract;
pub mod select;

/// Index of the histogram bin holding `value`, given increasing bin `edges`.
///
/// Bins are half-open `[edges[i], edges[i + 1])`, except the last bin,
/// which also includes the final edge. Returns `None` for values outside the
/// edges and for NaN.
pub(crate) fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    let n_edges = edges.len();
    if n_edges < 2 || value.is_nan() || value < edges[0] || value > edges[n_edges - 1] {
        None
    } else if value == edges[n_edges - 1] {
        Some(n_edges - 2)
    } else {
        Some(edges.partition_point(|&edge| edge <= value) - 1)
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Score normalization shared by the local backends.

/// Softmax of `scores / temperature`, shifted by the maximum for stability.
///
/// Non-finite scores produce non-finite probabilities, which
/// [`Confidence::new`](crate::domain::geo::Confidence::new) then rejects.
pub(crate) fn softmax(scores: &[f64], temperature: f64) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores
        .iter()
        .map(|s| ((s - max) / temperature).exp())
        .collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Indices of the `k` largest values, largest first. Ties keep index order.
pub(crate) fn top_k_indices(values: &[f64], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    indices.truncate(k);
    indices
}

//! Sample and weighted quantiles over stacks

use crate::maybe_rayon::*;
use crate::stack::stack_apply;
use hydroflux_core::{Error, Grid, Result, Stack};
use ndarray::Array2;

/// Type-7 sample quantile of a set of defined values.
///
/// Returns missing when the input is empty or `q` falls outside [0, 1].
pub(crate) fn sample_quantile(values: &[f64], q: f64) -> f64 {
    if !(0.0..=1.0).contains(&q) || values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let h = q * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - h.floor();

    (1.0 - frac) * sorted[lo] + frac * sorted[hi]
}

/// Sample quantile `q` of the defined values at each cell,
/// interpolated with the Type-7 rule.
pub fn stack_quantile(stack: &Stack, q: f64) -> Result<Grid<f64>> {
    stack_apply(stack, true, move |v| sample_quantile(v, q))
}

/// Median of the defined values at each cell
pub fn stack_median(stack: &Stack) -> Result<Grid<f64>> {
    stack_quantile(stack, 0.5)
}

/// Weighted sample quantile of the defined values at each cell.
///
/// `weights` aligns with the depth axis and must be finite,
/// non-negative and not all zero. With equal weights the result matches
/// the classical Type-7 quantile. Sorted by value, the cumulative
/// position of the i-th pair is `S_i = i*w_i + (n-1) * sum(w_j, j < i)`
/// and the quantile interpolates linearly where `q * S_n` lands.
pub fn stack_weighted_quantile(stack: &Stack, q: f64, weights: &[f64]) -> Result<Grid<f64>> {
    let (rows, cols, depth) = stack.shape();

    if weights.len() != depth {
        return Err(Error::LengthMismatch {
            expected: depth,
            actual: weights.len(),
        });
    }
    if weights.iter().any(|w| w.is_nan() || *w < 0.0) {
        return Err(Error::InvalidParameter {
            name: "weights",
            value: format!("{weights:?}"),
            reason: "weights must be defined and non-negative".to_string(),
        });
    }
    if weights.iter().all(|&w| w == 0.0) {
        return Err(Error::InvalidParameter {
            name: "weights",
            value: "all zero".to_string(),
            reason: "at least one weight must be positive".to_string(),
        });
    }

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|i| {
            let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(depth);
            let mut row = vec![f64::NAN; cols];
            for (j, out) in row.iter_mut().enumerate() {
                pairs.clear();
                for k in 0..depth {
                    let val = unsafe { stack.get_unchecked(i, j, k) };
                    if !val.is_nan() {
                        pairs.push((val, weights[k]));
                    }
                }
                *out = weighted_quantile(&mut pairs, q);
            }
            row
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(Grid::from_array(array))
}

fn weighted_quantile(pairs: &mut [(f64, f64)], q: f64) -> f64 {
    if !(0.0..=1.0).contains(&q) || pairs.is_empty() {
        return f64::NAN;
    }

    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let n = pairs.len();
    if n == 1 {
        return pairs[0].0;
    }

    let total: f64 = pairs.iter().map(|p| p.1).sum();
    if total == 0.0 {
        return f64::NAN;
    }

    // S_i = i*w_i + (n-1) * prefix_i, with S_n = (n-1) * total
    let mut positions = Vec::with_capacity(n);
    let mut prefix = 0.0;
    for (i, &(_, w)) in pairs.iter().enumerate() {
        positions.push(i as f64 * w + (n - 1) as f64 * prefix);
        prefix += w;
    }

    let target = q * (n - 1) as f64 * total;

    let mut k = 0;
    while k + 1 < n && positions[k + 1] <= target {
        k += 1;
    }
    if k == n - 1 {
        return pairs[n - 1].0;
    }

    let span = positions[k + 1] - positions[k];
    if span == 0.0 {
        return pairs[k].0;
    }

    let frac = (target - positions[k]) / span;
    pairs[k].0 + frac * (pairs[k + 1].0 - pairs[k].0)
}

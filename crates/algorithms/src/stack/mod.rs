//! Slice-wise reductions over 3-D stacks
//!
//! Every reduction gathers the length-depth vector at each (row, col),
//! optionally strips missing values, and reduces it to one number. The
//! missing-value rule is "ignore NaN" unless a reduction states
//! otherwise; an all-missing vector reduces to missing.

mod quantile;
mod rank;

pub use quantile::{stack_median, stack_quantile, stack_weighted_quantile};
pub use rank::{stack_max_rank, stack_min_rank, stack_select, stack_sort};

use crate::maybe_rayon::*;
use hydroflux_core::{Error, Grid, Result, Stack};
use ndarray::Array2;

/// Apply a reduction to each cell's depth vector.
///
/// With `remove_missing`, the closure sees only the defined values of
/// the slice, in depth order. Without it, the closure sees the raw
/// slice including NaNs (needed by index-reporting reductions).
pub(crate) fn stack_apply<F>(stack: &Stack, remove_missing: bool, f: F) -> Result<Grid<f64>>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    let (rows, cols, depth) = stack.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|i| {
            let mut args = Vec::with_capacity(depth);
            let mut row = vec![f64::NAN; cols];
            for (j, out) in row.iter_mut().enumerate() {
                args.clear();
                for k in 0..depth {
                    let val = unsafe { stack.get_unchecked(i, j, k) };
                    if !remove_missing || !val.is_nan() {
                        args.push(val);
                    }
                }
                *out = f(&args);
            }
            row
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(Grid::from_array(array))
}

/// Sum of defined values at each cell; all-missing cells stay missing.
pub fn stack_sum(stack: &Stack) -> Result<Grid<f64>> {
    stack_apply(stack, true, |v| {
        if v.is_empty() {
            f64::NAN
        } else {
            v.iter().sum()
        }
    })
}

/// Mean of defined values at each cell
pub fn stack_mean(stack: &Stack) -> Result<Grid<f64>> {
    stack_apply(stack, true, |v| {
        if v.is_empty() {
            f64::NAN
        } else {
            v.iter().sum::<f64>() / v.len() as f64
        }
    })
}

/// Minimum defined value at each cell
pub fn stack_min(stack: &Stack) -> Result<Grid<f64>> {
    stack_apply(stack, true, |v| {
        if v.is_empty() {
            f64::NAN
        } else {
            v.iter().copied().fold(f64::INFINITY, f64::min)
        }
    })
}

/// Maximum defined value at each cell
pub fn stack_max(stack: &Stack) -> Result<Grid<f64>> {
    stack_apply(stack, true, |v| {
        if v.is_empty() {
            f64::NAN
        } else {
            v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    })
}

/// 1-based depth index of the first minimum defined value at each cell
pub fn stack_which_min(stack: &Stack) -> Result<Grid<f64>> {
    stack_apply(stack, false, |v| which_extreme(v, |a, b| a < b))
}

/// 1-based depth index of the first maximum defined value at each cell
pub fn stack_which_max(stack: &Stack) -> Result<Grid<f64>> {
    stack_apply(stack, false, |v| which_extreme(v, |a, b| a > b))
}

fn which_extreme(values: &[f64], better: impl Fn(f64, f64) -> bool) -> f64 {
    let mut best: Option<usize> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            None => best = Some(i),
            Some(b) if better(v, values[b]) => best = Some(i),
            Some(_) => {}
        }
    }

    match best {
        Some(i) => (i + 1) as f64,
        None => f64::NAN,
    }
}

/// Count of defined values at each cell
pub fn stack_num_defined(stack: &Stack) -> Result<Grid<f64>> {
    stack_apply(stack, true, |v| v.len() as f64)
}

/// Fraction of the depth that is defined at each cell
pub fn stack_frac_defined(stack: &Stack) -> Result<Grid<f64>> {
    let depth = stack.depth() as f64;
    stack_apply(stack, true, move |v| v.len() as f64 / depth)
}

/// Fraction of defined values above zero at each cell;
/// all-missing cells stay missing.
pub fn stack_frac_defined_above_zero(stack: &Stack) -> Result<Grid<f64>> {
    stack_apply(stack, true, |v| {
        if v.is_empty() {
            f64::NAN
        } else {
            v.iter().filter(|&&x| x > 0.0).count() as f64 / v.len() as f64
        }
    })
}

//! Block aggregation of grids
//!
//! Collapses every f×f block of the input to a single cell. Missing
//! values do not poison a block: a block with at least one defined value
//! reduces over its defined values only, and an all-missing block stays
//! missing.

use crate::calendar::mean_doy;
use hydroflux_core::{Error, Grid, Result};

fn check_factor(grid: &Grid<f64>, factor: usize) -> Result<(usize, usize)> {
    if factor == 0 {
        return Err(Error::InvalidParameter {
            name: "factor",
            value: factor.to_string(),
            reason: "aggregation factor must be positive".to_string(),
        });
    }

    let (rows, cols) = grid.shape();
    if rows % factor != 0 || cols % factor != 0 {
        return Err(Error::NotDivisible { factor, rows, cols });
    }

    Ok((rows / factor, cols / factor))
}

/// Aggregate a grid by summing each f×f block.
///
/// Missing cells are ignored; a block with no defined cells yields a
/// missing cell.
pub fn aggregate_sum(grid: &Grid<f64>, factor: usize) -> Result<Grid<f64>> {
    let (out_rows, out_cols) = check_factor(grid, factor)?;
    let (rows, cols) = grid.shape();

    let mut out: Grid<f64> = Grid::missing(out_rows, out_cols);

    for i in 0..rows {
        for j in 0..cols {
            let val = unsafe { grid.get_unchecked(i, j) };
            if val.is_nan() {
                continue;
            }

            let cur = unsafe { out.get_unchecked(i / factor, j / factor) };
            let next = if cur.is_nan() { val } else { cur + val };
            unsafe { out.set_unchecked(i / factor, j / factor, next) };
        }
    }

    Ok(out)
}

/// Aggregate a grid by averaging each f×f block.
///
/// The mean divides by the count of defined cells in the block, not by
/// f². A block with no defined cells yields a missing cell.
pub fn aggregate_mean(grid: &Grid<f64>, factor: usize) -> Result<Grid<f64>> {
    let (out_rows, out_cols) = check_factor(grid, factor)?;
    let (rows, cols) = grid.shape();

    let mut sum: Grid<f64> = Grid::missing(out_rows, out_cols);
    let mut count: Grid<i32> = Grid::new(out_rows, out_cols);

    for i in 0..rows {
        for j in 0..cols {
            let val = unsafe { grid.get_unchecked(i, j) };
            if val.is_nan() {
                continue;
            }

            let cur = unsafe { sum.get_unchecked(i / factor, j / factor) };
            let next = if cur.is_nan() { val } else { cur + val };
            unsafe {
                sum.set_unchecked(i / factor, j / factor, next);
                let n = count.get_unchecked(i / factor, j / factor);
                count.set_unchecked(i / factor, j / factor, n + 1);
            }
        }
    }

    for i in 0..out_rows {
        for j in 0..out_cols {
            let n = unsafe { count.get_unchecked(i, j) };
            if n > 0 {
                let s = unsafe { sum.get_unchecked(i, j) };
                unsafe { sum.set_unchecked(i, j, s / n as f64) };
            }
        }
    }

    Ok(sum)
}

/// Aggregate a grid of day-of-year values [1, 365] by the circular mean
/// of each f×f block.
///
/// Day numbers wrap: the mean of {1, 365} is 365 or 1, never mid-year.
pub fn aggregate_mean_doy(grid: &Grid<f64>, factor: usize) -> Result<Grid<f64>> {
    let (out_rows, out_cols) = check_factor(grid, factor)?;

    let mut out = Grid::missing(out_rows, out_cols);
    let mut block = Vec::with_capacity(factor * factor);

    for i in 0..out_rows {
        for j in 0..out_cols {
            block.clear();
            for ii in 0..factor {
                for jj in 0..factor {
                    let val = unsafe { grid.get_unchecked(i * factor + ii, j * factor + jj) };
                    if !val.is_nan() {
                        block.push(val);
                    }
                }
            }

            if let Some(doy) = mean_doy(block.iter().copied()) {
                unsafe { out.set_unchecked(i, j, doy) };
            }
        }
    }

    Ok(out)
}

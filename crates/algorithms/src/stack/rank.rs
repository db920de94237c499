//! Ranking, sorting and windowed selection over stacks

use hydroflux_core::{Error, Grid, Result, Stack};

fn check_footprint(grid: &Grid<f64>, rows: usize, cols: usize) -> Result<()> {
    if grid.shape() != (rows, cols) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: grid.rows(),
            ac: grid.cols(),
        });
    }
    Ok(())
}

fn rank_against(x: &Grid<f64>, obs: &Stack, strict: bool) -> Result<Grid<f64>> {
    let (rows, cols, depth) = obs.shape();
    check_footprint(x, rows, cols)?;

    let mut out = Grid::missing(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let val = unsafe { x.get_unchecked(i, j) };
            if val.is_nan() {
                continue;
            }

            let mut below = 0;
            for k in 0..depth {
                let o = unsafe { obs.get_unchecked(i, j, k) };
                if o.is_nan() {
                    continue;
                }
                if (strict && o < val) || (!strict && o <= val) {
                    below += 1;
                }
            }

            unsafe { out.set_unchecked(i, j, (1 + below) as f64) };
        }
    }

    Ok(out)
}

/// Rank of each `x` cell against the observations at that cell:
/// one plus the count of observations strictly less than `x`.
///
/// All-missing observations rank `x` first; missing `x` stays missing.
pub fn stack_min_rank(x: &Grid<f64>, obs: &Stack) -> Result<Grid<f64>> {
    rank_against(x, obs, true)
}

/// Rank of each `x` cell against the observations at that cell:
/// one plus the count of observations less than or equal to `x`.
pub fn stack_max_rank(x: &Grid<f64>, obs: &Stack) -> Result<Grid<f64>> {
    rank_against(x, obs, false)
}

/// Sort each cell's series ascending, with missing values moved to the
/// end of the slice.
pub fn stack_sort(stack: &Stack) -> Stack {
    let (rows, cols, depth) = stack.shape();
    let mut out = Stack::filled(rows, cols, depth, f64::NAN);
    let mut buf = Vec::with_capacity(depth);

    for i in 0..rows {
        for j in 0..cols {
            buf.clear();
            for k in 0..depth {
                let val = unsafe { stack.get_unchecked(i, j, k) };
                if !val.is_nan() {
                    buf.push(val);
                }
            }
            buf.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            for (k, &val) in buf.iter().enumerate() {
                unsafe { out.set_unchecked(i, j, k, val) };
            }
        }
    }

    out
}

/// Extract a window of `n` elements from each cell's series, starting
/// at the 1-based depth index in `start`. Positions outside the series
/// (including every position when `start` is missing) take `fill`.
pub fn stack_select(stack: &Stack, start: &Grid<f64>, n: usize, fill: f64) -> Result<Stack> {
    let (rows, cols, depth) = stack.shape();
    check_footprint(start, rows, cols)?;

    let mut out = Stack::filled(rows, cols, n, fill);

    for i in 0..rows {
        for j in 0..cols {
            let begin = unsafe { start.get_unchecked(i, j) };
            if begin.is_nan() {
                continue;
            }
            let begin = begin as i64 - 1;

            for m in 0..n {
                let k = begin + m as i64;
                if k >= 0 && (k as usize) < depth {
                    let val = unsafe { stack.get_unchecked(i, j, k as usize) };
                    unsafe { out.set_unchecked(i, j, m, val) };
                }
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    #[test]
    fn test_min_rank_counts_strictly_less() {
        let x = Grid::from_vec(vec![2.0], 1, 1).unwrap();
        let obs = Stack::from_vec(vec![1.0, 2.0, 3.0, 2.0], 1, 1, 4).unwrap();

        let out = stack_min_rank(&x, &obs).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 2.0);
    }

    #[test]
    fn test_max_rank_counts_less_or_equal() {
        let x = Grid::from_vec(vec![2.0], 1, 1).unwrap();
        let obs = Stack::from_vec(vec![1.0, 2.0, 3.0, 2.0], 1, 1, 4).unwrap();

        let out = stack_max_rank(&x, &obs).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 4.0);
    }

    #[test]
    fn test_rank_missing_rules() {
        let x = Grid::from_vec(vec![2.0, NAN], 1, 2).unwrap();
        let obs = Stack::filled(1, 2, 3, NAN);

        let out = stack_min_rank(&x, &obs).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 1.0);
        assert!(out.get(0, 1).unwrap().is_nan());
    }

    #[test]
    fn test_rank_shape_mismatch() {
        let x = Grid::<f64>::new(2, 2);
        let obs = Stack::new(1, 2, 3);
        assert!(stack_min_rank(&x, &obs).is_err());
    }

    #[test]
    fn test_sort_moves_missing_to_back() {
        let stack = Stack::from_vec(vec![3.0, NAN, 1.0, 2.0], 1, 1, 4).unwrap();
        let out = stack_sort(&stack);

        assert_eq!(out.get(0, 0, 0).unwrap(), 1.0);
        assert_eq!(out.get(0, 0, 1).unwrap(), 2.0);
        assert_eq!(out.get(0, 0, 2).unwrap(), 3.0);
        assert!(out.get(0, 0, 3).unwrap().is_nan());
    }

    #[test]
    fn test_select_window() {
        let stack = Stack::from_vec(vec![10.0, 20.0, 30.0, 40.0], 1, 1, 4).unwrap();
        let start = Grid::from_vec(vec![2.0], 1, 1).unwrap();

        let out = stack_select(&stack, &start, 2, -1.0).unwrap();
        assert_eq!(out.depth(), 2);
        assert_eq!(out.get(0, 0, 0).unwrap(), 20.0);
        assert_eq!(out.get(0, 0, 1).unwrap(), 30.0);
    }

    #[test]
    fn test_select_out_of_range_fills() {
        let stack = Stack::from_vec(vec![10.0, 20.0, 30.0], 1, 1, 3).unwrap();
        let start = Grid::from_vec(vec![3.0], 1, 1).unwrap();

        let out = stack_select(&stack, &start, 3, -1.0).unwrap();
        assert_eq!(out.get(0, 0, 0).unwrap(), 30.0);
        assert_eq!(out.get(0, 0, 1).unwrap(), -1.0);
        assert_eq!(out.get(0, 0, 2).unwrap(), -1.0);
    }

    #[test]
    fn test_select_missing_start_fills() {
        let stack = Stack::from_vec(vec![10.0, 20.0], 1, 1, 2).unwrap();
        let start = Grid::from_vec(vec![NAN], 1, 1).unwrap();

        let out = stack_select(&stack, &start, 2, 0.0).unwrap();
        assert_eq!(out.get(0, 0, 0).unwrap(), 0.0);
        assert_eq!(out.get(0, 0, 1).unwrap(), 0.0);
    }
}

//! Block disaggregation of grids

use hydroflux_core::{Error, Grid, Result};

fn check_positive_factor(factor: usize) -> Result<()> {
    if factor == 0 {
        return Err(Error::InvalidParameter {
            name: "factor",
            value: factor.to_string(),
            reason: "disaggregation factor must be positive".to_string(),
        });
    }
    Ok(())
}

/// Disaggregate a grid by repeating each cell over an f×f block.
pub fn disaggregate(grid: &Grid<f64>, factor: usize) -> Result<Grid<f64>> {
    check_positive_factor(factor)?;

    let (rows, cols) = grid.shape();
    let mut out = Grid::new(rows * factor, cols * factor);

    for i in 0..rows {
        for j in 0..cols {
            let val = unsafe { grid.get_unchecked(i, j) };
            for p in 0..factor {
                for q in 0..factor {
                    unsafe { out.set_unchecked(i * factor + p, j * factor + q, val) };
                }
            }
        }
    }

    Ok(out)
}

/// Disaggregate a grid of amounts, dividing each cell's value evenly
/// over the f×f cells it becomes.
pub fn disaggregate_amount(grid: &Grid<f64>, factor: usize) -> Result<Grid<f64>> {
    check_positive_factor(factor)?;

    let share = (factor * factor) as f64;
    let (rows, cols) = grid.shape();
    let mut out = Grid::new(rows * factor, cols * factor);

    for i in 0..rows {
        for j in 0..cols {
            let val = unsafe { grid.get_unchecked(i, j) } / share;
            for p in 0..factor {
                for q in 0..factor {
                    unsafe { out.set_unchecked(i * factor + p, j * factor + q, val) };
                }
            }
        }
    }

    Ok(out)
}

/// Pointwise operator for [`disaggregate_pfun`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointwiseOp {
    Sum,
    Difference,
    Product,
    Quotient,
}

impl PointwiseOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            PointwiseOp::Sum => a + b,
            PointwiseOp::Difference => a - b,
            PointwiseOp::Product => a * b,
            PointwiseOp::Quotient => a / b,
        }
    }
}

/// Tile the coarse grid up to the fine grid's resolution and combine the
/// two pointwise.
///
/// The fine grid's dimensions must be an integer multiple of the coarse
/// grid's, with the same factor on both axes. The result takes the fine
/// grid's shape, computed as `op(tiled_coarse, fine)` in argument order.
///
/// When `na_rm` is true a missing value on one side acts as the
/// identity: combining missing with a defined value yields the defined
/// value, and two missings stay missing. When false, missing propagates.
pub fn disaggregate_pfun(
    coarse: &Grid<f64>,
    fine: &Grid<f64>,
    op: PointwiseOp,
    na_rm: bool,
) -> Result<Grid<f64>> {
    let (crows, ccols) = coarse.shape();
    let (frows, fcols) = fine.shape();

    if crows == 0 || ccols == 0 {
        return Err(Error::InvalidDimensions { rows: crows, cols: ccols });
    }

    let factor = frows / crows;
    if factor == 0
        || frows != crows * factor
        || fcols != ccols * factor
    {
        return Err(Error::SizeMismatch {
            er: crows * factor.max(1),
            ec: ccols * factor.max(1),
            ar: frows,
            ac: fcols,
        });
    }

    let mut out = Grid::new(frows, fcols);

    for i in 0..frows {
        for j in 0..fcols {
            let a = unsafe { coarse.get_unchecked(i / factor, j / factor) };
            let b = unsafe { fine.get_unchecked(i, j) };

            let val = if na_rm {
                match (a.is_nan(), b.is_nan()) {
                    (true, true) => f64::NAN,
                    (true, false) => b,
                    (false, true) => a,
                    (false, false) => op.apply(a, b),
                }
            } else {
                op.apply(a, b)
            };

            unsafe { out.set_unchecked(i, j, val) };
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_disaggregate_repeats_cells() {
        let grid = Grid::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let out = disaggregate(&grid, 2).unwrap();

        assert_eq!(out.shape(), (4, 4));
        assert_eq!(out.get(0, 0).unwrap(), 1.0);
        assert_eq!(out.get(1, 1).unwrap(), 1.0);
        assert_eq!(out.get(0, 2).unwrap(), 2.0);
        assert_eq!(out.get(3, 3).unwrap(), 4.0);
    }

    #[test]
    fn test_disaggregate_amount_conserves_total() {
        let grid = Grid::from_vec(vec![8.0, 4.0], 1, 2).unwrap();
        let out = disaggregate_amount(&grid, 2).unwrap();

        assert_eq!(out.get(0, 0).unwrap(), 2.0);
        assert_eq!(out.get(1, 3).unwrap(), 1.0);

        let total: f64 = out.data().iter().sum();
        assert_relative_eq!(total, 12.0);
    }

    #[test]
    fn test_disaggregate_zero_factor() {
        let grid = Grid::<f64>::new(2, 2);
        assert!(disaggregate(&grid, 0).is_err());
    }

    #[test]
    fn test_pfun_difference() {
        let coarse = Grid::from_vec(vec![10.0], 1, 1).unwrap();
        let fine = Grid::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();

        let out = disaggregate_pfun(&coarse, &fine, PointwiseOp::Difference, false).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 9.0);
        assert_eq!(out.get(1, 1).unwrap(), 6.0);
    }

    #[test]
    fn test_pfun_na_rm_identity() {
        let coarse = Grid::from_vec(vec![f64::NAN], 1, 1).unwrap();
        let fine = Grid::from_vec(vec![1.0, f64::NAN, 3.0, 4.0], 2, 2).unwrap();

        let out = disaggregate_pfun(&coarse, &fine, PointwiseOp::Sum, true).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 1.0);
        assert!(out.get(0, 1).unwrap().is_nan());

        let strict = disaggregate_pfun(&coarse, &fine, PointwiseOp::Sum, false).unwrap();
        assert!(strict.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_round_trip_through_aggregate_mean() {
        use crate::resample::aggregate_mean;

        let grid = Grid::from_vec(
            vec![
                1.0, 3.0, f64::NAN, f64::NAN, //
                5.0, 7.0, f64::NAN, f64::NAN,
            ],
            2,
            4,
        )
        .unwrap();

        let back = disaggregate(&aggregate_mean(&grid, 2).unwrap(), 2).unwrap();

        // Defined blocks come back as their block mean, fully-missing
        // blocks stay missing
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(back.get(i, j).unwrap(), 4.0);
                assert!(back.get(i, j + 2).unwrap().is_nan());
            }
        }
    }

    #[test]
    fn test_pfun_shape_mismatch() {
        let coarse = Grid::<f64>::new(2, 2);
        let fine = Grid::<f64>::new(3, 3);
        assert!(disaggregate_pfun(&coarse, &fine, PointwiseOp::Sum, false).is_err());
    }
}

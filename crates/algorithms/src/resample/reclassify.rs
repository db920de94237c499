//! Value mapping: reclassification, substitution and coalescing

use hydroflux_core::{Error, Grid, Result};
use std::collections::HashMap;

// f64 is not hashable; keys are stored as bit patterns with -0.0
// normalized so 0.0 and -0.0 map the same way. NaN keys are never
// inserted or looked up, so missing inputs cannot match by equality.
fn key(value: f64) -> u64 {
    let v = if value == 0.0 { 0.0 } else { value };
    v.to_bits()
}

/// Reclassify each cell through a table of (original, replacement) pairs.
///
/// A row whose original value is missing specifies the replacement for
/// missing inputs. Defined values not found in the table become missing
/// when `na_default` is true; otherwise they fail the operation.
pub fn reclassify(grid: &Grid<f64>, table: &[(f64, f64)], na_default: bool) -> Result<Grid<f64>> {
    let mut lookup: HashMap<u64, f64> = HashMap::with_capacity(table.len());
    let mut missing_replacement = None;

    for &(from, to) in table {
        if from.is_nan() {
            if !to.is_nan() {
                missing_replacement = Some(to);
            }
        } else {
            lookup.insert(key(from), to);
        }
    }

    let (rows, cols) = grid.shape();
    let mut out = Grid::new(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let val = unsafe { grid.get_unchecked(i, j) };

            let mapped = if val.is_nan() {
                match missing_replacement {
                    Some(r) => r,
                    None if na_default => f64::NAN,
                    None => return Err(Error::UnmappedValue(val)),
                }
            } else {
                match lookup.get(&key(val)) {
                    Some(&r) => r,
                    None if na_default => f64::NAN,
                    None => return Err(Error::UnmappedValue(val)),
                }
            };

            unsafe { out.set_unchecked(i, j, mapped) };
        }
    }

    Ok(out)
}

/// Substitute specified values in a grid with replacements.
///
/// `pairs` is a flat sequence `value_1, replacement_1, value_2,
/// replacement_2, ...`; cells equal to a listed value take its
/// replacement, all other cells pass through unchanged.
pub fn substitute(grid: &Grid<f64>, pairs: &[f64]) -> Result<Grid<f64>> {
    if pairs.len() % 2 != 0 {
        return Err(Error::InvalidParameter {
            name: "pairs",
            value: pairs.len().to_string(),
            reason: "substitutions must come in (value, replacement) pairs".to_string(),
        });
    }

    let mut lookup: HashMap<u64, f64> = HashMap::with_capacity(pairs.len() / 2);
    for chunk in pairs.chunks_exact(2) {
        if !chunk[0].is_nan() {
            lookup.insert(key(chunk[0]), chunk[1]);
        }
    }

    Ok(grid.map(|val| {
        if val.is_nan() {
            return val;
        }
        lookup.get(&key(val)).copied().unwrap_or(val)
    }))
}

/// Replace missing values with a constant.
pub fn coalesce(grid: &Grid<f64>, replacement: f64) -> Grid<f64> {
    grid.map(|val| if val.is_nan() { replacement } else { val })
}

/// Replace missing values with the aligned cell of a same-shape grid.
pub fn coalesce_grid(grid: &Grid<f64>, replacement: &Grid<f64>) -> Result<Grid<f64>> {
    grid.check_same_shape(replacement)?;

    let (rows, cols) = grid.shape();
    let mut out = Grid::new(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let val = unsafe { grid.get_unchecked(i, j) };
            let val = if val.is_nan() {
                unsafe { replacement.get_unchecked(i, j) }
            } else {
                val
            };
            unsafe { out.set_unchecked(i, j, val) };
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reclassify_basic() {
        let grid = Grid::from_vec(vec![1.0, 2.0, 1.0, 3.0], 2, 2).unwrap();
        let table = [(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)];

        let out = reclassify(&grid, &table, false).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 10.0);
        assert_eq!(out.get(0, 1).unwrap(), 20.0);
        assert_eq!(out.get(1, 1).unwrap(), 30.0);
    }

    #[test]
    fn test_reclassify_missing_row() {
        let grid = Grid::from_vec(vec![1.0, f64::NAN], 1, 2).unwrap();
        let table = [(1.0, 10.0), (f64::NAN, -1.0)];

        let out = reclassify(&grid, &table, false).unwrap();
        assert_eq!(out.get(0, 1).unwrap(), -1.0);
    }

    #[test]
    fn test_reclassify_unmapped() {
        let grid = Grid::from_vec(vec![1.0, 7.0], 1, 2).unwrap();
        let table = [(1.0, 10.0)];

        let lenient = reclassify(&grid, &table, true).unwrap();
        assert!(lenient.get(0, 1).unwrap().is_nan());

        assert!(matches!(
            reclassify(&grid, &table, false),
            Err(Error::UnmappedValue(v)) if v == 7.0
        ));
    }

    #[test]
    fn test_substitute() {
        let grid = Grid::from_vec(vec![1.0, 2.0, 3.0, f64::NAN], 2, 2).unwrap();
        let out = substitute(&grid, &[2.0, -2.0, 3.0, -3.0]).unwrap();

        assert_eq!(out.get(0, 0).unwrap(), 1.0);
        assert_eq!(out.get(0, 1).unwrap(), -2.0);
        assert_eq!(out.get(1, 0).unwrap(), -3.0);
        assert!(out.get(1, 1).unwrap().is_nan());
    }

    #[test]
    fn test_substitute_odd_pairs() {
        let grid = Grid::<f64>::new(1, 1);
        assert!(substitute(&grid, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_coalesce() {
        let grid = Grid::from_vec(vec![1.0, f64::NAN], 1, 2).unwrap();
        let out = coalesce(&grid, 0.0);
        assert_eq!(out.get(0, 0).unwrap(), 1.0);
        assert_eq!(out.get(0, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_coalesce_grid() {
        let grid = Grid::from_vec(vec![1.0, f64::NAN], 1, 2).unwrap();
        let fill = Grid::from_vec(vec![9.0, 8.0], 1, 2).unwrap();

        let out = coalesce_grid(&grid, &fill).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 1.0);
        assert_eq!(out.get(0, 1).unwrap(), 8.0);

        let wrong = Grid::<f64>::new(2, 2);
        assert!(coalesce_grid(&grid, &wrong).is_err());
    }
}

//! Gridded evaluation of distribution kernels and forecast correction

use crate::distributions::{Distribution, ParamGrids};
use crate::maybe_rayon::*;
use hydroflux_core::{Error, Grid, Result};
use ndarray::Array2;

/// A grid argument or a scalar broadcast across the output shape
#[derive(Debug, Clone, Copy)]
pub enum GridOrScalar<'a> {
    Grid(&'a Grid<f64>),
    Scalar(f64),
}

impl<'a> GridOrScalar<'a> {
    fn shape(&self) -> Option<(usize, usize)> {
        match self {
            GridOrScalar::Grid(g) => Some(g.shape()),
            GridOrScalar::Scalar(_) => None,
        }
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        match self {
            GridOrScalar::Grid(g) => unsafe { g.get_unchecked(row, col) },
            GridOrScalar::Scalar(v) => *v,
        }
    }
}

impl<'a> From<&'a Grid<f64>> for GridOrScalar<'a> {
    fn from(grid: &'a Grid<f64>) -> Self {
        GridOrScalar::Grid(grid)
    }
}

impl<'a> From<f64> for GridOrScalar<'a> {
    fn from(value: f64) -> Self {
        GridOrScalar::Scalar(value)
    }
}

/// Resolve the common shape of a set of grid-or-scalar arguments.
///
/// At least one argument must be a grid; all grids must agree.
fn common_shape(args: &[GridOrScalar<'_>]) -> Result<(usize, usize)> {
    let mut shape: Option<(usize, usize)> = None;

    for arg in args {
        if let Some((r, c)) = arg.shape() {
            match shape {
                None => shape = Some((r, c)),
                Some((er, ec)) if (er, ec) != (r, c) => {
                    return Err(Error::SizeMismatch { er, ec, ar: r, ac: c });
                }
                Some(_) => {}
            }
        }
    }

    shape.ok_or(Error::InvalidParameter {
        name: "data",
        value: "scalar".to_string(),
        reason: "at least one argument must be a grid".to_string(),
    })
}

fn apply_elementwise<'a>(
    args: [GridOrScalar<'a>; 4],
    f: impl Fn(f64, f64, f64, f64) -> f64 + Sync,
) -> Result<Grid<f64>> {
    let (rows, cols) = common_shape(&args)?;
    let [x, location, scale, shape] = args;

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|i| {
            let mut row = vec![f64::NAN; cols];
            for (j, out) in row.iter_mut().enumerate() {
                *out = f(x.get(i, j), location.get(i, j), scale.get(i, j), shape.get(i, j));
            }
            row
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(Grid::from_array(array))
}

/// Evaluate a distribution's CDF elementwise.
///
/// Every argument may be a grid or a scalar broadcast across the others;
/// at least one must be a grid and all grids must share a shape.
pub fn cdf_grid<'a>(
    dist: Distribution,
    data: impl Into<GridOrScalar<'a>>,
    location: impl Into<GridOrScalar<'a>>,
    scale: impl Into<GridOrScalar<'a>>,
    shape: impl Into<GridOrScalar<'a>>,
) -> Result<Grid<f64>> {
    apply_elementwise(
        [data.into(), location.into(), scale.into(), shape.into()],
        move |x, l, s, k| dist.cdf(x, l, s, k),
    )
}

/// Evaluate a distribution's quantile function elementwise.
///
/// Broadcasting rules match [`cdf_grid`].
pub fn qua_grid<'a>(
    dist: Distribution,
    probability: impl Into<GridOrScalar<'a>>,
    location: impl Into<GridOrScalar<'a>>,
    scale: impl Into<GridOrScalar<'a>>,
    shape: impl Into<GridOrScalar<'a>>,
) -> Result<Grid<f64>> {
    apply_elementwise(
        [probability.into(), location.into(), scale.into(), shape.into()],
        move |f, l, s, k| dist.qua(f, l, s, k),
    )
}

/// Bias-correct a forecast by quantile matching.
///
/// Each forecast value is placed on the CDF of the retrospective
/// forecast distribution, the quantile is clamped to
/// `[1/extreme_cutoff, 1 - 1/extreme_cutoff]`, and the corrected value
/// is read from the observed distribution at that quantile.
///
/// Cells with missing data stay missing. Where any retrospective
/// parameter is missing the quantile falls back to `when_undefined`, and
/// where the observed scale or shape is missing the observed location is
/// returned directly.
pub fn forecast_correct(
    dist: Distribution,
    data: &Grid<f64>,
    obs: &ParamGrids,
    retro: &ParamGrids,
    extreme_cutoff: f64,
    when_undefined: f64,
) -> Result<Grid<f64>> {
    if !(extreme_cutoff.is_finite() && extreme_cutoff > 1.0) {
        return Err(Error::InvalidParameter {
            name: "extreme_cutoff",
            value: extreme_cutoff.to_string(),
            reason: "cutoff must be finite and greater than one".to_string(),
        });
    }

    data.check_same_shape(&obs.location)?;
    data.check_same_shape(&retro.location)?;

    let min_quantile = 1.0 / extreme_cutoff;
    let max_quantile = 1.0 - min_quantile;

    let (rows, cols) = data.shape();
    let corrected: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|i| {
            let mut row = vec![f64::NAN; cols];
            for (j, out) in row.iter_mut().enumerate() {
                let x = unsafe { data.get_unchecked(i, j) };
                if x.is_nan() {
                    continue;
                }

                let rl = unsafe { retro.location.get_unchecked(i, j) };
                let rs = unsafe { retro.scale.get_unchecked(i, j) };
                let rk = unsafe { retro.shape.get_unchecked(i, j) };

                let quantile = if rl.is_nan() || rs.is_nan() || rk.is_nan() {
                    when_undefined
                } else {
                    dist.cdf(x, rl, rs, rk)
                };
                let quantile = quantile.min(max_quantile).max(min_quantile);

                let ol = unsafe { obs.location.get_unchecked(i, j) };
                let os = unsafe { obs.scale.get_unchecked(i, j) };
                let ok = unsafe { obs.shape.get_unchecked(i, j) };

                *out = if os.is_nan() || ok.is_nan() {
                    ol
                } else {
                    dist.qua(quantile, ol, os, ok)
                };
            }
            row
        })
        .collect();

    let array = Array2::from_shape_vec((rows, cols), corrected)
        .map_err(|e| Error::Other(e.to_string()))?;
    Ok(Grid::from_array(array))
}

//! GEV and Pearson Type-III distribution kernels
//!
//! Both distributions are parameterized by (location, scale, shape).
//! The shape parameter controls the tail; a missing parameter marks the
//! distribution as undefined, and undefined distributions evaluate to
//! missing.

mod grid_ops;

pub use grid_ops::{cdf_grid, forecast_correct, qua_grid, GridOrScalar};

use hydroflux_core::{Grid, Result};
use statrs::distribution::{ContinuousCDF, Gamma, Normal};

/// Below this magnitude the Pearson-III shape is treated as zero and the
/// distribution degenerates to a normal with (location, scale).
pub const PE3_SHAPE_EPSILON: f64 = 1e-6;

/// Distribution family selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Generalized Extreme Value
    Gev,
    /// Pearson Type-III
    Pearson3,
}

impl Distribution {
    /// Cumulative distribution function at `x`
    pub fn cdf(self, x: f64, location: f64, scale: f64, shape: f64) -> f64 {
        match self {
            Distribution::Gev => cdf_gev(x, location, scale, shape),
            Distribution::Pearson3 => cdf_pe3(x, location, scale, shape),
        }
    }

    /// Quantile function at cumulative probability `f`
    pub fn qua(self, f: f64, location: f64, scale: f64, shape: f64) -> f64 {
        match self {
            Distribution::Gev => qua_gev(f, location, scale, shape),
            Distribution::Pearson3 => qua_pe3(f, location, scale, shape),
        }
    }
}

fn any_nan(location: f64, scale: f64, shape: f64) -> bool {
    location.is_nan() || scale.is_nan() || shape.is_nan()
}

fn cdf_gev(x: f64, location: f64, scale: f64, shape: f64) -> f64 {
    if x.is_nan() || any_nan(location, scale, shape) {
        return f64::NAN;
    }

    let mut y = (x - location) / scale;
    if shape != 0.0 {
        y = -1.0 / shape * (1.0 - shape * y).max(0.0).ln();
    }

    (-(-y).exp()).exp()
}

fn qua_gev(f: f64, location: f64, scale: f64, shape: f64) -> f64 {
    if f.is_nan() || any_nan(location, scale, shape) {
        return f64::NAN;
    }

    if shape == 0.0 {
        location - scale * (-f.ln()).ln()
    } else {
        location + scale / shape * (1.0 - (-f.ln()).powf(shape))
    }
}

fn cdf_pe3(x: f64, location: f64, scale: f64, shape: f64) -> f64 {
    if x.is_nan() || any_nan(location, scale, shape) {
        return f64::NAN;
    }

    if shape.abs() < PE3_SHAPE_EPSILON {
        return Normal::new(location, scale).map_or(f64::NAN, |n| n.cdf(x));
    }

    let alpha = 4.0 / (shape * shape);
    let z = 2.0 * (x - location) / (scale * shape) + alpha;

    let result = Gamma::new(alpha, 1.0).map_or(f64::NAN, |g| g.cdf(z.max(0.0)));
    if shape < 0.0 {
        1.0 - result
    } else {
        result
    }
}

fn qua_pe3(f: f64, location: f64, scale: f64, shape: f64) -> f64 {
    if f.is_nan() || any_nan(location, scale, shape) {
        return f64::NAN;
    }
    if !(0.0..=1.0).contains(&f) {
        return f64::NAN;
    }

    if shape.abs() < PE3_SHAPE_EPSILON {
        return Normal::new(location, scale).map_or(f64::NAN, |n| n.inverse_cdf(f));
    }

    let alpha = 4.0 / (shape * shape);
    let beta = (0.5 * scale * shape).abs();
    let gamma = match Gamma::new(alpha, 1.0) {
        Ok(g) => g,
        Err(_) => return f64::NAN,
    };

    if shape > 0.0 {
        location - alpha * beta + beta * gamma.inverse_cdf(f).max(0.0)
    } else {
        location + alpha * beta - beta * gamma.inverse_cdf(1.0 - f).max(0.0)
    }
}

/// Per-cell (location, scale, shape) parameter grids of one distribution
#[derive(Debug, Clone)]
pub struct ParamGrids {
    pub location: Grid<f64>,
    pub scale: Grid<f64>,
    pub shape: Grid<f64>,
}

impl ParamGrids {
    /// Bundle three same-shape parameter grids
    pub fn new(location: Grid<f64>, scale: Grid<f64>, shape: Grid<f64>) -> Result<Self> {
        location.check_same_shape(&scale)?;
        location.check_same_shape(&shape)?;
        Ok(Self { location, scale, shape })
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.location.shape()
    }
}

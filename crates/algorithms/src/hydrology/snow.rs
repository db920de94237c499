//! Snow accumulation and melt

use hydroflux_core::{Grid, GridElement, Result};

/// Compute snow accumulation.
///
/// All precipitation is snowfall when the temperature is at or below
/// -1 °C; none is when the temperature is above that or unknown.
pub fn snow_accumulation(precip: &Grid<f64>, temp: &Grid<f64>) -> Result<Grid<f64>> {
    precip.check_same_shape(temp)?;

    let (rows, cols) = precip.shape();
    let mut out = Grid::new(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let t = unsafe { temp.get_unchecked(i, j) };
            let p = unsafe { precip.get_unchecked(i, j) };
            let sa = if t <= -1.0 { p } else { 0.0 };
            unsafe { out.set_unchecked(i, j, sa) };
        }
    }

    Ok(out)
}

/// Compute snowmelt from the prior snowpack.
///
/// No melt occurs below -1 °C. Above 500 m elevation the first melting
/// month releases half the pack; everywhere else the whole pack melts.
/// A missing melt-month counter or elevation makes the melt missing.
pub fn snow_melt(
    snowpack: &Grid<f64>,
    melt_month: &Grid<i32>,
    temp: &Grid<f64>,
    elevation: &Grid<f64>,
) -> Result<Grid<f64>> {
    snowpack.check_same_shape(melt_month)?;
    snowpack.check_same_shape(temp)?;
    snowpack.check_same_shape(elevation)?;

    let (rows, cols) = snowpack.shape();
    let mut out = Grid::new(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let pack = unsafe { snowpack.get_unchecked(i, j) };
            let months = unsafe { melt_month.get_unchecked(i, j) };
            let t = unsafe { temp.get_unchecked(i, j) };
            let z = unsafe { elevation.get_unchecked(i, j) };

            let melt = if months.is_missing() || z.is_nan() {
                f64::NAN
            } else if t >= -1.0 {
                // First melting month at altitude releases only half
                // the pack; otherwise all of it goes.
                if z > 500.0 && months == 1 {
                    0.5 * pack
                } else {
                    pack
                }
            } else {
                0.0
            };

            unsafe { out.set_unchecked(i, j, melt) };
        }
    }

    Ok(out)
}

//! Partitioning of generated runoff into detained rain and snow stores

use hydroflux_core::{Grid, GridElement, Result};

/// Fraction of the detained volume that leaves detention each month
pub const DETENTION_RELEASE: f64 = 0.5;

/// Fraction of runoff that bypasses detention entirely
pub const DETENTION_BYPASS: f64 = 0.5;

/// Fraction of the detained snowmelt store released this month.
///
/// Release ramps up with consecutive melting months, more slowly above
/// 500 m elevation; no melting conditions means no release.
pub fn snowmelt_release_fraction(melt_month: i32, elevation: f64) -> f64 {
    if elevation < 500.0 {
        match melt_month {
            1 => 0.1,
            m if m > 1 => 0.5,
            _ => 0.0,
        }
    } else {
        match melt_month {
            1 => 0.1,
            2 => 0.25,
            m if m > 2 => 0.5,
            _ => 0.0,
        }
    }
}

fn snowmelt_runoff(detained_snow: f64, snow_runoff: f64, melt_month: i32, elevation: f64) -> f64 {
    if melt_month.is_missing() || elevation.is_nan() {
        return f64::NAN;
    }

    snowmelt_release_fraction(melt_month, elevation) * (detained_snow + snow_runoff)
}

/// Revised runoff and detention store changes for one month
#[derive(Debug, Clone)]
pub struct DetentionUpdate {
    /// Runoff delivered to streamflow from rainfall (mm)
    pub rain_runoff: Grid<f64>,
    /// Runoff delivered to streamflow from snowmelt (mm)
    pub snow_runoff: Grid<f64>,
    /// Change in the detained rainfall store (mm)
    pub delta_detained_rain: Grid<f64>,
    /// Change in the detained snowmelt store (mm)
    pub delta_detained_snow: Grid<f64>,
}

/// Split generated runoff into rain- and snow-driven parts and update
/// the two detention stores.
///
/// The split is proportional to the rainfall and snowmelt shares of net
/// precipitation; a zero net precipitation sends nothing to either
/// store. A missing melt-month counter or elevation makes the snow-side
/// outputs missing.
///
/// # Arguments
/// * `runoff` - generated runoff (mm)
/// * `precip` - measured precipitation (mm)
/// * `net_precip` - net precipitation, precip - snow accumulation + snowmelt (mm)
/// * `snow_melt` - snowmelt (mm)
/// * `detained_rain` - detained rainfall store at start of month (mm)
/// * `detained_snow` - detained snowmelt store at start of month (mm)
/// * `elevation` - elevation (m)
/// * `melt_month` - consecutive months of melting conditions
#[allow(clippy::too_many_arguments)]
pub fn detained_runoff(
    runoff: &Grid<f64>,
    precip: &Grid<f64>,
    net_precip: &Grid<f64>,
    snow_melt: &Grid<f64>,
    detained_rain: &Grid<f64>,
    detained_snow: &Grid<f64>,
    elevation: &Grid<f64>,
    melt_month: &Grid<i32>,
) -> Result<DetentionUpdate> {
    runoff.check_same_shape(precip)?;
    runoff.check_same_shape(net_precip)?;
    runoff.check_same_shape(snow_melt)?;
    runoff.check_same_shape(detained_rain)?;
    runoff.check_same_shape(detained_snow)?;
    runoff.check_same_shape(elevation)?;
    runoff.check_same_shape(melt_month)?;

    let (rows, cols) = runoff.shape();
    let mut rain_runoff = Grid::new(rows, cols);
    let mut snow_runoff = Grid::new(rows, cols);
    let mut delta_rain = Grid::new(rows, cols);
    let mut delta_snow = Grid::new(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let r = unsafe { runoff.get_unchecked(i, j) };
            let pr = unsafe { precip.get_unchecked(i, j) };
            let p = unsafe { net_precip.get_unchecked(i, j) };
            let sm = unsafe { snow_melt.get_unchecked(i, j) };
            let dr = unsafe { detained_rain.get_unchecked(i, j) };
            let ds = unsafe { detained_snow.get_unchecked(i, j) };
            let z = unsafe { elevation.get_unchecked(i, j) };
            let mm = unsafe { melt_month.get_unchecked(i, j) };

            let mut rain_part = 0.0;
            let mut snow_part = 0.0;

            if p != 0.0 {
                rain_part = r * pr / p;
                snow_part = r * sm / p;

                if rain_part.is_nan() {
                    rain_part = 0.0;
                }
                if snow_part.is_nan() {
                    snow_part = 0.0;
                }
            }

            let rp = DETENTION_BYPASS * rain_part + DETENTION_RELEASE * dr;
            let rs = snowmelt_runoff(ds, snow_part, mm, z);

            unsafe {
                rain_runoff.set_unchecked(i, j, rp);
                snow_runoff.set_unchecked(i, j, rs);
                delta_rain.set_unchecked(i, j, (1.0 - DETENTION_BYPASS) * rain_part - DETENTION_RELEASE * dr);
                delta_snow.set_unchecked(i, j, snow_part - rs);
            }
        }
    }

    Ok(DetentionUpdate {
        rain_runoff,
        snow_runoff,
        delta_detained_rain: delta_rain,
        delta_detained_snow: delta_snow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn one_cell(v: f64) -> Grid<f64> {
        Grid::from_vec(vec![v], 1, 1).unwrap()
    }

    #[test]
    fn test_release_fraction_ramps() {
        assert_eq!(snowmelt_release_fraction(0, 100.0), 0.0);
        assert_eq!(snowmelt_release_fraction(1, 100.0), 0.1);
        assert_eq!(snowmelt_release_fraction(2, 100.0), 0.5);
        assert_eq!(snowmelt_release_fraction(1, 800.0), 0.1);
        assert_eq!(snowmelt_release_fraction(2, 800.0), 0.25);
        assert_eq!(snowmelt_release_fraction(3, 800.0), 0.5);
    }

    #[test]
    fn test_rain_only_partitioning() {
        let out = detained_runoff(
            &one_cell(10.0),       // runoff
            &one_cell(40.0),       // precip
            &one_cell(40.0),       // net precip
            &one_cell(0.0),        // snowmelt
            &one_cell(6.0),        // detained rain
            &one_cell(0.0),        // detained snow
            &one_cell(100.0),      // elevation
            &Grid::from_vec(vec![0], 1, 1).unwrap(),
        )
        .unwrap();

        // Half the rain-driven runoff bypasses detention, plus half of
        // the store is released.
        assert_relative_eq!(out.rain_runoff.get(0, 0).unwrap(), 0.5 * 10.0 + 0.5 * 6.0);
        assert_relative_eq!(out.delta_detained_rain.get(0, 0).unwrap(), 0.5 * 10.0 - 0.5 * 6.0);
        assert_relative_eq!(out.snow_runoff.get(0, 0).unwrap(), 0.0);
        assert_relative_eq!(out.delta_detained_snow.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_mixed_rain_snow_split() {
        // Net precip 30 = 20 rain + 10 melt; runoff 9 splits 6/3
        let out = detained_runoff(
            &one_cell(9.0),
            &one_cell(20.0),
            &one_cell(30.0),
            &one_cell(10.0),
            &one_cell(0.0),
            &one_cell(4.0),
            &one_cell(800.0),
            &Grid::from_vec(vec![2], 1, 1).unwrap(),
        )
        .unwrap();

        let rs = 0.25 * (4.0 + 3.0);
        assert_relative_eq!(out.rain_runoff.get(0, 0).unwrap(), 0.5 * 6.0);
        assert_relative_eq!(out.snow_runoff.get(0, 0).unwrap(), rs);
        assert_relative_eq!(out.delta_detained_snow.get(0, 0).unwrap(), 3.0 - rs);
    }

    #[test]
    fn test_zero_net_precip_no_split() {
        let out = detained_runoff(
            &one_cell(5.0),
            &one_cell(0.0),
            &one_cell(0.0),
            &one_cell(0.0),
            &one_cell(2.0),
            &one_cell(0.0),
            &one_cell(100.0),
            &Grid::from_vec(vec![0], 1, 1).unwrap(),
        )
        .unwrap();

        // Only the store release moves
        assert_relative_eq!(out.rain_runoff.get(0, 0).unwrap(), 1.0);
        assert_relative_eq!(out.delta_detained_rain.get(0, 0).unwrap(), -1.0);
    }

    #[test]
    fn test_missing_melt_month_poisons_snow_side() {
        let out = detained_runoff(
            &one_cell(5.0),
            &one_cell(10.0),
            &one_cell(10.0),
            &one_cell(0.0),
            &one_cell(0.0),
            &one_cell(0.0),
            &one_cell(100.0),
            &Grid::from_vec(vec![i32::MIN], 1, 1).unwrap(),
        )
        .unwrap();

        assert!(out.snow_runoff.get(0, 0).unwrap().is_nan());
        assert!(out.delta_detained_snow.get(0, 0).unwrap().is_nan());
        assert!(out.rain_runoff.get(0, 0).unwrap().is_finite());
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Grid::<f64>::new(1, 1);
        let b = Grid::<f64>::new(2, 2);
        let mm = Grid::<i32>::new(1, 1);
        assert!(detained_runoff(&a, &a, &a, &a, &a, &b, &a, &mm).is_err());
    }
}

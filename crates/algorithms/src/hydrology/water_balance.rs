//! Monthly soil/snow water balance

use crate::hydrology::precip::daily_precip;
use crate::hydrology::soil::soil_moisture_change;
use crate::maybe_rayon::*;
use hydroflux_core::{Algorithm, Error, Grid, Result};
use ndarray::Array2;

/// Monthly balance terms for one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellWaterBalance {
    /// Change in soil moisture over the month (mm)
    pub delta_soil_moisture: f64,
    /// Mean soil moisture over the month (mm)
    pub mean_soil_moisture: f64,
    /// Total evapotranspiration (mm)
    pub evapotranspiration: f64,
    /// Total generated runoff (mm)
    pub runoff: f64,
}

fn evapotranspiration(p: f64, e0: f64, dwdt: f64) -> f64 {
    if p <= e0 {
        p - dwdt
    } else {
        e0
    }
}

/// Run the monthly water balance for a single cell.
///
/// Rain (precipitation net of snow accumulation) lands on evenly-spaced
/// wet days, snowmelt spreads over every day, and the daily soil
/// moisture update integrates to the monthly terms. Missing snow terms
/// are treated as zero.
///
/// # Arguments
/// * `precip` - precipitation for the month (mm)
/// * `snow_accum` - snow accumulation for the month (mm)
/// * `snow_melt` - snowmelt for the month (mm)
/// * `pet` - potential evapotranspiration for the month (mm)
/// * `soil_moisture` - soil moisture at the start of the month (mm)
/// * `capacity` - soil water holding capacity (mm)
/// * `n_days` - days in the month
/// * `p_wet` - fraction of days with precipitation
pub fn water_balance_cell(
    precip: f64,
    snow_accum: f64,
    snow_melt: f64,
    pet: f64,
    soil_moisture: f64,
    capacity: f64,
    n_days: u32,
    p_wet: f64,
) -> CellWaterBalance {
    let snow_accum = if snow_accum.is_nan() { 0.0 } else { snow_accum };
    let snow_melt = if snow_melt.is_nan() { 0.0 } else { snow_melt };

    let pet_daily = pet / n_days as f64;
    let rain_daily = daily_precip(precip - snow_accum, n_days, p_wet);
    let melt_daily = daily_precip(snow_melt, n_days, 1.0);

    let mut ws = soil_moisture;
    let mut ws_sum = 0.0;
    let mut dwdt = 0.0;
    let mut e_total = 0.0;
    let mut r_total = 0.0;

    for (rain, melt) in rain_daily.iter().zip(&melt_daily) {
        let p_daily = rain + melt;
        let dwdt_daily = soil_moisture_change(p_daily, pet_daily, ws, capacity);

        ws += dwdt_daily;
        ws_sum += ws;
        dwdt += dwdt_daily;

        let e_daily = evapotranspiration(p_daily, pet_daily, dwdt_daily);
        e_total += e_daily;
        r_total += p_daily - e_daily - dwdt_daily;
    }

    CellWaterBalance {
        delta_soil_moisture: dwdt,
        mean_soil_moisture: ws_sum / n_days as f64,
        evapotranspiration: e_total,
        runoff: r_total,
    }
}

/// Monthly balance terms for every cell
#[derive(Debug, Clone)]
pub struct WaterBalanceGrids {
    pub delta_soil_moisture: Grid<f64>,
    pub mean_soil_moisture: Grid<f64>,
    pub evapotranspiration: Grid<f64>,
    pub runoff: Grid<f64>,
}

/// Run the monthly water balance over every cell of a grid.
///
/// A missing precipitation, demand, soil moisture, capacity or wet-day
/// fraction makes all four outputs missing for that cell; missing snow
/// terms are treated as zero.
#[allow(clippy::too_many_arguments)]
pub fn water_balance_grid(
    precip: &Grid<f64>,
    snow_accum: &Grid<f64>,
    snow_melt: &Grid<f64>,
    pet: &Grid<f64>,
    soil_moisture: &Grid<f64>,
    capacity: &Grid<f64>,
    n_days: u32,
    p_wet: &Grid<f64>,
) -> Result<WaterBalanceGrids> {
    precip.check_same_shape(snow_accum)?;
    precip.check_same_shape(snow_melt)?;
    precip.check_same_shape(pet)?;
    precip.check_same_shape(soil_moisture)?;
    precip.check_same_shape(capacity)?;
    precip.check_same_shape(p_wet)?;

    if n_days == 0 {
        return Err(Error::InvalidParameter {
            name: "n_days",
            value: n_days.to_string(),
            reason: "time step must cover at least one day".to_string(),
        });
    }

    let (rows, cols) = precip.shape();

    let cells: Vec<CellWaterBalance> = (0..rows)
        .into_par_iter()
        .flat_map(|i| {
            let mut row = Vec::with_capacity(cols);
            for j in 0..cols {
                let p = unsafe { precip.get_unchecked(i, j) };
                let sa = unsafe { snow_accum.get_unchecked(i, j) };
                let sm = unsafe { snow_melt.get_unchecked(i, j) };
                let e0 = unsafe { pet.get_unchecked(i, j) };
                let ws = unsafe { soil_moisture.get_unchecked(i, j) };
                let wc = unsafe { capacity.get_unchecked(i, j) };
                let pw = unsafe { p_wet.get_unchecked(i, j) };

                if p.is_nan() || e0.is_nan() || ws.is_nan() || wc.is_nan() || pw.is_nan() {
                    row.push(CellWaterBalance {
                        delta_soil_moisture: f64::NAN,
                        mean_soil_moisture: f64::NAN,
                        evapotranspiration: f64::NAN,
                        runoff: f64::NAN,
                    });
                } else {
                    row.push(water_balance_cell(p, sa, sm, e0, ws, wc, n_days, pw));
                }
            }
            row
        })
        .collect();

    let unpack = |f: fn(&CellWaterBalance) -> f64| -> Result<Grid<f64>> {
        let data: Vec<f64> = cells.iter().map(f).collect();
        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(Grid::from_array(array))
    };

    Ok(WaterBalanceGrids {
        delta_soil_moisture: unpack(|c| c.delta_soil_moisture)?,
        mean_soil_moisture: unpack(|c| c.mean_soil_moisture)?,
        evapotranspiration: unpack(|c| c.evapotranspiration)?,
        runoff: unpack(|c| c.runoff)?,
    })
}

/// Input grids for the [`WaterBalance`] algorithm
#[derive(Debug, Clone)]
pub struct WaterBalanceInput {
    pub precip: Grid<f64>,
    pub snow_accum: Grid<f64>,
    pub snow_melt: Grid<f64>,
    pub pet: Grid<f64>,
    pub soil_moisture: Grid<f64>,
    pub capacity: Grid<f64>,
    pub wet_day_fraction: Grid<f64>,
}

/// Parameters for the [`WaterBalance`] algorithm
#[derive(Debug, Clone)]
pub struct WaterBalanceParams {
    /// Days in the time step
    pub n_days: u32,
}

impl Default for WaterBalanceParams {
    fn default() -> Self {
        Self { n_days: 30 }
    }
}

/// Monthly water balance algorithm
#[derive(Debug, Clone, Default)]
pub struct WaterBalance;

impl Algorithm for WaterBalance {
    type Input = WaterBalanceInput;
    type Output = WaterBalanceGrids;
    type Params = WaterBalanceParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Water Balance"
    }

    fn description(&self) -> &'static str {
        "Update soil moisture, evapotranspiration and runoff over a monthly time step"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        water_balance_grid(
            &input.precip,
            &input.snow_accum,
            &input.snow_melt,
            &input.pet,
            &input.soil_moisture,
            &input.capacity,
            params.n_days,
            &input.wet_day_fraction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_water_conservation_per_cell() {
        // P + Sm - Sa = dW + E + R over the month
        let out = water_balance_cell(80.0, 10.0, 5.0, 60.0, 50.0, 150.0, 30, 0.3);

        let effective = 80.0 - 10.0 + 5.0;
        let closed = out.delta_soil_moisture + out.evapotranspiration + out.runoff;
        assert_relative_eq!(closed, effective, epsilon = 1e-9);
    }

    #[test]
    fn test_dry_month_depletes_soil() {
        let out = water_balance_cell(0.0, 0.0, 0.0, 90.0, 100.0, 150.0, 30, 0.1);

        assert!(out.delta_soil_moisture < 0.0);
        assert!(out.evapotranspiration > 0.0);
        assert_relative_eq!(out.runoff, 0.0, epsilon = 1e-9);
        assert!(out.mean_soil_moisture < 100.0);
    }

    #[test]
    fn test_saturating_month_generates_runoff() {
        let out = water_balance_cell(300.0, 0.0, 0.0, 30.0, 140.0, 150.0, 30, 0.5);

        assert!(out.runoff > 0.0);
        assert!(out.delta_soil_moisture <= 10.0 + 1e-9);
    }

    #[test]
    fn test_missing_snow_terms_treated_as_zero() {
        let with_zero = water_balance_cell(50.0, 0.0, 0.0, 40.0, 60.0, 150.0, 30, 0.2);
        let with_nan = water_balance_cell(50.0, f64::NAN, f64::NAN, 40.0, 60.0, 150.0, 30, 0.2);

        assert_relative_eq!(with_zero.runoff, with_nan.runoff);
        assert_relative_eq!(
            with_zero.delta_soil_moisture,
            with_nan.delta_soil_moisture
        );
    }

    #[test]
    fn test_grid_missing_inputs_propagate() {
        let mut precip = Grid::filled(1, 2, 50.0);
        precip.set(0, 1, f64::NAN).unwrap();
        let zeros = Grid::new(1, 2);
        let pet = Grid::filled(1, 2, 40.0);
        let ws = Grid::filled(1, 2, 60.0);
        let wc = Grid::filled(1, 2, 150.0);
        let pw = Grid::filled(1, 2, 0.2);

        let out =
            water_balance_grid(&precip, &zeros, &zeros, &pet, &ws, &wc, 30, &pw).unwrap();

        assert!(out.runoff.get(0, 0).unwrap().is_finite());
        assert!(out.runoff.get(0, 1).unwrap().is_nan());
        assert!(out.evapotranspiration.get(0, 1).unwrap().is_nan());
        assert!(out.mean_soil_moisture.get(0, 1).unwrap().is_nan());
        assert!(out.delta_soil_moisture.get(0, 1).unwrap().is_nan());
    }

    #[test]
    fn test_grid_shape_mismatch() {
        let a = Grid::<f64>::new(2, 2);
        let b = Grid::<f64>::new(3, 3);
        assert!(water_balance_grid(&a, &a, &a, &a, &a, &b, 30, &a).is_err());
    }

    #[test]
    fn test_algorithm_wrapper_matches_free_function() {
        let input = WaterBalanceInput {
            precip: Grid::filled(2, 2, 80.0),
            snow_accum: Grid::new(2, 2),
            snow_melt: Grid::new(2, 2),
            pet: Grid::filled(2, 2, 60.0),
            soil_moisture: Grid::filled(2, 2, 50.0),
            capacity: Grid::filled(2, 2, 150.0),
            wet_day_fraction: Grid::filled(2, 2, 0.3),
        };

        let by_algo = WaterBalance.execute(input.clone(), WaterBalanceParams { n_days: 30 }).unwrap();
        let direct = water_balance_grid(
            &input.precip,
            &input.snow_accum,
            &input.snow_melt,
            &input.pet,
            &input.soil_moisture,
            &input.capacity,
            30,
            &input.wet_day_fraction,
        )
        .unwrap();

        assert_eq!(
            by_algo.runoff.get(1, 1).unwrap(),
            direct.runoff.get(1, 1).unwrap()
        );
    }
}

//! Daily soil moisture change

/// Shape constant of the soil drying curve
const DRYING_ALPHA: f64 = 5.0;

// Components of the unitless soil drying function. g1 scales drying by
// how full the soil column is; g2 by the unmet evaporative demand.
fn g1(ws: f64, wc: f64) -> f64 {
    (-DRYING_ALPHA * ws / wc).exp_m1() / (-DRYING_ALPHA).exp_m1()
}

fn g2(ws: f64, e0: f64, p: f64) -> f64 {
    if e0 <= ws {
        e0 - p
    } else {
        let beta = e0 / ws;
        ws * ((p - e0) / ws).exp_m1() / (-beta).exp_m1()
    }
}

/// Magnitude of soil moisture decline under drying conditions (mm/day)
///
/// # Arguments
/// * `ws` - soil moisture (mm)
/// * `wc` - soil water holding capacity (mm)
/// * `e0` - potential evapotranspiration (mm/day)
/// * `p`  - effective precipitation (mm/day)
pub fn drying_rate(ws: f64, wc: f64, e0: f64, p: f64) -> f64 {
    g1(ws, wc) * g2(ws, e0, p)
}

/// Change in soil moisture over one day (mm/day)
///
/// Three regimes: drying when precipitation cannot meet the evaporative
/// demand (bounded so no more than 90% of soil moisture is lost in one
/// day), unsaturated fill when it can, and clipping to capacity when
/// precipitation also exceeds the soil moisture deficit.
pub fn soil_moisture_change(p: f64, e0: f64, ws: f64, wc: f64) -> f64 {
    let deficit = (wc - ws) + e0;

    if p <= e0 {
        let dwdt = -drying_rate(ws, wc, e0, p);
        dwdt.max(-0.9 * ws)
    } else if p <= deficit {
        p - e0
    } else {
        wc - ws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unsaturated_fill() {
        // Precipitation above demand but below the deficit is absorbed
        assert_relative_eq!(soil_moisture_change(6.0, 2.0, 50.0, 150.0), 4.0);
    }

    #[test]
    fn test_clip_to_capacity() {
        let dw = soil_moisture_change(200.0, 2.0, 140.0, 150.0);
        assert_relative_eq!(dw, 10.0);
    }

    #[test]
    fn test_drying_is_negative_and_bounded() {
        let dw = soil_moisture_change(0.0, 5.0, 20.0, 150.0);
        assert!(dw < 0.0);
        assert!(dw >= -0.9 * 20.0);
    }

    #[test]
    fn test_drying_clamp_engages_under_extreme_demand() {
        // A nearly-full column under extreme demand would lose almost
        // all its moisture in one day; the clamp holds the loss to 90%.
        let ws = 140.0;
        let dw = soil_moisture_change(0.0, 1000.0, ws, 150.0);
        assert_relative_eq!(dw, -0.9 * ws);
    }

    #[test]
    fn test_no_demand_no_change() {
        let dw = soil_moisture_change(0.0, 0.0, 50.0, 150.0);
        assert_relative_eq!(dw, 0.0);
    }

    #[test]
    fn test_drying_increases_with_moisture() {
        // A wetter column dries faster under the same demand
        let dry = soil_moisture_change(0.0, 5.0, 10.0, 150.0);
        let wet = soil_moisture_change(0.0, 5.0, 100.0, 150.0);
        assert!(wet < dry);
    }
}

//! Loss due to water-surplus, water-deficit, heat or cold stress

use hydroflux_core::Grid;

/// Estimate the loss fraction caused by a stress of a given return
/// period.
///
/// Loss begins at `rp_onset`, reaches 1 at `rp_total`, and ramps
/// between them as a power function; higher `power` defers loss to
/// greater return periods.
pub fn loss_function(return_period: &Grid<f64>, rp_onset: f64, rp_total: f64, power: f64) -> Grid<f64> {
    return_period.map(|rp| {
        if rp >= rp_total {
            1.0
        } else if rp <= rp_onset {
            0.0
        } else {
            ((rp - rp_onset) / (rp_total - rp_onset)).powf(power)
        }
    })
}

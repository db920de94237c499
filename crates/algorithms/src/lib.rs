//! # HydroFlux Algorithms
//!
//! Numerical engines for the HydroFlux water-balance toolkit.
//!
//! ## Available Algorithm Categories
//!
//! - **resample**: Aggregate/disaggregate grids between resolutions, reclassify,
//!   substitute and coalesce cell values
//! - **calendar**: Solar day length, Gregorian helpers, circular day-of-year means
//! - **distributions**: GEV and Pearson Type-III quantile/CDF kernels, gridded
//!   evaluation, forecast bias correction
//! - **stack**: Slice-wise reductions over 3-D stacks with missing-value rules
//! - **hydrology**: Snow accumulation and melt, monthly soil water balance,
//!   detained runoff, D8 flow accumulation, basin-to-basin accumulation
//! - **agriculture**: Growing-season predicates and day counters, stress loss

pub mod agriculture;
pub mod calendar;
pub mod distributions;
pub mod hydrology;
pub mod resample;
pub mod stack;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agriculture::{
        days_since_planting, days_until_harvest, first_growing_day, growing_days_this_season,
        growing_days_this_year, is_growing_season, last_growing_day, loss_function,
    };
    pub use crate::calendar::{average_day_length, day_length, days_in_month, is_leap_year, mean_doy};
    pub use crate::distributions::{
        cdf_grid, forecast_correct, qua_grid, Distribution, GridOrScalar, ParamGrids,
    };
    pub use crate::hydrology::{
        accumulate_basins, accumulate_flow, detained_runoff, downstream_flow, snow_accumulation,
        snow_melt, water_balance_grid, FlowAccumulation, WaterBalance,
    };
    pub use crate::resample::{
        aggregate_mean, aggregate_mean_doy, aggregate_sum, coalesce, disaggregate, reclassify,
        substitute, PointwiseOp,
    };
    pub use crate::stack::{
        stack_max, stack_mean, stack_median, stack_min, stack_quantile, stack_sum,
        stack_weighted_quantile,
    };
    pub use hydroflux_core::prelude::*;
}

//! Snow, soil moisture, runoff detention and flow routing
//!
//! The monthly land-surface update runs per cell: snow accumulates or
//! melts, precipitation is spread over wet days, and a daily
//! Thornthwaite-style balance updates soil moisture, evapotranspiration
//! and generated runoff. Generated runoff is split into detained rain
//! and snow components, then routed downstream over a D8 raster or a
//! basin network.

mod basin;
mod detention;
mod flow_accumulation;
mod precip;
mod snow;
mod soil;
mod water_balance;

pub use basin::{accumulate_basins, downstream_flow};
pub use detention::{
    detained_runoff, snowmelt_release_fraction, DetentionUpdate, DETENTION_BYPASS,
    DETENTION_RELEASE,
};
pub use flow_accumulation::{
    accumulate_flow, inward_flow_grid, FlowAccumulation, FlowAccumulationParams,
    DIR_EAST, DIR_NORTH, DIR_NORTHEAST, DIR_NORTHWEST, DIR_SOUTH, DIR_SOUTHEAST, DIR_SOUTHWEST,
    DIR_WEST,
};
pub use precip::{daily_precip, wet_day_pattern};
pub use snow::{snow_accumulation, snow_melt};
pub use soil::{drying_rate, soil_moisture_change};
pub use water_balance::{
    water_balance_cell, water_balance_grid, CellWaterBalance, WaterBalance, WaterBalanceGrids,
    WaterBalanceInput, WaterBalanceParams,
};

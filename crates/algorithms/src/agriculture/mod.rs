//! Crop calendar predicates and stress loss

mod growing_season;
mod loss;

pub use growing_season::{
    days_since_planting, days_since_planting_next_year, days_since_planting_next_year_slice,
    days_since_planting_slice, days_since_planting_this_season,
    days_since_planting_this_season_slice, days_since_planting_this_year,
    days_since_planting_this_year_slice, days_until_harvest, days_until_harvest_slice,
    first_growing_day, first_growing_day_slice, growing_days_next_year,
    growing_days_next_year_slice, growing_days_this_season, growing_days_this_season_slice,
    growing_days_this_year, growing_days_this_year_slice, is_growing_season,
    is_growing_season_slice, last_growing_day, last_growing_day_slice,
};
pub use loss::loss_function;

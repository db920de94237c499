//! Calendar arithmetic and solar day length

mod daylength;
mod doy;

pub use daylength::{
    average_day_length, average_day_length_vec, day_hours, day_length, day_length_vec,
    day_of_year, days_in_month, is_leap_year,
};
pub use doy::mean_doy;

//! Solar day length from latitude and date
//!
//! The sun's declination comes from a Besselian series in the Julian
//! century offset from 1900 January 0.5 UT: eccentricity, mean obliquity
//! and the true anomaly expanded through the fifth harmonic of the mean
//! anomaly. Daylight hours follow from the sunset hour angle, saturating
//! at 0 or 24 inside the polar circles.

use std::f64::consts::PI;

/// Determine if a given year is a leap year
pub fn is_leap_year(year: i32) -> bool {
    // Every four years, except centuries not divisible by 400
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in a month of the Gregorian calendar
///
/// # Panics
/// Panics if `month` is not in 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => panic!("month {month} out of range"),
    }
}

/// Day of the year (1-based) for a calendar date
///
/// # Panics
/// Panics if `month` is not in 1..=12.
pub fn day_of_year(year: i32, month: u32, day: u32) -> u32 {
    (1..month).map(|m| days_in_month(year, m)).sum::<u32>() + day
}

/// Days elapsed since 1900 January 1
fn days_since_1900(year: i32, doy: u32) -> i64 {
    let mut count: i64 = 0;
    for y in 1900..year {
        count += 365 + is_leap_year(y) as i64;
    }
    count + doy as i64 - 1
}

/// Sun's latitude (declination) in radians for a day offset from 1900
fn solar_declination(days_since_1900: i64) -> f64 {
    // "tj" is the number of Julian centuries from 1900 Jan 0d 12h to
    // 0h UT of the current day
    let d = days_since_1900 as f64;
    let tj = d / 36525.0;
    let tjsq = tj * tj;
    let tjcb = tjsq * tj;

    // Mean anomaly: Earth orbit angle swept at the mean orbital rate
    let mut mean_anomaly =
        (358.475833 + (0.985600267 * d) % 360.0 - 0.150e-3 * tjsq - 0.3e-5 * tjcb) * PI / 180.0;
    mean_anomaly %= 2.0 * PI;

    // Eccentricity of Earth's orbit and mean obliquity of the ecliptic
    let eccentricity = 0.01675104 - 0.4180e-4 * tj - 0.126e-6 * tjsq;
    let mean_obliquity =
        (23.4522944 - 0.0130125 * tj - 0.164e-5 * tjsq + 0.503e-6 * tjcb) * PI / 180.0;

    let e2 = eccentricity * eccentricity;
    let e3 = e2 * eccentricity;
    let e4 = e2 * e2;
    let e5 = e4 * eccentricity;

    // True anomaly: angle of the sun from perihelion, Bessel expansion
    let true_anomaly = mean_anomaly
        + (2.0 * eccentricity - 0.24 * e2 + 5.0 / 96.0 * e5) * mean_anomaly.sin()
        + (1.25 * e2 - 11.0 / 24.0 * e4) * (2.0 * mean_anomaly).sin()
        + (13.0 / 12.0 * e3 - 43.0 / 64.0 * e5) * (3.0 * mean_anomaly).sin()
        + (103.0 / 960.0 * e4) * (4.0 * mean_anomaly).sin()
        + (1097.0 / 960.0 * e5) * (5.0 * mean_anomaly).sin();

    // Mean longitude of perihelion
    let peri_long =
        (281.220833 + 0.470684e-4 * d + 0.453e-3 * tjsq + 0.3e-5 * tjcb) * PI / 180.0;

    let true_longitude = (true_anomaly + peri_long) % (2.0 * PI);

    mean_obliquity * true_longitude.sin()
}

/// Number of daylight hours, given sun and observer latitudes in radians
pub fn day_hours(sun_lat: f64, earth_lat: f64) -> f64 {
    let clon = -earth_lat.tan() * sun_lat.tan();
    if clon >= 1.0 {
        return 0.0;
    }
    if clon <= -1.0 {
        return 24.0;
    }

    24.0 * clon.acos() / PI
}

/// Day length in hours at a latitude (degrees) on a calendar date
pub fn day_length(latitude: f64, year: i32, month: u32, day: u32) -> f64 {
    let doy = day_of_year(year, month, day);
    let sun_lat = solar_declination(days_since_1900(year, doy));
    day_hours(sun_lat, latitude * PI / 180.0)
}

/// Day lengths for a set of latitudes on a calendar date
pub fn day_length_vec(latitudes: &[f64], year: i32, month: u32, day: u32) -> Vec<f64> {
    let doy = day_of_year(year, month, day);
    let sun_lat = solar_declination(days_since_1900(year, doy));

    latitudes
        .iter()
        .map(|&lat| day_hours(sun_lat, lat * PI / 180.0))
        .collect()
}

/// Mean day length in hours over all days of a month
pub fn average_day_length(latitude: f64, year: i32, month: u32) -> f64 {
    let n_days = days_in_month(year, month);
    let total: f64 = (1..=n_days)
        .map(|day| day_length(latitude, year, month, day))
        .sum();
    total / n_days as f64
}

/// Mean day lengths for a set of latitudes over all days of a month
pub fn average_day_length_vec(latitudes: &[f64], year: i32, month: u32) -> Vec<f64> {
    latitudes
        .iter()
        .map(|&lat| average_day_length(lat, year, month))
        .collect()
}

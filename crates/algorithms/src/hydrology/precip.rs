//! Distribution of monthly precipitation over wet days

/// Compute the list of days (1-based) on which precipitation falls.
///
/// The wet-day count is `ceil(n_days * p_wet)` with `p_wet` floored at
/// `1/n_days`, so there is always at least one wet day. Wet days are
/// evenly spaced through the period.
pub fn wet_day_pattern(n_days: u32, p_wet: f64) -> Vec<u32> {
    let n = n_days as f64;
    let p = p_wet.max(1.0 / n);
    let wet_days = (n * p).ceil() as u32;

    if wet_days >= n_days {
        return (1..=n_days).collect();
    }

    let interval = n / (wet_days as f64 + 1.0);
    let mut day = (1 + interval as u32 / 2) as f64;
    let mut pattern = Vec::with_capacity(wet_days as usize);

    while day <= n - interval {
        day += interval;
        pattern.push(day as u32);
    }

    if pattern.is_empty() {
        pattern.push((n_days + 1) / 2);
    }

    pattern
}

/// Spread a period total over the days of the period.
///
/// With `p_wet` of 1 the total is spread evenly over every day;
/// otherwise it is split equally among the evenly-spaced wet days and
/// the remaining days are dry.
pub fn daily_precip(total: f64, n_days: u32, p_wet: f64) -> Vec<f64> {
    if p_wet == 1.0 {
        return vec![total / n_days as f64; n_days as usize];
    }

    let wet = wet_day_pattern(n_days, p_wet);
    let per_day = total / wet.len() as f64;

    let mut daily = vec![0.0; n_days as usize];
    for day in wet {
        daily[(day - 1) as usize] = per_day;
    }

    daily
}

//! Growing-season membership and day counting
//!
//! Seasons run from a planting day to a harvest day, both in [1, 365].
//! A harvest day before the planting day means the season wraps across
//! the year boundary. Scalar kernels return `None` when the planting or
//! harvest day is missing; the slice mappers encode missing results as
//! the integer sentinel.

use hydroflux_core::{Error, GridElement, Result};

/// Whether a day of the year falls within the growing season.
///
/// Returns `None` when the planting or harvest day is missing.
pub fn is_growing_season(day_of_year: i32, plant: i32, harvest: i32) -> Option<bool> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }

    Some(if harvest >= plant {
        day_of_year >= plant && day_of_year <= harvest
    } else {
        // Wrapped season
        day_of_year >= plant || day_of_year <= harvest
    })
}

/// Days elapsed since planting, or `None` outside the growing season.
pub fn days_since_planting(day_of_year: i32, plant: i32, harvest: i32) -> Option<i32> {
    if is_growing_season(day_of_year, plant, harvest) != Some(true) {
        return None;
    }

    if harvest > plant || day_of_year >= plant {
        Some(day_of_year - plant)
    } else {
        Some(365 - plant + day_of_year)
    }
}

/// Days remaining until harvest, or `None` outside the growing season.
pub fn days_until_harvest(day_of_year: i32, plant: i32, harvest: i32) -> Option<i32> {
    if is_growing_season(day_of_year, plant, harvest) != Some(true) {
        return None;
    }

    if harvest > plant || day_of_year <= harvest {
        Some(harvest - day_of_year)
    } else {
        Some(365 - day_of_year + harvest)
    }
}

// Walk the day range [from, to], wrapping through the year boundary
// when from > to.
fn day_range(from: i32, to: i32) -> Box<dyn Iterator<Item = i32>> {
    if from <= to {
        Box::new(from..=to)
    } else {
        Box::new((from..=365).chain(1..=to))
    }
}

/// First day in [from, to] that is within the growing season.
pub fn first_growing_day(from: i32, to: i32, plant: i32, harvest: i32) -> Option<i32> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }

    day_range(from, to).find(|&d| is_growing_season(d, plant, harvest) == Some(true))
}

/// Last day in [from, to] that is within the growing season.
pub fn last_growing_day(from: i32, to: i32, plant: i32, harvest: i32) -> Option<i32> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }

    let days: Vec<i32> = day_range(from, to).collect();
    days.into_iter()
        .rev()
        .find(|&d| is_growing_season(d, plant, harvest) == Some(true))
}

/// Growing days in the latest season overlapping [from, to].
///
/// Counts the longest contiguous in-season run ending at the interval's
/// last day; if the interval ends outside the season, the count is zero.
pub fn growing_days_this_season(from: i32, to: i32, plant: i32, harvest: i32) -> Option<i32> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }

    let mut from = from;
    let mut to = to;

    if plant > from && plant <= to {
        from = plant;
    }
    if harvest >= from && harvest <= to {
        to = harvest;
    }

    if is_growing_season(to, plant, harvest) == Some(true) {
        Some((to - from + 1).max(0))
    } else {
        Some(0)
    }
}

/// Growing days in [from, to] that contribute to a harvest in the
/// current calendar year.
pub fn growing_days_this_year(from: i32, to: i32, plant: i32, harvest: i32) -> Option<i32> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }

    let mut from = from;
    let to = to.min(harvest);

    if harvest > plant && from < plant {
        from = plant;
    }

    Some((to - from + 1).max(0))
}

/// Growing days in [from, to] that contribute to next year's harvest.
///
/// Nonzero only for wrapped seasons, where days after planting ripen a
/// crop harvested after the year boundary.
pub fn growing_days_next_year(from: i32, to: i32, plant: i32, harvest: i32) -> Option<i32> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }

    if harvest > plant {
        return Some(0);
    }

    let from = from.max(plant);
    Some((to - from + 1).max(0))
}

/// Growing days between planting and the end of [from, to], capped at
/// the harvest contributing to the current calendar year.
pub fn days_since_planting_this_year(from: i32, to: i32, plant: i32, harvest: i32) -> Option<i32> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }

    if from > harvest {
        return Some(0);
    }

    let to = to.min(harvest);

    if harvest > plant {
        Some((to - plant + 1).max(0))
    } else {
        Some((365 - plant + 1 + to).max(0))
    }
}

/// Growing days between planting and the end of [from, to] contributing
/// to next year's harvest.
pub fn days_since_planting_next_year(from: i32, to: i32, plant: i32, harvest: i32) -> Option<i32> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }
    // The interval start never matters here; wrapped seasons count from
    // the planting day directly.
    let _ = from;

    if harvest > plant {
        return Some(0);
    }

    Some((to - plant + 1).max(0))
}

/// Growing days between the most recent planting and the end of
/// [from, to].
pub fn days_since_planting_this_season(
    from: i32,
    to: i32,
    plant: i32,
    harvest: i32,
) -> Option<i32> {
    if plant.is_missing() || harvest.is_missing() {
        return None;
    }

    if plant < harvest {
        // Non-wrapped season; intervals entirely before planting or
        // after harvest contribute nothing
        if to < plant || from > harvest {
            return Some(0);
        }

        let to = to.min(harvest);
        Some((to - plant + 1).max(0))
    } else {
        // Wrapped season
        if from > harvest && to < plant {
            return Some(0);
        }

        if to > plant {
            return Some((to - plant + 1).max(0));
        }

        let to = to.min(harvest);
        Some((365 - plant + 1 + to).max(0))
    }
}

fn map_pairs<F>(plant: &[i32], harvest: &[i32], f: F) -> Result<Vec<i32>>
where
    F: Fn(i32, i32) -> Option<i32>,
{
    if plant.len() != harvest.len() {
        return Err(Error::LengthMismatch {
            expected: plant.len(),
            actual: harvest.len(),
        });
    }

    Ok(plant
        .iter()
        .zip(harvest)
        .map(|(&p, &h)| f(p, h).unwrap_or_else(i32::missing))
        .collect())
}

/// Vectorized [`is_growing_season`]: 1 in season, 0 out, sentinel when
/// the planting or harvest day is missing.
pub fn is_growing_season_slice(
    day_of_year: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| {
        is_growing_season(day_of_year, p, h).map(i32::from)
    })
}

/// Vectorized [`days_since_planting`]
pub fn days_since_planting_slice(
    day_of_year: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| days_since_planting(day_of_year, p, h))
}

/// Vectorized [`days_until_harvest`]
pub fn days_until_harvest_slice(
    day_of_year: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| days_until_harvest(day_of_year, p, h))
}

/// Vectorized [`first_growing_day`]
pub fn first_growing_day_slice(
    from: i32,
    to: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| first_growing_day(from, to, p, h))
}

/// Vectorized [`last_growing_day`]
pub fn last_growing_day_slice(
    from: i32,
    to: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| last_growing_day(from, to, p, h))
}

/// Vectorized [`growing_days_this_season`]
pub fn growing_days_this_season_slice(
    from: i32,
    to: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| growing_days_this_season(from, to, p, h))
}

/// Vectorized [`growing_days_this_year`]
pub fn growing_days_this_year_slice(
    from: i32,
    to: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| growing_days_this_year(from, to, p, h))
}

/// Vectorized [`growing_days_next_year`]
pub fn growing_days_next_year_slice(
    from: i32,
    to: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| growing_days_next_year(from, to, p, h))
}

/// Vectorized [`days_since_planting_this_season`]
pub fn days_since_planting_this_season_slice(
    from: i32,
    to: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| {
        days_since_planting_this_season(from, to, p, h)
    })
}

/// Vectorized [`days_since_planting_this_year`]
pub fn days_since_planting_this_year_slice(
    from: i32,
    to: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| {
        days_since_planting_this_year(from, to, p, h)
    })
}

/// Vectorized [`days_since_planting_next_year`]
pub fn days_since_planting_next_year_slice(
    from: i32,
    to: i32,
    plant: &[i32],
    harvest: &[i32],
) -> Result<Vec<i32>> {
    map_pairs(plant, harvest, |p, h| {
        days_since_planting_next_year(from, to, p, h)
    })
}

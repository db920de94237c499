//! D8 flow accumulation with optional wrap-around
//!
//! Directions use the clockwise-from-East D8 coding (E=1, SE=2, S=4,
//! SW=8, W=16, NW=32, N=64, NE=128); 0 and the missing sentinel both
//! mark sink cells. Weights may sit on a coarser grid whose dimensions
//! divide the direction grid's; they are spread over the fine cells,
//! routed, and re-aggregated.
//!
//! # Algorithm
//! 1. Count inward direction codes for each cell (in-degree)
//! 2. Start from cells with no inflow (headwaters)
//! 3. Propagate accumulated flow downstream, decrementing in-degrees,
//!    until the frontier drains

use crate::resample::disaggregate_amount;
use hydroflux_core::{Algorithm, Error, Grid, GridElement, Result};
use tracing::{debug, warn};

pub const DIR_EAST: i32 = 1;
pub const DIR_SOUTHEAST: i32 = 2;
pub const DIR_SOUTH: i32 = 4;
pub const DIR_SOUTHWEST: i32 = 8;
pub const DIR_WEST: i32 = 16;
pub const DIR_NORTHWEST: i32 = 32;
pub const DIR_NORTH: i32 = 64;
pub const DIR_NORTHEAST: i32 = 128;

/// Upper bound on propagation rounds, a guard against malformed
/// (cyclic) direction grids
const MAX_ROUNDS: usize = 50_000;

/// Where a cell drains, tracking whether flow actually continues
struct Downstream {
    row: usize,
    col: usize,
    flows: bool,
}

impl Downstream {
    fn move_east(&mut self, n_cols: usize, wrap_x: bool) {
        if self.col == n_cols - 1 {
            self.col = 0;
            self.flows = self.flows && wrap_x;
        } else {
            self.col += 1;
        }
    }

    fn move_west(&mut self, n_cols: usize, wrap_x: bool) {
        if self.col == 0 {
            self.col = n_cols - 1;
            self.flows = self.flows && wrap_x;
        } else {
            self.col -= 1;
        }
    }

    fn move_north(&mut self, n_cols: usize, wrap_y: bool) {
        if self.row == 0 {
            // Crossing the pole reflects the column
            self.col = n_cols - self.col - 1;
            self.flows = self.flows && wrap_y;
        } else {
            self.row -= 1;
        }
    }

    fn move_south(&mut self, n_rows: usize, n_cols: usize, wrap_y: bool) {
        if self.row == n_rows - 1 {
            self.col = n_cols - self.col - 1;
            self.flows = self.flows && wrap_y;
        } else {
            self.row += 1;
        }
    }
}

fn downstream_of(
    directions: &Grid<i32>,
    row: usize,
    col: usize,
    wrap_x: bool,
    wrap_y: bool,
) -> Downstream {
    let (rows, cols) = directions.shape();
    let mut ds = Downstream { row, col, flows: true };

    match unsafe { directions.get_unchecked(row, col) } {
        DIR_NORTH => ds.move_north(cols, wrap_y),
        DIR_NORTHEAST => {
            ds.move_north(cols, wrap_y);
            ds.move_east(cols, wrap_x);
        }
        DIR_EAST => ds.move_east(cols, wrap_x),
        DIR_SOUTHEAST => {
            ds.move_south(rows, cols, wrap_y);
            ds.move_east(cols, wrap_x);
        }
        DIR_SOUTH => ds.move_south(rows, cols, wrap_y),
        DIR_SOUTHWEST => {
            ds.move_south(rows, cols, wrap_y);
            ds.move_west(cols, wrap_x);
        }
        DIR_WEST => ds.move_west(cols, wrap_x),
        DIR_NORTHWEST => {
            ds.move_north(cols, wrap_y);
            ds.move_west(cols, wrap_x);
        }
        code => {
            // Missing and 0 both mark sink cells
            ds.flows = false;
            if !code.is_missing() && code != 0 {
                warn!(code, row, col, "invalid flow direction");
            }
        }
    }

    ds
}

/// For each cell, sum the direction codes of the neighbors draining
/// into it. Zero means no adjacent cell flows in (a headwater).
pub fn inward_flow_grid(directions: &Grid<i32>, wrap_x: bool, wrap_y: bool) -> Grid<i32> {
    let (rows, cols) = directions.shape();
    let mut inward = Grid::new(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let ds = downstream_of(directions, i, j, wrap_x, wrap_y);
            if ds.flows {
                let code = unsafe { directions.get_unchecked(i, j) };
                let cur = unsafe { inward.get_unchecked(ds.row, ds.col) };
                unsafe { inward.set_unchecked(ds.row, ds.col, cur + code) };
            }
        }
    }

    inward
}

/// Accumulate flow, given flow directions and per-cell weights.
///
/// The weight grid may be coarser than the direction grid by an integer
/// factor shared by both axes; each coarse weight is spread evenly over
/// its fine cells before routing and the result is re-aggregated to the
/// weight grid's resolution. Cells whose direction is missing are
/// masked in the output.
///
/// # Arguments
/// * `directions` - D8 direction codes; 0 or missing marks a sink
/// * `weights` - amount of flow originating at each cell
/// * `wrap_x` - route flow exiting the X-limits to the opposite side
/// * `wrap_y` - route flow exiting the Y-limits across the pole
pub fn accumulate_flow(
    directions: &Grid<i32>,
    weights: &Grid<f64>,
    wrap_x: bool,
    wrap_y: bool,
) -> Result<Grid<f64>> {
    let (drows, dcols) = directions.shape();
    let (wrows, wcols) = weights.shape();

    if wrows == 0 || wcols == 0 || drows % wrows != 0 || dcols % wcols != 0 {
        return Err(Error::SizeMismatch { er: drows, ec: dcols, ar: wrows, ac: wcols });
    }

    let factor = drows / wrows;
    if dcols / wcols != factor {
        return Err(Error::SizeMismatch { er: drows, ec: dcols, ar: wrows, ac: wcols });
    }

    let mut flows = disaggregate_amount(weights, factor)?;
    let mut inward = inward_flow_grid(directions, wrap_x, wrap_y);

    let mut frontier: Vec<(usize, usize)> = Vec::new();
    for i in 0..drows {
        for j in 0..dcols {
            if unsafe { inward.get_unchecked(i, j) } == 0 {
                frontier.push((i, j));
            }
        }
    }

    let mut rounds = 0;
    while !frontier.is_empty() && rounds < MAX_ROUNDS {
        rounds += 1;
        let mut next = Vec::new();

        for &(i, j) in &frontier {
            let ds = downstream_of(directions, i, j, wrap_x, wrap_y);
            if !ds.flows {
                continue;
            }

            let mut weight = unsafe { flows.get_unchecked(i, j) };
            if weight.is_nan() {
                weight = 0.0;
            }

            let cur = unsafe { flows.get_unchecked(ds.row, ds.col) };
            let sum = if cur.is_nan() { weight } else { cur + weight };
            unsafe { flows.set_unchecked(ds.row, ds.col, sum) };

            let code = unsafe { directions.get_unchecked(i, j) };
            let remaining = unsafe { inward.get_unchecked(ds.row, ds.col) } - code;
            unsafe { inward.set_unchecked(ds.row, ds.col, remaining) };
            if remaining == 0 {
                next.push((ds.row, ds.col));
            }
        }

        frontier = next;
    }

    if !frontier.is_empty() {
        return Err(Error::IterationCapExceeded(MAX_ROUNDS));
    }
    debug!(rounds, "flow accumulation converged");

    // The output mask follows the direction grid
    for i in 0..drows {
        for j in 0..dcols {
            if unsafe { directions.get_unchecked(i, j) }.is_missing() {
                unsafe { flows.set_unchecked(i, j, f64::NAN) };
            }
        }
    }

    Ok(aggregate_flows(flows, directions, factor, wrap_x, wrap_y))
}

/// Re-aggregate routed fine-grid flows back to the weight resolution.
///
/// Only flow that leaves its coarse cell is summed; a fine transition
/// whose downstream stays inside the same coarse cell would otherwise
/// be counted twice.
fn aggregate_flows(
    flows: Grid<f64>,
    directions: &Grid<i32>,
    factor: usize,
    wrap_x: bool,
    wrap_y: bool,
) -> Grid<f64> {
    if factor == 1 {
        return flows;
    }

    let (rows, cols) = flows.shape();
    let mut out: Grid<f64> = Grid::missing(rows / factor, cols / factor);

    for i in 0..rows {
        for j in 0..cols {
            let val = unsafe { flows.get_unchecked(i, j) };
            if val.is_nan() {
                continue;
            }

            let ds = downstream_of(directions, i, j, wrap_x, wrap_y);
            if ds.flows && ds.row / factor == i / factor && ds.col / factor == j / factor {
                continue;
            }

            let cur = unsafe { out.get_unchecked(i / factor, j / factor) };
            let sum = if cur.is_nan() { val } else { cur + val };
            unsafe { out.set_unchecked(i / factor, j / factor, sum) };
        }
    }

    out
}

/// Parameters for the [`FlowAccumulation`] algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowAccumulationParams {
    pub wrap_x: bool,
    pub wrap_y: bool,
}

/// D8 flow accumulation algorithm
#[derive(Debug, Clone, Default)]
pub struct FlowAccumulation;

impl Algorithm for FlowAccumulation {
    type Input = (Grid<i32>, Grid<f64>);
    type Output = Grid<f64>;
    type Params = FlowAccumulationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Accumulation"
    }

    fn description(&self) -> &'static str {
        "Accumulate weighted flow downstream over a D8 direction grid"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        accumulate_flow(&input.0, &input.1, params.wrap_x, params.wrap_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MISSING: i32 = i32::MIN;

    fn ones(rows: usize, cols: usize) -> Grid<f64> {
        Grid::filled(rows, cols, 1.0)
    }

    #[test]
    fn test_linear_strip_accumulates_east() {
        // 1x3 strip draining east into a sink
        let directions = Grid::from_vec(vec![DIR_EAST, DIR_EAST, 0], 1, 3).unwrap();

        let acc = accumulate_flow(&directions, &ones(1, 3), false, false).unwrap();
        assert_eq!(acc.get(0, 0).unwrap(), 1.0);
        assert_eq!(acc.get(0, 1).unwrap(), 2.0);
        assert_eq!(acc.get(0, 2).unwrap(), 3.0);
    }

    #[test]
    fn test_convergent_center_collects_all() {
        // Every border cell drains straight into the center sink
        let directions = Grid::from_vec(
            vec![
                DIR_SOUTHEAST, DIR_SOUTH, DIR_SOUTHWEST, //
                DIR_EAST, 0, DIR_WEST, //
                DIR_NORTHEAST, DIR_NORTH, DIR_NORTHWEST,
            ],
            3,
            3,
        )
        .unwrap();

        let acc = accumulate_flow(&directions, &ones(3, 3), false, false).unwrap();
        assert_eq!(acc.get(1, 1).unwrap(), 9.0);
    }

    #[test]
    fn test_conservation_at_sinks() {
        // 3x3 plane draining south into a sink row
        let directions = Grid::from_vec(
            vec![
                DIR_SOUTH, DIR_SOUTH, DIR_SOUTH, //
                DIR_SOUTH, DIR_SOUTH, DIR_SOUTH, //
                0, 0, 0,
            ],
            3,
            3,
        )
        .unwrap();
        let weights = Grid::from_vec(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
            3,
            3,
        )
        .unwrap();

        let acc = accumulate_flow(&directions, &weights, false, false).unwrap();

        let sink_total: f64 = (0..3).map(|j| acc.get(2, j).unwrap()).sum();
        let weight_total: f64 = weights.data().iter().sum();
        assert_relative_eq!(sink_total, weight_total, epsilon = 1e-9);
    }

    #[test]
    fn test_wrap_x_routes_across_edge() {
        let directions = Grid::from_vec(vec![0, DIR_EAST], 1, 2).unwrap();

        let wrapped = accumulate_flow(&directions, &ones(1, 2), true, false).unwrap();
        assert_eq!(wrapped.get(0, 0).unwrap(), 2.0);

        let clipped = accumulate_flow(&directions, &ones(1, 2), false, false).unwrap();
        assert_eq!(clipped.get(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_wrap_y_reflects_column_at_pole() {
        // A northern exit crosses the pole and lands in the mirrored
        // column of the same row
        let directions = Grid::from_vec(vec![DIR_NORTH, 0], 1, 2).unwrap();

        let wrapped = accumulate_flow(&directions, &ones(1, 2), false, true).unwrap();
        assert_eq!(wrapped.get(0, 1).unwrap(), 2.0);

        let clipped = accumulate_flow(&directions, &ones(1, 2), false, false).unwrap();
        assert_eq!(clipped.get(0, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_missing_directions_mask_output() {
        let directions = Grid::from_vec(vec![DIR_EAST, 0, MISSING], 1, 3).unwrap();

        let acc = accumulate_flow(&directions, &ones(1, 3), false, false).unwrap();
        assert_eq!(acc.get(0, 1).unwrap(), 2.0);
        assert!(acc.get(0, 2).unwrap().is_nan());
    }

    #[test]
    fn test_missing_weights_add_as_zero() {
        let directions = Grid::from_vec(vec![DIR_EAST, DIR_EAST, 0], 1, 3).unwrap();
        let weights = Grid::from_vec(vec![1.0, f64::NAN, 1.0], 1, 3).unwrap();

        let acc = accumulate_flow(&directions, &weights, false, false).unwrap();
        assert_eq!(acc.get(0, 2).unwrap(), 2.0);
    }

    #[test]
    fn test_coarse_weights_disaggregate_and_reaggregate() {
        // 2x2 directions all draining east off-grid; weights on a 1x1
        // grid spread evenly over the fine cells
        let directions = Grid::from_vec(vec![DIR_EAST, 0, DIR_EAST, 0], 2, 2).unwrap();
        let weights = Grid::from_vec(vec![8.0], 1, 1).unwrap();

        let acc = accumulate_flow(&directions, &weights, false, false).unwrap();

        assert_eq!(acc.shape(), (1, 1));
        assert_relative_eq!(acc.get(0, 0).unwrap(), 8.0);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let directions = Grid::<i32>::new(4, 4);

        let weights = Grid::<f64>::new(3, 3);
        assert!(accumulate_flow(&directions, &weights, false, false).is_err());

        let weights = Grid::<f64>::new(2, 4);
        assert!(accumulate_flow(&directions, &weights, false, false).is_err());
    }

    #[test]
    fn test_inward_flow_grid_sums_codes() {
        let directions = Grid::from_vec(
            vec![
                DIR_SOUTHEAST, DIR_SOUTH, DIR_SOUTHWEST, //
                DIR_EAST, 0, DIR_WEST, //
                DIR_NORTHEAST, DIR_NORTH, DIR_NORTHWEST,
            ],
            3,
            3,
        )
        .unwrap();

        let inward = inward_flow_grid(&directions, false, false);
        let expected: i32 = DIR_SOUTHEAST
            + DIR_SOUTH
            + DIR_SOUTHWEST
            + DIR_EAST
            + DIR_WEST
            + DIR_NORTHEAST
            + DIR_NORTH
            + DIR_NORTHWEST;
        assert_eq!(inward.get(1, 1).unwrap(), expected);
        assert_eq!(inward.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_multi_step_network() {
        // Two headwater arms joining before a sink
        let directions = Grid::from_vec(
            vec![
                DIR_SOUTH, MISSING, DIR_SOUTH, //
                DIR_SOUTHEAST, MISSING, DIR_SOUTHWEST, //
                MISSING, 0, MISSING,
            ],
            3,
            3,
        )
        .unwrap();

        // Sink gathers its own weight plus both two-cell arms
        let acc = accumulate_flow(&directions, &ones(3, 3), false, false).unwrap();
        assert_eq!(acc.get(2, 1).unwrap(), 5.0);
        assert!(acc.get(1, 1).unwrap().is_nan());
    }

    #[test]
    fn test_algorithm_wrapper() {
        let directions = Grid::from_vec(vec![DIR_EAST, 0], 1, 2).unwrap();
        let acc = FlowAccumulation
            .execute_default((directions, ones(1, 2)))
            .unwrap();
        assert_eq!(acc.get(0, 1).unwrap(), 2.0);
    }
}

//! Basin-to-basin flow accumulation
//!
//! Basins form a forest: each basin drains into at most one downstream
//! basin, with a non-positive downstream id marking a river mouth.
//! Processing begins at the mouths and works upstream to the
//! headwaters, then resolves back downstream, using an explicit stack
//! with a two-state (visited, resolved) flag so long rivers cannot
//! overflow the call stack.

use hydroflux_core::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

struct BasinForest {
    /// Index of the downstream basin, None at a mouth
    downstream: Vec<Option<usize>>,
    /// Indices of the basins draining into each basin
    upstream: Vec<Vec<usize>>,
}

fn build_forest(basin_ids: &[i32], downstream_ids: &[i32]) -> Result<BasinForest> {
    let n = basin_ids.len();

    if downstream_ids.len() != n {
        return Err(Error::LengthMismatch {
            expected: n,
            actual: downstream_ids.len(),
        });
    }

    let mut index: HashMap<i32, usize> = HashMap::with_capacity(n);
    for (i, &id) in basin_ids.iter().enumerate() {
        if index.insert(id, i).is_some() {
            return Err(Error::DuplicateBasin(id));
        }
    }

    let mut downstream = vec![None; n];
    let mut upstream = vec![Vec::new(); n];

    for (i, &down_id) in downstream_ids.iter().enumerate() {
        if down_id > 0 {
            let &down_idx = index.get(&down_id).ok_or(Error::UnknownDownstreamBasin {
                basin: basin_ids[i],
                downstream: down_id,
            })?;
            downstream[i] = Some(down_idx);
            upstream[down_idx].push(i);
        }
    }

    Ok(BasinForest { downstream, upstream })
}

struct AccumulatedFlows {
    /// Flow leaving each basin: local flow plus everything upstream
    flow_out: Vec<f64>,
    /// Local flow generated strictly downstream of each basin
    flow_downstream: Vec<f64>,
}

fn accumulate_impl(
    basin_ids: &[i32],
    downstream_ids: &[i32],
    flows: &[f64],
) -> Result<AccumulatedFlows> {
    let n = basin_ids.len();

    if flows.len() != n {
        return Err(Error::LengthMismatch {
            expected: n,
            actual: flows.len(),
        });
    }

    let forest = build_forest(basin_ids, downstream_ids)?;

    let mut flow_out = vec![0.0; n];
    let mut flow_downstream = vec![0.0; n];
    let mut visited = vec![false; n];
    let mut resolved = 0usize;

    let mut stack: Vec<usize> = (0..n).filter(|&i| forest.downstream[i].is_none()).collect();

    while let Some(&basin) = stack.last() {
        if visited[basin] || forest.upstream[basin].is_empty() {
            // Second visit (or headwater): all children resolved
            stack.pop();
            flow_out[basin] = flows[basin];
            for &up in &forest.upstream[basin] {
                flow_out[basin] += flow_out[up];
            }
            resolved += 1;
        } else {
            // First visit: queue the upstream basins and push the
            // downstream accumulation up to them
            for &up in &forest.upstream[basin] {
                stack.push(up);
                flow_downstream[up] += flows[basin] + flow_downstream[basin];
            }
            visited[basin] = true;
        }
    }

    if resolved != n {
        return Err(Error::BasinCycle { unresolved: n - resolved });
    }
    debug!(basins = n, "basin accumulation resolved");

    Ok(AccumulatedFlows { flow_out, flow_downstream })
}

/// Accumulate flow through a basin network.
///
/// Returns, for each basin, the flow at its outlet: the flow generated
/// within the basin plus the outlet flow of every upstream basin.
///
/// # Arguments
/// * `basin_ids` - basin identifiers
/// * `downstream_ids` - id of each basin's downstream basin, aligned
///   with `basin_ids`; non-positive means the basin empties into a sink
/// * `flows` - flow generated within each basin
pub fn accumulate_basins(
    basin_ids: &[i32],
    downstream_ids: &[i32],
    flows: &[f64],
) -> Result<Vec<f64>> {
    Ok(accumulate_impl(basin_ids, downstream_ids, flows)?.flow_out)
}

/// Sum of flow originating in basins strictly downstream of each basin.
///
/// Excludes flow generated within the basin itself; a river mouth gets
/// zero.
pub fn downstream_flow(
    basin_ids: &[i32],
    downstream_ids: &[i32],
    flows: &[f64],
) -> Result<Vec<f64>> {
    Ok(accumulate_impl(basin_ids, downstream_ids, flows)?.flow_downstream)
}

//! Resolution changes and value mapping for grids
//!
//! Aggregation collapses f×f blocks to single cells with missing-aware
//! reductions; disaggregation expands cells back out. Reclassification
//! and substitution map scalar cell values through lookup tables.

mod aggregate;
mod disaggregate;
mod reclassify;

pub use aggregate::{aggregate_mean, aggregate_mean_doy, aggregate_sum};
pub use disaggregate::{disaggregate, disaggregate_amount, disaggregate_pfun, PointwiseOp};
pub use reclassify::{coalesce, coalesce_grid, reclassify, substitute};

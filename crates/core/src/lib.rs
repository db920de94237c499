//! # HydroFlux Core
//!
//! Core types and I/O for the HydroFlux water-balance toolkit.
//!
//! This crate provides:
//! - `Grid<T>`: generic 2-D grid type with missing-value semantics
//! - `Stack`: 3-D array of per-cell time series or ensembles
//! - `GridElement`: cell-type trait hiding the missing-value sentinel
//! - Algorithm trait for consistent API
//! - The MIRCA condensed crop calendar parser

pub mod error;
pub mod grid;
pub mod io;

pub use error::{Error, Result};
pub use grid::{Grid, GridElement, Stack};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid::{Grid, GridElement, Stack};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in HydroFlux.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

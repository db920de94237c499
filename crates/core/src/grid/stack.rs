//! 3-D stack type for per-cell time series

use crate::error::{Error, Result};
use crate::grid::Grid;
use ndarray::{s, Array3, ArrayView1};

/// A 3-D array of shape `(rows, cols, depth)`.
///
/// Each `(row, col, ·)` vector holds a time series or ensemble for one
/// cell. Missing values use NaN; reductions over the depth axis ignore
/// NaN unless stated otherwise.
#[derive(Debug, Clone)]
pub struct Stack {
    data: Array3<f64>,
}

impl Stack {
    /// Create a new stack filled with zeros
    pub fn new(rows: usize, cols: usize, depth: usize) -> Self {
        Self {
            data: Array3::zeros((rows, cols, depth)),
        }
    }

    /// Create a new stack filled with a specific value
    pub fn filled(rows: usize, cols: usize, depth: usize, value: f64) -> Self {
        Self {
            data: Array3::from_elem((rows, cols, depth), value),
        }
    }

    /// Create a stack from existing data.
    ///
    /// `data` is laid out row-major with the depth axis contiguous:
    /// index `(i, j, k)` maps to `((i * cols) + j) * depth + k`.
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize, depth: usize) -> Result<Self> {
        if data.len() != rows * cols * depth {
            return Err(Error::LengthMismatch {
                expected: rows * cols * depth,
                actual: data.len(),
            });
        }

        let array = Array3::from_shape_vec((rows, cols, depth), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self { data: array })
    }

    /// Create a stack from an ndarray
    pub fn from_array(data: Array3<f64>) -> Self {
        Self { data }
    }

    /// Build a stack from a sequence of same-shape layers; layer `k`
    /// becomes depth index `k` of every cell series.
    pub fn from_layers(layers: &[Grid<f64>]) -> Result<Self> {
        let depth = layers.len();
        if depth == 0 {
            return Err(Error::InvalidDimensions { rows: 0, cols: 0 });
        }

        let (rows, cols) = layers[0].shape();
        for layer in &layers[1..] {
            layers[0].check_same_shape(layer)?;
        }

        let mut data = Array3::zeros((rows, cols, depth));
        for (k, layer) in layers.iter().enumerate() {
            for i in 0..rows {
                for j in 0..cols {
                    data[(i, j, k)] = unsafe { layer.get_unchecked(i, j) };
                }
            }
        }

        Ok(Self { data })
    }

    /// Dimensions as (rows, cols, depth)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Length of each cell series
    pub fn depth(&self) -> usize {
        self.data.dim().2
    }

    /// Get value at (row, col, level)
    pub fn get(&self, row: usize, col: usize, level: usize) -> Result<f64> {
        self.data
            .get((row, col, level))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col, level) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure the indices are in bounds
    pub unsafe fn get_unchecked(&self, row: usize, col: usize, level: usize) -> f64 {
        unsafe { *self.data.uget((row, col, level)) }
    }

    /// Set value at (row, col, level)
    pub fn set(&mut self, row: usize, col: usize, level: usize, value: f64) -> Result<()> {
        let (rows, cols, depth) = self.shape();
        if row >= rows || col >= cols || level >= depth {
            return Err(Error::IndexOutOfBounds { row, col, rows, cols });
        }
        self.data[(row, col, level)] = value;
        Ok(())
    }

    /// Set value at (row, col, level) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure the indices are in bounds
    pub unsafe fn set_unchecked(&mut self, row: usize, col: usize, level: usize, value: f64) {
        unsafe { *self.data.uget_mut((row, col, level)) = value; }
    }

    /// View of the series at one cell
    pub fn cell_series(&self, row: usize, col: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![row, col, ..])
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array3<f64> {
        &mut self.data
    }

    /// Consume the stack and return the underlying array
    pub fn into_array(self) -> Array3<f64> {
        self.data
    }
}

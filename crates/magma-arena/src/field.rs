//! A single square grid of heat values.

use magma_core::FieldRead;

/// Square grid of non-negative heat values, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatField {
    side: u32,
    cells: Vec<f32>,
}

impl HeatField {
    /// A zero-filled field of `side × side` cells.
    pub fn new(side: u32) -> Self {
        Self {
            side,
            cells: vec![0.0; side as usize * side as usize],
        }
    }

    /// Build a field from existing values.
    ///
    /// Returns `None` if `cells.len() != side * side`.
    pub fn from_cells(side: u32, cells: Vec<f32>) -> Option<Self> {
        if cells.len() != side as usize * side as usize {
            return None;
        }
        Some(Self { side, cells })
    }

    /// Set every cell to zero.
    pub fn zero(&mut self) {
        self.cells.fill(0.0);
    }

    /// Row-major values.
    pub fn as_slice(&self) -> &[f32] {
        &self.cells
    }

    /// Row-major values, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.cells
    }

    /// Set an in-range cell.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is not below the side.
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let side = self.side as usize;
        self.cells[y as usize * side + x as usize] = value;
    }

    /// Largest value in the field (0 for an all-zero field).
    pub fn max(&self) -> f32 {
        self.cells.iter().copied().fold(0.0, f32::max)
    }

    /// Sum of all values.
    pub fn sum(&self) -> f64 {
        self.cells.iter().map(|&v| f64::from(v)).sum()
    }

    /// Position of the largest value, first in row-major order on ties.
    pub fn argmax(&self) -> (u32, u32) {
        let mut best = 0usize;
        for (i, &v) in self.cells.iter().enumerate() {
            if v > self.cells[best] {
                best = i;
            }
        }
        let side = self.side.max(1) as usize;
        ((best % side) as u32, (best / side) as u32)
    }

    /// `true` if every cell is exactly zero.
    pub fn is_extinct(&self) -> bool {
        self.cells.iter().all(|&v| v == 0.0)
    }
}

impl FieldRead for HeatField {
    fn side(&self) -> u32 {
        self.side
    }

    fn cells(&self) -> &[f32] {
        &self.cells
    }
}

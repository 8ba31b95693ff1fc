//! Core abstraction trait for reading a scalar heat field.

/// Read-only access to a square scalar field.
///
/// Implemented by the arena's `HeatField` and by test doubles. Every
/// lookup outside `[0, side)` clamps to the nearest in-range cell; the
/// field never wraps.
pub trait FieldRead {
    /// Number of cells along each axis.
    fn side(&self) -> u32;

    /// Row-major cell values; length `side * side`.
    fn cells(&self) -> &[f32];

    /// Value at an in-range cell.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is not below `side()`.
    fn get(&self, x: u32, y: u32) -> f32 {
        self.cells()[y as usize * self.side() as usize + x as usize]
    }

    /// Value at a possibly out-of-range cell, clamped onto the grid.
    fn sample_clamped(&self, x: i64, y: i64) -> f32 {
        let max = i64::from(self.side()) - 1;
        let cx = x.clamp(0, max) as usize;
        let cy = y.clamp(0, max) as usize;
        self.cells()[cy * self.side() as usize + cx]
    }

    /// Bilinear sample at normalised coordinates.
    ///
    /// Cell `(x, y)` has its centre at `((x + 0.5) / side, (y + 0.5) / side)`;
    /// sampling exactly on a centre returns that cell's value. Taps that
    /// fall outside the grid use clamp-to-edge.
    fn sample_uv(&self, u: f32, v: f32) -> f32 {
        let side = self.side() as f32;
        let x = u * side - 0.5;
        let y = v * side - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (ix, iy) = (x0 as i64, y0 as i64);

        let a = self.sample_clamped(ix, iy);
        let b = self.sample_clamped(ix + 1, iy);
        let c = self.sample_clamped(ix, iy + 1);
        let d = self.sample_clamped(ix + 1, iy + 1);

        let top = a + (b - a) * fx;
        let bottom = c + (d - c) * fx;
        top + (bottom - top) * fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Grid {
        side: u32,
        cells: Vec<f32>,
    }

    impl FieldRead for Grid {
        fn side(&self) -> u32 {
            self.side
        }
        fn cells(&self) -> &[f32] {
            &self.cells
        }
    }

    fn ramp_grid(side: u32) -> Grid {
        let cells = (0..side * side).map(|i| i as f32).collect();
        Grid { side, cells }
    }

    #[test]
    fn clamped_lookup_repeats_edge() {
        let g = ramp_grid(3);
        assert_eq!(g.sample_clamped(-1, 0), g.get(0, 0));
        assert_eq!(g.sample_clamped(3, 1), g.get(2, 1));
        assert_eq!(g.sample_clamped(1, -5), g.get(1, 0));
        assert_eq!(g.sample_clamped(9, 9), g.get(2, 2));
    }

    #[test]
    fn uv_on_cell_centre_is_exact() {
        let g = ramp_grid(4);
        let v = g.sample_uv(2.5 / 4.0, 1.5 / 4.0);
        assert!((v - g.get(2, 1)).abs() < 1e-5);
    }

    #[test]
    fn uv_between_centres_interpolates() {
        let g = ramp_grid(4);
        // Halfway between (1,1)=5 and (2,1)=6.
        let v = g.sample_uv(2.0 / 4.0, 1.5 / 4.0);
        assert!((v - 5.5).abs() < 1e-5, "got {v}");
    }

    #[test]
    fn uv_outside_clamps_to_edge() {
        let g = ramp_grid(4);
        assert!((g.sample_uv(-1.0, -1.0) - g.get(0, 0)).abs() < 1e-6);
        assert!((g.sample_uv(2.0, 2.0) - g.get(3, 3)).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn clamped_lookup_stays_in_range(x in -100i64..100, y in -100i64..100) {
            let g = ramp_grid(5);
            let v = g.sample_clamped(x, y);
            let cx = x.clamp(0, 4) as u32;
            let cy = y.clamp(0, 4) as u32;
            prop_assert_eq!(v, g.get(cx, cy));
        }

        #[test]
        fn bilinear_within_cell_bounds(u in -0.5f32..1.5, v in -0.5f32..1.5) {
            let g = ramp_grid(6);
            let s = g.sample_uv(u, v);
            prop_assert!(s >= 0.0 && s <= 35.0 + 1e-3);
        }
    }
}

//! Shared grid and interpolation helpers.
//!
//! Axis clamping and 4-connected neighbour lookup for the diffusion
//! kernel, plus the GLSL-style `smoothstep`/`mix` used by both kernels.

/// Clamp a possibly out-of-range axis value onto `[0, len)`.
#[inline]
pub(crate) fn clamp_axis(val: i64, len: u32) -> usize {
    val.clamp(0, i64::from(len) - 1) as usize
}

/// Flat indices of the west, east, north and south neighbours of
/// `(x, y)`. Out-of-range neighbours clamp onto the edge, so a boundary
/// cell sees its own value in place of the missing side.
#[inline]
pub(crate) fn neighbours_clamped(x: u32, y: u32, side: u32) -> [usize; 4] {
    let (xi, yi) = (i64::from(x), i64::from(y));
    let s = side as usize;
    let row = y as usize * s;
    [
        row + clamp_axis(xi - 1, side),
        row + clamp_axis(xi + 1, side),
        clamp_axis(yi - 1, side) * s + x as usize,
        clamp_axis(yi + 1, side) * s + x as usize,
    ]
}

/// Hermite interpolation between two edges, GLSL semantics.
///
/// `edge0 > edge1` is allowed and yields a falling curve, so
/// `smoothstep(r, 0, d)` is 1 at `d = 0` and 0 at `d >= r`. The
/// derivative is zero at both edges.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let delta = edge1 - edge0;
    if delta == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / delta).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend, `a` at `t = 0` and `b` at `t = 1`.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_axis_in_bounds() {
        assert_eq!(clamp_axis(2, 5), 2);
        assert_eq!(clamp_axis(0, 5), 0);
    }

    #[test]
    fn clamp_axis_out_of_bounds() {
        assert_eq!(clamp_axis(-1, 5), 0);
        assert_eq!(clamp_axis(7, 5), 4);
    }

    #[test]
    fn neighbours_center() {
        // 3x3: west=3, east=5, north=1, south=7
        assert_eq!(neighbours_clamped(1, 1, 3), [3, 5, 1, 7]);
    }

    #[test]
    fn neighbours_corner_repeat_self() {
        // (0,0): west and north clamp back onto cell 0.
        assert_eq!(neighbours_clamped(0, 0, 3), [0, 1, 0, 3]);
        // (2,2): east and south clamp back onto cell 8.
        assert_eq!(neighbours_clamped(2, 2, 3), [7, 8, 5, 8]);
    }

    #[test]
    fn neighbours_single_cell_grid() {
        assert_eq!(neighbours_clamped(0, 0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn smoothstep_rising() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn smoothstep_falling() {
        assert_eq!(smoothstep(0.1, 0.0, 0.0), 1.0);
        assert_eq!(smoothstep(0.1, 0.0, 0.1), 0.0);
        assert_eq!(smoothstep(0.1, 0.0, 0.5), 0.0);
        assert!((smoothstep(0.1, 0.0, 0.05) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn smoothstep_degenerate_edges() {
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.5), 1.0);
    }

    #[test]
    fn mix_endpoints() {
        assert_eq!(mix(2.0, 4.0, 0.0), 2.0);
        assert_eq!(mix(2.0, 4.0, 1.0), 4.0);
        assert_eq!(mix(2.0, 4.0, 0.5), 3.0);
    }
}

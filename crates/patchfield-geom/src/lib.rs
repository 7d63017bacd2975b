#![warn(missing_docs)]

//! Bicubic Bezier patch construction and tile layout for patchfield.
//!
//! Turns a [`ControlGrid`] of heights into spatially laid-out bicubic
//! Bezier patches:
//!
//! 1. [`TileLayout`] computes the per-patch side length and the placement
//!    offset that centers the whole patch array in its footprint square.
//! 2. [`build_patches`] partitions the grid into 4x4 sub-blocks, lays the
//!    16 control points of each block uniformly across `[-0.5, 0.5]²` in
//!    the plane, lifts them by the grid heights, and assigns each patch
//!    its translation and scaling.
//!
//! A renderer draws patches from the shared sample topology alone, but
//! [`BezierPatch`] also carries a CPU reference evaluation of the bicubic
//! Bernstein basis for exporters and tests.

use patchfield_grid::{ControlGrid, BLOCK};
use patchfield_math::{Dir3, Point3, Transform, Vec3};

/// Planar spacing between adjacent control points of one patch.
///
/// Four control points per axis span a unit square, so they sit 1/3 apart.
pub const CONTROL_SPACING: f64 = 1.0 / 3.0;

// =============================================================================
// Tile layout
// =============================================================================

/// Uniform scale and placement for a rectangular array of unit patches.
///
/// The array of `nx x ny` patches, each scaled to side length
/// [`TileLayout::side`], is centered within a `footprint x footprint`
/// square around the origin. `offset` translates the top-left patch's
/// center; subsequent patches step by `side` to the right and down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    /// Side length of each patch: `footprint / max(nx, ny)`.
    pub side: f64,
    /// Translation of the top-left patch.
    pub offset: Vec3,
}

impl TileLayout {
    /// Compute the layout for an `nx x ny` patch array in a
    /// `footprint x footprint` square centered at the origin.
    ///
    /// When the array is wider than tall, the short (vertical) dimension
    /// is centered. The taller-than-wide case keeps the square-case
    /// offset, pinning the array to the left edge instead of centering it
    /// horizontally; that asymmetry is long-standing layout behavior and
    /// is kept as-is.
    pub fn compute(nx: usize, ny: usize, footprint: f64) -> Self {
        let side = footprint / nx.max(ny) as f64;
        let half = footprint / 2.0;
        let offset = if nx > ny {
            Vec3::new(0.5 * side - half, -half + side * ny as f64 - 0.5 * side, 0.0)
        } else {
            Vec3::new(0.5 * side - half, half - 0.5 * side, 0.0)
        };
        Self { side, offset }
    }

    /// Translation of the patch at row `i`, column `j`.
    ///
    /// Patches run left to right and top to bottom, y decreasing by row.
    pub fn patch_translation(&self, i: usize, j: usize) -> Vec3 {
        self.offset + Vec3::new(j as f64 * self.side, -(i as f64) * self.side, 0.0)
    }

    /// Per-patch scaling vector: uniform in the plane, unit in z.
    pub fn patch_scaling(&self) -> Vec3 {
        Vec3::new(self.side, self.side, 1.0)
    }
}

// =============================================================================
// Bernstein basis
// =============================================================================

/// Cubic Bernstein basis values `B0..B3` at parameter `t`.
fn bernstein3(t: f64) -> [f64; 4] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * s * s * t, 3.0 * s * t * t, t * t * t]
}

/// Derivatives of the cubic Bernstein basis at parameter `t`.
fn bernstein3_deriv(t: f64) -> [f64; 4] {
    let s = 1.0 - t;
    [
        -3.0 * s * s,
        3.0 * s * s - 6.0 * s * t,
        6.0 * s * t - 3.0 * t * t,
        3.0 * t * t,
    ]
}

// =============================================================================
// Bezier patch
// =============================================================================

/// One bicubic Bezier patch: 16 control points plus its placement.
///
/// Control points are stored row-major over local `(v, u)`: index
/// `v * 4 + u`, with row `v = 0` at the top (`y = 0.5`) and `u` growing
/// with x. Control-point positions never change after construction;
/// `translation` and `scaling` are rewritten in place when the footprint
/// scale changes.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierPatch {
    /// Control points, row-major over local `(v, u)`.
    pub control_points: [Point3; 16],
    /// Placement translation in model space.
    pub translation: Vec3,
    /// Placement scaling: uniform in x/y, 1 in z.
    pub scaling: Vec3,
}

impl BezierPatch {
    /// Control point at local `(v, u)`, both in `0..4`.
    pub fn control_point(&self, v: usize, u: usize) -> &Point3 {
        &self.control_points[v * BLOCK + u]
    }

    /// Rewrite this patch's placement from `layout` for row-major cell `(i, j)`.
    pub fn place(&mut self, layout: &TileLayout, i: usize, j: usize) {
        self.translation = layout.patch_translation(i, j);
        self.scaling = layout.patch_scaling();
    }

    /// The model transform a renderer applies: scale, then translate.
    pub fn model_transform(&self) -> Transform {
        Transform::translation(self.translation.x, self.translation.y, self.translation.z)
            .then(&Transform::scale(
                self.scaling.x,
                self.scaling.y,
                self.scaling.z,
            ))
    }

    /// Evaluate the patch surface at `(u, v)` in local (pre-placement) space.
    pub fn evaluate(&self, u: f64, v: f64) -> Point3 {
        let bu = bernstein3(u);
        let bv = bernstein3(v);
        self.weighted_sum(&bu, &bv)
    }

    /// Partial derivative with respect to u, in local space.
    pub fn d_du(&self, u: f64, v: f64) -> Vec3 {
        let bu = bernstein3_deriv(u);
        let bv = bernstein3(v);
        self.weighted_sum(&bu, &bv).coords
    }

    /// Partial derivative with respect to v, in local space.
    pub fn d_dv(&self, u: f64, v: f64) -> Vec3 {
        let bu = bernstein3(u);
        let bv = bernstein3_deriv(v);
        self.weighted_sum(&bu, &bv).coords
    }

    /// Surface normal at `(u, v)` in local space.
    pub fn normal(&self, u: f64, v: f64) -> Dir3 {
        let n = self.d_du(u, v).cross(&self.d_dv(u, v));
        if n.norm() < 1e-15 {
            Dir3::new_normalize(Vec3::z())
        } else {
            Dir3::new_normalize(n)
        }
    }

    fn weighted_sum(&self, bu: &[f64; 4], bv: &[f64; 4]) -> Point3 {
        let mut acc = Vec3::zeros();
        for (v_idx, &wv) in bv.iter().enumerate() {
            for (u_idx, &wu) in bu.iter().enumerate() {
                acc += wu * wv * self.control_point(v_idx, u_idx).coords;
            }
        }
        Point3::from(acc)
    }
}

// =============================================================================
// Patch construction
// =============================================================================

/// Partition `grid` into 4x4 sub-blocks and build one placed patch per block.
///
/// The output is row-major over block `(i, j)`: patch index `i * nx + j`.
/// That ordering is what placement updates key on, so it must match
/// [`TileLayout::patch_translation`]'s `(i, j)` convention — and does.
pub fn build_patches(grid: &ControlGrid, footprint: f64) -> Vec<BezierPatch> {
    let nx = grid.blocks_x();
    let ny = grid.blocks_y();
    if nx == 0 || ny == 0 {
        return Vec::new();
    }

    let layout = TileLayout::compute(nx, ny, footprint);
    let mut patches = Vec::with_capacity(nx * ny);

    for i in 0..ny {
        for j in 0..nx {
            let mut control_points = [Point3::origin(); 16];
            for v in 0..BLOCK {
                for u in 0..BLOCK {
                    let z = grid.height(BLOCK * i + v, BLOCK * j + u);
                    control_points[v * BLOCK + u] = Point3::new(
                        u as f64 * CONTROL_SPACING - 0.5,
                        0.5 - v as f64 * CONTROL_SPACING,
                        z,
                    );
                }
            }
            let mut patch = BezierPatch {
                control_points,
                translation: Vec3::zeros(),
                scaling: Vec3::zeros(),
            };
            patch.place(&layout, i, j);
            patches.push(patch);
        }
    }

    patches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(rows: usize, cols: usize) -> ControlGrid {
        ControlGrid::new(rows, cols, vec![0.0; rows * cols]).unwrap()
    }

    fn ramp_grid(rows: usize, cols: usize) -> ControlGrid {
        let heights = (0..rows * cols).map(|k| k as f64).collect();
        ControlGrid::new(rows, cols, heights).unwrap()
    }

    // ---- Tile layout tests ----

    #[test]
    fn test_layout_square() {
        let layout = TileLayout::compute(3, 3, 1.0);
        assert!((layout.side - 1.0 / 3.0).abs() < 1e-12);
        assert!((layout.offset.x - (-1.0 / 3.0)).abs() < 1e-12);
        assert!((layout.offset.y - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(layout.offset.z, 0.0);
    }

    #[test]
    fn test_layout_x_dominant_centers_vertically() {
        let layout = TileLayout::compute(2, 1, 1.0);
        assert!((layout.side - 0.5).abs() < 1e-12);
        assert!((layout.offset.x - (-0.25)).abs() < 1e-12);
        // -1/2 + s*ny - s/2 with s = 1/2, ny = 1
        assert!((layout.offset.y - (-0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_layout_y_dominant_matches_square_offset() {
        // The taller-than-wide case intentionally reuses the square-case
        // offset formula instead of a horizontally-centered variant.
        let tall = TileLayout::compute(1, 2, 1.0);
        let square = TileLayout::compute(2, 2, 1.0);
        assert_eq!(tall.side, square.side);
        assert_eq!(tall.offset, square.offset);
    }

    #[test]
    fn test_layout_scales_linearly_with_footprint() {
        for (nx, ny) in [(3, 3), (4, 1), (1, 4)] {
            let base = TileLayout::compute(nx, ny, 1.0);
            let doubled = TileLayout::compute(nx, ny, 2.0);
            assert!((doubled.side - 2.0 * base.side).abs() < 1e-12);
            assert!((doubled.offset - 2.0 * base.offset).norm() < 1e-12);
        }
    }

    #[test]
    fn test_patch_translation_steps() {
        let layout = TileLayout::compute(3, 3, 1.0);
        let origin = layout.patch_translation(0, 0);
        assert!((origin - layout.offset).norm() < 1e-12);
        let far = layout.patch_translation(2, 2);
        let expected = layout.offset + Vec3::new(2.0 / 3.0, -2.0 / 3.0, 0.0);
        assert!((far - expected).norm() < 1e-12);
    }

    // ---- Patch construction tests ----

    #[test]
    fn test_patch_count() {
        assert_eq!(build_patches(&flat_grid(4, 4), 1.0).len(), 1);
        assert_eq!(build_patches(&flat_grid(12, 12), 1.0).len(), 9);
        assert_eq!(build_patches(&flat_grid(4, 16), 1.0).len(), 4);
    }

    #[test]
    fn test_planar_control_point_layout() {
        let patches = build_patches(&flat_grid(4, 4), 1.0);
        let patch = &patches[0];
        // Row v = 0 is the top edge, u grows with x.
        assert!((patch.control_point(0, 0) - Point3::new(-0.5, 0.5, 0.0)).norm() < 1e-12);
        assert!((patch.control_point(0, 3) - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
        assert!((patch.control_point(3, 0) - Point3::new(-0.5, -0.5, 0.0)).norm() < 1e-12);
        assert!(
            (patch.control_point(1, 2)
                - Point3::new(2.0 * CONTROL_SPACING - 0.5, 0.5 - CONTROL_SPACING, 0.0))
            .norm()
                < 1e-12
        );
    }

    #[test]
    fn test_heights_map_to_sub_blocks() {
        let grid = ramp_grid(8, 8);
        let patches = build_patches(&grid, 1.0);
        assert_eq!(patches.len(), 4);
        // Patch (i=1, j=0) reads grid rows 4..8, columns 0..4.
        let patch = &patches[2];
        assert_eq!(patch.control_point(0, 0).z, grid.height(4, 0));
        assert_eq!(patch.control_point(2, 3).z, grid.height(6, 3));
    }

    #[test]
    fn test_three_by_three_scenario() {
        // 12x12 grid, unit footprint: s = 1/3, offset (-1/3, 1/3, 0).
        let patches = build_patches(&flat_grid(12, 12), 1.0);
        let first = &patches[0];
        assert!((first.translation - Vec3::new(-1.0 / 3.0, 1.0 / 3.0, 0.0)).norm() < 1e-12);
        assert!((first.scaling - Vec3::new(1.0 / 3.0, 1.0 / 3.0, 1.0)).norm() < 1e-12);
        let last = &patches[8]; // (i=2, j=2)
        let expected = first.translation + Vec3::new(2.0 / 3.0, -2.0 / 3.0, 0.0);
        assert!((last.translation - expected).norm() < 1e-12);
    }

    #[test]
    fn test_row_major_patch_order() {
        let patches = build_patches(&flat_grid(8, 12), 1.0);
        // nx = 3, ny = 2: index i*nx + j.
        let layout = TileLayout::compute(3, 2, 1.0);
        for i in 0..2 {
            for j in 0..3 {
                let patch = &patches[i * 3 + j];
                assert!((patch.translation - layout.patch_translation(i, j)).norm() < 1e-12);
            }
        }
    }

    // ---- Evaluation tests ----

    #[test]
    fn test_bernstein_partition_of_unity() {
        for k in 0..=20 {
            let t = k as f64 / 20.0;
            let sum: f64 = bernstein3(t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum at t={}: {}", t, sum);
            let dsum: f64 = bernstein3_deriv(t).iter().sum();
            assert!(dsum.abs() < 1e-12, "derivative sum at t={}: {}", t, dsum);
        }
    }

    #[test]
    fn test_flat_patch_evaluates_in_plane() {
        let patches = build_patches(&flat_grid(4, 4), 1.0);
        let patch = &patches[0];
        let center = patch.evaluate(0.5, 0.5);
        assert!(center.x.abs() < 1e-12);
        assert!(center.y.abs() < 1e-12);
        assert!(center.z.abs() < 1e-12);
    }

    #[test]
    fn test_corners_interpolate_control_points() {
        let grid = ramp_grid(4, 4);
        let patches = build_patches(&grid, 1.0);
        let patch = &patches[0];
        assert!((patch.evaluate(0.0, 0.0) - patch.control_point(0, 0)).norm() < 1e-12);
        assert!((patch.evaluate(1.0, 0.0) - patch.control_point(0, 3)).norm() < 1e-12);
        assert!((patch.evaluate(0.0, 1.0) - patch.control_point(3, 0)).norm() < 1e-12);
        assert!((patch.evaluate(1.0, 1.0) - patch.control_point(3, 3)).norm() < 1e-12);
    }

    #[test]
    fn test_flat_patch_normal_is_z() {
        let patches = build_patches(&flat_grid(4, 4), 1.0);
        let n = patches[0].normal(0.3, 0.7);
        assert!((n.as_ref().z.abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let grid = ramp_grid(4, 4);
        let patches = build_patches(&grid, 1.0);
        let patch = &patches[0];
        let h = 1e-6;
        let du = patch.d_du(0.4, 0.6);
        let approx = (patch.evaluate(0.4 + h, 0.6) - patch.evaluate(0.4 - h, 0.6)) / (2.0 * h);
        assert!((du - approx).norm() < 1e-6);
    }

    #[test]
    fn test_model_transform_places_corner() {
        let patches = build_patches(&flat_grid(12, 12), 1.0);
        let first = &patches[0];
        // Top-left corner of the top-left patch lands at the footprint corner.
        let corner = first
            .model_transform()
            .apply_point(&Point3::new(-0.5, 0.5, 0.0));
        assert!((corner.x - (-0.5)).abs() < 1e-12);
        assert!((corner.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_replace_keeps_control_points() {
        let grid = ramp_grid(4, 8);
        let mut patches = build_patches(&grid, 1.0);
        let before = patches[1].control_points;
        let layout = TileLayout::compute(2, 1, 3.0);
        patches[1].place(&layout, 0, 1);
        assert_eq!(patches[1].control_points, before);
        assert!((patches[1].scaling.x - 1.5).abs() < 1e-12);
    }
}

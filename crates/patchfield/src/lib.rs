#![warn(missing_docs)]

//! Bezier height-field patch pipeline.
//!
//! Builds a grid of bicubic Bezier patches from a control-point height
//! grid and keeps the set consistent under interactive density and scale
//! changes. A renderer consumes, per patch, the 16 control points and the
//! placement transform, plus the one [`SampleMesh`] shared by every patch.
//!
//! # Example
//!
//! ```
//! use patchfield::{ControlGrid, PatchSet, ViewCommand};
//!
//! let grid = ControlGrid::new(12, 12, vec![0.0; 144]).unwrap();
//! let mut set = PatchSet::new(&grid, 10, 1.0).unwrap();
//! assert_eq!(set.patches().len(), 9);
//! assert_eq!(set.sample_mesh().num_triangles(), 162);
//!
//! set.apply(ViewCommand::IncreaseSampleDensity);
//! assert_eq!(set.num_samples(), 12);
//! ```

pub use patchfield_geom;
pub use patchfield_grid;
pub use patchfield_math;
pub use patchfield_scene;
pub use patchfield_tessellate;

pub use patchfield_geom::{build_patches, BezierPatch, TileLayout};
pub use patchfield_grid::{ControlGrid, GridError};
pub use patchfield_scene::{PointLight, SceneDescription, SceneError};
pub use patchfield_tessellate::{tessellate, SampleMesh, TessellateError};

pub mod export;

/// Step applied per interactive density command.
pub const SAMPLE_STEP: usize = 2;

/// Lower bound of the interactive sample density range.
pub const MIN_SAMPLES: usize = 2;

/// Upper bound of the interactive sample density range.
pub const MAX_SAMPLES: usize = 80;

/// Step applied per interactive footprint-scale command.
pub const SCALE_STEP: f64 = 0.1;

/// Lower bound of the footprint scale.
pub const MIN_SCALE: f64 = 0.1;

/// One interactive command from the input-handling collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    /// Raise the per-axis sample count by [`SAMPLE_STEP`].
    IncreaseSampleDensity,
    /// Lower the per-axis sample count by [`SAMPLE_STEP`].
    DecreaseSampleDensity,
    /// Grow the assembly footprint by [`SCALE_STEP`].
    IncreaseFootprintScale,
    /// Shrink the assembly footprint by [`SCALE_STEP`].
    DecreaseFootprintScale,
}

/// The full set of patches plus the interactive view parameters.
///
/// Constructed once per scene load. The two mutating operations each
/// leave the set fully consistent: a renderer reading the set between
/// commands never observes a mix of old and new geometry. Patches are
/// never added or removed after construction.
#[derive(Debug, Clone)]
pub struct PatchSet {
    patches: Vec<BezierPatch>,
    sample_mesh: SampleMesh,
    num_samples: usize,
    coord_multiplier: f64,
    num_bezier_x: usize,
    num_bezier_y: usize,
}

impl PatchSet {
    /// Build the patch set for `grid` at the given initial sample density
    /// and footprint scale.
    ///
    /// The scale is clamped to [`MIN_SCALE`] like the interactive path;
    /// a density below [`MIN_SAMPLES`] is an error rather than a clamp,
    /// since nothing interactive asked for it.
    pub fn new(
        grid: &ControlGrid,
        num_samples: usize,
        coord_multiplier: f64,
    ) -> patchfield_tessellate::Result<Self> {
        let coord_multiplier = coord_multiplier.max(MIN_SCALE);
        let sample_mesh = tessellate(num_samples)?;
        let patches = build_patches(grid, coord_multiplier);
        log::debug!(
            "built {} patches ({}x{} blocks), {} samples/axis",
            patches.len(),
            grid.blocks_x(),
            grid.blocks_y(),
            num_samples
        );
        Ok(Self {
            patches,
            sample_mesh,
            num_samples,
            coord_multiplier,
            num_bezier_x: grid.blocks_x(),
            num_bezier_y: grid.blocks_y(),
        })
    }

    /// The patches, row-major over block `(i, j)`.
    pub fn patches(&self) -> &[BezierPatch] {
        &self.patches
    }

    /// The sample mesh shared by every patch.
    pub fn sample_mesh(&self) -> &SampleMesh {
        &self.sample_mesh
    }

    /// Current per-axis sample count.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Current footprint scale.
    pub fn coord_multiplier(&self) -> f64 {
        self.coord_multiplier
    }

    /// Number of patches along x.
    pub fn num_bezier_x(&self) -> usize {
        self.num_bezier_x
    }

    /// Number of patches along y.
    pub fn num_bezier_y(&self) -> usize {
        self.num_bezier_y
    }

    /// Set the per-axis sample density, clamped to
    /// `[MIN_SAMPLES, MAX_SAMPLES]`.
    ///
    /// Regenerates the shared sample mesh only when the clamped value
    /// differs from the current one; patches are untouched either way.
    pub fn set_sample_density(&mut self, samples: usize) {
        let clamped = samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
        if clamped == self.num_samples {
            return;
        }
        match tessellate(clamped) {
            Ok(mesh) => {
                self.sample_mesh = mesh;
                self.num_samples = clamped;
                log::debug!("sample density set to {}", clamped);
            }
            Err(_) => unreachable!("density clamped into the valid range"),
        }
    }

    /// Set the footprint scale, clamped to at least [`MIN_SCALE`].
    ///
    /// Recomputes the tile layout and rewrites every patch's placement in
    /// place; control points and the sample mesh are untouched.
    pub fn set_footprint_scale(&mut self, multiplier: f64) {
        let clamped = multiplier.max(MIN_SCALE);
        self.coord_multiplier = clamped;
        let layout = TileLayout::compute(self.num_bezier_x, self.num_bezier_y, clamped);
        for i in 0..self.num_bezier_y {
            for j in 0..self.num_bezier_x {
                self.patches[i * self.num_bezier_x + j].place(&layout, i, j);
            }
        }
        log::debug!("footprint scale set to {}", clamped);
    }

    /// Apply one interactive command.
    pub fn apply(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::IncreaseSampleDensity => {
                self.set_sample_density(self.num_samples + SAMPLE_STEP);
            }
            ViewCommand::DecreaseSampleDensity => {
                self.set_sample_density(self.num_samples.saturating_sub(SAMPLE_STEP));
            }
            ViewCommand::IncreaseFootprintScale => {
                self.set_footprint_scale(self.coord_multiplier + SCALE_STEP);
            }
            ViewCommand::DecreaseFootprintScale => {
                self.set_footprint_scale(self.coord_multiplier - SCALE_STEP);
            }
        }
    }
}

/// A loaded scene: the lights plus the patch set built from its grid.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Point lights from the scene description.
    pub lights: Vec<PointLight>,
    /// The patch set built from the description's grid.
    pub patches: PatchSet,
}

impl Scene {
    /// Build a scene from a parsed description at the given initial
    /// density and footprint scale.
    pub fn from_description(
        description: &SceneDescription,
        num_samples: usize,
        coord_multiplier: f64,
    ) -> patchfield_tessellate::Result<Self> {
        let patches = PatchSet::new(&description.grid, num_samples, coord_multiplier)?;
        log::info!(
            "scene: {} lights, {} patches",
            description.lights.len(),
            patches.patches().len()
        );
        Ok(Self {
            lights: description.lights.clone(),
            patches,
        })
    }
}

//! Wavefront OBJ export of an evaluated patch set.
//!
//! The renderer contract hands out control points, placement, and the
//! shared sample topology; a GPU evaluates the surface per vertex. This
//! module is the CPU counterpart: it evaluates every patch at the current
//! sample density, pushes the result through the patch's model transform
//! (plus the viewer's X-axis tilt), and writes independent triangles as
//! an OBJ mesh with per-vertex normals.

use crate::PatchSet;
use patchfield_math::Transform;
use std::io::Write;
use thiserror::Error;

/// Errors raised during export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Writing to the output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Write `set` as a Wavefront OBJ mesh.
///
/// `tilt` is the viewer rotation about the X axis in radians, applied on
/// top of each patch's own placement. Every patch contributes
/// `num_samples^2` vertices and `2 * (num_samples - 1)^2` faces, indexed
/// through the shared sample mesh.
pub fn write_obj<W: Write>(set: &PatchSet, tilt: f64, out: &mut W) -> Result<()> {
    let mesh = set.sample_mesh();
    let view = Transform::rotation_x(tilt);

    writeln!(out, "# patchfield surface export")?;
    writeln!(
        out,
        "# {} patches, {} samples per axis",
        set.patches().len(),
        set.num_samples()
    )?;

    for patch in set.patches() {
        let model = view.then(&patch.model_transform());
        for k in 0..mesh.num_samples() {
            let (u, v) = mesh.uv_at(k);
            let (u, v) = (f64::from(u), f64::from(v));
            let p = model.apply_point(&patch.evaluate(u, v));
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
            // Normals from the transformed tangents, so non-uniform z
            // scaling still yields a true surface normal.
            let du = model.apply_vec(&patch.d_du(u, v));
            let dv = model.apply_vec(&patch.d_dv(u, v));
            let n = du.cross(&dv);
            let n = if n.norm() < 1e-15 {
                model.apply_vec(&patchfield_math::Vec3::z())
            } else {
                n.normalize()
            };
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }

    // OBJ indices are 1-based; each patch's block of vertices is offset by
    // its position in the set.
    let verts_per_patch = mesh.num_samples();
    for patch_index in 0..set.patches().len() {
        let base = patch_index * verts_per_patch + 1;
        for tri in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (
                base + tri[0] as usize,
                base + tri[1] as usize,
                base + tri[2] as usize,
            );
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }
    }

    log::info!(
        "exported {} vertices, {} triangles",
        set.patches().len() * verts_per_patch,
        set.patches().len() * mesh.num_triangles()
    );
    Ok(())
}

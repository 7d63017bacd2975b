#![warn(missing_docs)]

//! Shared parametric sample grid and triangle topology for patchfield.
//!
//! Every bicubic patch in a set is drawn from the same tessellation of the
//! unit parameter square: an `n x n` grid of (u, v) samples plus the
//! triangle indices connecting them. The renderer evaluates the surface at
//! the sampled (u, v) pairs; this crate supplies only the parametrization
//! and the static topology.
//!
//! Buffers are flat `f32`/`u32` arrays in upload-ready layout.

use thiserror::Error;

/// Errors raised during tessellation.
#[derive(Error, Debug)]
pub enum TessellateError {
    /// Fewer than two samples per axis cannot form a grid.
    #[error("sample count must be at least 2, got {0}")]
    InvalidSampleCount(usize),
}

/// Result type for tessellation.
pub type Result<T> = std::result::Result<T, TessellateError>;

/// Tessellation of the unit parameter square, shared by every patch.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMesh {
    /// Samples per axis.
    pub samples_per_axis: usize,
    /// Flat (u, v) pairs: `[u0, v0, u1, v1, ...]`, length `2 * n^2`.
    pub uv: Vec<f32>,
    /// Flat triangle indices into the sample grid: `[i0, i1, i2, ...]`,
    /// length `3 * 2 * (n-1)^2`, counter-clockwise winding.
    pub indices: Vec<u32>,
}

impl SampleMesh {
    /// Number of (u, v) samples.
    pub fn num_samples(&self) -> usize {
        self.uv.len() / 2
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// The (u, v) pair at sample index `k`.
    pub fn uv_at(&self, k: usize) -> (f32, f32) {
        (self.uv[2 * k], self.uv[2 * k + 1])
    }
}

/// Tessellate the unit parameter square with `n` samples per axis.
///
/// The sample at grid row `i`, column `j` is `(j/(n-1), i/(n-1))`, stored
/// at linear index `i*n + j`; u grows with the column, v with the row.
/// Each interior cell emits two counter-clockwise triangles. The result is
/// built from scratch on every call, so regenerating at a new density can
/// never mix old and new topology.
pub fn tessellate(n: usize) -> Result<SampleMesh> {
    if n < 2 {
        return Err(TessellateError::InvalidSampleCount(n));
    }

    let spacing = (n - 1) as f32;
    let mut uv = Vec::with_capacity(2 * n * n);
    let mut indices = Vec::with_capacity(3 * 2 * (n - 1) * (n - 1));

    for i in 0..n {
        for j in 0..n {
            uv.push(j as f32 / spacing);
            uv.push(i as f32 / spacing);
            if i != n - 1 && j != n - 1 {
                let si = (i * n + j) as u32;
                let below = si + n as u32;
                indices.extend_from_slice(&[si, below, below + 1]);
                indices.extend_from_slice(&[si, below + 1, si + 1]);
            }
        }
    }

    Ok(SampleMesh {
        samples_per_axis: n,
        uv,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_match_density() {
        for n in [2, 3, 10, 80] {
            let mesh = tessellate(n).unwrap();
            assert_eq!(mesh.num_samples(), n * n, "samples at n={}", n);
            assert_eq!(
                mesh.num_triangles(),
                2 * (n - 1) * (n - 1),
                "triangles at n={}",
                n
            );
        }
    }

    #[test]
    fn test_ten_samples_concrete() {
        let mesh = tessellate(10).unwrap();
        assert_eq!(mesh.num_samples(), 100);
        assert_eq!(mesh.num_triangles(), 162);
    }

    #[test]
    fn test_corner_samples() {
        for n in [2, 5, 17] {
            let mesh = tessellate(n).unwrap();
            assert_eq!(mesh.uv_at(0), (0.0, 0.0));
            assert_eq!(mesh.uv_at(n * n - 1), (1.0, 1.0));
        }
    }

    #[test]
    fn test_sample_layout() {
        // Row i, column j holds (j/(n-1), i/(n-1)) at index i*n + j.
        let n = 4;
        let mesh = tessellate(n).unwrap();
        let (u, v) = mesh.uv_at(n + 2); // row 1, column 2
        assert!((u - 2.0 / 3.0).abs() < 1e-6);
        assert!((v - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_indices_in_range() {
        let n = 7;
        let mesh = tessellate(n).unwrap();
        let num_samples = (n * n) as u32;
        assert!(mesh.indices.iter().all(|&i| i < num_samples));
    }

    #[test]
    fn test_first_cell_winding() {
        let n = 3;
        let mesh = tessellate(n).unwrap();
        // Cell (0, 0): lower-left split, counter-clockwise.
        assert_eq!(&mesh.indices[0..3], &[0, 3, 4]);
        assert_eq!(&mesh.indices[3..6], &[0, 4, 1]);
    }

    #[test]
    fn test_every_interior_edge_shared_twice() {
        // Topological sanity: in a closed grid of cells every non-boundary
        // edge appears in exactly two triangles, with opposite direction.
        use std::collections::HashMap;
        let mesh = tessellate(5).unwrap();
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for tri in mesh.indices.chunks_exact(3) {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                *directed.entry((a, b)).or_default() += 1;
            }
        }
        // Consistent winding means no directed edge repeats.
        assert!(directed.values().all(|&count| count == 1));
        // And every shared edge shows up once per direction.
        let shared = directed
            .keys()
            .filter(|(a, b)| directed.contains_key(&(*b, *a)))
            .count();
        assert!(shared > 0);
    }

    #[test]
    fn test_minimum_density() {
        let mesh = tessellate(2).unwrap();
        assert_eq!(mesh.num_samples(), 4);
        assert_eq!(mesh.num_triangles(), 2);
    }

    #[test]
    fn test_undersized_density_rejected() {
        assert!(matches!(
            tessellate(1),
            Err(TessellateError::InvalidSampleCount(1))
        ));
        assert!(matches!(
            tessellate(0),
            Err(TessellateError::InvalidSampleCount(0))
        ));
    }

    #[test]
    fn test_regeneration_is_pure() {
        let a = tessellate(6).unwrap();
        let b = tessellate(6).unwrap();
        assert_eq!(a, b);
    }
}

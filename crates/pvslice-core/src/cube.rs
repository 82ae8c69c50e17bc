//! Data cube and output slice containers
//!
//! Both types store their samples in a flat row-major `Vec<f64>` with
//! explicit extents, so indexing stays a plain multiply-add and planes can
//! be handed out as contiguous slices.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 3D spatial-spectral data cube, indexed `[spectral, y, x]`.
///
/// The cube is read-only once built; extraction never mutates it. NaN
/// values are valid samples and mark missing data.
#[derive(Debug, Clone)]
pub struct Cube {
    data: Vec<f64>,
    nz: usize,
    ny: usize,
    nx: usize,
}

impl Cube {
    /// Build a cube from a flat row-major vector and its `(nz, ny, nx)`
    /// shape. Fails if the data length does not match the shape.
    pub fn from_vec(data: Vec<f64>, shape: (usize, usize, usize)) -> Result<Self> {
        let (nz, ny, nx) = shape;
        let expected = nz * ny * nx;
        if data.len() != expected {
            return Err(Error::CubeShape {
                len: data.len(),
                nz,
                ny,
                nx,
                expected,
            });
        }
        Ok(Self { data, nz, ny, nx })
    }

    /// Create a zero-filled cube.
    pub fn zeros(shape: (usize, usize, usize)) -> Self {
        let (nz, ny, nx) = shape;
        Self {
            data: vec![0.0; nz * ny * nx],
            nz,
            ny,
            nx,
        }
    }

    /// The cube shape as `(nz, ny, nx)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nz, self.ny, self.nx)
    }

    /// Number of spectral planes.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Spatial extent along y.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Spatial extent along x.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Sample at `(z, y, x)`. Panics on out-of-range indices, like slice
    /// indexing; callers bound-check fractional coordinates first.
    pub fn value(&self, z: usize, y: usize, x: usize) -> f64 {
        self.data[(z * self.ny + y) * self.nx + x]
    }

    /// Set a sample. Only used while assembling synthetic cubes; extraction
    /// itself never writes.
    pub fn set(&mut self, z: usize, y: usize, x: usize, value: f64) {
        self.data[(z * self.ny + y) * self.nx + x] = value;
    }

    /// One spectral plane as a contiguous `ny * nx` row-major slice.
    pub fn plane(&self, z: usize) -> &[f64] {
        let len = self.ny * self.nx;
        &self.data[z * len..(z + 1) * len]
    }

    /// Whether the integer pixel `(y, x)` lies inside the spatial grid.
    pub fn contains(&self, y: i64, x: i64) -> bool {
        y >= 0 && x >= 0 && (y as usize) < self.ny && (x as usize) < self.nx
    }
}

/// A 2D position-velocity slice, indexed `[spectral, offset]`.
///
/// Created fresh per extraction call; ownership passes to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvSlice {
    data: Vec<f64>,
    nz: usize,
    npos: usize,
}

impl PvSlice {
    /// Create a zero-filled slice with `nz` spectral rows and `npos`
    /// offset columns.
    pub fn zeros(nz: usize, npos: usize) -> Self {
        Self {
            data: vec![0.0; nz * npos],
            nz,
            npos,
        }
    }

    /// The slice shape as `(nz, npos)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nz, self.npos)
    }

    /// Sample at spectral row `z`, offset column `i`.
    pub fn value(&self, z: usize, i: usize) -> f64 {
        self.data[z * self.npos + i]
    }

    /// Write the sample at spectral row `z`, offset column `i`.
    pub fn set(&mut self, z: usize, i: usize, value: f64) {
        self.data[z * self.npos + i] = value;
    }

    /// One spectral row as a contiguous slice of `npos` offset samples.
    pub fn row(&self, z: usize) -> &[f64] {
        &self.data[z * self.npos..(z + 1) * self.npos]
    }

    /// Consume the slice, returning the flat row-major data.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

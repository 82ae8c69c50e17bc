//! # pvslice
//!
//! Extracts position-velocity (PV) slices from 3D spatial-spectral data
//! cubes along user-drawn polyline paths, optionally with a perpendicular
//! width. The horizontal axis of the output is distance along the path,
//! the vertical axis is the cube's spectral axis.
//!
//! The pipeline: validate the cube's coordinate layout, resample the path
//! at uniform arc-length spacing, then either interpolate the cube along
//! the thin path (nearest or B-spline, NaN-aware) or integrate it over
//! perpendicular width bands with exact polygon-pixel overlap areas, and
//! finally derive the slice's 2-axis coordinate system (linear offset axis
//! plus the cube's spectral axis, copied verbatim).
//!
//! ```
//! use pvslice::{extract_pv_slice, Cube, ExtractOptions, Path};
//!
//! let cube = Cube::zeros((3, 8, 8));
//! let path = Path::new(&[(1.0, 1.0), (6.0, 6.0)], None)?;
//! let slice = extract_pv_slice(&cube, &path, &ExtractOptions::default())?;
//! assert_eq!(slice.shape().0, 3);
//! # Ok::<(), pvslice::Error>(())
//! ```
//!
//! The core is synchronous and performs no I/O; cubes and coordinate
//! systems are passed in already loaded, and GUI, region-file and FITS
//! glue live outside this crate.

pub mod extractor;

pub use extractor::{extract_pv_slice, extract_pv_slice_wcs, path_from_world, ExtractOptions};

pub use pvslice_core::{
    CelestialFrame, Cube, CubeWcs, Error, PathError, PvSlice, PvWcs, Result, Spacing, WcsAxis,
    WcsError,
};
pub use pvslice_geometry::{
    extract_line_slice, extract_poly_slice, Interpolation, Path, PathBuilder, Point, Polygon,
    SampledCurve,
};

//! # pvslice Geometry
//!
//! The geometric resampling engine for pvslice: arc-length path sampling,
//! perpendicular-offset polygon construction for finite-width paths, cube
//! interpolation with NaN-aware semantics, and exact polygon-pixel
//! area-overlap integration.
//!
//! Everything here works in pixel coordinates; world-coordinate handling
//! lives in `pvslice-core` and the adapter in the `pvslice` crate.

pub mod line_slice;
pub mod path;
pub mod poly_slice;
mod spline;

pub use line_slice::{extract_line_slice, Interpolation};
pub use path::{Path, PathBuilder, Point, Polygon, SampledCurve};
pub use poly_slice::extract_poly_slice;

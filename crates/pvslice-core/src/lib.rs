//! # pvslice Core
//!
//! Core types for pvslice: the data cube and slice containers, the
//! coordinate-system model, and the error taxonomy shared by every layer
//! of the extraction pipeline.

pub mod cube;
pub mod error;
pub mod wcs;

pub use cube::{Cube, PvSlice};
pub use error::{Error, PathError, Result, WcsError};
pub use wcs::{AxisKind, CelestialFrame, CubeWcs, PvWcs, Spacing, WcsAxis};

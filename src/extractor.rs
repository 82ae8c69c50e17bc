//! Position-velocity slice extraction
//!
//! The orchestration layer: validates inputs, converts the requested
//! spacing to pixels, dispatches to line interpolation or polygon
//! integration depending on the path width, and derives the output
//! coordinate system. Neither the cube nor the path is ever mutated.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pvslice_core::{Cube, CubeWcs, Error, PvSlice, PvWcs, Result, Spacing};
use pvslice_geometry::{extract_line_slice, extract_poly_slice, Interpolation, Path};

/// Parameters of a slice extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Sample spacing along the path; defaults to 1 pixel.
    pub spacing: Option<Spacing>,
    /// Spline order for zero-width paths (0 to 3). Has no effect on
    /// finite-width paths.
    pub order: u8,
    /// Propagate NaN values into the output instead of treating them as
    /// zero.
    pub respect_nan: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            spacing: None,
            order: 3,
            respect_nan: true,
        }
    }
}

/// Extract a position-velocity slice in pure pixel space.
///
/// The path and spacing are interpreted in pixels; an angular spacing is
/// rejected because there is no coordinate system to convert it with.
pub fn extract_pv_slice(cube: &Cube, path: &Path, options: &ExtractOptions) -> Result<PvSlice> {
    let spacing_px = match options.spacing {
        None => 1.0,
        Some(Spacing::Pixels(p)) => p,
        Some(Spacing::Degrees(_)) => return Err(Error::AngularSpacingWithoutWcs),
    };
    extract(cube, path, spacing_px, options)
}

/// Extract a position-velocity slice together with its derived 2-axis
/// coordinate system.
///
/// Validates the cube axis layout, converts the spacing through the pixel
/// scale, and builds the output WCS with the world position of the path's
/// first sampled point as provenance.
pub fn extract_pv_slice_wcs(
    cube: &Cube,
    wcs: &CubeWcs,
    path: &Path,
    options: &ExtractOptions,
) -> Result<(PvSlice, PvWcs)> {
    wcs.validate_axes()?;

    let spacing_px = match options.spacing {
        None => 1.0,
        Some(spacing) => spacing.to_pixels(wcs)?,
    };

    let edges = path.sample_points_edges(spacing_px)?;
    let start_world = wcs.pixel_to_world(edges.x[0], edges.y[0]);

    let slice = extract(cube, path, spacing_px, options)?;
    let output_wcs = wcs.build_output_wcs(spacing_px, start_world)?;

    info!(
        columns = slice.shape().1,
        planes = slice.shape().0,
        frame = %output_wcs.frame,
        "extracted position-velocity slice"
    );

    Ok((slice, output_wcs))
}

fn extract(cube: &Cube, path: &Path, spacing_px: f64, options: &ExtractOptions) -> Result<PvSlice> {
    debug!(
        spacing_px,
        width = ?path.width(),
        order = options.order,
        respect_nan = options.respect_nan,
        "dispatching extraction"
    );

    if path.width().is_some() {
        let polygons = path.sample_polygons(spacing_px)?;
        extract_poly_slice(cube, &polygons, options.respect_nan)
    } else {
        let centers = path.sample_points(spacing_px)?;
        let xs: Vec<f64> = centers.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = centers.iter().map(|p| p.y).collect();
        extract_line_slice(
            cube,
            &xs,
            &ys,
            Interpolation::Spline {
                order: options.order,
            },
            options.respect_nan,
        )
    }
}

/// Build a pixel-space [`Path`] from world coordinates.
///
/// Longitude/latitude pairs (degrees) are mapped through the inverse
/// celestial sub-transform; an angular width (degrees) is converted with
/// the pixel scale. Kept separate from `Path` itself so the geometry layer
/// never depends on coordinate-system types.
pub fn path_from_world(
    coords_deg: &[(f64, f64)],
    width_deg: Option<f64>,
    wcs: &CubeWcs,
) -> Result<Path> {
    let mut points = Vec::with_capacity(coords_deg.len());
    for &(lon, lat) in coords_deg {
        points.push(wcs.world_to_pixel(lon, lat)?);
    }
    let width = match width_deg {
        Some(w) => Some(w / wcs.pixel_scale()?),
        None => None,
    };
    Path::new(&points, width)
}

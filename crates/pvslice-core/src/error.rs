//! Error handling for pvslice
//!
//! Provides error types for the two fallible layers of the extraction
//! pipeline:
//! - Path errors (geometry of the user-supplied polyline)
//! - WCS errors (unsupported coordinate layouts)
//!
//! All error types use `thiserror` for ergonomic error handling. NaN values
//! in cube data are never errors; they propagate into the output according
//! to the interpolator rules.

use thiserror::Error;

/// Path error type
///
/// Represents errors in the definition or sampling of an extraction path.
/// None of these are retried - the caller must supply a valid path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// Fewer than two control points were supplied
    #[error("Path needs at least 2 control points, got {count}")]
    TooFewPoints {
        /// The number of points supplied.
        count: usize,
    },

    /// Two consecutive control points coincide
    #[error("Consecutive path points at index {index} coincide; segment direction is undefined")]
    CoincidentPoints {
        /// Index of the first of the two coinciding points.
        index: usize,
    },

    /// The path is too short to fit a single sample interval
    #[error("Path is shorter than spacing ({length} < {spacing} pixels)")]
    ShorterThanSpacing {
        /// Total arc length of the path in pixels.
        length: f64,
        /// The requested sample spacing in pixels.
        spacing: f64,
    },

    /// Coordinate arrays passed to the interpolator have different lengths
    #[error("Coordinate arrays have mismatched lengths ({x_len} x values, {y_len} y values)")]
    LengthMismatch {
        /// Length of the x array.
        x_len: usize,
        /// Length of the y array.
        y_len: usize,
    },

    /// The path width is not a positive finite number
    #[error("Path width must be positive and finite, got {width}")]
    InvalidWidth {
        /// The rejected width value.
        width: f64,
    },

    /// The requested sample spacing is not a positive finite number
    #[error("Sample spacing must be positive and finite, got {spacing}")]
    InvalidSpacing {
        /// The rejected spacing value.
        spacing: f64,
    },

    /// Polygon sampling was requested on a path without a width
    #[error("Path has no width; use sample_points for zero-width extraction")]
    MissingWidth,
}

/// WCS error type
///
/// Represents unsupported coordinate layouts. These are fatal for the
/// current call; no partial result is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WcsError {
    /// The cube axes are not (celestial, celestial, spectral)
    #[error("Cube axes not in expected orientation: {detail}")]
    UnexpectedAxisLayout {
        /// Description of the offending layout.
        detail: String,
    },

    /// The spectral axis is coupled to the celestial axes
    #[error("Spectral axis is not independent of the celestial axes")]
    NonOrthogonalAxes,

    /// The two spatial axes have different pixel scales
    #[error("Non-square pixels ({x_scale} deg vs {y_scale} deg); resample the data first")]
    NonSquarePixels {
        /// Pixel scale along the first spatial axis, in degrees.
        x_scale: f64,
        /// Pixel scale along the second spatial axis, in degrees.
        y_scale: f64,
    },

    /// The celestial axis types do not match any supported frame
    #[error("Unrecognized celestial frame for axis types '{lon_ctype}' / '{lat_ctype}'")]
    UnrecognizedFrame {
        /// The longitude axis ctype.
        lon_ctype: String,
        /// The latitude axis ctype.
        lat_ctype: String,
    },

    /// The celestial linear transform cannot be inverted
    #[error("Celestial pixel-to-world transform is singular")]
    SingularTransform,
}

/// Main error type for pvslice
///
/// A unified error type covering every fatal condition in the extraction
/// pipeline. This is the error type used in public APIs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Path error
    #[error(transparent)]
    Path(#[from] PathError),

    /// WCS error
    #[error(transparent)]
    Wcs(#[from] WcsError),

    /// Cube data length does not match the declared shape
    #[error("Cube data has {len} values but shape ({nz}, {ny}, {nx}) needs {expected}")]
    CubeShape {
        /// Length of the supplied data vector.
        len: usize,
        /// Declared spectral extent.
        nz: usize,
        /// Declared spatial y extent.
        ny: usize,
        /// Declared spatial x extent.
        nx: usize,
        /// The product of the declared extents.
        expected: usize,
    },

    /// Spline order outside the supported range
    #[error("Unsupported spline order {order}; supported orders are 0 to 3")]
    UnsupportedOrder {
        /// The rejected order.
        order: u8,
    },

    /// Angular spacing requested for a cube with no coordinate system
    #[error("Angular spacing requires a cube WCS; pass a pixel spacing instead")]
    AngularSpacingWithoutWcs,
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

//! Coordinate-system model for cubes and position-velocity slices
//!
//! A [`CubeWcs`] describes the linear pixel-to-world mapping of a 3-axis
//! cube: per-axis reference pixel, reference value and increment, plus a
//! 3x3 PC rotation/skew matrix (CD = cdelt * PC). The projector validates
//! the axis layout (celestial, celestial, spectral with an independent
//! third axis), computes the spatial pixel scale, and derives the 2-axis
//! [`PvWcs`] of an extracted slice.
//!
//! Reference pixels follow the FITS convention (1-based); all pixel
//! coordinates passed in and out of the transform methods are 0-based.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WcsError};

/// Coordinate type of a single axis, classified from its ctype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    /// A celestial (sky) axis such as RA---SIN or GLAT-CAR.
    Celestial,
    /// A spectral axis such as VELO-HEL, VRAD or FREQ.
    Spectral,
    /// Anything else (Stokes, time, linear).
    Other,
}

/// Celestial reference frame family, matched from the lon/lat ctype pair.
///
/// A closed set: unrecognized axis types fail with
/// [`WcsError::UnrecognizedFrame`] instead of falling through to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CelestialFrame {
    /// Equatorial (RA/DEC) coordinates.
    Icrs,
    /// Galactic (GLON/GLAT) coordinates.
    Galactic,
}

impl CelestialFrame {
    /// Match a frame from the longitude/latitude axis types.
    pub fn from_ctypes(lon_ctype: &str, lat_ctype: &str) -> Result<Self> {
        let lon = axis_code(lon_ctype);
        let lat = axis_code(lat_ctype);
        match (lon.as_str(), lat.as_str()) {
            ("RA", "DEC") => Ok(CelestialFrame::Icrs),
            ("GLON", "GLAT") => Ok(CelestialFrame::Galactic),
            _ => Err(WcsError::UnrecognizedFrame {
                lon_ctype: lon_ctype.to_string(),
                lat_ctype: lat_ctype.to_string(),
            }
            .into()),
        }
    }

    /// The frame name recorded in provenance fields.
    pub fn name(&self) -> &'static str {
        match self {
            CelestialFrame::Icrs => "icrs",
            CelestialFrame::Galactic => "galactic",
        }
    }
}

impl fmt::Display for CelestialFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The coordinate code of a ctype: the part before the first '-'.
fn axis_code(ctype: &str) -> String {
    ctype
        .split('-')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_uppercase()
}

/// Linear description of a single coordinate axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WcsAxis {
    /// Axis type string, e.g. "RA---SIN" or "VELO-HEL".
    pub ctype: String,
    /// Unit string, e.g. "deg" or "m/s".
    pub cunit: String,
    /// Reference pixel (1-based, FITS convention).
    pub crpix: f64,
    /// World value at the reference pixel.
    pub crval: f64,
    /// World increment per pixel.
    pub cdelt: f64,
}

impl WcsAxis {
    /// Build an axis description.
    pub fn new(ctype: &str, cunit: &str, crpix: f64, crval: f64, cdelt: f64) -> Self {
        Self {
            ctype: ctype.to_string(),
            cunit: cunit.to_string(),
            crpix,
            crval,
            cdelt,
        }
    }

    /// Classify the axis from its ctype.
    pub fn kind(&self) -> AxisKind {
        match axis_code(&self.ctype).as_str() {
            "RA" | "DEC" | "GLON" | "GLAT" | "ELON" | "ELAT" => AxisKind::Celestial,
            "VELO" | "VRAD" | "VOPT" | "ZOPT" | "FREQ" | "WAVE" | "AWAV" | "ENER" | "BETA" => {
                AxisKind::Spectral
            }
            _ => AxisKind::Other,
        }
    }
}

/// Requested sample spacing along the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Spacing {
    /// Spacing already in pixels.
    Pixels(f64),
    /// Angular spacing in degrees; divided by the pixel scale.
    Degrees(f64),
}

impl Spacing {
    /// Angular spacing given in arcseconds.
    pub fn arcsec(value: f64) -> Self {
        Spacing::Degrees(value / 3600.0)
    }

    /// Convert to a pixel spacing under the given cube WCS.
    pub fn to_pixels(&self, wcs: &CubeWcs) -> Result<f64> {
        match *self {
            Spacing::Pixels(p) => Ok(p),
            Spacing::Degrees(deg) => Ok(deg / wcs.pixel_scale()?),
        }
    }
}

/// Coordinate system of a 3-axis cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeWcs {
    /// Axis descriptions in cube order: (spatial x, spatial y, spectral).
    pub axes: [WcsAxis; 3],
    /// PC rotation/skew matrix; `pc[i][j]` couples world axis i to pixel
    /// axis j. Identity when the axes are unrotated.
    pub pc: [[f64; 3]; 3],
}

const IDENTITY_PC: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Relative tolerance for the square-pixel assertion.
const SCALE_TOL: f64 = 1e-8;

impl CubeWcs {
    /// Build a WCS with an identity PC matrix.
    pub fn new(axes: [WcsAxis; 3]) -> Self {
        Self {
            axes,
            pc: IDENTITY_PC,
        }
    }

    /// Build a WCS with an explicit PC matrix.
    pub fn with_pc(axes: [WcsAxis; 3], pc: [[f64; 3]; 3]) -> Self {
        Self { axes, pc }
    }

    /// The spectral axis description.
    pub fn spectral_axis(&self) -> &WcsAxis {
        &self.axes[2]
    }

    /// Validate that the cube has exactly two celestial axes followed by a
    /// spectral axis, and that the spectral axis is algebraically
    /// independent of the celestial pair in the linear transform.
    pub fn validate_axes(&self) -> Result<()> {
        let kinds = [
            self.axes[0].kind(),
            self.axes[1].kind(),
            self.axes[2].kind(),
        ];
        if kinds != [AxisKind::Celestial, AxisKind::Celestial, AxisKind::Spectral] {
            return Err(WcsError::UnexpectedAxisLayout {
                detail: format!(
                    "expected (celestial, celestial, spectral), got {:?} for ctypes ({}, {}, {})",
                    kinds, self.axes[0].ctype, self.axes[1].ctype, self.axes[2].ctype
                ),
            }
            .into());
        }

        // Coupling terms between the 3rd axis and the other two must all
        // vanish so the output spectral axis maps pixel-for-pixel onto the
        // cube's.
        let pc = &self.pc;
        if pc[2][0] != 0.0 || pc[2][1] != 0.0 || pc[0][2] != 0.0 || pc[1][2] != 0.0 {
            return Err(WcsError::NonOrthogonalAxes.into());
        }

        // The frame must be recognizable up front rather than when the
        // output header is assembled.
        self.celestial_frame()?;

        Ok(())
    }

    /// The celestial frame family of the spatial axes.
    pub fn celestial_frame(&self) -> Result<CelestialFrame> {
        CelestialFrame::from_ctypes(&self.axes[0].ctype, &self.axes[1].ctype)
    }

    /// The spatial pixel scale in the spatial axes' angular unit,
    /// asserting square pixels. Computed from the CD column norms so a
    /// rotated PC matrix yields the true per-pixel angular scale.
    pub fn pixel_scale(&self) -> Result<f64> {
        let cd = self.celestial_cd();
        let x_scale = cd[0][0].hypot(cd[1][0]);
        let y_scale = cd[0][1].hypot(cd[1][1]);
        let ref_scale = x_scale.max(y_scale);
        if (x_scale - y_scale).abs() > SCALE_TOL * ref_scale {
            return Err(WcsError::NonSquarePixels { x_scale, y_scale }.into());
        }
        Ok(x_scale)
    }

    /// The 2x2 celestial CD matrix (cdelt * PC over the spatial axes).
    fn celestial_cd(&self) -> [[f64; 2]; 2] {
        [
            [
                self.axes[0].cdelt * self.pc[0][0],
                self.axes[0].cdelt * self.pc[0][1],
            ],
            [
                self.axes[1].cdelt * self.pc[1][0],
                self.axes[1].cdelt * self.pc[1][1],
            ],
        ]
    }

    /// Map a 0-based spatial pixel position to world coordinates through
    /// the celestial sub-transform.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let cd = self.celestial_cd();
        let dx = x - (self.axes[0].crpix - 1.0);
        let dy = y - (self.axes[1].crpix - 1.0);
        (
            self.axes[0].crval + cd[0][0] * dx + cd[0][1] * dy,
            self.axes[1].crval + cd[1][0] * dx + cd[1][1] * dy,
        )
    }

    /// Map world coordinates to a 0-based spatial pixel position through
    /// the inverse celestial sub-transform.
    pub fn world_to_pixel(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let cd = self.celestial_cd();
        let det = cd[0][0] * cd[1][1] - cd[0][1] * cd[1][0];
        if det == 0.0 {
            return Err(WcsError::SingularTransform.into());
        }
        let dl = lon - self.axes[0].crval;
        let db = lat - self.axes[1].crval;
        let dx = (cd[1][1] * dl - cd[0][1] * db) / det;
        let dy = (-cd[1][0] * dl + cd[0][0] * db) / det;
        Ok((
            self.axes[0].crpix - 1.0 + dx,
            self.axes[1].crpix - 1.0 + dy,
        ))
    }

    /// Derive the 2-axis WCS of an extracted slice.
    ///
    /// The offset axis is linear, zero at the path start, with an
    /// increment of `pixel_spacing * pixel_scale` in the input spatial
    /// unit. The spectral axis is copied verbatim from the cube.
    pub fn build_output_wcs(&self, pixel_spacing: f64, start_world: (f64, f64)) -> Result<PvWcs> {
        let scale = self.pixel_scale()?;
        let cunit = if self.axes[0].cunit.is_empty() {
            "deg".to_string()
        } else {
            self.axes[0].cunit.clone()
        };
        Ok(PvWcs {
            offset: WcsAxis {
                ctype: "OFFSET".to_string(),
                cunit,
                crpix: 1.0,
                crval: 0.0,
                cdelt: pixel_spacing * scale,
            },
            spectral: self.axes[2].clone(),
            start_lon: start_world.0,
            start_lat: start_world.1,
            frame: self.celestial_frame()?,
        })
    }
}

/// Coordinate system of a position-velocity slice.
///
/// Axis 1 is the offset along the path, axis 2 the cube's spectral axis.
/// The provenance fields record the world position of the path start and
/// the source frame family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvWcs {
    /// The offset axis (ctype "OFFSET", reference value 0 at the start).
    pub offset: WcsAxis,
    /// The spectral axis, copied unchanged from the cube.
    pub spectral: WcsAxis,
    /// World longitude of the path's starting point, in degrees.
    pub start_lon: f64,
    /// World latitude of the path's starting point, in degrees.
    pub start_lat: f64,
    /// Celestial frame family of the source cube.
    pub frame: CelestialFrame,
}

impl PvWcs {
    /// Render the slice WCS and provenance as FITS-style key/value cards,
    /// for callers that assemble output headers. The core itself performs
    /// no file I/O.
    pub fn to_cards(&self) -> Vec<(String, String)> {
        vec![
            ("CTYPE1".to_string(), self.offset.ctype.clone()),
            ("CRPIX1".to_string(), format!("{}", self.offset.crpix)),
            ("CRVAL1".to_string(), format!("{}", self.offset.crval)),
            ("CDELT1".to_string(), format!("{}", self.offset.cdelt)),
            ("CUNIT1".to_string(), self.offset.cunit.clone()),
            ("CTYPE2".to_string(), self.spectral.ctype.clone()),
            ("CRPIX2".to_string(), format!("{}", self.spectral.crpix)),
            ("CRVAL2".to_string(), format!("{}", self.spectral.crval)),
            ("CDELT2".to_string(), format!("{}", self.spectral.cdelt)),
            ("CUNIT2".to_string(), self.spectral.cunit.clone()),
            ("STARTLON".to_string(), format!("{}", self.start_lon)),
            ("STARTLAT".to_string(), format!("{}", self.start_lat)),
            ("CSYSOFFS".to_string(), self.frame.name().to_string()),
        ]
    }
}

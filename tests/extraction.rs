//! End-to-end extraction tests: pixel-space and WCS-aware slicing,
//! NaN propagation, the finite-width limit, and the derived output
//! coordinate system.

use approx::assert_relative_eq;

use pvslice::{
    extract_pv_slice, extract_pv_slice_wcs, path_from_world, CelestialFrame, Cube, CubeWcs, Error,
    ExtractOptions, Interpolation, Path, Spacing, WcsAxis, WcsError,
};

/// 3x4x5 cube whose spatial rows hold, bottom to top, the values
/// 1, 0, 2 and NaN in every spectral plane.
fn banded_cube() -> Cube {
    let mut cube = Cube::zeros((3, 4, 5));
    let rows = [1.0, 0.0, 2.0, f64::NAN];
    for z in 0..3 {
        for (y, &v) in rows.iter().enumerate() {
            for x in 0..5 {
                cube.set(z, y, x, v);
            }
        }
    }
    cube
}

/// 2x4x6 cube where plane z holds `100 z + 10 y + x`.
fn graded_cube() -> Cube {
    let mut cube = Cube::zeros((2, 4, 6));
    for z in 0..2 {
        for y in 0..4 {
            for x in 0..6 {
                cube.set(z, y, x, (100 * z + 10 * y + x) as f64);
            }
        }
    }
    cube
}

/// WCS resembling a VLA HI cube: equatorial SIN projection, heliocentric
/// velocity axis.
fn m33_like_wcs() -> CubeWcs {
    CubeWcs::new([
        WcsAxis::new("RA---SIN", "deg", 1373.0, 23.18375, -5.55555561268e-4),
        WcsAxis::new("DEC--SIN", "deg", 1152.0, 30.5765277962, 5.55555561268e-4),
        WcsAxis::new("VELO-HEL", "m/s", 1.0, -321214.698632, 1288.21496879),
    ])
}

#[test]
fn test_regression_vertical_path_order_zero() {
    // Straight vertical path crossing the value bands; 10 cells at
    // spacing 0.4 with nearest (order 0) gathering. The NaN band
    // propagates when respected and reads as zero when not.
    let cube = banded_cube();
    let path = Path::new(&[(1.0, -0.45), (1.0, 3.56)], None).unwrap();

    let options = ExtractOptions {
        spacing: Some(Spacing::Pixels(0.4)),
        order: 0,
        respect_nan: true,
    };
    let slice = extract_pv_slice(&cube, &path, &options).unwrap();
    assert_eq!(slice.shape(), (3, 10));

    let expected = [1.0, 1.0, 0.0, 0.0, 0.0, 2.0, 2.0, f64::NAN, f64::NAN, f64::NAN];
    for z in [0, 2] {
        for (i, &e) in expected.iter().enumerate() {
            let v = slice.value(z, i);
            if e.is_nan() {
                assert!(v.is_nan(), "expected NaN at column {i}, got {v}");
            } else {
                assert_relative_eq!(v, e, epsilon = 1e-12);
            }
        }
    }

    let options = ExtractOptions {
        respect_nan: false,
        ..options
    };
    let slice = extract_pv_slice(&cube, &path, &options).unwrap();
    let expected = [1.0, 1.0, 0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 0.0];
    for (i, &e) in expected.iter().enumerate() {
        assert_relative_eq!(slice.value(0, i), e, epsilon = 1e-12);
    }
}

#[test]
fn test_width_zero_limit_matches_nearest() {
    // Cells aligned with whole pixel columns: the width-integrated column
    // divided by the cell area converges to the nearest-mode sample.
    let cube = graded_cube();
    let width = 1e-3;
    let spacing = 1.0;
    let wide = Path::new(&[(-0.5, 1.0), (3.5, 1.0)], Some(width)).unwrap();
    let thin = Path::new(&[(-0.5, 1.0), (3.5, 1.0)], None).unwrap();

    let options = ExtractOptions {
        spacing: Some(Spacing::Pixels(spacing)),
        order: 0,
        respect_nan: true,
    };
    let integrated = extract_pv_slice(&cube, &wide, &options).unwrap();

    let centers = thin.sample_points(spacing).unwrap();
    let xs: Vec<f64> = centers.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = centers.iter().map(|p| p.y).collect();
    let sampled =
        pvslice::extract_line_slice(&cube, &xs, &ys, Interpolation::Nearest, true).unwrap();

    assert_eq!(integrated.shape(), sampled.shape());
    let cell_area = spacing * width;
    for z in 0..2 {
        for i in 0..4 {
            assert_relative_eq!(
                integrated.value(z, i) / cell_area,
                sampled.value(z, i),
                max_relative = 1e-4
            );
        }
    }
}

#[test]
fn test_wide_path_dispatches_to_polygons() {
    let cube = graded_cube();
    let path = Path::new(&[(0.5, 1.5), (4.5, 1.5)], Some(2.0)).unwrap();
    let slice = extract_pv_slice(&cube, &path, &ExtractOptions::default()).unwrap();
    assert_eq!(slice.shape(), (2, 4));
    // First cell spans x in [0.5, 1.5], y in [0.5, 2.5]: exactly the unit
    // cells of pixels (1, 1) and (1, 2).
    assert_relative_eq!(slice.value(0, 0), 11.0 + 21.0, epsilon = 1e-6);
}

#[test]
fn test_width_band_zero_fills_nan_when_not_respected() {
    // Width band covering the NaN row entirely plus half of the row of
    // twos. Disabling NaN-respecting mode must zero-fill the missing data
    // before integration, not poison the columns.
    let cube = banded_cube();
    let path = Path::new(&[(-0.5, 3.0), (3.5, 3.0)], Some(2.0)).unwrap();
    let options = ExtractOptions {
        spacing: Some(Spacing::Pixels(1.0)),
        order: 0,
        respect_nan: false,
    };
    let slice = extract_pv_slice(&cube, &path, &options).unwrap();
    assert_eq!(slice.shape(), (3, 4));
    for z in 0..3 {
        for i in 0..4 {
            assert_relative_eq!(slice.value(z, i), 0.5 * 2.0, epsilon = 1e-6);
        }
    }

    let options = ExtractOptions {
        respect_nan: true,
        ..options
    };
    let slice = extract_pv_slice(&cube, &path, &options).unwrap();
    assert!(slice.value(0, 0).is_nan());
}

#[test]
fn test_angular_spacing_requires_wcs() {
    let cube = graded_cube();
    let path = Path::new(&[(0.0, 1.0), (4.0, 1.0)], None).unwrap();
    let options = ExtractOptions {
        spacing: Some(Spacing::arcsec(2.0)),
        ..Default::default()
    };
    let err = extract_pv_slice(&cube, &path, &options).unwrap_err();
    assert_eq!(err, Error::AngularSpacingWithoutWcs);
}

#[test]
fn test_wcs_extraction_output_header() {
    let cube = graded_cube();
    let wcs = m33_like_wcs();
    let path = Path::new(&[(0.0, 0.0), (3.0, 3.0)], None).unwrap();
    let options = ExtractOptions {
        spacing: Some(Spacing::Pixels(1.0)),
        order: 0,
        respect_nan: true,
    };

    let (slice, pv) = extract_pv_slice_wcs(&cube, &wcs, &path, &options).unwrap();
    assert_eq!(slice.shape().0, 2);

    // Offset axis: zero at the path start, increment in world units.
    assert_eq!(pv.offset.ctype, "OFFSET");
    assert_eq!(pv.offset.crval, 0.0);
    assert_eq!(pv.offset.crpix, 1.0);
    assert_relative_eq!(pv.offset.cdelt, 5.55555561268e-4, max_relative = 1e-9);
    assert_eq!(pv.offset.cunit, "deg");

    // Spectral axis copied verbatim from the cube.
    assert_eq!(pv.spectral, wcs.axes[2]);

    // Provenance: the world position of the first sampled point.
    let (lon, lat) = wcs.pixel_to_world(0.0, 0.0);
    assert_relative_eq!(pv.start_lon, lon, max_relative = 1e-12);
    assert_relative_eq!(pv.start_lat, lat, max_relative = 1e-12);
    assert_eq!(pv.frame, CelestialFrame::Icrs);

    let cards = pv.to_cards();
    assert!(cards.iter().any(|(k, v)| k == "CTYPE1" && v == "OFFSET"));
    assert!(cards.iter().any(|(k, v)| k == "CSYSOFFS" && v == "icrs"));
}

#[test]
fn test_wcs_extraction_angular_spacing() {
    let cube = graded_cube();
    let wcs = m33_like_wcs();
    let path = Path::new(&[(0.0, 1.0), (4.0, 1.0)], None).unwrap();

    // Two pixels' worth of angular spacing.
    let options = ExtractOptions {
        spacing: Some(Spacing::Degrees(2.0 * 5.55555561268e-4)),
        order: 0,
        respect_nan: true,
    };
    let (slice, pv) = extract_pv_slice_wcs(&cube, &wcs, &path, &options).unwrap();
    assert_eq!(slice.shape().1, 2);
    assert_relative_eq!(pv.offset.cdelt, 2.0 * 5.55555561268e-4, max_relative = 1e-9);
}

#[test]
fn test_wcs_extraction_rejects_non_square_pixels() {
    let cube = graded_cube();
    let mut wcs = m33_like_wcs();
    wcs.axes[0].cdelt *= 3.0;
    let path = Path::new(&[(0.0, 1.0), (4.0, 1.0)], None).unwrap();
    let err =
        extract_pv_slice_wcs(&cube, &wcs, &path, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Wcs(WcsError::NonSquarePixels { .. })));
}

#[test]
fn test_wcs_extraction_rejects_coupled_spectral_axis() {
    let cube = graded_cube();
    let mut wcs = m33_like_wcs();
    wcs.pc[0][2] = 0.05;
    let path = Path::new(&[(0.0, 1.0), (4.0, 1.0)], None).unwrap();
    let err =
        extract_pv_slice_wcs(&cube, &wcs, &path, &ExtractOptions::default()).unwrap_err();
    assert_eq!(err, Error::Wcs(WcsError::NonOrthogonalAxes));
}

#[test]
fn test_path_from_world_round_trip() {
    let wcs = m33_like_wcs();
    let pixels = [(2.0, 3.0), (10.0, 7.5)];
    let world: Vec<(f64, f64)> = pixels
        .iter()
        .map(|&(x, y)| wcs.pixel_to_world(x, y))
        .collect();

    let scale = wcs.pixel_scale().unwrap();
    let path = path_from_world(&world, Some(2.0 * scale), &wcs).unwrap();

    for (p, &(x, y)) in path.points().iter().zip(&pixels) {
        assert_relative_eq!(p.x, x, epsilon = 1e-6);
        assert_relative_eq!(p.y, y, epsilon = 1e-6);
    }
    assert_relative_eq!(path.width().unwrap(), 2.0, epsilon = 1e-9);
}

#[test]
fn test_galactic_frame_provenance() {
    let cube = graded_cube();
    let wcs = CubeWcs::new([
        WcsAxis::new("GLON-CAR", "deg", 1.0, 10.0, -1e-3),
        WcsAxis::new("GLAT-CAR", "deg", 1.0, -1.0, 1e-3),
        WcsAxis::new("FREQ", "Hz", 1.0, 1.42e9, 1e5),
    ]);
    let path = Path::new(&[(0.0, 1.0), (4.0, 1.0)], None).unwrap();
    let (_, pv) = extract_pv_slice_wcs(&cube, &wcs, &path, &ExtractOptions::default()).unwrap();
    assert_eq!(pv.frame, CelestialFrame::Galactic);
    assert_eq!(pv.spectral.ctype, "FREQ");
}

#[test]
fn test_inputs_not_mutated() {
    let cube = banded_cube();
    let before = cube.clone();
    let path = Path::new(&[(1.0, -0.45), (1.0, 3.56)], Some(0.8)).unwrap();
    let options = ExtractOptions {
        spacing: Some(Spacing::Pixels(0.4)),
        ..Default::default()
    };
    let path_before = path.clone();
    let _ = extract_pv_slice(&cube, &path, &options).unwrap();
    assert_eq!(path, path_before);
    for z in 0..3 {
        for y in 0..4 {
            for x in 0..5 {
                let (a, b) = (cube.value(z, y, x), before.value(z, y, x));
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
    }
}

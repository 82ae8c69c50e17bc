//! Separable B-spline interpolation on 2D planes
//!
//! Evaluates a spectral plane at fractional pixel coordinates with spline
//! orders 0 through 3. Orders 2 and 3 first run the standard recursive
//! B-spline prefilter (causal/anticausal IIR pass per row and per column)
//! so that evaluation interpolates the original samples exactly at integer
//! nodes. Boundaries are handled by mirror reflection, both in the
//! prefilter and when folding evaluation taps back into the grid.
//!
//! Inputs are expected to be NaN-free; the caller zero-fills missing data
//! and tracks it through a separate indicator pass.

/// Interpolation pole of the quadratic B-spline.
const POLE_2: f64 = -0.171_572_875_253_809_9; // sqrt(8) - 3
/// Interpolation pole of the cubic B-spline.
const POLE_3: f64 = -0.267_949_192_431_122_7; // sqrt(3) - 2

/// Evaluate `plane` (row-major, `ny * nx`) at the fractional positions
/// `(xs[k], ys[k])`. `order` must be in 0..=3; the caller validates.
pub(crate) fn interpolate_plane(
    plane: &[f64],
    ny: usize,
    nx: usize,
    xs: &[f64],
    ys: &[f64],
    order: u8,
) -> Vec<f64> {
    debug_assert_eq!(plane.len(), ny * nx);
    debug_assert_eq!(xs.len(), ys.len());

    let coeffs = match order {
        2 | 3 => {
            let mut c = plane.to_vec();
            prefilter_plane(&mut c, ny, nx, order);
            c
        }
        _ => plane.to_vec(),
    };

    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| evaluate(&coeffs, ny, nx, x, y, order))
        .collect()
}

fn evaluate(coeffs: &[f64], ny: usize, nx: usize, x: f64, y: f64, order: u8) -> f64 {
    let (wx, x0, taps) = weights(order, x);
    let (wy, y0, _) = weights(order, y);

    let mut acc = 0.0;
    for j in 0..taps {
        let row = mirror_index(y0 + j as i64, ny as i64);
        let base = row * nx;
        let mut row_acc = 0.0;
        for i in 0..taps {
            let col = mirror_index(x0 + i as i64, nx as i64);
            row_acc += wx[i] * coeffs[base + col];
        }
        acc += wy[j] * row_acc;
    }
    acc
}

/// B-spline weights at fractional position `t`: the tap values, the index
/// of the first tap, and the tap count.
fn weights(order: u8, t: f64) -> ([f64; 4], i64, usize) {
    match order {
        0 => {
            // Nearest sample; ties round up.
            let i = (t + 0.5).floor() as i64;
            ([1.0, 0.0, 0.0, 0.0], i, 1)
        }
        1 => {
            let i = t.floor();
            let f = t - i;
            ([1.0 - f, f, 0.0, 0.0], i as i64, 2)
        }
        2 => {
            let i = (t + 0.5).floor();
            let f = t - i;
            (
                [
                    0.5 * (0.5 - f) * (0.5 - f),
                    0.75 - f * f,
                    0.5 * (0.5 + f) * (0.5 + f),
                    0.0,
                ],
                i as i64 - 1,
                3,
            )
        }
        3 => {
            let i = t.floor();
            let f = t - i;
            let f2 = f * f;
            let f3 = f2 * f;
            (
                [
                    (1.0 - 3.0 * f + 3.0 * f2 - f3) / 6.0,
                    (4.0 - 6.0 * f2 + 3.0 * f3) / 6.0,
                    (1.0 + 3.0 * f + 3.0 * f2 - 3.0 * f3) / 6.0,
                    f3 / 6.0,
                ],
                i as i64 - 1,
                4,
            )
        }
        _ => unreachable!("spline order validated by the caller"),
    }
}

/// Fold an index into `[0, n)` by mirror reflection about the edges.
fn mirror_index(i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let mut j = i % period;
    if j < 0 {
        j += period;
    }
    if j >= n {
        j = period - j;
    }
    j as usize
}

/// In-place B-spline prefilter over every row and every column.
fn prefilter_plane(c: &mut [f64], ny: usize, nx: usize, order: u8) {
    let pole = match order {
        2 => POLE_2,
        3 => POLE_3,
        _ => return,
    };

    for y in 0..ny {
        filter_line(&mut c[y * nx..(y + 1) * nx], pole);
    }

    let mut column = vec![0.0; ny];
    for x in 0..nx {
        for y in 0..ny {
            column[y] = c[y * nx + x];
        }
        filter_line(&mut column, pole);
        for y in 0..ny {
            c[y * nx + x] = column[y];
        }
    }
}

/// One causal/anticausal IIR pass with mirror boundary conditions.
fn filter_line(c: &mut [f64], pole: f64) {
    let n = c.len();
    if n < 2 {
        return;
    }

    let gain = (1.0 - pole) * (1.0 - 1.0 / pole);
    for v in c.iter_mut() {
        *v *= gain;
    }

    // Causal initialization: truncated mirror-boundary sum.
    let horizon = ((f64::EPSILON.ln() / pole.abs().ln()).ceil() as usize).min(n);
    let mut sum = c[0];
    let mut zn = pole;
    for &v in c.iter().take(horizon).skip(1) {
        sum += zn * v;
        zn *= pole;
    }
    c[0] = sum;

    for i in 1..n {
        c[i] += pole * c[i - 1];
    }

    // Anticausal initialization and pass.
    c[n - 1] = (pole / (pole * pole - 1.0)) * (c[n - 1] + pole * c[n - 2]);
    for i in (0..n - 1).rev() {
        c[i] = pole * (c[i + 1] - c[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp_plane(ny: usize, nx: usize) -> Vec<f64> {
        (0..ny * nx)
            .map(|i| {
                let (y, x) = (i / nx, i % nx);
                0.3 * x as f64 - 1.7 * y as f64 + 0.1 * (x * y) as f64
            })
            .collect()
    }

    #[test]
    fn test_mirror_index() {
        assert_eq!(mirror_index(0, 5), 0);
        assert_eq!(mirror_index(4, 5), 4);
        assert_eq!(mirror_index(5, 5), 3);
        assert_eq!(mirror_index(-1, 5), 1);
        assert_eq!(mirror_index(-2, 5), 2);
        assert_eq!(mirror_index(8, 5), 0);
        assert_eq!(mirror_index(3, 1), 0);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for order in 0..=3u8 {
            for &t in &[0.0, 0.25, 0.5, 0.75, 2.3, -0.4] {
                let (w, _, taps) = weights(order, t);
                let sum: f64 = w[..taps].iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_integer_nodes_reproduced_every_order() {
        let (ny, nx) = (6, 7);
        let plane = ramp_plane(ny, nx);
        let xs: Vec<f64> = vec![0.0, 3.0, 6.0, 2.0];
        let ys: Vec<f64> = vec![0.0, 2.0, 5.0, 4.0];
        for order in 0..=3u8 {
            let out = interpolate_plane(&plane, ny, nx, &xs, &ys, order);
            for (k, v) in out.iter().enumerate() {
                let expected = plane[(ys[k] as usize) * nx + xs[k] as usize];
                assert_relative_eq!(*v, expected, epsilon = 1e-9, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_bilinear_midpoint_average() {
        let plane = vec![0.0, 2.0, 4.0, 6.0]; // 2x2
        let out = interpolate_plane(&plane, 2, 2, &[0.5], &[0.5], 1);
        assert_relative_eq!(out[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_plane_is_exact_everywhere() {
        let plane = vec![5.0; 8 * 9];
        let xs = vec![0.1, 3.7, 8.0, 4.4];
        let ys = vec![6.9, 0.2, 3.3, 7.0];
        for order in 1..=3u8 {
            let out = interpolate_plane(&plane, 8, 9, &xs, &ys, order);
            for v in out {
                assert_relative_eq!(v, 5.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_order_zero_rounds_to_nearest() {
        let plane = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
        let out = interpolate_plane(&plane, 2, 3, &[0.4, 1.6, 2.2], &[0.1, 0.9, 1.2], 0);
        assert_eq!(out, vec![1.0, 6.0, 6.0]);
    }
}

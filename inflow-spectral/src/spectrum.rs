//! One-dimensional von Karman spectrum.

/// Von Karman energy spectrum with integral length scale `length`.
///
/// `S(k) = 4 L / (1 + 70.8 (k L)^2)^(5/6)`, normalized so that its integral
/// over `[0, inf)` equals 1.
#[inline]
pub fn von_karman(k: f64, length: f64) -> f64 {
    4.0 * length / (1.0 + 70.8 * (k * length).powi(2)).powf(5.0 / 6.0)
}

/// Composite trapezoidal rule of `f` over `[a, b]` on `n` equally spaced points.
pub fn trapezoid<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, n: usize) -> f64 {
    if n < 2 || b == a {
        return 0.0;
    }
    let h = (b - a) / (n - 1) as f64;
    let interior: f64 = (1..n - 1).map(|i| f(a + i as f64 * h)).sum();
    h * (0.5 * (f(a) + f(b)) + interior)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_von_karman_at_origin() {
        assert_relative_eq!(von_karman(0.0, 1.0), 4.0);
        assert_relative_eq!(von_karman(0.0, 0.25), 1.0);
    }

    #[test]
    fn test_von_karman_integrates_to_one() {
        // Substitution k = t / (1 - t) maps [0, 1) onto [0, inf).
        for length in [0.2, 1.0, 3.0] {
            let integral = trapezoid(
                |t| {
                    let k = t / (1.0 - t);
                    von_karman(k, length) / (1.0 - t).powi(2)
                },
                0.0,
                1.0 - 1e-9,
                200_001,
            );
            assert_relative_eq!(integral, 1.0, epsilon = 2e-3);
        }
    }

    #[test]
    fn test_trapezoid_exact_on_linear() {
        assert_relative_eq!(trapezoid(|x| 2.0 * x + 1.0, 0.0, 2.0, 5), 6.0, epsilon = 1e-12);
        assert_eq!(trapezoid(|x| x, 1.0, 1.0, 100), 0.0);
    }
}

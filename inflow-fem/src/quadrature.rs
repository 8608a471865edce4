//! Gauss-Legendre quadrature on the reference square

/// A single quadrature point with weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraturePoint {
    /// Reference coordinates (xi, eta)
    pub coords: [f64; 2],
    /// Integration weight
    pub weight: f64,
}

impl QuadraturePoint {
    #[inline]
    pub fn xi(&self) -> f64 {
        self.coords[0]
    }

    #[inline]
    pub fn eta(&self) -> f64 {
        self.coords[1]
    }
}

/// 1D Gauss-Legendre points and weights on [-1, 1]
///
/// Orders above 3 fall back to the 3-point rule.
pub fn gauss_legendre_1d(order: usize) -> Vec<(f64, f64)> {
    match order {
        0 | 1 => vec![(0.0, 2.0)],
        2 => {
            let x = 1.0 / 3.0_f64.sqrt();
            vec![(-x, 1.0), (x, 1.0)]
        }
        _ => {
            let x = (3.0 / 5.0_f64).sqrt();
            vec![(-x, 5.0 / 9.0), (0.0, 8.0 / 9.0), (x, 5.0 / 9.0)]
        }
    }
}

/// Tensor-product Gauss rule on the quadrilateral, xi varying slowest
pub fn gauss_quadrilateral(order: usize) -> Vec<QuadraturePoint> {
    let line = gauss_legendre_1d(order);
    line.iter()
        .flat_map(|&(xi, wi)| {
            line.iter().map(move |&(eta, wj)| QuadraturePoint {
                coords: [xi, eta],
                weight: wi * wj,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_point_rule() {
        let rule = gauss_quadrilateral(2);
        assert_eq!(rule.len(), 4);
        for qp in &rule {
            assert_relative_eq!(qp.xi().abs(), 0.5773502691896258, epsilon = 1e-15);
            assert_relative_eq!(qp.eta().abs(), 0.5773502691896258, epsilon = 1e-15);
            assert_eq!(qp.weight, 1.0);
        }
    }

    #[test]
    fn test_exact_for_bicubic() {
        // Integral of xi^2 eta^2 + xi^3 over the square is 4/9.
        for order in [2, 3] {
            let integral: f64 = gauss_quadrilateral(order)
                .iter()
                .map(|qp| qp.weight * (qp.xi().powi(2) * qp.eta().powi(2) + qp.xi().powi(3)))
                .sum();
            assert_relative_eq!(integral, 4.0 / 9.0, epsilon = 1e-14);
        }
    }
}

//! Spectral modes and the turbulent field they form.

/// One Fourier mode of the synthetic velocity field.
///
/// The velocity contribution of the mode at position `x` and time `t` is
/// `p cos(2 pi k.x) + q sin(2 pi k.x)` (time phase handled by the consumer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralMode {
    /// Wavevector
    pub k: [f64; 3],
    /// Energy of each velocity component held by the mode
    pub energy: [f64; 3],
    /// Cosine amplitude
    pub p: [f64; 3],
    /// Sine amplitude
    pub q: [f64; 3],
}

impl SpectralMode {
    /// Per-component variance carried by the mode, `0.5 (p_i^2 + q_i^2)`.
    pub fn variance(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, v) in out.iter_mut().enumerate() {
            *v = 0.5 * (self.p[i] * self.p[i] + self.q[i] * self.q[i]);
        }
        out
    }

    /// Divergence residuals `(k.p, k.q)`.
    pub fn divergence(&self) -> (f64, f64) {
        (
            crate::vector::dot(&self.k, &self.p),
            crate::vector::dot(&self.k, &self.q),
        )
    }
}

/// A set of spectral modes with known statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurbulentField {
    modes: Vec<SpectralMode>,
}

impl TurbulentField {
    /// Create a field from its modes.
    pub fn new(modes: Vec<SpectralMode>) -> Self {
        Self { modes }
    }

    /// The modes of the field.
    pub fn modes(&self) -> &[SpectralMode] {
        &self.modes
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Whether the field has no modes.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Iterate over the modes.
    pub fn iter(&self) -> std::slice::Iter<'_, SpectralMode> {
        self.modes.iter()
    }

    /// Wavevectors of all modes.
    pub fn wavevectors(&self) -> Vec<[f64; 3]> {
        self.modes.iter().map(|m| m.k).collect()
    }

    /// Cosine amplitudes of all modes.
    pub fn p_vectors(&self) -> Vec<[f64; 3]> {
        self.modes.iter().map(|m| m.p).collect()
    }

    /// Sine amplitudes of all modes.
    pub fn q_vectors(&self) -> Vec<[f64; 3]> {
        self.modes.iter().map(|m| m.q).collect()
    }

    /// Copy of the field with every wavevector multiplied by `factor`.
    pub fn with_scaled_wavevectors(&self, factor: f64) -> Self {
        let modes = self
            .modes
            .iter()
            .map(|m| SpectralMode {
                k: crate::vector::scale(&m.k, factor),
                ..*m
            })
            .collect();
        Self { modes }
    }

    /// Copy of the field with every amplitude multiplied by `factor`.
    ///
    /// Energies are scaled by `factor^2` so they stay consistent with the
    /// amplitudes.
    pub fn with_scaled_amplitudes(&self, factor: f64) -> Self {
        let modes = self
            .modes
            .iter()
            .map(|m| SpectralMode {
                k: m.k,
                energy: crate::vector::scale(&m.energy, factor * factor),
                p: crate::vector::scale(&m.p, factor),
                q: crate::vector::scale(&m.q, factor),
            })
            .collect();
        Self { modes }
    }
}

impl<'a> IntoIterator for &'a TurbulentField {
    type Item = &'a SpectralMode;
    type IntoIter = std::slice::Iter<'a, SpectralMode>;

    fn into_iter(self) -> Self::IntoIter {
        self.modes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mode() -> SpectralMode {
        SpectralMode {
            k: [1.0, 2.0, 3.0],
            energy: [0.5, 1.0, 2.0],
            p: [1.0, 0.0, 0.0],
            q: [0.0, 1.0, 2.0],
        }
    }

    #[test]
    fn test_scaling_keeps_originals() {
        let field = TurbulentField::new(vec![mode()]);
        let k_scaled = field.with_scaled_wavevectors(2.0);
        let a_scaled = field.with_scaled_amplitudes(3.0);

        assert_eq!(field.modes()[0], mode());
        assert_eq!(k_scaled.modes()[0].k, [2.0, 4.0, 6.0]);
        assert_eq!(k_scaled.modes()[0].p, mode().p);
        assert_eq!(a_scaled.modes()[0].q, [0.0, 3.0, 6.0]);
        assert_relative_eq!(a_scaled.modes()[0].energy[2], 18.0);
    }

    #[test]
    fn test_mode_variance() {
        let v = mode().variance();
        assert_relative_eq!(v[0], 0.5);
        assert_relative_eq!(v[2], 2.0);
    }
}

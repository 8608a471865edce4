//! Vertical profiles of the inflow statistics
//!
//! Every profile evaluates to the same [`Profile`] record: the heights it is
//! sampled at, the values and a one-line description of how it was built.
//! Terrain categories follow the Eurocode (EN 1991-1-4) and AIJ tables.

use crate::error::{OutputError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Quantity a profile describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Time modulation of the inflow
    Time,
    /// Mean streamwise velocity
    Velocity,
    /// Standard deviation of the streamwise velocity
    Deviation,
    /// Streamwise integral length scale
    Length,
}

impl ProfileKind {
    /// Dictionary entry name of the profile
    pub fn entry(&self) -> &'static str {
        match self {
            ProfileKind::Time => "tProfile",
            ProfileKind::Velocity => "uProfile",
            ProfileKind::Deviation => "sProfile",
            ProfileKind::Length => "lProfile",
        }
    }
}

/// An evaluated profile
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Quantity described
    pub kind: ProfileKind,
    /// Heights (or times for [`ProfileKind::Time`])
    pub domain: Vec<f64>,
    /// Values at `domain`
    pub values: Vec<f64>,
    /// Construction record, `<entry>.<law>(<parameters>)`
    pub description: String,
}

impl Profile {
    /// Append the dictionary entry `name ( (z value 1.000) ... );`
    pub fn write(&self, out: &mut String) {
        let _ = writeln!(out, "{} (", self.kind.entry());
        for (z, v) in self.domain.iter().zip(&self.values) {
            let _ = writeln!(out, "({z:.3} {v:.3} 1.000)");
        }
        out.push_str(");");
    }
}

/// Python-like rendering of a parameter in descriptions
fn param(value: f64) -> String {
    format!("{value:?}")
}

/// Heights at which height-dependent profiles are sampled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDomain {
    /// Lowest height
    pub z_min: f64,
    /// Highest height
    pub z_max: f64,
    /// Number of equally spaced samples
    pub points: usize,
}

impl Default for ProfileDomain {
    fn default() -> Self {
        Self {
            z_min: 0.0,
            z_max: 300.0,
            points: 101,
        }
    }
}

impl ProfileDomain {
    /// Equally spaced heights, end points included
    pub fn heights(&self) -> Result<Vec<f64>> {
        if self.points < 2 || !(self.z_max > self.z_min) {
            return Err(OutputError::InvalidProfile(format!(
                "domain [{}, {}] with {} points",
                self.z_min, self.z_max, self.points
            )));
        }
        let step = (self.z_max - self.z_min) / (self.points - 1) as f64;
        Ok((0..self.points)
            .map(|i| {
                if i + 1 == self.points {
                    self.z_max
                } else {
                    self.z_min + step * i as f64
                }
            })
            .collect())
    }
}

/// Eurocode terrain coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EurocodeTerrain {
    /// Roughness length
    pub z0: f64,
    /// Minimum height of the log law
    pub z_min: f64,
    /// Terrain factor
    pub kt: f64,
}

/// AIJ terrain coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AijTerrain {
    /// Height below which the velocity is constant
    pub zb: f64,
    /// Gradient height
    pub zg: f64,
    /// Power-law exponent
    pub alpha: f64,
}

/// Accept both `"II"` and `"EC Category II"` style names
fn category_key<'a>(name: &'a str, prefix: &str) -> &'a str {
    name.trim().strip_prefix(prefix).unwrap_or(name).trim()
}

/// Coefficients of Eurocode terrain category `0`, `I`, `II`, `III` or `IV`
pub fn eurocode_terrain(category: &str) -> Result<EurocodeTerrain> {
    let (z0, z_min, kt) = match category_key(category, "EC Category") {
        "0" => (0.003, 1.0, 0.16),
        "I" => (0.01, 1.0, 0.17),
        "II" => (0.05, 2.0, 0.19),
        "III" => (0.3, 5.0, 0.22),
        "IV" => (1.0, 10.0, 0.24),
        _ => {
            return Err(OutputError::UnknownCategory {
                kind: "Eurocode",
                name: category.to_string(),
            });
        }
    };
    Ok(EurocodeTerrain { z0, z_min, kt })
}

/// Coefficients of AIJ terrain category `I` to `V`
pub fn aij_terrain(category: &str) -> Result<AijTerrain> {
    let (zb, zg, alpha) = match category_key(category, "AIJ Category") {
        "I" => (5.0, 250.0, 0.1),
        "II" => (5.0, 350.0, 0.15),
        "III" => (10.0, 450.0, 0.2),
        "IV" => (20.0, 550.0, 0.27),
        "V" => (30.0, 650.0, 0.35),
        _ => {
            return Err(OutputError::UnknownCategory {
                kind: "AIJ",
                name: category.to_string(),
            });
        }
    };
    Ok(AijTerrain { zb, zg, alpha })
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(OutputError::InvalidProfile(format!(
            "{name} must be > 0, got {value}"
        )))
    }
}

/// Raise every value below `max / 20` to that floor; non-finite values are
/// floored as well.
fn floor_at_twentieth(values: &mut [f64]) {
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let floor = max / 20.0;
    for v in values.iter_mut() {
        if !v.is_finite() || *v < floor {
            *v = floor;
        }
    }
}

/// Time modulation of the inflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeProfile {
    /// Full intensity from the start
    #[default]
    Constant,
    /// Linear ramp from 0 to 1 over `t_ramp`
    Ramp {
        /// Ramp duration
        t_ramp: f64,
    },
}

impl TimeProfile {
    /// Evaluate the two-point time table
    pub fn evaluate(&self) -> Result<Profile> {
        let (domain, values, description) = match *self {
            TimeProfile::Constant => (
                vec![0.0, 1.0e6],
                vec![1.0, 1.0],
                "tProfile.constantProfile()".to_string(),
            ),
            TimeProfile::Ramp { t_ramp } => {
                require_positive("tRamp", t_ramp)?;
                (
                    vec![0.0, t_ramp],
                    vec![0.0, 1.0],
                    format!("tProfile.rampProfile(tRamp={})", param(t_ramp)),
                )
            }
        };
        Ok(Profile {
            kind: ProfileKind::Time,
            domain,
            values,
            description,
        })
    }
}

/// Mean velocity laws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VelocityProfile {
    /// Constant velocity
    Uniform {
        /// Velocity
        u: f64,
    },
    /// `u0 + dudz * z`
    Linear {
        /// Velocity at z = 0
        u0: f64,
        /// Shear
        dudz: f64,
    },
    /// `u0 * (z / z_ref)^alpha`, floored at a twentieth of the maximum
    PowerLaw {
        /// Reference velocity
        u0: f64,
        /// Reference height
        z_ref: f64,
        /// Exponent
        alpha: f64,
    },
    /// Eurocode log law `u_bas * kt * ln(z * scale / z0)`
    Eurocode {
        /// Basic wind velocity
        u_bas: f64,
        /// Terrain category
        category: String,
        /// Model-to-full-scale height ratio
        #[serde(default = "unit_scale")]
        scale: f64,
    },
    /// AIJ power law `1.7 * u * (z * scale / zg)^alpha`
    Aij {
        /// Basic wind velocity
        u: f64,
        /// Terrain category
        category: String,
        /// Model-to-full-scale height ratio
        #[serde(default = "unit_scale")]
        scale: f64,
    },
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for VelocityProfile {
    fn default() -> Self {
        VelocityProfile::Uniform { u: 10.0 }
    }
}

impl VelocityProfile {
    /// Evaluate the law at heights `z`
    pub fn evaluate(&self, z: &[f64]) -> Result<Profile> {
        let (values, description) = match self {
            VelocityProfile::Uniform { u } => (
                vec![*u; z.len()],
                format!("uProfile.uniformProfile(U={})", param(*u)),
            ),
            VelocityProfile::Linear { u0, dudz } => (
                z.iter().map(|z| u0 + dudz * z).collect(),
                format!(
                    "uProfile.linearProfile(U0={},dUdz={})",
                    param(*u0),
                    param(*dudz)
                ),
            ),
            VelocityProfile::PowerLaw { u0, z_ref, alpha } => {
                require_positive("zRef", *z_ref)?;
                let mut values: Vec<f64> =
                    z.iter().map(|z| u0 * (z / z_ref).powf(*alpha)).collect();
                floor_at_twentieth(&mut values);
                (
                    values,
                    format!(
                        "uProfile.powerLaw(U0={},zRef={},alpha={})",
                        param(*u0),
                        param(*z_ref),
                        param(*alpha)
                    ),
                )
            }
            VelocityProfile::Eurocode {
                u_bas,
                category,
                scale,
            } => {
                require_positive("scale", *scale)?;
                let t = eurocode_terrain(category)?;
                let log_law = |height: f64| u_bas * t.kt * (height / t.z0).ln();
                (
                    z.iter()
                        .map(|z| log_law((z * scale).max(t.z_min)))
                        .collect(),
                    format!(
                        "uProfile.ECProfile(Ubas={},z0={},kt={},zMin={},scale={})",
                        param(*u_bas),
                        param(t.z0),
                        param(t.kt),
                        param(t.z_min),
                        param(*scale)
                    ),
                )
            }
            VelocityProfile::Aij { u, category, scale } => {
                require_positive("scale", *scale)?;
                let t = aij_terrain(category)?;
                let power_law = |height: f64| 1.7 * u * (height / t.zg).powf(t.alpha);
                (
                    z.iter().map(|z| power_law((z * scale).max(t.zb))).collect(),
                    format!(
                        "uProfile.AIJProfile(U={},zb={},zg={},alpha={},scale={})",
                        param(*u),
                        param(t.zb),
                        param(t.zg),
                        param(t.alpha),
                        param(*scale)
                    ),
                )
            }
        };
        Ok(Profile {
            kind: ProfileKind::Velocity,
            domain: z.to_vec(),
            values,
            description,
        })
    }
}

/// Standard deviation laws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviationProfile {
    /// Constant standard deviation
    Uniform {
        /// Standard deviation
        su: f64,
    },
    /// Eurocode `u_bas * kt`, constant with height
    Eurocode {
        /// Basic wind velocity
        u_bas: f64,
        /// Terrain category
        category: String,
    },
}

impl Default for DeviationProfile {
    fn default() -> Self {
        DeviationProfile::Uniform { su: 1.0 }
    }
}

impl DeviationProfile {
    /// Evaluate the law at heights `z`
    pub fn evaluate(&self, z: &[f64]) -> Result<Profile> {
        let (value, description) = match self {
            DeviationProfile::Uniform { su } => {
                (*su, format!("sProfile.uniformProfile(su={})", param(*su)))
            }
            DeviationProfile::Eurocode { u_bas, category } => {
                let t = eurocode_terrain(category)?;
                (
                    u_bas * t.kt,
                    format!(
                        "sProfile.ECProfile(Ubas={},kt={})",
                        param(*u_bas),
                        param(t.kt)
                    ),
                )
            }
        };
        Ok(Profile {
            kind: ProfileKind::Deviation,
            domain: z.to_vec(),
            values: vec![value; z.len()],
            description,
        })
    }
}

/// Integral length scale laws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LengthProfile {
    /// Constant length scale
    Uniform {
        /// Length scale
        l: f64,
    },
    /// Solari (1993): `300 (z * scale / 300)^(0.46 + 0.074 ln z0)`
    Solari1993 {
        /// Roughness length
        z0: f64,
        /// Model-to-full-scale height ratio
        #[serde(default = "unit_scale")]
        scale: f64,
    },
    /// ESDU: `25 (z * scale)^0.35 z0^-0.063`
    Esdu {
        /// Roughness length
        z0: f64,
        /// Model-to-full-scale height ratio
        #[serde(default = "unit_scale")]
        scale: f64,
    },
}

impl Default for LengthProfile {
    fn default() -> Self {
        LengthProfile::Uniform { l: 1.0 }
    }
}

impl LengthProfile {
    /// Evaluate the law at heights `z`; full-scale lengths are divided by
    /// `scale` back to model scale.
    pub fn evaluate(&self, z: &[f64]) -> Result<Profile> {
        let (values, description) = match self {
            LengthProfile::Uniform { l } => (
                vec![*l; z.len()],
                format!("lProfile.uniformProfile(L={})", param(*l)),
            ),
            LengthProfile::Solari1993 { z0, scale } => {
                require_positive("z0", *z0)?;
                require_positive("scale", *scale)?;
                let exponent = 0.46 + 0.074 * z0.ln();
                let mut values: Vec<f64> = z
                    .iter()
                    .map(|z| 300.0 * (z * scale / 300.0).powf(exponent))
                    .collect();
                floor_at_twentieth(&mut values);
                (
                    values.into_iter().map(|l| l / scale).collect(),
                    format!(
                        "lProfile.solari1993Profile(z0={},scale={})",
                        param(*z0),
                        param(*scale)
                    ),
                )
            }
            LengthProfile::Esdu { z0, scale } => {
                require_positive("z0", *z0)?;
                require_positive("scale", *scale)?;
                let roughness = z0.powf(-0.063);
                let mut values: Vec<f64> = z
                    .iter()
                    .map(|z| 25.0 * (z * scale).powf(0.35) * roughness)
                    .collect();
                floor_at_twentieth(&mut values);
                (
                    values.into_iter().map(|l| l / scale).collect(),
                    format!(
                        "lProfile.ESDUProfile(z0={},scale={})",
                        param(*z0),
                        param(*scale)
                    ),
                )
            }
        };
        Ok(Profile {
            kind: ProfileKind::Length,
            domain: z.to_vec(),
            values,
            description,
        })
    }
}

/// The four profiles of a turbulence dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSet {
    /// Sampling heights
    pub domain: ProfileDomain,
    /// Time modulation
    pub time: TimeProfile,
    /// Mean velocity
    pub velocity: VelocityProfile,
    /// Standard deviation
    pub deviation: DeviationProfile,
    /// Length scale
    pub length: LengthProfile,
}

impl ProfileSet {
    /// Evaluate the four profiles in dictionary order `t`, `u`, `s`, `l`
    pub fn evaluate(&self) -> Result<[Profile; 4]> {
        let z = self.domain.heights()?;
        Ok([
            self.time.evaluate()?,
            self.velocity.evaluate(&z)?,
            self.deviation.evaluate(&z)?,
            self.length.evaluate(&z)?,
        ])
    }
}

//! Turbulence dictionary: profiles, seeds and the main spectral seed

use super::format::format_shortest;
use super::{OutputConfig, SEPARATOR};
use crate::profile::Profile;
use inflow_spectral::SynthesisReport;
use log::info;
use std::fmt::Write;

fn write_mode_vectors(out: &mut String, name: &str, vectors: &[[f64; 3]]) {
    let _ = writeln!(out, "{name} ( ");
    for v in vectors {
        let [x, y, z] = v.map(format_shortest);
        let _ = writeln!(out, "({x} {y} {z})");
    }
    out.push_str(");\n");
}

/// Render the turbulence dictionary.
///
/// `profiles` are written in the given order, which should be time,
/// velocity, deviation and length. Profile values and seeds use three
/// decimals; mode vectors are written at full precision so that `k . p`
/// and `k . q` stay zero.
pub fn write_turbulence_dictionary(
    report: &SynthesisReport,
    profiles: &[Profile],
    seeds: &[f64],
    config: &OutputConfig,
) -> String {
    let field = &report.field;
    let mut out = String::with_capacity(256 * (field.len() + 4 * profiles.len()));

    out.push_str(&config.banner);
    for profile in profiles {
        out.push_str("\n// ");
        out.push_str(&profile.description);
    }
    out.push('\n');
    out.push_str(&report.description);
    let _ = write!(out, "\n\n{SEPARATOR}\n\n");

    out.push_str("cutOff 0.5; \n\n");
    let seeds: Vec<String> = seeds.iter().map(|s| format!("{s:.3}")).collect();
    let _ = write!(out, "seeds ({});\n\n", seeds.join("\n"));

    for profile in profiles {
        profile.write(&mut out);
        out.push_str("\n\n");
    }

    write_mode_vectors(&mut out, "kMainSeed", &field.wavevectors());
    out.push('\n');
    write_mode_vectors(&mut out, "pMainSeed", &field.p_vectors());
    out.push('\n');
    write_mode_vectors(&mut out, "qMainSeed", &field.q_vectors());

    info!(
        "Turbulence dictionary: {} modes, {} profiles, {} seeds",
        field.len(),
        profiles.len(),
        seeds.len()
    );
    out
}

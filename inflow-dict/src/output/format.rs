//! Number formatting and generic dictionary blocks.

use super::OutputConfig;
use crate::error::{OutputError, Result};
use std::fmt::Write;

/// Rust writes `1.2346e0`; pad the exponent to two digits with a sign
fn pad_exponent(raw: String) -> String {
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, magnitude) = match exponent.strip_prefix('-') {
                Some(m) => ('-', m),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{magnitude:0>2}")
        }
        None => raw,
    }
}

/// C-style scientific notation with `digits` significant digits,
/// e.g. `-1.2346e+00` for 5 digits.
pub fn format_sci(value: f64, digits: usize) -> String {
    let precision = digits.saturating_sub(1);
    if !value.is_finite() {
        return format!("{value}");
    }
    pad_exponent(format!("{value:.precision$e}"))
}

/// Shortest text that reads back to the same `f64`.
///
/// Plain decimals for `1e-4 <= |value| < 1e16`, otherwise exponent form
/// with a signed two-digit exponent (`1e-05`, `1.5e+16`).
pub fn format_shortest(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    pad_exponent(format!("{value:?}"))
}

/// An index written in the numeric format, rejected when it would not read
/// back as the same integer.
pub fn format_index(index: usize, digits: usize) -> Result<String> {
    let text = format_sci(index as f64, digits);
    match text.parse::<f64>() {
        Ok(v) if v == index as f64 => Ok(text),
        _ => Err(OutputError::IndexPrecision { index, digits }),
    }
}

fn open(out: &mut String, name: &str) {
    let _ = writeln!(out, "{name} (");
}

fn close(out: &mut String) {
    out.push_str(");\n");
}

/// `name (a b c);` on a single line
pub fn write_inline_vector(out: &mut String, name: &str, v: &[f64; 3], config: &OutputConfig) {
    let d = config.significant_digits;
    let _ = writeln!(
        out,
        "{name} ({} {} {});",
        format_sci(v[0], d),
        format_sci(v[1], d),
        format_sci(v[2], d)
    );
}

/// Sparse triplets as `(row col value)` rows, sorted by row then column,
/// or in the reverse order when `descending`.
pub fn write_triplets(
    out: &mut String,
    name: &str,
    triplets: &[(usize, usize, f64)],
    descending: bool,
    config: &OutputConfig,
) -> Result<()> {
    let d = config.significant_digits;
    let mut sorted = triplets.to_vec();
    sorted.sort_by_key(|&(r, c, _)| (r, c));
    if descending {
        sorted.reverse();
    }
    open(out, name);
    for (r, c, v) in sorted {
        let _ = writeln!(
            out,
            "({} {} {})",
            format_index(r, d)?,
            format_index(c, d)?,
            format_sci(v, d)
        );
    }
    close(out);
    Ok(())
}

/// One value per line
pub fn write_scalars(out: &mut String, name: &str, values: &[f64], config: &OutputConfig) {
    open(out, name);
    for &v in values {
        out.push_str(&format_sci(v, config.significant_digits));
        out.push('\n');
    }
    close(out);
}

/// One index per line, in the numeric format
pub fn write_indices(
    out: &mut String,
    name: &str,
    values: impl IntoIterator<Item = usize>,
    config: &OutputConfig,
) -> Result<()> {
    open(out, name);
    for v in values {
        out.push_str(&format_index(v, config.significant_digits)?);
        out.push('\n');
    }
    close(out);
    Ok(())
}

/// Dense rows as `(a b ...)` lines
pub fn write_rows<R: AsRef<[f64]>>(out: &mut String, name: &str, rows: &[R], config: &OutputConfig) {
    open(out, name);
    for row in rows {
        let cells: Vec<String> = row
            .as_ref()
            .iter()
            .map(|&v| format_sci(v, config.significant_digits))
            .collect();
        let _ = writeln!(out, "({})", cells.join(" "));
    }
    close(out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sci() {
        assert_eq!(format_sci(-1.23456, 5), "-1.2346e+00");
        assert_eq!(format_sci(0.0, 5), "0.0000e+00");
        assert_eq!(format_sci(12345.0, 5), "1.2345e+04");
        assert_eq!(format_sci(2.5e-7, 3), "2.50e-07");
        assert_eq!(format_sci(1e123, 2), "1.0e+123");
        assert_eq!(format_sci(7.0, 1), "7e+00");
    }

    #[test]
    fn test_format_shortest() {
        assert_eq!(format_shortest(0.1), "0.1");
        assert_eq!(format_shortest(-2.0), "-2.0");
        assert_eq!(format_shortest(0.0001), "0.0001");
        assert_eq!(format_shortest(1e-5), "1e-05");
        assert_eq!(format_shortest(-1.5e-7), "-1.5e-07");
        assert_eq!(format_shortest(1e16), "1e+16");
        assert_eq!(format_shortest(2.5e123), "2.5e+123");
        for v in [0.1 + 0.2, 1e-5 / 3.0, 123456.789e20] {
            assert_eq!(format_shortest(v).parse::<f64>().unwrap(), v);
        }
    }

    #[test]
    fn test_format_index() {
        assert_eq!(format_index(42, 5).unwrap(), "4.2000e+01");
        assert_eq!(format_index(99999, 5).unwrap(), "9.9999e+04");
        assert_eq!(format_index(100000, 5).unwrap(), "1.0000e+05");
        assert!(matches!(
            format_index(123456, 5),
            Err(OutputError::IndexPrecision {
                index: 123456,
                digits: 5
            })
        ));
        assert!(format_index(123456, 6).is_ok());
    }

    #[test]
    fn test_triplet_block_order() {
        let config = OutputConfig::default().significant_digits(3);
        let triplets = vec![(1, 0, 2.0), (0, 1, -1.0), (0, 0, 4.0)];

        let mut out = String::new();
        write_triplets(&mut out, "A", &triplets, false, &config).unwrap();
        assert_eq!(
            out,
            "A (\n(0.00e+00 0.00e+00 4.00e+00)\n(0.00e+00 1.00e+00 -1.00e+00)\n(1.00e+00 0.00e+00 2.00e+00)\n);\n"
        );

        let mut out = String::new();
        write_triplets(&mut out, "A", &triplets, true, &config).unwrap();
        assert!(out.starts_with("A (\n(1.00e+00 0.00e+00"));
    }

    #[test]
    fn test_rows_and_inline() {
        let config = OutputConfig::default().significant_digits(2);
        let mut out = String::new();
        write_rows(&mut out, "nodes", &[[1.0, 2.0], [3.0, 4.0]], &config);
        write_inline_vector(&mut out, "t1", &[0.0, 0.0, 1.0], &config);
        assert_eq!(
            out,
            "nodes (\n(1.0e+00 2.0e+00)\n(3.0e+00 4.0e+00)\n);\nt1 (0.0e+00 0.0e+00 1.0e+00);\n"
        );
    }
}

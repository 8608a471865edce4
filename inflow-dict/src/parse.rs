//! Reader for the blocks written by [`crate::output`]
//!
//! Only the layout produced by the writers is understood: a block opens with
//! a `name (` line, holds one value or one parenthesized row per line and is
//! closed by `);`.

use crate::error::{OutputError, Result};

fn parse_error(line: usize, message: impl Into<String>) -> OutputError {
    OutputError::Parse {
        line,
        message: message.into(),
    }
}

fn number(token: &str, line: usize) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| parse_error(line, format!("invalid number '{token}'")))
}

fn index(token: &str, line: usize) -> Result<usize> {
    let value = number(token, line)?;
    if value < 0.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
        return Err(parse_error(line, format!("invalid index '{token}'")));
    }
    Ok(value as usize)
}

/// Lines between `name (` and `);`, each with its 1-based line number
fn block<'a>(text: &'a str, name: &str) -> Result<Vec<(usize, &'a str)>> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));
    let opening = format!("{name} (");
    let start = lines
        .by_ref()
        .find(|(_, l)| *l == opening)
        .ok_or_else(|| parse_error(0, format!("block '{name}' not found")))?;

    let mut body = Vec::new();
    for (line_no, line) in lines {
        if line == ");" {
            return Ok(body);
        }
        if !line.is_empty() {
            body.push((line_no, line));
        }
    }
    Err(parse_error(start.0, format!("block '{name}' is not closed")))
}

/// Whitespace-separated numbers of a `(a b ...)` row
fn row(line: &str, line_no: usize) -> Result<Vec<&str>> {
    let inner = line
        .strip_prefix('(')
        .and_then(|l| l.strip_suffix(')'))
        .ok_or_else(|| parse_error(line_no, format!("expected '(...)', got '{line}'")))?;
    Ok(inner.split_whitespace().collect())
}

/// Read a `(row col value)` block
pub fn parse_triplets(text: &str, name: &str) -> Result<Vec<(usize, usize, f64)>> {
    block(text, name)?
        .into_iter()
        .map(|(line, content)| match row(content, line)?.as_slice() {
            [r, c, v] => Ok((index(r, line)?, index(c, line)?, number(v, line)?)),
            other => Err(parse_error(
                line,
                format!("expected 3 entries, got {}", other.len()),
            )),
        })
        .collect()
}

/// Read a block of one number per line
pub fn parse_scalars(text: &str, name: &str) -> Result<Vec<f64>> {
    block(text, name)?
        .into_iter()
        .map(|(line, content)| number(content, line))
        .collect()
}

/// Read a block of one index per line
pub fn parse_indices(text: &str, name: &str) -> Result<Vec<usize>> {
    block(text, name)?
        .into_iter()
        .map(|(line, content)| index(content, line))
        .collect()
}

/// Read a block of `(a b ...)` rows
pub fn parse_rows(text: &str, name: &str) -> Result<Vec<Vec<f64>>> {
    block(text, name)?
        .into_iter()
        .map(|(line, content)| {
            row(content, line)?
                .into_iter()
                .map(|token| number(token, line))
                .collect()
        })
        .collect()
}

/// Read a single-line `name (a b c);` entry
pub fn parse_inline_vector(text: &str, name: &str) -> Result<[f64; 3]> {
    let prefix = format!("{name} (");
    for (i, line) in text.lines().enumerate() {
        let Some(rest) = line.trim().strip_prefix(&prefix) else {
            continue;
        };
        let Some(inner) = rest.strip_suffix(");") else {
            continue;
        };
        let values = inner
            .split_whitespace()
            .map(|token| number(token, i + 1))
            .collect::<Result<Vec<f64>>>()?;
        return values
            .try_into()
            .map_err(|v: Vec<f64>| parse_error(i + 1, format!("expected 3 entries, got {}", v.len())));
    }
    Err(parse_error(0, format!("entry '{name}' not found")))
}

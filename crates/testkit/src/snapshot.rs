//! Golden-file snapshot helper.
//!
//! Snapshots are canonical pretty JSON: object keys sorted, floats rounded to
//! [`FLOAT_DIGITS`] decimals so platform-level rounding noise in the particle
//! integrators does not churn goldens.
//!
//! Tests compare against the golden file on disk and fail when it is missing.
//! To create or update goldens, rerun with `RAINSCAPE_UPDATE_SNAPSHOTS=1`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Number, Value};
use std::fs;
use std::path::Path;
use tracing::info;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "RAINSCAPE_UPDATE_SNAPSHOTS";

/// Decimal digits kept for floating point values.
pub const FLOAT_DIGITS: i32 = 4;

/// Assert that `value` matches the JSON snapshot stored at `path`.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if should_update_snapshots() {
        info!(path = %path.display(), "writing snapshot");
        write_snapshot(path, &actual)?;
        return Ok(());
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {}=1 to create/update)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    if expected != actual {
        anyhow::bail!(
            "Snapshot mismatch at {} (run with {}=1 to update)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        );
    }

    Ok(())
}

/// Serialize `value` the way snapshots store it.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let value = canonicalize_value(value);
    let mut s = serde_json::to_string_pretty(&value).context("Failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

fn should_update_snapshots() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes") | Ok("YES")
    )
}

fn write_snapshot(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k, canonicalize_value(v));
            }
            Value::Object(out)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize_value).collect()),
        Value::Number(n) if n.is_f64() => round_number(n),
        other => other,
    }
}

fn round_number(n: Number) -> Value {
    let Some(f) = n.as_f64() else {
        return Value::Number(n);
    };
    let scale = 10f64.powi(FLOAT_DIGITS);
    let rounded = (f * scale).round() / scale;
    // Normalize -0.0 so it matches 0.0.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    Number::from_f64(rounded).map_or(Value::Number(n), Value::Number)
}

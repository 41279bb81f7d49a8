//! Golden-file snapshot assertions.
//!
//! Two flavors: plain-text goldens for terrain glyph grids (diff-friendly
//! in review) and canonical JSON goldens for structured values. Tests
//! compare against the file on disk; rerun with
//! `WILDMERE_UPDATE_SNAPSHOTS=1` to rewrite goldens.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::TerrainGrid;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "WILDMERE_UPDATE_SNAPSHOTS";

/// Assert that a terrain grid matches the plain-text golden at `path`.
///
/// On mismatch the error carries both renderings, so the failure output
/// shows the two maps side by side.
pub fn assert_grid_snapshot<P: AsRef<Path>>(path: P, grid: &TerrainGrid) -> Result<()> {
    let path = path.as_ref();
    let mut actual = grid.render();
    actual.push('\n');

    if should_update_snapshots() {
        return write_snapshot(path, &actual);
    }

    let expected = read_golden(path)?;
    if expected != actual {
        bail!(
            "Terrain snapshot mismatch at {} (run with {}=1 to update)\n--- golden ---\n{}--- actual ---\n{}",
            path.display(),
            UPDATE_SNAPSHOTS_ENV,
            expected,
            actual
        );
    }
    Ok(())
}

/// Assert that `value` matches the canonical-JSON golden at `path`.
/// Object keys are sorted so the files stay stable across serializers.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let mut actual = serde_json::to_string_pretty(&sort_keys(value))
        .context("Failed to format snapshot JSON")?;
    actual.push('\n');

    if should_update_snapshots() {
        return write_snapshot(path, &actual);
    }

    let expected = read_golden(path)?;
    if expected != actual {
        bail!(
            "Snapshot mismatch at {} (run with {}=1 to update)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        );
    }
    Ok(())
}

fn read_golden(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {}=1 to create)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })
}

fn should_update_snapshots() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
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

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (key, inner) in entries {
                out.insert(key, sort_keys(inner));
            }
            Value::Object(out)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{name}-{nanos}"))
    }

    #[test]
    fn grid_snapshot_round_trips() {
        let path = temp_path("wildmere-grid.golden");
        let grid = TerrainGrid::from_rows(vec!["..~".into(), "^^.".into()]);
        fs::write(&path, "..~\n^^.\n").unwrap();
        assert_grid_snapshot(&path, &grid).expect("matching golden passes");
    }

    #[test]
    fn grid_snapshot_mismatch_shows_both_maps() {
        let path = temp_path("wildmere-grid-mismatch.golden");
        let grid = TerrainGrid::from_rows(vec!["..~".into()]);
        fs::write(&path, "~~~\n").unwrap();
        let err = assert_grid_snapshot(&path, &grid).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("~~~"));
        assert!(message.contains("..~"));
    }

    #[test]
    fn missing_golden_names_the_update_env_var() {
        let path = temp_path("wildmere-missing.golden");
        let grid = TerrainGrid::from_rows(vec![".".into()]);
        let err = assert_grid_snapshot(&path, &grid).unwrap_err();
        assert!(err.to_string().contains(UPDATE_SNAPSHOTS_ENV));
    }

    #[test]
    fn json_snapshot_sorts_object_keys() {
        let path = temp_path("wildmere-json.golden");
        fs::write(&path, "{\n  \"a\": 1,\n  \"b\": 2\n}\n").unwrap();
        let value = serde_json::json!({"b": 2, "a": 1});
        assert_json_snapshot(&path, &value).expect("sorted golden matches");
    }
}

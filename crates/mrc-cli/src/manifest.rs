use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One CLI invocation, written as `run-<run_id>.json` next to its output.
#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub run_id: String,
    pub command: String,
    pub version: String,
    pub timestamp: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    pub outputs: Vec<String>,
    pub params: Vec<Param>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: String,
}

/// Record a run; the manifest lands in `dir` when it is a directory, else
/// next to the output file.
pub fn record_manifest(
    output: &Path,
    command: &str,
    params: &[(&str, &str)],
    status: &str,
    duration_ms: Option<u128>,
) -> Result<PathBuf> {
    let run_id = Uuid::new_v4().to_string();
    let dir = if output.is_dir() {
        output.to_path_buf()
    } else {
        output
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    };
    fs::create_dir_all(&dir)?;
    let manifest = ManifestEntry {
        run_id: run_id.clone(),
        command: command.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        status: status.to_string(),
        duration_ms,
        outputs: vec![output.display().to_string()],
        params: params
            .iter()
            .map(|(k, v)| Param {
                name: k.to_string(),
                value: v.to_string(),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    let path = dir.join(format!("run-{}.json", run_id));
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub fn read_manifest(path: &Path) -> Result<ManifestEntry> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading run manifest '{}'", path.display()))?;
    let manifest = serde_json::from_str(&json)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn manifest_lands_next_to_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("ltmr.csv");
        let path = record_manifest(
            &output,
            "estimate",
            &[("params", "ltmr.yaml")],
            "success",
            Some(12),
        )
        .unwrap();
        assert_eq!(path.parent(), Some(dir.path()));

        let entry = read_manifest(&path).unwrap();
        assert_eq!(entry.command, "estimate");
        assert_eq!(entry.status, "success");
        assert_eq!(entry.params[0].name, "params");
        assert_eq!(entry.outputs, vec![output.display().to_string()]);
    }
}

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::job::BatchJobRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchManifest {
    pub created_at: DateTime<Utc>,
    pub task: String,
    pub num_jobs: usize,
    pub success: usize,
    pub failure: usize,
    pub jobs: Vec<BatchJobRecord>,
}

pub fn write_batch_manifest(path: &Path, manifest: &BatchManifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating manifest directory '{}'", parent.display()))?;
    }
    let json =
        serde_json::to_string_pretty(manifest).context("serializing batch manifest to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("writing batch manifest '{}'", path.display()))?;
    Ok(())
}

pub fn load_batch_manifest(path: &Path) -> Result<BatchManifest> {
    let file = fs::File::open(path)
        .with_context(|| format!("opening batch manifest '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing batch manifest '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn manifest_writes_and_reads_back() {
        let records = vec![
            BatchJobRecord {
                job_id: "estimate:ltmr".into(),
                design_id: "ltmr".into(),
                status: "ok".into(),
                error: None,
                lcoe_foak: Some(310.5),
                lcoe_noak: Some(142.0),
                output: "out/ltmr".into(),
                tags: vec!["baseline".into()],
            },
            BatchJobRecord {
                job_id: "estimate:heu".into(),
                design_id: "heu".into(),
                status: "error".into(),
                error: Some("enrichment 0.25 is outside the fuel cost law range".into()),
                lcoe_foak: None,
                lcoe_noak: None,
                output: "out/heu".into(),
                tags: Vec::new(),
            },
        ];
        let manifest = BatchManifest {
            created_at: Utc::now(),
            task: "estimate".into(),
            num_jobs: 2,
            success: 1,
            failure: 1,
            jobs: records,
        };
        let tmp = NamedTempFile::new().unwrap();
        write_batch_manifest(tmp.path(), &manifest).unwrap();
        let parsed = load_batch_manifest(tmp.path()).unwrap();
        assert_eq!(parsed.task, "estimate");
        assert_eq!(parsed.jobs[0].lcoe_foak, Some(310.5));
        assert!(!parsed.jobs[1].is_ok());
        assert_eq!(parsed.jobs[0].tags, vec!["baseline".to_string()]);
    }
}

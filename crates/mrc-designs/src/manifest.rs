use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::path::Path;

use crate::set::ResolvedDesign;

/// Summary of one resolved design, as listed in a design manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignArtifact {
    pub design_id: String,
    pub description: Option<String>,
    pub params_file: String,
    pub parameter_count: usize,
    pub reactor_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignManifest {
    pub created_at: DateTime<Utc>,
    pub designs: Vec<DesignArtifact>,
}

pub fn artifacts_from_designs(designs: &[ResolvedDesign]) -> Vec<DesignArtifact> {
    designs
        .iter()
        .map(|design| DesignArtifact {
            design_id: design.design_id.clone(),
            description: design.description.clone(),
            params_file: design.params_file.display().to_string(),
            parameter_count: design.parameters.len(),
            reactor_type: design
                .parameters
                .get("Reactor Type")
                .map(|value| value.to_string()),
            tags: design.tags.clone(),
            metadata: design.metadata.clone(),
        })
        .collect()
}

pub fn write_manifest(path: &Path, artifacts: &[DesignArtifact]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating manifest directory '{}'", parent.display()))?;
    }
    let manifest = DesignManifest {
        created_at: Utc::now(),
        designs: artifacts.to_vec(),
    };
    let file = File::create(path)
        .with_context(|| format!("creating design manifest '{}'", path.display()))?;
    serde_json::to_writer_pretty(file, &manifest)
        .with_context(|| format!("writing design manifest '{}'", path.display()))?;
    Ok(())
}

pub fn load_manifest(path: &Path) -> Result<DesignManifest> {
    let file = File::open(path)
        .with_context(|| format!("opening design manifest '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing design manifest '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrc_core::DesignParameters;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn writes_and_reads_manifest() {
        let design = ResolvedDesign {
            design_id: "gcmr".into(),
            description: Some("gas-cooled variant".into()),
            params_file: PathBuf::from("gcmr.yaml"),
            parameters: DesignParameters::new()
                .with("Reactor Type", "GCMR")
                .with("Power MWe", 5.0),
            tags: vec!["gas".into()],
            metadata: HashMap::new(),
        };
        let artifacts = artifacts_from_designs(&[design]);
        assert_eq!(artifacts[0].reactor_type.as_deref(), Some("GCMR"));
        assert_eq!(artifacts[0].parameter_count, 2);

        let tmp = NamedTempFile::new().unwrap();
        write_manifest(tmp.path(), &artifacts).unwrap();
        let parsed = load_manifest(tmp.path()).unwrap();
        assert_eq!(parsed.designs.first().unwrap().design_id, "gcmr");
    }
}

use anyhow::{anyhow, Context, Result};
use mrc_core::{DesignParameters, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// A set of reactor designs evaluated against one chart of accounts.
///
/// File paths are resolved relative to the directory holding the set file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignSet {
    pub version: Option<u32>,
    pub chart_file: Option<String>,
    pub index_file: Option<String>,
    pub economics_file: Option<String>,
    /// Replaces the built-in non-standard law registry when set
    pub laws_file: Option<String>,
    #[serde(default)]
    pub defaults: DesignDefaults,
    #[serde(default)]
    pub designs: Vec<DesignEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignDefaults {
    /// Parameters applied to every design before its own overrides
    #[serde(default)]
    pub overrides: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignEntry {
    pub design_id: String,
    pub description: Option<String>,
    /// YAML or JSON design parameter file
    pub params: String,
    #[serde(default)]
    pub overrides: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedDesign {
    pub design_id: String,
    pub description: Option<String>,
    pub params_file: PathBuf,
    pub parameters: DesignParameters,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, String>,
}

/// Input tables shared by every design in a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedInputs {
    pub chart_file: Option<PathBuf>,
    pub index_file: Option<PathBuf>,
    pub economics_file: Option<PathBuf>,
    pub laws_file: Option<PathBuf>,
}

pub fn load_set_from_path(path: &Path) -> Result<DesignSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading design set '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing design set yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing design set json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing design set"),
    }
}

fn relative_to(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

impl DesignSet {
    pub fn shared_inputs(&self, base_dir: &Path) -> SharedInputs {
        let resolve = |file: &Option<String>| file.as_deref().map(|f| relative_to(base_dir, f));
        SharedInputs {
            chart_file: resolve(&self.chart_file),
            index_file: resolve(&self.index_file),
            economics_file: resolve(&self.economics_file),
            laws_file: resolve(&self.laws_file),
        }
    }
}

/// Check identifiers and parameter references without reading any file.
pub fn check_identifiers(set: &DesignSet) -> Result<()> {
    if set.designs.is_empty() {
        return Err(anyhow!("design set contains no designs"));
    }
    let mut seen = HashSet::new();
    for design in &set.designs {
        if design.design_id.trim().is_empty() {
            return Err(anyhow!("design_id cannot be empty"));
        }
        if !seen.insert(design.design_id.clone()) {
            return Err(anyhow!(
                "duplicate design_id '{}' in set",
                design.design_id
            ));
        }
        if design.params.trim().is_empty() {
            return Err(anyhow!(
                "design '{}' must name a parameter file",
                design.design_id
            ));
        }
    }
    Ok(())
}

/// Load every design's parameters and apply defaults, then its own overrides.
pub fn resolve_designs(set: &DesignSet, base_dir: &Path) -> Result<Vec<ResolvedDesign>> {
    check_identifiers(set)?;
    let defaults = &set.defaults;
    let mut resolved = Vec::with_capacity(set.designs.len());
    for design in &set.designs {
        let params_file = relative_to(base_dir, &design.params);
        let mut parameters = mrc_io::load_design_parameters(&params_file)
            .with_context(|| format!("loading parameters for design '{}'", design.design_id))?;
        for (name, value) in defaults.overrides.iter().chain(&design.overrides) {
            parameters.insert(name, value.clone());
        }
        resolved.push(ResolvedDesign {
            design_id: design.design_id.clone(),
            description: design.description.clone(),
            params_file,
            parameters,
            tags: design
                .tags
                .as_ref()
                .cloned()
                .unwrap_or_else(|| defaults.tags.clone()),
            metadata: design
                .metadata
                .as_ref()
                .cloned()
                .unwrap_or_else(|| defaults.metadata.clone()),
        });
    }
    info!(designs = resolved.len(), "resolved design set");
    Ok(resolved)
}

pub fn validate(set: &DesignSet, base_dir: &Path) -> Result<()> {
    resolve_designs(set, base_dir).map(|_| ())
}

//! Design parameters, economics table and law registry loaders.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, Trim};
use mrc_core::{AccountId, DesignParameters, LawRegistry, NonStandardLaw, ParamValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

/// Parse YAML or JSON by extension, falling back to trying both.
fn load_structured<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {} '{}'", what, path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).with_context(|| format!("parsing {} yaml", what))
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).with_context(|| format!("parsing {} json", what))
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .with_context(|| format!("parsing {}", what)),
    }
}

/// Load a design parameter file (YAML or JSON mapping).
pub fn load_design_parameters(path: impl AsRef<Path>) -> Result<DesignParameters> {
    let path = path.as_ref();
    let params: DesignParameters = load_structured(path, "design parameters")?;
    info!(count = params.len(), path = %path.display(), "loaded design parameters");
    Ok(params)
}

#[derive(Debug, Deserialize)]
struct EconomicsRecord {
    #[serde(rename = "Parameter")]
    parameter: String,
    #[serde(rename = "Value")]
    value: String,
}

/// Parse a `Parameter,Value` economics table. Extra columns are ignored.
pub fn parse_economics<R: Read>(reader: R) -> Result<DesignParameters> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut params = DesignParameters::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: EconomicsRecord =
            result.with_context(|| format!("parsing economics record {}", line + 1))?;
        if record.parameter.is_empty() {
            return Err(anyhow!("economics record {} has no parameter name", line + 1));
        }
        let value = record
            .value
            .parse::<f64>()
            .map(ParamValue::Number)
            .unwrap_or(ParamValue::Text(record.value));
        params.insert(&record.parameter, value);
    }
    Ok(params)
}

pub fn read_economics(path: impl AsRef<Path>) -> Result<DesignParameters> {
    let path = path.as_ref();
    let file = fs::File::open(path)
        .with_context(|| format!("opening economics table '{}'", path.display()))?;
    let params = parse_economics(file)
        .with_context(|| format!("reading economics table '{}'", path.display()))?;
    info!(count = params.len(), "loaded economics parameters");
    Ok(params)
}

/// Design parameters with the economics table merged on top.
pub fn merge_economics(design: &DesignParameters, economics: &DesignParameters) -> DesignParameters {
    let mut merged = design.clone();
    merged.merge(economics);
    merged
}

/// Load an account -> law registry from YAML or JSON.
pub fn load_law_registry(path: impl AsRef<Path>) -> Result<LawRegistry> {
    let path = path.as_ref();
    let table: BTreeMap<AccountId, NonStandardLaw> = load_structured(path, "law registry")?;
    if table.is_empty() {
        return Err(anyhow!("law registry '{}' assigns no accounts", path.display()));
    }
    info!(accounts = table.len(), "loaded non-standard law registry");
    Ok(LawRegistry::from_table(&table))
}

use mrc_core::DesignParameters;
use mrc_designs::ResolvedDesign;
use serde::{Deserialize, Serialize};

/// What each batch job computes for its design.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskKind {
    Estimate,
    Sample,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Estimate => "estimate",
            TaskKind::Sample => "sample",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub job_id: String,
    pub design_id: String,
    pub parameters: DesignParameters,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJobRecord {
    pub job_id: String,
    pub design_id: String,
    pub status: String,
    pub error: Option<String>,
    pub lcoe_foak: Option<f64>,
    pub lcoe_noak: Option<f64>,
    pub output: String,
    /// Carried over from the design set entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl BatchJobRecord {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

pub fn jobs_from_designs(designs: &[ResolvedDesign], task: TaskKind) -> Vec<BatchJob> {
    designs
        .iter()
        .map(|design| BatchJob {
            job_id: format!("{}:{}", task.as_str(), design.design_id),
            design_id: design.design_id.clone(),
            parameters: design.parameters.clone(),
            tags: design.tags.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_design() -> ResolvedDesign {
        ResolvedDesign {
            design_id: "ltmr".into(),
            description: None,
            params_file: PathBuf::from("ltmr.yaml"),
            parameters: DesignParameters::new().with("Power MWe", 6.2),
            tags: vec!["tag".into()],
            metadata: Default::default(),
        }
    }

    #[test]
    fn jobs_from_designs_builds_identifiers() {
        let jobs = jobs_from_designs(&[make_design()], TaskKind::Sample);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, "sample:ltmr");
        assert_eq!(jobs[0].tags, vec!["tag".to_string()]);
    }
}

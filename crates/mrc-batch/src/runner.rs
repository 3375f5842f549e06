use crate::job::{BatchJob, BatchJobRecord, TaskKind};
use crate::manifest::{write_batch_manifest, BatchManifest};
use anyhow::{Context, Result};
use chrono::Utc;
use mrc_algo::{sample_estimate, CostEngine, SamplingConfig};
use mrc_core::{AccountRow, CostColumn, CostReport, DesignParameters, InflationIndex, LawRegistry};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Tables shared read-only by every job in a batch.
pub struct BatchInputs {
    pub chart: Vec<AccountRow>,
    pub index: InflationIndex,
    /// Merged over each design's parameters; wins on collision
    pub economics: Option<DesignParameters>,
    pub laws: LawRegistry,
}

impl BatchInputs {
    pub fn from_files(
        chart: &Path,
        index: &Path,
        economics: Option<&Path>,
        laws: Option<&Path>,
    ) -> Result<Self> {
        Ok(Self {
            chart: mrc_io::read_chart_of_accounts(chart)?,
            index: mrc_io::read_inflation_index(index)?,
            economics: economics.map(mrc_io::read_economics).transpose()?,
            laws: match laws {
                Some(path) => mrc_io::load_law_registry(path)?,
                None => LawRegistry::default(),
            },
        })
    }
}

pub struct BatchRunnerConfig {
    pub jobs: Vec<BatchJob>,
    pub output_root: PathBuf,
    pub task: TaskKind,
    pub sampling: SamplingConfig,
    pub threads: usize,
}

/// Summary returned after the run so clients can log success/failure counts and manifest location.
pub struct BatchSummary {
    pub success: usize,
    pub failure: usize,
    pub manifest_path: PathBuf,
    pub jobs: Vec<BatchJobRecord>,
}

/// Evaluate every job in parallel. A failing design is recorded in the
/// manifest and never affects the others.
pub fn run_batch(config: &BatchRunnerConfig, inputs: &BatchInputs) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_root).with_context(|| {
        format!(
            "creating batch output root '{}'",
            config.output_root.display()
        )
    })?;

    let thread_count = if config.threads == 0 {
        num_cpus::get()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for batch runs")?;

    let job_records: Vec<BatchJobRecord> = pool.install(|| {
        config
            .jobs
            .par_iter()
            .map(|job| run_job(job, config, inputs))
            .collect()
    });

    let success = job_records.iter().filter(|record| record.is_ok()).count();
    let failure = job_records.len() - success;
    info!(success, failure, threads = thread_count, "batch finished");

    let manifest = BatchManifest {
        created_at: Utc::now(),
        task: config.task.as_str().to_string(),
        num_jobs: job_records.len(),
        success,
        failure,
        jobs: job_records.clone(),
    };
    let manifest_path = config.output_root.join("batch_manifest.json");
    write_batch_manifest(&manifest_path, &manifest)?;
    Ok(BatchSummary {
        success,
        failure,
        manifest_path,
        jobs: job_records,
    })
}

/// Evaluate one design and write `report.json` and `report.csv` under
/// `output_root/<design_id>/`.
fn run_job(job: &BatchJob, config: &BatchRunnerConfig, inputs: &BatchInputs) -> BatchJobRecord {
    let output_dir = config.output_root.join(sanitize_name(&job.design_id));

    let runner = || -> Result<CostReport> {
        let mut params = job.parameters.clone();
        if let Some(economics) = &inputs.economics {
            params.merge(economics);
        }
        let engine = CostEngine::new(&inputs.index, &inputs.laws);
        let prepared = engine.prepare(&inputs.chart, &params)?;
        let report = match config.task {
            TaskKind::Estimate => engine
                .evaluate(&prepared)?
                .into_report(params, Some(job.design_id.clone())),
            TaskKind::Sample => sample_estimate(&engine, &prepared, &config.sampling)?
                .into_report(params, Some(job.design_id.clone())),
        };
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating design directory '{}'", output_dir.display()))?;
        mrc_io::write_report_json(&report, &output_dir.join("report.json"))?;
        mrc_io::write_report_csv(&report, &output_dir.join("report.csv"))?;
        Ok(report)
    };

    let (status, error, lcoe) = match runner() {
        Ok(report) => (
            "ok".to_string(),
            None,
            Some((report.lcoe(CostColumn::Foak), report.lcoe(CostColumn::Noak))),
        ),
        Err(err) => {
            warn!(job = %job.job_id, "batch job failed: {:#}", err);
            ("error".to_string(), Some(format!("{:#}", err)), None)
        }
    };
    BatchJobRecord {
        job_id: job.job_id.clone(),
        design_id: job.design_id.clone(),
        status,
        error,
        lcoe_foak: lcoe.map(|(foak, _)| foak),
        lcoe_noak: lcoe.map(|(_, noak)| noak),
        output: output_dir.display().to_string(),
        tags: job.tags.clone(),
    }
}

fn sanitize_name(value: &str) -> String {
    let filtered: String = value
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    if filtered.is_empty() {
        "design".to_string()
    } else {
        filtered
    }
}

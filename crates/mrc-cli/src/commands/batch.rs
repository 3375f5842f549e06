use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};
use mrc_batch::{
    jobs_from_designs, run_batch, BatchInputs, BatchRunnerConfig, BatchSummary, TaskKind,
};
use mrc_cli::cli::{BatchTask, SamplingArgs, SharedInputOverrides};
use mrc_core::custom_round;
use mrc_designs::{load_set_from_path, resolve_designs};
use tabwriter::TabWriter;

use crate::commands::util::{display_opt, record_run_timed, sampling_config};

pub fn handle(
    designs: &Path,
    out: &Path,
    task: BatchTask,
    threads: usize,
    overrides: &SharedInputOverrides,
    sampling: &SamplingArgs,
) -> Result<()> {
    let start = Instant::now();
    let task = match task {
        BatchTask::Estimate => TaskKind::Estimate,
        BatchTask::Sample => TaskKind::Sample,
    };
    let mut inputs_used = (None, None);
    let mut summary = None;
    let res = (|| -> Result<()> {
        let set = load_set_from_path(designs)?;
        let base_dir = designs.parent().unwrap_or_else(|| Path::new("."));
        let shared = set.shared_inputs(base_dir);
        let chart = pick(&overrides.chart, shared.chart_file, "chart")?;
        let index = pick(&overrides.index, shared.index_file, "inflation index")?;
        let economics = overrides.economics.clone().or(shared.economics_file);
        let laws = overrides.laws.clone().or(shared.laws_file);
        inputs_used = (Some(chart.clone()), economics.clone());

        let resolved = resolve_designs(&set, base_dir)?;
        let inputs =
            BatchInputs::from_files(&chart, &index, economics.as_deref(), laws.as_deref())?;
        let config = BatchRunnerConfig {
            jobs: jobs_from_designs(&resolved, task),
            output_root: out.to_path_buf(),
            task,
            sampling: sampling_config(sampling)?,
            threads,
        };
        let batch_summary = run_batch(&config, &inputs)?;
        println!(
            "batch {} {} -> {}/{} ok/fail",
            task.as_str(),
            batch_summary.jobs.len(),
            batch_summary.success,
            batch_summary.failure
        );
        print_summary(&batch_summary)?;
        summary = Some(batch_summary);
        Ok(())
    })();

    let designs_path = designs.display().to_string();
    let chart = display_opt(inputs_used.0.as_deref());
    let economics = display_opt(inputs_used.1.as_deref());
    let thread_text = threads.to_string();
    let mut params = vec![
        ("designs", designs_path.as_str()),
        ("task", task.as_str()),
        ("chart", chart.as_str()),
        ("economics", economics.as_str()),
        ("threads", thread_text.as_str()),
    ];
    let counts = summary
        .as_ref()
        .map(|s| (s.jobs.len().to_string(), s.success.to_string(), s.failure.to_string()));
    if let Some((jobs, success, failure)) = counts.as_ref() {
        params.push(("num_jobs", jobs.as_str()));
        params.push(("success", success.as_str()));
        params.push(("failure", failure.as_str()));
    }
    if out.is_dir() {
        record_run_timed(out, "batch", &params, start, &res);
    }
    res
}

fn pick(flag: &Option<PathBuf>, from_set: Option<PathBuf>, what: &str) -> Result<PathBuf> {
    flag.clone().or(from_set).ok_or_else(|| {
        anyhow!(
            "no {} table: name it in the design set or pass it on the command line",
            what
        )
    })
}

fn print_summary(summary: &BatchSummary) -> Result<()> {
    let lcoe = |value: Option<f64>| {
        value
            .map(|v| custom_round(v).to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "DESIGN\tSTATUS\tLCOE FOAK\tLCOE NOAK\tOUTPUT")?;
    for job in &summary.jobs {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            job.design_id,
            job.status,
            lcoe(job.lcoe_foak),
            lcoe(job.lcoe_noak),
            job.output
        )?;
    }
    writer.flush()?;
    for job in summary.jobs.iter().filter(|job| !job.is_ok()) {
        if let Some(error) = &job.error {
            eprintln!("{}: {}", job.design_id, error);
        }
    }
    println!("Batch manifest: {}", summary.manifest_path.display());
    Ok(())
}

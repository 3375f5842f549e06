use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use mrc_algo::{SamplingConfig, SamplingDistribution};
use mrc_cli::cli::{InputArgs, OutputArgs, SamplingArgs};
use mrc_cli::manifest::record_manifest;
use mrc_core::{custom_round, AccountRow, CostReport, DesignParameters, InflationIndex, LawRegistry};
use tabwriter::TabWriter;
use tracing::{info, warn};

/// Everything one design's estimate reads, economics already merged.
pub struct LoadedInputs {
    pub chart: Vec<AccountRow>,
    pub index: InflationIndex,
    pub params: DesignParameters,
    pub laws: LawRegistry,
    pub design_id: String,
}

pub fn load_inputs(inputs: &InputArgs) -> Result<LoadedInputs> {
    let chart = mrc_io::read_chart_of_accounts(&inputs.chart)?;
    let index = mrc_io::read_inflation_index(&inputs.index)?;
    let design = mrc_io::load_design_parameters(&inputs.params)?;
    let params = match &inputs.economics {
        Some(path) => mrc_io::merge_economics(&design, &mrc_io::read_economics(path)?),
        None => design,
    };
    let laws = match &inputs.laws {
        Some(path) => mrc_io::load_law_registry(path)?,
        None => LawRegistry::default(),
    };
    info!(
        rows = chart.len(),
        parameters = params.len(),
        laws = laws.len(),
        "loaded estimate inputs"
    );
    Ok(LoadedInputs {
        chart,
        index,
        params,
        laws,
        design_id: design_id(&inputs.params),
    })
}

fn design_id(params: &Path) -> String {
    params
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "design".to_string())
}

pub fn sampling_config(args: &SamplingArgs) -> Result<SamplingConfig> {
    Ok(SamplingConfig {
        samples: args.samples,
        distribution: args.distribution.parse::<SamplingDistribution>()?,
        seed: args.seed,
    })
}

/// Log every diagnostic collected while the design was evaluated.
pub fn log_diagnostics(report: &CostReport) {
    for issue in &report.diagnostics.issues {
        match issue.severity {
            mrc_core::Severity::Warning => warn!("{}", issue),
            mrc_core::Severity::Info => info!("{}", issue),
        }
    }
}

pub fn display_opt(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_nan() => "NaN".to_string(),
        Some(v) => custom_round(v).to_string(),
        None => "-".to_string(),
    }
}

pub fn print_report(report: &CostReport, all: bool) -> Result<()> {
    let sampled = report.samples.is_some();
    let mut writer = TabWriter::new(io::stdout());
    if sampled {
        writeln!(writer, "ACCOUNT\tTITLE\tFOAK\tFOAK STD\tNOAK\tNOAK STD")?;
    } else {
        writeln!(writer, "ACCOUNT\tTITLE\tFOAK\tNOAK")?;
    }
    for row in report.rows.iter().filter(|row| all || row.is_summary()) {
        if sampled {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                row.account,
                row.title,
                cell(row.foak),
                cell(row.foak_std),
                cell(row.noak),
                cell(row.noak_std),
            )?;
        } else {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                row.account,
                row.title,
                cell(row.foak),
                cell(row.noak),
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write the requested report files and return their paths.
pub fn write_outputs(report: &CostReport, output: &OutputArgs) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if let Some(out) = &output.out {
        let is_json = out
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            mrc_io::write_report_json(report, out)?;
        } else {
            mrc_io::write_report_csv(report, out)?;
        }
        println!("Wrote cost table to {}", out.display());
        written.push(out.clone());
    }
    if let Some(path) = &output.dictionary {
        mrc_io::write_cost_dictionary(report, &output.track, path)
            .with_context(|| format!("writing cost dictionary '{}'", path.display()))?;
        println!("Wrote cost dictionary to {}", path.display());
        written.push(path.clone());
    }
    Ok(written)
}

/// Record a run manifest next to `out`; failure to record never fails the command.
pub fn record_run_timed(
    out: &Path,
    command: &str,
    params: &[(&str, &str)],
    start: Instant,
    result: &Result<()>,
) {
    let status = if result.is_ok() { "success" } else { "failure" };
    let duration_ms = Some(start.elapsed().as_millis());
    match record_manifest(out, command, params, status, duration_ms) {
        Ok(path) => println!("Recorded run manifest {}", path.display()),
        Err(err) => eprintln!("Failed to record run manifest: {err}"),
    }
}

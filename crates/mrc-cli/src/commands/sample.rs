use std::time::Instant;

use anyhow::Result;
use mrc_algo::{sample_estimate, CostEngine};
use mrc_cli::cli::{InputArgs, OutputArgs, SamplingArgs};
use tracing::info;

use crate::commands::util::{
    display_opt, load_inputs, log_diagnostics, print_report, record_run_timed, sampling_config,
    write_outputs,
};

pub fn handle(inputs: &InputArgs, output: &OutputArgs, sampling: &SamplingArgs) -> Result<()> {
    let start = Instant::now();
    let mut written = Vec::new();
    let res = (|| -> Result<()> {
        let config = sampling_config(sampling)?;
        let loaded = load_inputs(inputs)?;
        let engine = CostEngine::new(&loaded.index, &loaded.laws);
        let prepared = engine.prepare(&loaded.chart, &loaded.params)?;
        info!(
            samples = config.samples,
            distribution = %config.distribution,
            seed = config.seed,
            "sampling cost uncertainty"
        );
        let report = sample_estimate(&engine, &prepared, &config)?
            .into_report(loaded.params.clone(), Some(loaded.design_id.clone()));
        log_diagnostics(&report);
        print_report(&report, output.all)?;
        written = write_outputs(&report, output)?;
        Ok(())
    })();
    if let Some(out) = written.first() {
        let chart = inputs.chart.display().to_string();
        let params = inputs.params.display().to_string();
        let economics = display_opt(inputs.economics.as_deref());
        let samples = sampling.samples.to_string();
        let seed = sampling.seed.to_string();
        record_run_timed(
            out,
            "sample",
            &[
                ("chart", chart.as_str()),
                ("params", params.as_str()),
                ("economics", economics.as_str()),
                ("samples", samples.as_str()),
                ("distribution", sampling.distribution.as_str()),
                ("seed", seed.as_str()),
            ],
            start,
            &res,
        );
    }
    res
}

use std::time::Instant;

use anyhow::Result;
use mrc_algo::CostEngine;
use mrc_cli::cli::{InputArgs, OutputArgs};

use crate::commands::util::{
    display_opt, load_inputs, log_diagnostics, print_report, record_run_timed, write_outputs,
};

pub fn handle(inputs: &InputArgs, output: &OutputArgs) -> Result<()> {
    let start = Instant::now();
    let mut written = Vec::new();
    let res = (|| -> Result<()> {
        let loaded = load_inputs(inputs)?;
        let engine = CostEngine::new(&loaded.index, &loaded.laws);
        let report = engine
            .estimate(&loaded.chart, &loaded.params)?
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
        let laws = display_opt(inputs.laws.as_deref());
        let track = output.track.join(",");
        record_run_timed(
            out,
            "estimate",
            &[
                ("chart", chart.as_str()),
                ("params", params.as_str()),
                ("economics", economics.as_str()),
                ("laws", laws.as_str()),
                ("track", track.as_str()),
            ],
            start,
            &res,
        );
    }
    res
}

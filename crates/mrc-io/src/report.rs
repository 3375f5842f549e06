//! Report exporters.
//!
//! The CSV layout mirrors the chart of accounts: one row per account, then
//! the synthetic summary rows. Standard-deviation columns are only written
//! for sampled reports.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use mrc_core::{CostReport, ReportRow};

const HEADER: [&str; 5] = [
    "Account",
    "Level",
    "Account Title",
    "FOAK Estimated Cost",
    "NOAK Estimated Cost",
];

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_nan() => "NaN".to_string(),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn record(row: &ReportRow, sampled: bool) -> Vec<String> {
    let mut fields = vec![
        row.account.clone(),
        row.level.map(|l| l.to_string()).unwrap_or_default(),
        row.title.clone(),
        cell(row.foak),
        cell(row.noak),
    ];
    if sampled {
        fields.push(cell(row.foak_std));
        fields.push(cell(row.noak_std));
    }
    fields
}

/// Write the report table as CSV to any writer.
pub fn write_report_csv_to<W: Write>(report: &CostReport, writer: W) -> Result<()> {
    let sampled = report.samples.is_some();
    let mut wtr = Writer::from_writer(writer);
    let mut header: Vec<&str> = HEADER.to_vec();
    if sampled {
        header.push("FOAK Estimated Cost std");
        header.push("NOAK Estimated Cost std");
    }
    wtr.write_record(&header).context("writing CSV header")?;
    for row in &report.rows {
        wtr.write_record(record(row, sampled))
            .with_context(|| format!("writing CSV record for account {}", row.account))?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

pub fn write_report_csv(report: &CostReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating CSV report {}", path.display()))?;
    write_report_csv_to(report, file)
}

/// Write the full report (rows, summary, parameters, diagnostics) as JSON.
pub fn write_report_json(report: &CostReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing cost report to JSON")?;
    std::fs::write(path, json).with_context(|| format!("writing JSON to {}", path.display()))?;
    Ok(())
}

/// Write the flat cost dictionary, led by the tracked design parameters.
pub fn write_cost_dictionary(report: &CostReport, tracked: &[String], path: &Path) -> Result<()> {
    let dict = report.cost_dictionary(tracked);
    let json = serde_json::to_string_pretty(&dict).context("serializing cost dictionary")?;
    std::fs::write(path, json).with_context(|| format!("writing JSON to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrc_core::{ColumnPair, DesignParameters, Diagnostics, SummaryFigures};

    fn report(samples: Option<usize>) -> CostReport {
        let std = samples.map(|_| 12.5);
        CostReport {
            design_id: Some("ltmr".into()),
            escalation_year: 2023,
            samples,
            rows: vec![
                ReportRow {
                    account: "10".into(),
                    level: Some(0),
                    title: "Capitalized Pre-Construction Costs".into(),
                    foak: Some(1_005_000.0),
                    noak: Some(f64::NAN),
                    foak_std: std,
                    noak_std: std,
                },
                ReportRow {
                    account: "LCOE".into(),
                    level: None,
                    title: "Levelized Cost Of Energy ($/MWh)".into(),
                    foak: Some(250.0),
                    noak: Some(120.0),
                    foak_std: std,
                    noak_std: std,
                },
            ],
            summary: ColumnPair::new(SummaryFigures::default(), SummaryFigures::default()),
            summary_std: None,
            parameters: DesignParameters::new().with("Power MWe", 10.0),
            diagnostics: Diagnostics::new(),
        }
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        write_report_csv_to(&report(None), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Account,Level,Account Title,FOAK Estimated Cost,NOAK Estimated Cost"
        );
        assert_eq!(lines[1], "10,0,Capitalized Pre-Construction Costs,1005000,NaN");
        assert!(lines[2].starts_with("LCOE,,"));
    }

    #[test]
    fn test_csv_std_columns_when_sampled() {
        let mut out = Vec::new();
        write_report_csv_to(&report(Some(50)), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().next().unwrap().ends_with("NOAK Estimated Cost std"));
        assert!(text.lines().nth(1).unwrap().ends_with("12.5,12.5"));
    }

    #[test]
    fn test_json_and_dictionary_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&report(None), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["design_id"], "ltmr");
        assert_eq!(value["rows"][0]["account"], "10");

        let dict_path = dir.path().join("dict.json");
        write_cost_dictionary(&report(None), &["Power MWe".to_string()], &dict_path).unwrap();
        let dict: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&dict_path).unwrap()).unwrap();
        assert_eq!(dict["Power MWe"], 10.0);
        assert!(dict.get("LCOE_FOAK").is_some());
    }
}

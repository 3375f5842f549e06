//! Inflation index CSV reader.
//!
//! **Expected CSV format:** a `Year` column followed by one column per cost
//! index. Empty cells are allowed and only fail when looked up.

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, Trim};
use mrc_core::InflationIndex;
use tracing::info;

pub fn parse_inflation_index<R: Read>(reader: R) -> Result<InflationIndex> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().context("reading inflation index header")?.clone();
    let year_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("year"))
        .ok_or_else(|| anyhow!("inflation index has no 'Year' column"))?;
    let columns: Vec<usize> = (0..headers.len()).filter(|&i| i != year_col).collect();
    let mut index = InflationIndex::new(columns.iter().map(|&i| headers[i].to_string()).collect());

    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("parsing inflation index record {}", line + 1))?;
        let year: f64 = record[year_col]
            .parse()
            .with_context(|| format!("inflation index record {}: bad year '{}'", line + 1, &record[year_col]))?;
        let values = columns
            .iter()
            .map(|&i| {
                let raw = record.get(i).unwrap_or("").trim();
                if raw.is_empty() || raw.eq_ignore_ascii_case("na") {
                    Ok(None)
                } else {
                    raw.parse::<f64>().map(Some).map_err(|_| {
                        anyhow!("year {}: '{}' is not a number in column '{}'", year, raw, &headers[i])
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        index.insert_year(year.round() as i32, values)?;
    }
    Ok(index)
}

pub fn read_inflation_index(path: impl AsRef<Path>) -> Result<InflationIndex> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening inflation index '{}'", path.display()))?;
    let index = parse_inflation_index(file)
        .with_context(|| format!("reading inflation index '{}'", path.display()))?;
    info!(
        years = index.years().count(),
        columns = index.columns().len(),
        "loaded inflation index"
    );
    Ok(index)
}

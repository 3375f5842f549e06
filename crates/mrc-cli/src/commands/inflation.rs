use std::path::Path;

use anyhow::Result;
use mrc_algo::inflation_multiplier;
use mrc_core::CostIndexType;

pub fn handle(index: &Path, column: &str, from: i32, to: i32) -> Result<()> {
    let table = mrc_io::read_inflation_index(index)?;
    let kind = CostIndexType::parse(column);
    let factor = inflation_multiplier(&table, from, &kind, to)?;
    println!("{} {} -> {}: {:.6}", column, from, to, factor);
    Ok(())
}

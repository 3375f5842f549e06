use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use mrc_core::LawRegistry;
use tabwriter::TabWriter;

pub fn handle(path: Option<&Path>) -> Result<()> {
    let registry = match path {
        Some(path) => mrc_io::load_law_registry(path)?,
        None => LawRegistry::default(),
    };
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "ACCOUNT\tLAW")?;
    for (account, law) in registry.to_table() {
        writeln!(writer, "{}\t{}", account, law)?;
    }
    writer.flush()?;
    Ok(())
}

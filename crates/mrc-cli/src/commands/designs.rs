use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use mrc_cli::cli::{DesignsCommands, ListFormat};
use mrc_designs::{
    artifacts_from_designs, load_set_from_path, resolve_designs, validate, write_manifest,
    DesignArtifact,
};
use tabwriter::TabWriter;

pub fn handle(command: &DesignsCommands) -> Result<()> {
    match command {
        DesignsCommands::Validate { set } => {
            let design_set = load_set_from_path(set)?;
            validate(&design_set, base_dir(set))?;
            println!(
                "Design set {} is valid ({} designs)",
                set.display(),
                design_set.designs.len()
            );
            Ok(())
        }
        DesignsCommands::List {
            set,
            format,
            manifest,
        } => {
            let design_set = load_set_from_path(set)?;
            let resolved = resolve_designs(&design_set, base_dir(set))?;
            let artifacts = artifacts_from_designs(&resolved);
            match format {
                ListFormat::Plain => print_table(&artifacts)?,
                ListFormat::Json => {
                    serde_json::to_writer_pretty(io::stdout(), &artifacts)
                        .map_err(|err| anyhow::anyhow!("serializing design list to JSON: {err}"))?;
                    println!();
                }
            }
            if let Some(path) = manifest {
                write_manifest(path, &artifacts)?;
                println!("Wrote design manifest to {}", path.display());
            }
            Ok(())
        }
    }
}

fn base_dir(set: &Path) -> &Path {
    set.parent().unwrap_or_else(|| Path::new("."))
}

fn print_table(artifacts: &[DesignArtifact]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "DESIGN ID\tREACTOR TYPE\tPARAMETERS\tTAGS\tPARAMS FILE")?;
    for artifact in artifacts {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            artifact.design_id,
            artifact.reactor_type.as_deref().unwrap_or("-"),
            artifact.parameter_count,
            artifact.tags.join(","),
            artifact.params_file,
        )?;
    }
    writer.flush()?;
    Ok(())
}

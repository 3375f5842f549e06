use clap::Parser;
use mrc_cli::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

use crate::commands::{batch, designs, estimate, inflation, laws, sample};

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let result = match &cli.command {
        Commands::Estimate { inputs, output } => estimate::handle(inputs, output),
        Commands::Sample {
            inputs,
            output,
            sampling,
        } => sample::handle(inputs, output, sampling),
        Commands::Batch {
            designs,
            out,
            task,
            threads,
            overrides,
            sampling,
        } => batch::handle(designs, out, *task, *threads, overrides, sampling),
        Commands::Designs { command } => designs::handle(command),
        Commands::Inflation {
            index,
            column,
            from,
            to,
        } => inflation::handle(index, column, *from, *to),
        Commands::Laws { laws: path } => laws::handle(path.as_deref()),
    };

    if let Err(err) = result {
        error!("{} failed: {:#}", command_name(&cli.command), err);
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Estimate { .. } => "estimate",
        Commands::Sample { .. } => "sample",
        Commands::Batch { .. } => "batch",
        Commands::Designs { .. } => "designs",
        Commands::Inflation { .. } => "inflation",
        Commands::Laws { .. } => "laws",
    }
}

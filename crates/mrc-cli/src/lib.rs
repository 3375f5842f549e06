pub mod cli;
pub mod manifest;

pub use cli::{
    build_cli_command, BatchTask, Cli, Commands, DesignsCommands, InputArgs, ListFormat,
    OutputArgs, SamplingArgs, SharedInputOverrides,
};

use clap::{Parser, Subcommand};

use crate::cmd::{process::ProcessCommand, report::ReportCommand, schema::SchemaCommand};

mod cmd;
mod core;
mod tax;

#[derive(Parser, Debug)]
#[command(
    name = "capgains",
    version,
    about = "Calculate capital gains tax on stock buy/sell operations"
)]
struct Opts {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read operations line by line and print the tax owed on each (default)
    Process(ProcessCommand),
    /// Show every operation with its outcome and the running position
    Report(ReportCommand),
    /// Print the expected input and output formats
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    match opts.command {
        Some(Command::Process(cmd)) => cmd.exec(),
        Some(Command::Report(cmd)) => cmd.exec(),
        Some(Command::Schema(cmd)) => cmd.exec(),
        None => ProcessCommand::default().exec(),
    }
}

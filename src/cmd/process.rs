//! Process command - one line of taxes out for every line of operations in the input

use crate::cmd::{for_each_line, open_input, OversellArg};
use crate::core::TaxRecord;
use crate::tax::{CalculatorOptions, TaxCalculator};
use anyhow::Context;
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ProcessCommand {
    /// File with one JSON array of operations per line. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// What to do when a sale exceeds the shares held
    #[arg(long, value_enum, default_value_t = OversellArg::Allow)]
    oversell: OversellArg,
}

impl Default for ProcessCommand {
    fn default() -> Self {
        ProcessCommand {
            file: PathBuf::from("-"),
            oversell: OversellArg::default(),
        }
    }
}

impl ProcessCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let options: CalculatorOptions = self.oversell.into();
        let input = open_input(&self.file)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();

        for_each_line(input, |line, operations| {
            // every line is an independent portfolio
            let mut calculator = TaxCalculator::with_options(options);
            let results = calculator
                .process(&operations)
                .with_context(|| format!("line {}", line))?;
            let records: Vec<TaxRecord> = results.iter().map(TaxRecord::from).collect();
            serde_json::to_writer(&mut out, &records)?;
            writeln!(out)?;
            out.flush()?;
            Ok(())
        })
    }
}

pub mod process;
pub mod report;
pub mod schema;

use crate::core::{parse_operations, Operation};
use crate::tax::{CalculatorOptions, OversellPolicy};
use anyhow::Context;
use clap::ValueEnum;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OversellArg {
    /// Let the share count go negative and log a warning
    #[default]
    Allow,
    /// Fail the line when a sale exceeds the shares held
    Reject,
}

impl From<OversellArg> for CalculatorOptions {
    fn from(arg: OversellArg) -> Self {
        let oversell = match arg {
            OversellArg::Allow => OversellPolicy::Allow,
            OversellArg::Reject => OversellPolicy::Reject,
        };
        CalculatorOptions { oversell }
    }
}

/// Open the operations input (or stdin with "-")
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(BufReader::new(io::stdin().lock())))
    } else {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Decode each input line into operations and hand them to `f` with the
/// 1-based line number. Stops at the first empty line or end of input.
pub fn for_each_line<R, F>(input: R, mut f: F) -> anyhow::Result<()>
where
    R: BufRead,
    F: FnMut(usize, Vec<Operation>) -> anyhow::Result<()>,
{
    for (i, line) in input.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_no))?;
        let line = line.trim();
        if line.is_empty() {
            log::debug!("Empty line {}, stopping", line_no);
            break;
        }
        let operations = parse_operations(line).with_context(|| format!("line {}", line_no))?;
        log::debug!("Line {}: {} operations", line_no, operations.len());
        f(line_no, operations)?;
    }
    Ok(())
}

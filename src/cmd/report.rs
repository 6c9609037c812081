//! Report command - step by step ledger of every operation

use crate::cmd::{for_each_line, open_input, OversellArg};
use crate::tax::ledger::{self, Ledger, LedgerEntry};
use crate::tax::{CalculatorOptions, PositionState, TaxCalculator};
use anyhow::Context;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReportCommand {
    /// File with one JSON array of operations per line. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// What to do when a sale exceeds the shares held
    #[arg(long, value_enum, default_value_t = OversellArg::Allow)]
    oversell: OversellArg,

    /// Output as JSON instead of formatted tables
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output as CSV instead of formatted tables
    #[arg(long)]
    csv: bool,
}

/// Ledger of one input line and the position left at its end
#[derive(Debug)]
struct LineLedger {
    line: usize,
    ledger: Ledger,
    position: PositionState,
}

#[derive(Debug, Serialize)]
struct LineReport {
    line: usize,
    total_tax: Decimal,
    final_position: PositionState,
    entries: Vec<LedgerEntry>,
}

#[derive(Debug, Serialize)]
struct ReportOutput {
    lines: Vec<LineReport>,
    total_tax: Decimal,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let options: CalculatorOptions = self.oversell.into();
        let input = open_input(&self.file)?;

        let mut ledgers: Vec<LineLedger> = Vec::new();
        for_each_line(input, |line, operations| {
            let mut calculator = TaxCalculator::with_options(options);
            let ledger = calculator
                .process_with_ledger(&operations)
                .with_context(|| format!("line {}", line))?;
            ledgers.push(LineLedger {
                line,
                ledger,
                position: calculator.state().clone(),
            });
            Ok(())
        })?;

        if self.json {
            self.print_json(ledgers)
        } else if self.csv {
            ledger::write_csv(ledgers.iter().map(|l| (l.line, &l.ledger)), io::stdout())
        } else {
            self.print_tables(&ledgers);
            Ok(())
        }
    }

    fn print_tables(&self, ledgers: &[LineLedger]) {
        if ledgers.is_empty() {
            println!("No operations found");
            return;
        }

        for LineLedger {
            line,
            ledger,
            position,
        } in ledgers
        {
            println!();
            println!("LINE {}", line);
            println!();

            if ledger.entries.is_empty() {
                println!("  (no operations)");
                continue;
            }

            let rows: Vec<LedgerRow> = ledger.entries.iter().map(LedgerRow::from).collect();
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
            println!(
                "Taxed sales: {}  Total tax: {}",
                ledger.taxed_count(),
                format_amount(ledger.total_tax())
            );
            println!(
                "Final position: {} shares at {}, carried loss {}",
                position.total_shares,
                format_amount(position.weighted_average_cost),
                format_amount(position.accumulated_loss)
            );
        }

        let grand_total: Decimal = ledgers.iter().map(|l| l.ledger.total_tax()).sum();
        println!();
        println!("TOTAL TAX: {}", format_amount(grand_total));
    }

    fn print_json(&self, ledgers: Vec<LineLedger>) -> anyhow::Result<()> {
        let lines: Vec<LineReport> = ledgers
            .into_iter()
            .map(|l| LineReport {
                line: l.line,
                total_tax: l.ledger.total_tax(),
                final_position: l.position,
                entries: l.ledger.entries,
            })
            .collect();
        let output = ReportOutput {
            total_tax: lines.iter().map(|l| l.total_tax).sum(),
            lines,
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

#[derive(Debug, Clone, Tabled)]
struct LedgerRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Unit Cost")]
    unit_cost: String,
    #[tabled(rename = "Quantity")]
    quantity: u64,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Tax")]
    tax: String,
    #[tabled(rename = "Shares")]
    total_shares: i64,
    #[tabled(rename = "Avg Cost")]
    weighted_average_cost: String,
    #[tabled(rename = "Carried Loss")]
    accumulated_loss: String,
}

impl From<&LedgerEntry> for LedgerRow {
    fn from(e: &LedgerEntry) -> Self {
        LedgerRow {
            index: e.index + 1,
            operation: e.kind.display().to_string(),
            unit_cost: format_amount(e.unit_cost),
            quantity: e.quantity,
            outcome: e.outcome.display().to_string(),
            tax: format_amount(e.tax),
            total_shares: e.total_shares,
            weighted_average_cost: format_amount(e.weighted_average_cost),
            accumulated_loss: format_amount(e.accumulated_loss),
        }
    }
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

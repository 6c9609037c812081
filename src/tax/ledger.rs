use super::calculator::{Assessment, PositionState, SaleOutcome};
use crate::core::{Operation, OperationKind};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// An operation together with its tax and the position right after it
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub index: usize,
    pub kind: OperationKind,
    pub unit_cost: Decimal,
    pub quantity: u64,
    pub total_value: Decimal,
    pub outcome: SaleOutcome,
    pub tax: Decimal,
    pub total_shares: i64,
    pub weighted_average_cost: Decimal,
    pub accumulated_loss: Decimal,
}

impl LedgerEntry {
    pub fn new(
        index: usize,
        op: &Operation,
        assessment: Assessment,
        state: &PositionState,
    ) -> Self {
        LedgerEntry {
            index,
            kind: op.kind,
            unit_cost: op.unit_cost,
            quantity: op.quantity,
            total_value: assessment.total_value,
            outcome: assessment.outcome,
            tax: assessment.tax,
            total_shares: state.total_shares,
            weighted_average_cost: state.weighted_average_cost,
            accumulated_loss: state.accumulated_loss,
        }
    }
}

/// Step by step record of one processed sequence
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    pub entries: Vec<LedgerEntry>,
}

impl Ledger {
    #[cfg(test)]
    pub fn taxes(&self) -> Vec<crate::core::TaxResult> {
        self.entries
            .iter()
            .map(|e| crate::core::TaxResult::new(e.tax))
            .collect()
    }

    pub fn total_tax(&self) -> Decimal {
        self.entries.iter().map(|e| e.tax).sum()
    }

    /// Count of sales that ended up paying tax
    pub fn taxed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == SaleOutcome::Taxed)
            .count()
    }
}

/// CSV record for ledger output
#[derive(Debug, Serialize)]
pub struct LedgerCsvRecord {
    pub line: usize,
    pub index: usize,
    pub operation: String,
    pub unit_cost: String,
    pub quantity: u64,
    pub total_value: String,
    pub outcome: String,
    pub tax: String,
    pub total_shares: i64,
    pub weighted_average_cost: String,
    pub accumulated_loss: String,
}

impl LedgerCsvRecord {
    fn new(line: usize, e: &LedgerEntry) -> Self {
        LedgerCsvRecord {
            line,
            index: e.index,
            operation: e.kind.display().to_string(),
            unit_cost: e.unit_cost.to_string(),
            quantity: e.quantity,
            total_value: e.total_value.round_dp(2).to_string(),
            outcome: e.outcome.display().to_string(),
            tax: e.tax.round_dp(2).to_string(),
            total_shares: e.total_shares,
            weighted_average_cost: e.weighted_average_cost.round_dp(2).to_string(),
            accumulated_loss: e.accumulated_loss.round_dp(2).to_string(),
        }
    }
}

/// Write ledgers to CSV, one row per operation, keyed by input line number
pub fn write_csv<'a, I, W>(ledgers: I, writer: W) -> anyhow::Result<()>
where
    I: IntoIterator<Item = (usize, &'a Ledger)>,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for (line, ledger) in ledgers {
        for entry in &ledger.entries {
            wtr.serialize(LedgerCsvRecord::new(line, entry))?;
        }
    }
    wtr.flush()?;
    Ok(())
}

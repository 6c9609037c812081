use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("invalid operations json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("operation {index}: unit cost must not be negative, got {unit_cost}")]
    NegativeUnitCost { index: usize, unit_cost: Decimal },
}

/// Kind of stock operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Buy,
    Sell,
}

impl OperationKind {
    pub fn display(&self) -> &'static str {
        match self {
            OperationKind::Buy => "Buy",
            OperationKind::Sell => "Sell",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// A single buy or sell of shares, validated and ready for the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub unit_cost: Decimal,
    pub quantity: u64,
}

impl Operation {
    #[cfg(test)]
    pub fn buy(unit_cost: Decimal, quantity: u64) -> Self {
        Operation {
            kind: OperationKind::Buy,
            unit_cost,
            quantity,
        }
    }

    #[cfg(test)]
    pub fn sell(unit_cost: Decimal, quantity: u64) -> Self {
        Operation {
            kind: OperationKind::Sell,
            unit_cost,
            quantity,
        }
    }

    /// Unit cost times quantity, `None` when it does not fit in a `Decimal`
    pub fn total_value(&self) -> Option<Decimal> {
        self.unit_cost.checked_mul(Decimal::from(self.quantity))
    }
}

/// Operation as it appears on the wire, one element of an input line
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OperationRecord {
    /// Either "buy" or "sell"
    pub operation: OperationKind,
    /// Price paid or received per share
    #[serde(rename = "unit-cost")]
    #[schemars(with = "f64")]
    pub unit_cost: Decimal,
    /// Number of shares bought or sold
    pub quantity: u64,
}

impl OperationRecord {
    fn into_operation(self, index: usize) -> Result<Operation, OperationError> {
        if self.unit_cost < Decimal::ZERO {
            return Err(OperationError::NegativeUnitCost {
                index,
                unit_cost: self.unit_cost,
            });
        }
        Ok(Operation {
            kind: self.operation,
            unit_cost: self.unit_cost,
            quantity: self.quantity,
        })
    }
}

/// Decode one input line: a JSON array of operation records
pub fn parse_operations(line: &str) -> Result<Vec<Operation>, OperationError> {
    let records: Vec<OperationRecord> = serde_json::from_str(line)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_operation(index))
        .collect()
}

/// Tax owed on the operation at the same position in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxResult {
    pub tax: Decimal,
}

impl TaxResult {
    pub fn new(tax: Decimal) -> Self {
        TaxResult { tax }
    }
}

/// Tax as written to the output, rounded to cents
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaxRecord {
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub tax: Decimal,
}

impl From<&TaxResult> for TaxRecord {
    fn from(result: &TaxResult) -> Self {
        TaxRecord {
            tax: result
                .tax
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        }
    }
}

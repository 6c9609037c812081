use super::ledger::{Ledger, LedgerEntry};
use super::policy::{self, CalculatorOptions, OversellPolicy};
use crate::core::{Operation, OperationKind, TaxResult};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("cannot sell {requested} shares: only {held} held")]
    InsufficientShares { held: i64, requested: i64 },
    #[error("quantity {0} is too large")]
    QuantityOutOfRange(u64),
    #[error("share count overflow: {held} held, changing by {quantity}")]
    ShareCountOverflow { held: i64, quantity: i64 },
    #[error("amount overflow: {quantity} shares at {unit_cost}")]
    AmountOverflow { quantity: i64, unit_cost: Decimal },
}

/// How a single operation was treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SaleOutcome {
    /// Shares bought, never taxed
    Purchase,
    /// Sold below average cost, loss carried forward
    Loss,
    /// Profitable sale at or below the exemption threshold
    Exempt,
    /// Profit fully absorbed by carried losses
    OffsetByLoss,
    /// Profit left after carried losses is taxed
    Taxed,
}

impl SaleOutcome {
    pub fn display(&self) -> &'static str {
        match self {
            SaleOutcome::Purchase => "Purchase",
            SaleOutcome::Loss => "Loss",
            SaleOutcome::Exempt => "Exempt",
            SaleOutcome::OffsetByLoss => "Offset",
            SaleOutcome::Taxed => "Taxed",
        }
    }
}

impl std::fmt::Display for SaleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Tax and treatment of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub tax: Decimal,
    pub outcome: SaleOutcome,
    /// Unit cost times quantity
    pub total_value: Decimal,
}

impl Assessment {
    fn untaxed(outcome: SaleOutcome, total_value: Decimal) -> Self {
        Assessment {
            tax: Decimal::ZERO,
            outcome,
            total_value,
        }
    }
}

impl From<Assessment> for TaxResult {
    fn from(assessment: Assessment) -> Self {
        TaxResult::new(assessment.tax)
    }
}

/// Running position of a single portfolio
///
/// `weighted_average_cost` only means something while `total_shares > 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionState {
    pub total_shares: i64,
    pub weighted_average_cost: Decimal,
    pub accumulated_loss: Decimal,
}

/// Stateful tax calculator for one sequence of operations.
///
/// Buys update the weighted average cost, sales are measured against it.
/// Losses are carried forward and offset against later taxable profits.
/// State is only ever reset by building a new calculator.
#[derive(Debug, Clone, Default)]
pub struct TaxCalculator {
    state: PositionState,
    options: CalculatorOptions,
}

impl TaxCalculator {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CalculatorOptions) -> Self {
        TaxCalculator {
            state: PositionState::default(),
            options,
        }
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// Process operations in order, one tax result per operation
    pub fn process(&mut self, operations: &[Operation]) -> Result<Vec<TaxResult>, TaxError> {
        operations
            .iter()
            .map(|op| self.step(op).map(TaxResult::from))
            .collect()
    }

    /// Process operations in order, recording the position after each one
    pub fn process_with_ledger(&mut self, operations: &[Operation]) -> Result<Ledger, TaxError> {
        let mut entries = Vec::with_capacity(operations.len());
        for (index, op) in operations.iter().enumerate() {
            let assessment = self.step(op)?;
            entries.push(LedgerEntry::new(index, op, assessment, &self.state));
        }
        Ok(Ledger { entries })
    }

    pub fn step(&mut self, op: &Operation) -> Result<Assessment, TaxError> {
        let quantity =
            i64::try_from(op.quantity).map_err(|_| TaxError::QuantityOutOfRange(op.quantity))?;
        let total_value = op
            .total_value()
            .ok_or(TaxError::AmountOverflow {
                quantity,
                unit_cost: op.unit_cost,
            })?;
        match op.kind {
            OperationKind::Buy => self.buy(quantity, op.unit_cost, total_value),
            OperationKind::Sell => self.sell(quantity, op.unit_cost, total_value),
        }
    }

    fn buy(
        &mut self,
        quantity: i64,
        unit_cost: Decimal,
        total_value: Decimal,
    ) -> Result<Assessment, TaxError> {
        let overflow = TaxError::AmountOverflow {
            quantity,
            unit_cost,
        };
        let held = self.state.total_shares;
        let total_shares = held
            .checked_add(quantity)
            .ok_or(TaxError::ShareCountOverflow { held, quantity })?;

        // nothing held afterwards: the average is meaningless, leave it
        if total_shares > 0 {
            self.state.weighted_average_cost = Decimal::from(held)
                .checked_mul(self.state.weighted_average_cost)
                .and_then(|current_cost| current_cost.checked_add(total_value))
                .and_then(|cost| cost.checked_div(Decimal::from(total_shares)))
                .ok_or(overflow)?;
        }
        self.state.total_shares = total_shares;

        log::debug!(
            "BUY: qty={}, unit_cost={}. Position: shares={}, avg_cost={}",
            quantity,
            unit_cost,
            self.state.total_shares,
            self.state.weighted_average_cost
        );
        Ok(Assessment::untaxed(SaleOutcome::Purchase, total_value))
    }

    fn sell(
        &mut self,
        quantity: i64,
        unit_cost: Decimal,
        total_value: Decimal,
    ) -> Result<Assessment, TaxError> {
        let overflow = TaxError::AmountOverflow {
            quantity,
            unit_cost,
        };
        let held = self.state.total_shares;
        if quantity > held {
            match self.options.oversell {
                OversellPolicy::Reject => {
                    return Err(TaxError::InsufficientShares {
                        held,
                        requested: quantity,
                    })
                }
                OversellPolicy::Allow => log::warn!(
                    "SELL of {} shares exceeds the {} held, position goes negative",
                    quantity,
                    held
                ),
            }
        }
        let total_shares = held
            .checked_sub(quantity)
            .ok_or(TaxError::ShareCountOverflow {
                held,
                quantity: -quantity,
            })?;

        let profit_or_loss = unit_cost
            .checked_sub(self.state.weighted_average_cost)
            .and_then(|margin| margin.checked_mul(Decimal::from(quantity)))
            .ok_or_else(|| overflow.clone())?;
        // position is only touched once every amount is known to fit
        let assessment = if profit_or_loss < Decimal::ZERO {
            self.record_loss(profit_or_loss.abs(), total_value)
                .ok_or(overflow)?
        } else {
            self.assess_profit(profit_or_loss, total_value)
        };
        self.state.total_shares = total_shares;

        log::debug!(
            "SELL: qty={}, unit_cost={}, result={}, outcome={}, tax={}. Position: shares={}, loss={}",
            quantity,
            unit_cost,
            profit_or_loss,
            assessment.outcome,
            assessment.tax,
            self.state.total_shares,
            self.state.accumulated_loss
        );
        Ok(assessment)
    }

    /// Losses are always carried forward, exempt sale or not
    fn record_loss(&mut self, loss: Decimal, total_value: Decimal) -> Option<Assessment> {
        self.state.accumulated_loss = self.state.accumulated_loss.checked_add(loss)?;
        Some(Assessment::untaxed(SaleOutcome::Loss, total_value))
    }

    fn assess_profit(&mut self, profit: Decimal, total_value: Decimal) -> Assessment {
        // exempt profits neither use nor add to the carried loss
        if policy::is_exempt(total_value) {
            return Assessment::untaxed(SaleOutcome::Exempt, total_value);
        }

        let taxable_profit = profit - self.state.accumulated_loss;
        if taxable_profit <= Decimal::ZERO {
            self.state.accumulated_loss -= profit;
            return Assessment::untaxed(SaleOutcome::OffsetByLoss, total_value);
        }

        self.state.accumulated_loss = Decimal::ZERO;
        Assessment {
            tax: policy::tax_due(taxable_profit),
            outcome: SaleOutcome::Taxed,
            total_value,
        }
    }
}

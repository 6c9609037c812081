use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Sales whose total value is at or below this amount pay no tax.
pub const EXEMPTION_THRESHOLD: Decimal = dec!(20000.00);

/// Rate applied to taxable profit (20%)
pub const TAX_RATE: Decimal = dec!(0.20);

/// What to do with a sale of more shares than are currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversellPolicy {
    /// Let the share count go negative and keep calculating
    #[default]
    Allow,
    /// Fail the sale, leaving the position untouched
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalculatorOptions {
    pub oversell: OversellPolicy,
}

/// True when a sale of this total value is exempt from tax
pub fn is_exempt(total_value: Decimal) -> bool {
    total_value <= EXEMPTION_THRESHOLD
}

pub fn tax_due(taxable_profit: Decimal) -> Decimal {
    taxable_profit * TAX_RATE
}

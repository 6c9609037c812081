pub mod operation;

// Flat public surface for domain types and functions.
pub use operation::{
    parse_operations, Operation, OperationKind, OperationRecord, TaxRecord, TaxResult,
};

//! Schema command - print the expected input and output line formats

use crate::core::{OperationRecord, TaxRecord};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which line format to describe
    #[arg(value_enum, default_value = "input")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for an input line (array of operations)
    Input,
    /// JSON Schema for an output line (array of taxes)
    Output,
    /// Input field descriptions
    Fields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::Input => {
                let schema = schema_for!(Vec<OperationRecord>);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::Output => {
                let schema = schema_for!(Vec<TaxRecord>);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::Fields => self.print_fields(),
        }
        Ok(())
    }

    fn print_fields(&self) {
        println!("Input Line Format");
        println!("=================");
        println!();
        println!("One JSON array of operations per line. An empty line ends the input.");
        println!();
        for (name, description) in INPUT_FIELD_DESCRIPTIONS {
            println!("{:12}  {}", name, description);
        }
        println!();
        println!("Output: one JSON array per input line, [{{\"tax\": <amount>}}, ...]");
    }
}

const INPUT_FIELD_DESCRIPTIONS: &[(&str, &str)] = &[
    ("operation", "\"buy\" or \"sell\""),
    ("unit-cost", "Price per share, decimal number (e.g. 10.00)"),
    ("quantity", "Number of shares, non-negative integer"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_schema_uses_wire_names() {
        let schema = serde_json::to_string(&schema_for!(Vec<OperationRecord>)).unwrap();

        assert!(schema.contains("unit-cost"));
        assert!(schema.contains("\"buy\""));
        assert!(schema.contains("\"sell\""));
    }

    #[test]
    fn output_schema_has_tax() {
        let schema = serde_json::to_string(&schema_for!(Vec<TaxRecord>)).unwrap();

        assert!(schema.contains("\"tax\""));
    }
}

//! Calculator Tool
//!
//! Basic two-operand arithmetic. The outcome is computed as a typed
//! `Result` and only turned into text at the tool boundary, where success
//! and failure both go back to the model as plain sentences.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolContext, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::coerce::as_number;

/// Supported operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Self; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    #[allow(clippy::float_cmp)]
    pub fn apply(self, a: f64, b: f64) -> Result<f64, CalcError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Subtract => Ok(a - b),
            Self::Multiply => Ok(a * b),
            Self::Divide if b == 0.0 => Err(CalcError::DivisionByZero),
            Self::Divide => Ok(a / b),
        }
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CalcError::InvalidOperation(wanted.to_string()))
    }
}

/// Calculator failures; `Display` is the text the model receives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error(
        "Error: Invalid operation '{0}'. Valid operations are: add, subtract, multiply, divide."
    )]
    InvalidOperation(String),

    #[error("Error: Cannot divide by zero.")]
    DivisionByZero,

    #[error("Error: Both num1 and num2 must be valid numbers.")]
    InvalidNumber,
}

/// A successful calculation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calculation {
    pub operation: Operation,
    pub num1: f64,
    pub num2: f64,
    pub result: f64,
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The result of {} {:?} and {:?} is {:?}.",
            self.operation.name(),
            self.num1,
            self.num2,
            self.result
        )
    }
}

/// Typed calculator entry point
pub fn calculate(operation: &str, num1: f64, num2: f64) -> Result<Calculation, CalcError> {
    let operation: Operation = operation.parse()?;
    let result = operation.apply(num1, num2)?;
    Ok(Calculation {
        operation,
        num1,
        num2,
        result,
    })
}

/// Text entry point used by the tool. Never fails; errors are sentences too.
///
/// The operation is checked before the operands.
pub fn simple_calculator(operation: &str, num1: &Value, num2: &Value) -> String {
    let outcome = operation.parse::<Operation>().and_then(|_| {
        let (Some(a), Some(b)) = (as_number(num1), as_number(num2)) else {
            return Err(CalcError::InvalidNumber);
        };
        calculate(operation, a, b)
    });

    match outcome {
        Ok(calculation) => calculation.to_string(),
        Err(e) => e.to_string(),
    }
}

/// Tool wrapper around [`simple_calculator`]
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "simple_calculator".into(),
            description: "Perform basic arithmetic on two numbers.".into(),
            parameters: vec![
                ParameterSchema {
                    name: "operation".into(),
                    param_type: "string".into(),
                    description: "One of: add, subtract, multiply, divide".into(),
                    required: true,
                    enum_values: Some(
                        Operation::ALL
                            .iter()
                            .map(|op| Value::from(op.name()))
                            .collect(),
                    ),
                },
                ParameterSchema::required("num1", "number", "The first operand."),
                ParameterSchema::required("num2", "number", "The second operand."),
            ],
            has_side_effects: false,
        }
    }

    /// Missing arguments are answered in the result text, not rejected.
    fn validate(&self, _call: &ToolCall) -> CoreResult<()> {
        Ok(())
    }

    async fn execute(&self, call: &ToolCall, _ctx: &mut ToolContext<'_>) -> CoreResult<ToolResult> {
        let operation = call
            .arg("operation")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let num1 = call.arg("num1").cloned().unwrap_or_default();
        let num2 = call.arg("num2").cloned().unwrap_or_default();

        let output = simple_calculator(operation, &num1, &num2);
        tracing::info!(operation, %num1, %num2, result = %output, "simple_calculator");

        Ok(ToolResult::success("simple_calculator", output))
    }
}

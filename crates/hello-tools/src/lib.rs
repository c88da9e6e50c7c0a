//! # hello-tools
//!
//! The three tools of the hello agent:
//!
//! - `roll_die` - roll an n-sided die, remembering every roll in the session
//! - `check_prime` - report which numbers in a list are prime
//! - `simple_calculator` - add, subtract, multiply or divide two numbers
//!
//! ```rust,ignore
//! let mut tools = ToolRegistry::new();
//! hello_tools::register_all(&mut tools);
//! ```

pub mod coerce;
pub mod error;
pub mod svckit;

use agent_core::ToolRegistry;

pub use error::{Result, ToolError};
pub use svckit::{
    CalcError, Calculation, Operation, calculate, check_prime, is_prime, roll_die,
    simple_calculator,
};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CalculatorTool, CheckPrimeTool, RollDieTool};
}

/// Register every hello tool
pub fn register_all(registry: &mut ToolRegistry) {
    registry.register(tools::RollDieTool);
    registry.register(tools::CheckPrimeTool);
    registry.register(tools::CalculatorTool);
}

/// Instructions for the hello agent
pub const HELLO_AGENT_PROMPT: &str = r"You roll dice, check numbers for primality and do simple arithmetic.

When asked to roll a die:
1. Call `roll_die` with the number of sides as an integer.
2. Tell the user the number rolled.
3. Ask whether they want to check if it is prime.

If they agree, call `check_prime` with the most recent roll, or with all
previous rolls from this conversation if they ask about those. Report the
result. If they decline, acknowledge and wait.

For arithmetic, call `simple_calculator` with `operation` (add, subtract,
multiply or divide), `num1` and `num2`, then relay its answer.

Never roll dice or check primes unprompted. Always mention the roll result
when a roll was made this turn.";

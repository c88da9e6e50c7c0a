//! Service Kit - Agent Tools
//!
//! Each tool pairs a plain function (testable on its own) with a thin
//! `agent_core::Tool` wrapper that handles argument coercion and logging.

mod calculator;
mod dice;
mod prime;

pub use calculator::{CalcError, Calculation, CalculatorTool, Operation, calculate, simple_calculator};
pub use dice::{RollDieTool, roll_die, roll_die_with};
pub use prime::{CheckPrimeTool, check_prime, find_primes, is_prime, render_primes};

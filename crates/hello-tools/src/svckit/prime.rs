//! Prime Checker Tool
//!
//! Reports which numbers in a list are prime.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolContext, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::coerce::as_integer;
use crate::error::{Result, ToolError};

const NO_PRIMES: &str = "No prime numbers found.";

/// Witnesses that make Miller-Rabin exact for every `u64`
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Primality for any integer; only values in `2..=u64::MAX` can be prime.
pub fn is_prime(n: i128) -> bool {
    u64::try_from(n).is_ok_and(is_prime_u64)
}

fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    // n >= 41 here: every smaller n > 1 has a factor among the witnesses
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;

    'witness: for a in WITNESSES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[allow(clippy::cast_possible_truncation)]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    (u128::from(a) * u128::from(b) % u128::from(m)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut acc = 1;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    acc
}

/// Distinct primes in order of first appearance
pub fn find_primes(numbers: &[i128]) -> Vec<i128> {
    let mut seen = HashSet::new();
    numbers
        .iter()
        .copied()
        .filter(|&n| n > 1 && is_prime(n) && seen.insert(n))
        .collect()
}

pub fn render_primes(primes: &[i128]) -> String {
    if primes.is_empty() {
        return NO_PRIMES.to_string();
    }

    let list: Vec<String> = primes.iter().map(ToString::to_string).collect();
    format!("{} are prime numbers.", list.join(", "))
}

/// Check a list of loosely-typed numbers and describe the primes found
pub fn check_prime(values: &[Value]) -> Result<String> {
    let numbers = values
        .iter()
        .map(|v| as_integer(v).ok_or_else(|| ToolError::NotAnInteger(v.to_string())))
        .collect::<Result<Vec<_>>>()?;

    Ok(render_primes(&find_primes(&numbers)))
}

/// Tool wrapper around [`check_prime`]
pub struct CheckPrimeTool;

#[async_trait]
impl Tool for CheckPrimeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "check_prime".into(),
            description: "Check if a given list of numbers are prime.".into(),
            parameters: vec![ParameterSchema::required(
                "nums",
                "array",
                "The list of integers to check.",
            )],
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall, _ctx: &mut ToolContext<'_>) -> CoreResult<ToolResult> {
        let raw = call.arg("nums").cloned().unwrap_or_default();
        let Value::Array(values) = &raw else {
            return Err(ToolError::NotAList(raw.to_string()).into());
        };

        let output = check_prime(values)?;
        tracing::info!(nums = %raw, result = %output, "check_prime");

        Ok(ToolResult::success("check_prime", output))
    }
}

//! Die Roller Tool
//!
//! Rolls an n-sided die and appends the result to the session's rolls.

use async_trait::async_trait;
use rand::Rng;

use agent_core::{
    Result as CoreResult, SessionState, Tool, ToolCall, ToolContext, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::coerce::as_exact_integer;
use crate::error::{Result, ToolError};

/// Roll a die with `sides` faces and record the result.
///
/// `sides` below 1 is rejected and leaves the state untouched.
pub fn roll_die(sides: i64, state: &mut SessionState) -> Result<i64> {
    roll_die_with(&mut rand::thread_rng(), sides, state)
}

/// [`roll_die`] with a caller-supplied random source
pub fn roll_die_with<R: Rng>(
    rng: &mut R,
    sides: i64,
    state: &mut SessionState,
) -> Result<i64> {
    if sides < 1 {
        return Err(ToolError::InvalidSides(sides.to_string()));
    }

    let value = rng.gen_range(1..=sides);
    state.record_roll(value);
    Ok(value)
}

/// Tool wrapper around [`roll_die`]
pub struct RollDieTool;

#[async_trait]
impl Tool for RollDieTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "roll_die".into(),
            description: "Roll a die and return the rolled result.".into(),
            parameters: vec![ParameterSchema::required(
                "sides",
                "integer",
                "The integer number of sides the die has.",
            )],
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall, ctx: &mut ToolContext<'_>) -> CoreResult<ToolResult> {
        let raw = call.arg("sides").cloned().unwrap_or_default();
        let sides =
            as_exact_integer(&raw).ok_or_else(|| ToolError::InvalidSides(raw.to_string()))?;

        let value = roll_die(sides, &mut *ctx.state)?;
        tracing::info!(
            session_id = %ctx.session_id,
            sides,
            result = value,
            "roll_die"
        );

        Ok(ToolResult::success("roll_die", value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::{Map, json};

    use agent_core::{AgentError, SessionId};

    use super::*;

    #[test]
    fn test_rolls_stay_in_range_and_accumulate() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = SessionState::new();

        for sides in [1, 2, 6, 20, 100] {
            for _ in 0..50 {
                let before = state.rolls().to_vec();
                let value = roll_die_with(&mut rng, sides, &mut state).unwrap();

                assert!((1..=sides).contains(&value));
                assert_eq!(state.rolls().len(), before.len() + 1);
                assert_eq!(&state.rolls()[..before.len()], before.as_slice());
                assert_eq!(*state.rolls().last().unwrap(), value);
            }
        }
    }

    #[test]
    fn test_one_sided_die() {
        let mut state = SessionState::new();
        assert_eq!(roll_die(1, &mut state), Ok(1));
    }

    #[test]
    fn test_invalid_sides_leave_state_alone() {
        let mut state = SessionState::new();
        assert_eq!(
            roll_die(0, &mut state),
            Err(ToolError::InvalidSides("0".into()))
        );
        assert!(roll_die(-6, &mut state).is_err());
        assert!(state.rolls().is_empty());
    }

    #[tokio::test]
    async fn test_tool_coerces_and_records() {
        let id = SessionId::new();
        let mut state = SessionState::new();
        let mut ctx = ToolContext {
            session_id: &id,
            user_id: "user1",
            state: &mut state,
        };

        let mut args = Map::new();
        args.insert("sides".into(), json!("6"));
        let result = RollDieTool
            .execute(&ToolCall::new("roll_die", args), &mut ctx)
            .await
            .unwrap();

        let value: i64 = result.output.parse().unwrap();
        assert!((1..=6).contains(&value));
        assert_eq!(state.rolls(), &[value]);
    }

    #[tokio::test]
    async fn test_tool_rejects_fractional_sides() {
        let id = SessionId::new();
        let mut state = SessionState::new();
        let mut ctx = ToolContext {
            session_id: &id,
            user_id: "user1",
            state: &mut state,
        };

        let mut args = Map::new();
        args.insert("sides".into(), json!(6.5));
        let err = RollDieTool
            .execute(&ToolCall::new("roll_die", args), &mut ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ToolValidation(_)));
    }
}

//! Terminal rendering of a folded turn

use chrono::{DateTime, Utc};

use agent_core::TurnReply;

/// Tool-call traces first, then the reply itself.
///
/// `fallback_author` names the reply when no text event carried an author.
pub fn reply_lines(reply: &TurnReply, fallback_author: &str) -> Vec<String> {
    let author = reply.author.as_deref().unwrap_or(fallback_author);

    let mut lines = reply.tool_calls.clone();
    if !reply.text.is_empty() {
        lines.push(format!("** {author}: {}", reply.text));
    }
    lines
}

pub fn user_line(message: &str) -> String {
    format!("** User says: {message}")
}

/// Seconds between two instants, for the closing summary
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_secs(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn test_traces_then_reply() {
        let reply = TurnReply {
            author: Some("hello_world_agent".into()),
            text: "You rolled a 17.".into(),
            tool_calls: vec![r#"Tool call: roll_die({"sides":20})"#.into()],
        };

        assert_eq!(
            reply_lines(&reply, "agent"),
            vec![
                r#"Tool call: roll_die({"sides":20})"#,
                "** hello_world_agent: You rolled a 17.",
            ]
        );
    }

    #[test]
    fn test_empty_reply() {
        assert!(reply_lines(&TurnReply::default(), "agent").is_empty());

        let reply = TurnReply {
            author: None,
            text: "hi".into(),
            tool_calls: Vec::new(),
        };
        assert_eq!(reply_lines(&reply, "agent"), vec!["** agent: hi"]);
    }

    #[test]
    fn test_elapsed() {
        let start = Utc::now();
        let end = start + TimeDelta::milliseconds(2_500);
        assert!((elapsed_secs(start, end) - 2.5).abs() < f64::EPSILON);
        assert_eq!(user_line("Hi"), "** User says: Hi");
    }
}

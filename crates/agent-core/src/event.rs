//! Turn Events
//!
//! A turn produces a finite, ordered stream of [`Event`]s. Entry points fold
//! that stream into a single [`TurnReply`].

use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tool::ToolCall;

/// One piece of an event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    ToolCall { call: ToolCall },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub const fn tool_call(call: ToolCall) -> Self {
        Self::ToolCall { call }
    }
}

/// Something the agent emitted during a turn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    /// Name of the emitting agent
    pub author: String,
    pub parts: Vec<Part>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(author: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            author: author.into(),
            parts,
            timestamp: Utc::now(),
        }
    }
}

/// Stream of events for one turn; a failure arrives as an `Err` item
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Event>> + Send>>;

/// Folded result of a turn
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnReply {
    /// Author of the last event that carried text
    pub author: Option<String>,
    /// All text parts, concatenated and trimmed
    pub text: String,
    /// Tool-call traces in emission order
    pub tool_calls: Vec<String>,
}

impl TurnReply {
    /// Fold already-collected events
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut acc = Accumulator::default();
        for event in events {
            acc.push(event);
        }
        acc.finish()
    }
}

#[derive(Default)]
struct Accumulator {
    author: Option<String>,
    text: String,
    tool_calls: Vec<String>,
}

impl Accumulator {
    fn push(&mut self, event: &Event) {
        for part in &event.parts {
            match part {
                Part::Text { text } => {
                    self.text.push_str(text);
                    self.author = Some(event.author.clone());
                }
                Part::ToolCall { call } => {
                    self.tool_calls.push(format!("Tool call: {}", call.summary()));
                }
            }
        }
    }

    fn finish(self) -> TurnReply {
        TurnReply {
            author: self.author,
            text: self.text.trim().to_string(),
            tool_calls: self.tool_calls,
        }
    }
}

/// Drain a turn's stream into a reply. The first error aborts the fold.
pub async fn fold_events(mut events: EventStream) -> Result<TurnReply> {
    let mut acc = Accumulator::default();
    while let Some(event) = events.next().await {
        acc.push(&event?);
    }
    Ok(acc.finish())
}

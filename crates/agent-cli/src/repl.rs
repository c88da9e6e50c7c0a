//! Sequential turn loop for the terminal

use std::io::Write;

use colored::Colorize;

use agent_core::{Runner, SessionRef};

use crate::display::{reply_lines, user_line};

/// Send one message, wait for the turn to finish and print its reply.
///
/// A failed turn is returned to the caller.
pub async fn run_prompt(
    runner: &Runner,
    session: &SessionRef,
    message: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    writeln!(out, "{}", user_line(message).green())?;

    let reply = runner.dispatch(session, message).await?;
    for line in reply_lines(&reply, runner.agent().name()) {
        writeln!(out, "{}", line.bright_blue())?;
    }
    out.flush()?;

    Ok(())
}

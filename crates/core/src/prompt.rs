//! Yes/no confirmation used for destructive or risky steps.

use std::io::{BufRead, Write};

/// Asks the operator a yes/no question.
pub trait Confirm {
    /// Return the operator's answer; `default` applies only to an empty reply.
    fn confirm(&mut self, question: &str, default: bool) -> bool;
}

/// Answers yes to everything (`--assume-yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, question: &str, _default: bool) -> bool {
        log::info!("{question} yes (prompts disabled)");
        true
    }
}

/// Prompt on a writer and read the reply from a line-oriented reader.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str, default: bool) -> bool {
        let hint = if default { "Yy|Nn (default=Y)" } else { "Yy|Nn (default=N)" };
        let _ = write!(self.output, "{question} {hint}: ");
        let _ = self.output.flush();

        let mut reply = String::new();
        match self.input.read_line(&mut reply) {
            Ok(0) | Err(_) => default,
            Ok(_) if reply.trim().is_empty() => default,
            Ok(_) => parse_reply(&reply).unwrap_or(false),
        }
    }
}

/// `Some(true)` for y/yes, `Some(false)` for n/no, `None` for anything else.
fn parse_reply(reply: &str) -> Option<bool> {
    match reply.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

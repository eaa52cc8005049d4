//! Input providers for READ.
//!
//! The contract is "produce one line per request". The interpreter never
//! touches stdin directly, so runs become deterministic by handing it a
//! [`QueueInput`] instead of [`StdinInput`].

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of input lines for `citeste`.
pub trait InputProvider {
    /// Produce one line, or `None` when the source is exhausted. The
    /// prompt may be shown to an interactive user; non-interactive
    /// providers ignore it.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// A pre-filled queue of input lines.
#[derive(Debug, Default, Clone)]
pub struct QueueInput {
    queue: VecDeque<String>,
}

impl QueueInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputProvider for QueueInput {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.queue.pop_front()
    }
}

/// Interactive provider over the process stdin; prints the prompt first.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputProvider for StdinInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        io::stdout().flush().ok();

        let mut buffer = String::new();
        match io::stdin().lock().read_line(&mut buffer) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(
                buffer
                    .trim_end_matches(|c| c == '\n' || c == '\r')
                    .to_string(),
            ),
        }
    }
}

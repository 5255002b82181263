//! Outbound that prints to a terminal.

use std::{
    io::{self, Write},
    sync::Mutex,
};

use {async_trait::async_trait, quandary_common::QuickReply};

use crate::{ChannelOutbound, Error, Result, SenderAction};

/// Writes each reply as a line, with quick replies as `[title → PAYLOAD]`.
pub struct ConsoleOutbound {
    out: Mutex<Box<dyn Write + Send>>,
    show_actions: bool,
}

impl ConsoleOutbound {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            show_actions: false,
        }
    }

    /// Also print presence signals such as typing indicators.
    #[must_use]
    pub fn with_actions(mut self, show: bool) -> Self {
        self.show_actions = show;
        self
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::unavailable("console writer poisoned"))?;
        writeln!(out, "{line}").map_err(|e| Error::external("console write", e))?;
        out.flush().map_err(|e| Error::external("console flush", e))
    }
}

fn render(text: &str, quick_replies: &[QuickReply]) -> String {
    if quick_replies.is_empty() {
        return text.to_string();
    }
    let chips: Vec<String> = quick_replies
        .iter()
        .map(|qr| format!("[{} → {}]", qr.title, qr.payload))
        .collect();
    format!("{text}\n  {}", chips.join(" "))
}

#[async_trait]
impl ChannelOutbound for ConsoleOutbound {
    async fn send_text(&self, to: &str, text: &str, quick_replies: &[QuickReply]) -> Result<()> {
        if text.is_empty() {
            return Err(Error::invalid_input(format!("empty message to {to}")));
        }
        self.write_line(&render(text, quick_replies))
    }

    async fn send_action(&self, to: &str, action: SenderAction) -> Result<()> {
        if self.show_actions {
            self.write_line(&format!("({} for {to})", action.as_str()))?;
        }
        Ok(())
    }
}

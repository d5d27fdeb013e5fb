//! Rope-backed in-memory host.

use std::collections::VecDeque;

use ropey::Rope;

use super::{Host, Region};

/// A document plus the editor state commands interact with.
///
/// Prompts are answered from a queue, and status messages and clipboard
/// writes are recorded so callers can inspect them afterwards.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    buffer: Rope,
    selections: Vec<Region>,
    prompt_answers: VecDeque<String>,
    prompts: Vec<String>,
    messages: Vec<String>,
    clipboard: Option<String>,
}

impl TextBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            ..Self::default()
        }
    }

    /// Buffer with the given selections already made.
    pub fn with_selections(text: &str, selections: Vec<Region>) -> Self {
        let mut buffer = Self::new(text);
        buffer.set_selections(selections);
        buffer
    }

    /// Queue an answer for the next prompt.
    pub fn push_prompt_answer(&mut self, answer: impl Into<String>) {
        self.prompt_answers.push_back(answer.into());
    }

    /// Full document text.
    pub fn contents(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// One region per line, excluding line terminators.
    pub fn line_regions(&self) -> Vec<Region> {
        let mut regions = Vec::with_capacity(self.buffer.len_lines());
        for (idx, line) in self.buffer.lines().enumerate() {
            let start = self.buffer.line_to_char(idx);
            let mut len = line.len_chars();
            while len > 0 && matches!(line.char(len - 1), '\n' | '\r') {
                len -= 1;
            }
            // ropey reports an empty last line after a trailing newline
            if line.len_chars() == 0 && idx > 0 && idx + 1 == self.buffer.len_lines() {
                break;
            }
            regions.push(Region::new(start, start + len));
        }
        regions
    }

    /// Titles of every prompt shown so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Status messages shown so far, oldest first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    fn clamp(&self, region: Region) -> Region {
        let len = self.buffer.len_chars();
        Region::new(region.begin.min(len), region.end.min(len))
    }
}

impl Host for TextBuffer {
    fn selections(&self) -> Vec<Region> {
        self.selections.clone()
    }

    fn set_selections(&mut self, selections: Vec<Region>) {
        let clamped = selections.into_iter().map(|r| self.clamp(r)).collect();
        self.selections = clamped;
    }

    fn text(&self, region: Region) -> String {
        let region = self.clamp(region);
        self.buffer.slice(region.begin..region.end).to_string()
    }

    fn replace(&mut self, region: Region, text: &str) {
        let region = self.clamp(region);
        self.buffer.remove(region.begin..region.end);
        self.buffer.insert(region.begin, text);
    }

    fn prompt_line(&mut self, title: &str) -> Option<String> {
        self.prompts.push(title.to_string());
        self.prompt_answers.pop_front()
    }

    fn status_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn set_clipboard(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }
}

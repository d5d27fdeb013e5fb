//! Host used by the command-line front end.

use tracing::warn;

use super::{Host, Region, TextBuffer, copy_to_clipboard};

/// A [`TextBuffer`] whose notifications reach the terminal.
///
/// Status messages go to stderr and clipboard writes go to the system
/// clipboard.
#[derive(Debug)]
pub struct TerminalHost {
    buffer: TextBuffer,
}

impl TerminalHost {
    pub fn new(buffer: TextBuffer) -> Self {
        Self { buffer }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> TextBuffer {
        self.buffer
    }
}

impl Host for TerminalHost {
    fn selections(&self) -> Vec<Region> {
        self.buffer.selections()
    }

    fn set_selections(&mut self, selections: Vec<Region>) {
        self.buffer.set_selections(selections);
    }

    fn text(&self, region: Region) -> String {
        self.buffer.text(region)
    }

    fn replace(&mut self, region: Region, text: &str) {
        self.buffer.replace(region, text);
    }

    fn prompt_line(&mut self, title: &str) -> Option<String> {
        self.buffer.prompt_line(title)
    }

    fn status_message(&mut self, message: &str) {
        eprintln!("calculate: {message}");
        self.buffer.status_message(message);
    }

    fn set_clipboard(&mut self, text: &str) {
        if let Err(e) = copy_to_clipboard(text) {
            warn!("{e}");
        }
        self.buffer.set_clipboard(text);
    }
}

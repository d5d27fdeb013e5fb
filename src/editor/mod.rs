//! The editor side of a command: document text, selections and the
//! user-facing notifications a command can emit.

mod buffer;
mod clipboard;
mod region;
mod terminal;

pub use buffer::TextBuffer;
pub use clipboard::{ClipboardError, copy_to_clipboard};
pub use region::Region;
pub use terminal::TerminalHost;

/// Editor operations commands rely on.
///
/// Offsets are character offsets. After [`Host::replace`] the bounds of
/// other regions are stale; callers sequence their own edits.
pub trait Host {
    /// Current selections in document order.
    fn selections(&self) -> Vec<Region>;

    fn set_selections(&mut self, selections: Vec<Region>);

    /// Text covered by `region`.
    fn text(&self, region: Region) -> String;

    /// Replace the text covered by `region`.
    fn replace(&mut self, region: Region, text: &str);

    /// Ask the user for one line of input; `None` means cancelled.
    fn prompt_line(&mut self, title: &str) -> Option<String>;

    /// Non-blocking notification.
    fn status_message(&mut self, message: &str);

    fn set_clipboard(&mut self, text: &str);
}

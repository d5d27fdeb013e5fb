//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use calculate::{Commands, Region, Settings, TextBuffer};

/// Commands with default settings and reproducible random functions
pub fn commands() -> Commands {
    Commands::with_seed(Settings::default(), 7)
}

/// A buffer holding `text` with one selection per `(begin, end)` pair
pub fn buffer(text: &str, regions: &[(usize, usize)]) -> TextBuffer {
    TextBuffer::with_selections(text, regions.iter().map(|&(a, b)| Region::new(a, b)).collect())
}

/// A buffer selecting every occurrence of `needle` in `text`
pub fn select_all(text: &str, needle: &str) -> TextBuffer {
    let regions = text
        .match_indices(needle)
        .map(|(byte, _)| {
            let begin = text[..byte].chars().count();
            Region::new(begin, begin + needle.chars().count())
        })
        .collect();
    TextBuffer::with_selections(text, regions)
}

/// A buffer selecting every line
pub fn select_lines(text: &str) -> TextBuffer {
    let mut buffer = TextBuffer::new(text);
    let lines = buffer.line_regions();
    calculate::Host::set_selections(&mut buffer, lines);
    buffer
}

/// The text under each current selection
pub fn selected_texts(buffer: &TextBuffer) -> Vec<String> {
    use calculate::Host;
    buffer
        .selections()
        .into_iter()
        .map(|region| buffer.text(region))
        .collect()
}

//! In-place selection calculator
//!
//! Evaluates formulas found in selected text, fills selections with
//! generated sequences and aggregates selected numbers. The editor is
//! abstracted behind [`editor::Host`].

pub mod calculator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod counter;
pub mod editor;
pub mod logging;

// Re-export commonly used types
pub use calculator::{CalcError, EvalError, Evaluator};
pub use commands::{BatchReport, CommandError, Commands, PromptMode};
pub use config::Settings;
pub use counter::Counter;
pub use editor::{Host, Region, TextBuffer};

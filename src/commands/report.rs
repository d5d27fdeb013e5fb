//! Outcome of running a command over a set of selections.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::calculator::CalcError;
use crate::editor::{Host, Region};

/// Failure that stops a command before it edits anything.
#[derive(Debug, Error)]
pub enum CommandError {
    /// An aggregate needs exactly one empty selection to write into.
    #[error("no empty selection to receive the result")]
    NoOutputSlot,

    #[error("{0} empty selections; exactly one may receive the result")]
    AmbiguousOutputSlot(usize),

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Calc(#[from] CalcError),
}

/// A non-fatal problem with one region of a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Region the problem belongs to, if any.
    pub region: Option<Region>,
    pub message: String,
}

/// What a command did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    results: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    /// Number of values written into the document.
    pub fn applied(&self) -> usize {
        self.results.len()
    }

    /// Written values, in selection order.
    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Check if every region succeeded.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Text to copy to the clipboard: every result, one per line.
    pub fn text_for_clipboard(&self) -> Option<String> {
        (!self.results.is_empty()).then(|| self.results.join("\n"))
    }

    pub(crate) fn record(&mut self, result: impl Into<String>) {
        self.results.push(result.into());
    }

    /// Record a problem and surface it through the host.
    pub(crate) fn report<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        region: Option<Region>,
        message: String,
    ) {
        match region {
            Some(region) => warn!(%region, "{message}"),
            None => warn!("{message}"),
        }
        host.status_message(&message);
        self.diagnostics.push(Diagnostic { region, message });
    }

    pub(crate) fn fail<H: Host + ?Sized>(&mut self, host: &mut H, region: Region, err: &CalcError) {
        self.report(host, Some(region), err.to_string());
    }
}

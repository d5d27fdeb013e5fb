//! Applying several replacements to one document.
//!
//! Every replacement can change the document length, invalidating the
//! offsets of everything after it. Edits are therefore applied from the
//! last region to the first, while callers keep assigning values in
//! selection order.

use crate::editor::{Host, Region};

/// A pending replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Edit {
    pub region: Region,
    pub text: String,
}

impl Edit {
    fn growth(&self) -> isize {
        self.text.chars().count() as isize - self.region.len() as isize
    }
}

/// Apply non-overlapping `edits` by region end, descending.
///
/// Returns the span each edit's text covers afterwards, in input order.
pub(crate) fn apply_edits<H: Host + ?Sized>(host: &mut H, edits: &[Edit]) -> Vec<Region> {
    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse((edits[i].region.end, edits[i].region.begin)));
    for &i in &order {
        host.replace(edits[i].region, &edits[i].text);
    }

    order.reverse();
    let mut spans = vec![Region::cursor(0); edits.len()];
    let mut shift = 0isize;
    for i in order {
        let edit = &edits[i];
        let begin = offset(edit.region.begin, shift);
        spans[i] = Region::new(begin, begin + edit.text.chars().count());
        shift += edit.growth();
    }
    spans
}

/// Where an untouched region ends up once `edits` have been applied.
pub(crate) fn shift_region(region: Region, edits: &[Edit]) -> Region {
    let shift: isize = edits
        .iter()
        .filter(|edit| edit.region.end <= region.begin && edit.region != region)
        .map(Edit::growth)
        .sum();
    Region::new(offset(region.begin, shift), offset(region.end, shift))
}

/// Selections after a batch: edited ones take their new span, the rest
/// are shifted. `edited[i]` indexes into `edits` for selection `i`.
pub(crate) fn reselect(
    selections: &[Region],
    edited: &[Option<usize>],
    edits: &[Edit],
    spans: &[Region],
    collapse: bool,
) -> Vec<Region> {
    selections
        .iter()
        .zip(edited)
        .map(|(&region, edit)| match edit {
            Some(e) if collapse => Region::cursor(spans[*e].end),
            Some(e) => spans[*e],
            None => shift_region(region, edits),
        })
        .collect()
}

fn offset(position: usize, shift: isize) -> usize {
    position.saturating_add_signed(shift)
}

/// Whether two regions touch the same text; equal cursors count.
pub(crate) fn overlaps(a: Region, b: Region) -> bool {
    a == b || (a.begin < b.end && b.begin < a.end)
}

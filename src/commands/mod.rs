//! Commands that run the calculator over the host's selections.
//!
//! Each command processes every selection in one pass. A failing region
//! is reported through the host and never stops its siblings.

mod edits;
mod report;

pub use report::{BatchReport, CommandError, Diagnostic};

use num_bigint::BigInt;
use tracing::debug;

use crate::calculator::{CalcError, Evaluator, Value, canonicalize, stats};
use crate::config::Settings;
use crate::counter;
use crate::editor::{Host, Region};
use edits::{Edit, apply_edits, overlaps, reselect};

const PROMPT_TITLE: &str = "Calculate:";
const RETRY_PROMPT_TITLE: &str = "Calculate (syntax error, try again):";

/// When [`Commands::evaluate_selection`] asks the user for a formula.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PromptMode {
    /// Only evaluate selected text.
    Never,
    /// Prompt when the only selection is an empty cursor.
    #[default]
    WhenEmpty,
    /// Always prompt, inserting the result at every selection.
    Always,
}

#[derive(Clone, Copy, Debug)]
enum Aggregate {
    Sum,
    Mean,
    Std { ddof: i64 },
}

/// The command surface, bound to one evaluator and its settings.
pub struct Commands {
    evaluator: Evaluator,
    settings: Settings,
}

impl Commands {
    pub fn new(settings: Settings) -> Self {
        let evaluator = Evaluator::new(settings.symbol_names());
        Self {
            evaluator,
            settings,
        }
    }

    /// Commands whose random functions are reproducible.
    pub fn with_seed(settings: Settings, seed: u64) -> Self {
        let evaluator = Evaluator::with_seed(settings.symbol_names(), seed);
        Self {
            evaluator,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// Evaluate every non-empty selection as a formula.
    ///
    /// With `replace` the formula is replaced by its result, otherwise
    /// `formula = result` is written. The value slot holds the previous
    /// region's result.
    pub fn evaluate_selection<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        replace: bool,
        prompt: PromptMode,
    ) -> Result<BatchReport, CommandError> {
        self.evaluator.reset_loop_context();
        let selections = host.selections();
        let single_cursor = matches!(selections.as_slice(), [only] if only.is_empty());

        let report = match prompt {
            PromptMode::Always => self.evaluate_prompt(host, &selections)?,
            PromptMode::WhenEmpty if single_cursor => self.evaluate_prompt(host, &selections)?,
            _ => self.evaluate_regions(host, &selections, replace),
        };
        self.finish(host, &report);
        Ok(report)
    }

    fn evaluate_regions<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        selections: &[Region],
        replace: bool,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut edits = Vec::new();
        let mut edited = vec![None; selections.len()];
        let mut previous = Value::None;

        for (index, &region) in selections.iter().enumerate() {
            if region.is_empty() {
                continue;
            }
            let formula = host.text(region);
            self.evaluator
                .set_loop_context(index, selections.len(), previous.clone());

            match self.evaluator.evaluate_value(&formula) {
                Ok(value) => {
                    let result = canonicalize(&value);
                    let text = if replace {
                        result.clone()
                    } else {
                        format!("{formula} = {result}")
                    };
                    edited[index] = Some(edits.len());
                    edits.push(Edit { region, text });
                    report.record(result);
                    previous = value;
                }
                Err(err) => report.fail(host, region, &err),
            }
        }

        let spans = apply_edits(host, &edits);
        host.set_selections(reselect(selections, &edited, &edits, &spans, false));
        report
    }

    /// Ask for a formula and insert its result at every selection.
    ///
    /// An answer that does not parse is asked for once more.
    fn evaluate_prompt<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        selections: &[Region],
    ) -> Result<BatchReport, CommandError> {
        let mut report = BatchReport::default();
        self.evaluator
            .set_loop_context(0, selections.len(), Value::None);

        let mut title = PROMPT_TITLE;
        let result = loop {
            let formula = host.prompt_line(title).ok_or(CommandError::Cancelled)?;
            match self.evaluator.evaluate(&formula) {
                Ok(result) => break result,
                Err(err) if err.is_syntax() && title == PROMPT_TITLE => {
                    debug!(%formula, "prompted formula did not parse: {err}");
                    title = RETRY_PROMPT_TITLE;
                }
                Err(err) => {
                    report.report(host, None, err.to_string());
                    return Ok(report);
                }
            }
        };

        let edits: Vec<Edit> = selections
            .iter()
            .map(|&region| Edit {
                region,
                text: result.clone(),
            })
            .collect();
        let spans = apply_edits(host, &edits);
        host.set_selections(spans.iter().map(|span| Region::cursor(span.end)).collect());
        for _ in &edits {
            report.record(result.clone());
        }
        Ok(report)
    }

    /// Fill every selection with successive values of a sequence.
    ///
    /// The format is detected from the first selection's text; text
    /// matching no format counts up from `start_index`. Afterwards each
    /// selection is a cursor after its value.
    pub fn generate_sequence<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        start_index: i64,
    ) -> Result<BatchReport, CommandError> {
        let selections = host.selections();
        let mut report = BatchReport::default();
        let Some(&first) = selections.first() else {
            return Ok(report);
        };

        let mut counter = counter::detect(&host.text(first), start_index);
        let edits: Vec<Edit> = selections
            .iter()
            .map(|&region| Edit {
                region,
                text: counter.advance(),
            })
            .collect();

        let spans = apply_edits(host, &edits);
        host.set_selections(spans.iter().map(|span| Region::cursor(span.end)).collect());
        for edit in &edits {
            report.record(edit.text.as_str());
        }
        self.finish(host, &report);
        Ok(report)
    }

    /// Write the sum of the selected numbers into the one empty selection.
    pub fn sum_selections<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<BatchReport, CommandError> {
        self.aggregate(host, Aggregate::Sum)
    }

    /// Write the mean of the selected numbers into the one empty selection.
    pub fn mean_selections<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<BatchReport, CommandError> {
        self.aggregate(host, Aggregate::Mean)
    }

    /// Write the standard deviation (divisor `n - ddof`) of the selected
    /// numbers into the one empty selection.
    pub fn std_selections<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        ddof: i64,
    ) -> Result<BatchReport, CommandError> {
        self.aggregate(host, Aggregate::Std { ddof })
    }

    fn aggregate<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        aggregate: Aggregate,
    ) -> Result<BatchReport, CommandError> {
        let selections = host.selections();
        let empty: Vec<usize> = selections
            .iter()
            .enumerate()
            .filter(|(_, region)| region.is_empty())
            .map(|(i, _)| i)
            .collect();
        let output = match empty.as_slice() {
            [single] => *single,
            [] => return Err(slot_error(host, CommandError::NoOutputSlot)),
            many => return Err(slot_error(host, CommandError::AmbiguousOutputSlot(many.len()))),
        };

        let mut numbers = Vec::new();
        // exact copies, kept while every number is an integer
        let mut integers = Some(Vec::new());
        for &region in selections.iter().filter(|region| !region.is_empty()) {
            let text = host.text(region);
            match self.settings.parse_number(&text) {
                Ok(number) => {
                    numbers.push(number);
                    match (self.settings.parse_integer(&text), integers.as_mut()) {
                        (Some(exact), Some(integers)) => integers.push(exact),
                        _ => integers = None,
                    }
                }
                Err(err) => debug!(%region, "skipping region: {err}"),
            }
        }

        let mut report = BatchReport::default();
        let text = match (aggregate, integers) {
            (Aggregate::Sum, Some(integers)) => Ok(integers.iter().sum::<BigInt>().to_string()),
            (Aggregate::Sum, None) => Ok(self.settings.format_number(stats::sum(&numbers))),
            (Aggregate::Mean, _) => match stats::mean(&numbers) {
                Some(mean) => Ok(self.settings.format_number(mean)),
                None => {
                    report.report(host, None, "no numbers selected; mean is undefined".to_string());
                    return Ok(report);
                }
            },
            (Aggregate::Std { ddof }, _) => {
                stats::std(&numbers, ddof).map(|std| self.settings.format_number(std))
            }
        };
        let text = match text {
            Ok(text) => text,
            Err(err) => {
                report.fail(host, selections[output], &CalcError::from(err));
                return Ok(report);
            }
        };

        debug!(?aggregate, count = numbers.len(), %text, "aggregated selections");
        let edits = vec![Edit {
            region: selections[output],
            text,
        }];
        let spans = apply_edits(host, &edits);
        let mut edited = vec![None; selections.len()];
        edited[output] = Some(0);
        host.set_selections(reselect(&selections, &edited, &edits, &spans, true));

        report.record(edits[0].text.as_str());
        self.finish(host, &report);
        Ok(report)
    }

    /// Add `delta` to the integer in each selection.
    ///
    /// An empty selection expands over the surrounding run of digits and
    /// `-`. Regions that do not hold an integer are skipped.
    pub fn increment_number_at_cursor<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        delta: i64,
    ) -> Result<BatchReport, CommandError> {
        let selections = host.selections();
        let mut report = BatchReport::default();
        let mut edits: Vec<Edit> = Vec::new();
        let mut edited = vec![None; selections.len()];

        for (index, &selection) in selections.iter().enumerate() {
            let region = if selection.is_empty() {
                expand_number(host, selection.begin)
            } else {
                selection
            };
            // two cursors inside the same number
            if edits.iter().any(|edit| overlaps(edit.region, region)) {
                continue;
            }

            let text = host.text(region);
            let Ok(number) = text.trim().parse::<BigInt>() else {
                debug!(%region, %text, "not an integer, skipping");
                continue;
            };
            edited[index] = Some(edits.len());
            edits.push(Edit {
                region,
                text: (number + delta).to_string(),
            });
        }

        let spans = apply_edits(host, &edits);
        let collapse_all = selections.iter().all(Region::is_empty);
        host.set_selections(reselect(&selections, &edited, &edits, &spans, collapse_all));
        for edit in &edits {
            report.record(edit.text.as_str());
        }
        self.finish(host, &report);
        Ok(report)
    }

    /// Evaluate `command` once per non-empty selection and replace the
    /// selection with the result.
    ///
    /// The value slot holds the region's number when its text parses as
    /// one, otherwise the text itself.
    pub fn apply_custom_expression<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        command: &str,
    ) -> Result<BatchReport, CommandError> {
        if let Err(err) = self.evaluator.check(command) {
            host.status_message(&err.to_string());
            return Err(err.into());
        }
        self.evaluator.reset_loop_context();

        let selections = host.selections();
        let mut report = BatchReport::default();
        let mut edits = Vec::new();
        let mut edited = vec![None; selections.len()];

        for (index, &region) in selections.iter().enumerate() {
            if region.is_empty() {
                continue;
            }
            let value = self.region_value(&host.text(region));
            self.evaluator.set_loop_context(index, selections.len(), value);

            match self.evaluator.evaluate(command) {
                Ok(result) => {
                    edited[index] = Some(edits.len());
                    edits.push(Edit {
                        region,
                        text: result.clone(),
                    });
                    report.record(result);
                }
                Err(err) => report.fail(host, region, &err),
            }
        }

        let spans = apply_edits(host, &edits);
        host.set_selections(reselect(&selections, &edited, &edits, &spans, false));
        self.finish(host, &report);
        Ok(report)
    }

    fn region_value(&self, text: &str) -> Value {
        if let Ok(int) = text.trim().parse::<BigInt>() {
            return Value::from_bigint(int);
        }
        match self.settings.parse_number(text) {
            Ok(number) => Value::Float(number),
            Err(_) => Value::Str(text.to_string()),
        }
    }

    fn finish<H: Host + ?Sized>(&self, host: &mut H, report: &BatchReport) {
        if !self.settings.auto_copy {
            return;
        }
        if let Some(text) = report.text_for_clipboard() {
            host.set_clipboard(&text);
        }
    }
}

fn slot_error<H: Host + ?Sized>(host: &mut H, err: CommandError) -> CommandError {
    tracing::warn!("{err}");
    host.status_message(&err.to_string());
    err
}

/// The run of digits and `-` around `offset`.
fn expand_number<H: Host + ?Sized>(host: &H, offset: usize) -> Region {
    let is_number = |region: Region| {
        host.text(region)
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '-')
    };

    let mut begin = offset;
    while begin > 0 && is_number(Region::new(begin - 1, begin)) {
        begin -= 1;
    }
    let mut end = offset;
    while is_number(Region::new(end, end + 1)) {
        end += 1;
    }
    Region::new(begin, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TextBuffer;
    use pretty_assertions::assert_eq;

    fn commands() -> Commands {
        Commands::with_seed(Settings::default(), 1)
    }

    fn regions(pairs: &[(usize, usize)]) -> Vec<Region> {
        pairs.iter().map(|&(a, b)| Region::new(a, b)).collect()
    }

    #[test]
    fn test_evaluate_appends_results() {
        let mut buffer = TextBuffer::with_selections("1+1 2*3", regions(&[(0, 3), (4, 7)]));
        let report = commands()
            .evaluate_selection(&mut buffer, false, PromptMode::Never)
            .unwrap();
        assert_eq!(buffer.contents(), "1+1 = 2 2*3 = 6");
        assert_eq!(report.results(), ["2", "6"]);
        assert_eq!(buffer.selections(), regions(&[(0, 7), (8, 15)]));
    }

    #[test]
    fn test_value_slot_chains_previous_result() {
        let mut buffer = TextBuffer::with_selections("10 x*2 x+i", regions(&[(0, 2), (3, 6), (7, 10)]));
        commands()
            .evaluate_selection(&mut buffer, true, PromptMode::Never)
            .unwrap();
        assert_eq!(buffer.contents(), "10 20 22");
    }

    #[test]
    fn test_prompt_when_single_cursor() {
        let mut buffer = TextBuffer::with_selections("total: ", vec![Region::cursor(7)]);
        buffer.push_prompt_answer("6 * 7");
        let report = commands()
            .evaluate_selection(&mut buffer, true, PromptMode::WhenEmpty)
            .unwrap();
        assert_eq!(buffer.contents(), "total: 42");
        assert_eq!(report.applied(), 1);
        assert_eq!(buffer.selections(), vec![Region::cursor(9)]);
    }

    #[test]
    fn test_prompt_retries_once_on_syntax_error() {
        let mut buffer = TextBuffer::with_selections("", vec![Region::cursor(0)]);
        buffer.push_prompt_answer("2 +");
        buffer.push_prompt_answer("2 + 3");
        commands()
            .evaluate_selection(&mut buffer, true, PromptMode::WhenEmpty)
            .unwrap();
        assert_eq!(buffer.contents(), "5");
        assert_eq!(buffer.prompts(), [PROMPT_TITLE, RETRY_PROMPT_TITLE]);
    }

    #[test]
    fn test_prompt_gives_up_after_second_syntax_error() {
        let mut buffer = TextBuffer::with_selections("", vec![Region::cursor(0)]);
        buffer.push_prompt_answer("2 +");
        buffer.push_prompt_answer("(");
        let report = commands()
            .evaluate_selection(&mut buffer, true, PromptMode::WhenEmpty)
            .unwrap();
        assert_eq!(buffer.contents(), "");
        assert_eq!(report.diagnostics().len(), 1);
        assert_eq!(buffer.messages().len(), 1);
    }

    #[test]
    fn test_cancelled_prompt() {
        let mut buffer = TextBuffer::with_selections("", vec![Region::cursor(0)]);
        let err = commands()
            .evaluate_selection(&mut buffer, true, PromptMode::Always)
            .unwrap_err();
        assert!(matches!(err, CommandError::Cancelled));
    }

    #[test]
    fn test_sequence_leaves_cursors_after_values() {
        let mut buffer = TextBuffer::with_selections("9 _ _", regions(&[(0, 1), (2, 3), (4, 5)]));
        let report = commands().generate_sequence(&mut buffer, 1).unwrap();
        assert_eq!(buffer.contents(), "9 10 11");
        assert_eq!(report.results(), ["9", "10", "11"]);
        assert_eq!(
            buffer.selections(),
            vec![Region::cursor(1), Region::cursor(4), Region::cursor(7)]
        );
    }

    #[test]
    fn test_sequence_from_start_index() {
        let mut buffer = TextBuffer::with_selections("", vec![Region::cursor(0)]);
        commands().generate_sequence(&mut buffer, 5).unwrap();
        assert_eq!(buffer.contents(), "5");
    }

    #[test]
    fn test_sum_into_empty_selection() {
        let mut buffer = TextBuffer::with_selections(
            "1 2 x 3.5 = ",
            regions(&[(0, 1), (2, 3), (4, 5), (6, 9), (12, 12)]),
        );
        let report = commands().sum_selections(&mut buffer).unwrap();
        assert_eq!(buffer.contents(), "1 2 x 3.5 = 6.5");
        assert!(report.is_clean());
        assert_eq!(buffer.selections()[4], Region::cursor(15));
    }

    #[test]
    fn test_aggregate_needs_exactly_one_output() {
        let mut buffer = TextBuffer::with_selections("1 2", regions(&[(0, 1), (2, 3)]));
        let err = commands().sum_selections(&mut buffer).unwrap_err();
        assert!(matches!(err, CommandError::NoOutputSlot));

        buffer.set_selections(vec![Region::cursor(0), Region::cursor(3)]);
        let err = commands().mean_selections(&mut buffer).unwrap_err();
        assert!(matches!(err, CommandError::AmbiguousOutputSlot(2)));
        assert_eq!(buffer.contents(), "1 2");
        assert_eq!(buffer.messages().len(), 2);
    }

    #[test]
    fn test_mean_of_nothing_inserts_nothing() {
        let mut buffer = TextBuffer::with_selections("a ", regions(&[(0, 1), (2, 2)]));
        let report = commands().mean_selections(&mut buffer).unwrap();
        assert_eq!(buffer.contents(), "a ");
        assert_eq!(report.applied(), 0);
        assert_eq!(report.diagnostics().len(), 1);
    }

    #[test]
    fn test_std_selections() {
        let text = "2 4 4 4 5 5 7 9 ";
        let mut selections: Vec<Region> = (0..8).map(|i| Region::new(2 * i, 2 * i + 1)).collect();
        selections.push(Region::cursor(16));

        let mut buffer = TextBuffer::with_selections(text, selections.clone());
        commands().std_selections(&mut buffer, 0).unwrap();
        assert_eq!(buffer.contents(), "2 4 4 4 5 5 7 9 2");

        let mut buffer = TextBuffer::with_selections(text, selections);
        commands().std_selections(&mut buffer, 1).unwrap();
        assert!(buffer.contents().starts_with("2 4 4 4 5 5 7 9 2.138"));

        let mut buffer = TextBuffer::with_selections("3 ", regions(&[(0, 1), (2, 2)]));
        let report = commands().std_selections(&mut buffer, 1).unwrap();
        assert_eq!(report.applied(), 0);
        assert!(report.diagnostics()[0].message.contains("division by zero"));
    }

    #[test]
    fn test_increment_expands_cursor() {
        let mut buffer = TextBuffer::with_selections("width: 120px", vec![Region::cursor(8)]);
        commands().increment_number_at_cursor(&mut buffer, 1).unwrap();
        assert_eq!(buffer.contents(), "width: 121px");

        let mut buffer = TextBuffer::with_selections("-1", vec![Region::cursor(2)]);
        commands().increment_number_at_cursor(&mut buffer, -1).unwrap();
        assert_eq!(buffer.contents(), "-2");
    }

    #[test]
    fn test_increment_past_64_bits() {
        let mut buffer = TextBuffer::with_selections("id 9223372036854775807", vec![Region::cursor(5)]);
        let report = commands().increment_number_at_cursor(&mut buffer, 1).unwrap();
        assert_eq!(buffer.contents(), "id 9223372036854775808");
        assert!(report.is_clean());
    }

    #[test]
    fn test_increment_skips_non_numbers() {
        let mut buffer = TextBuffer::with_selections("abc 5", vec![Region::cursor(1), Region::cursor(5)]);
        let report = commands().increment_number_at_cursor(&mut buffer, 10).unwrap();
        assert_eq!(buffer.contents(), "abc 15");
        assert!(report.is_clean());
    }

    #[test]
    fn test_apply_custom_expression() {
        let mut buffer = TextBuffer::with_selections("3 4.5 abc", regions(&[(0, 1), (2, 5), (6, 9)]));
        let report = commands()
            .apply_custom_expression(&mut buffer, "x * 2")
            .unwrap();
        assert_eq!(buffer.contents(), "6 9 abcabc");
        assert_eq!(report.applied(), 3);
    }

    #[test]
    fn test_apply_rejects_unparsable_command() {
        let mut buffer = TextBuffer::with_selections("3", regions(&[(0, 1)]));
        let err = commands()
            .apply_custom_expression(&mut buffer, "x *")
            .unwrap_err();
        assert!(matches!(err, CommandError::Calc(CalcError::Syntax { .. })));
        assert_eq!(buffer.contents(), "3");
    }

    #[test]
    fn test_auto_copy() {
        let mut settings = Settings::default();
        settings.auto_copy = true;
        let mut commands = Commands::with_seed(settings, 1);
        let mut buffer = TextBuffer::with_selections("_ _", regions(&[(0, 1), (2, 3)]));
        commands.generate_sequence(&mut buffer, 1).unwrap();
        assert_eq!(buffer.clipboard(), Some("1\n2"));

        let mut buffer = TextBuffer::with_selections("_", regions(&[(0, 1)]));
        commands.evaluate_selection(&mut buffer, true, PromptMode::Never).unwrap();
        assert_eq!(buffer.clipboard(), None);
    }
}

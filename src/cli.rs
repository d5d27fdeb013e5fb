//! Command-line front end
//!
//! Applies one command to a document read from a file or stdin:
//! - Selections come from `--select START:END`, `--lines`, or the whole text
//! - The edited document goes to stdout, or back to the file with `--in-place`
//! - Diagnostics go to stderr

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::commands::{BatchReport, Commands, PromptMode};
use crate::config::Settings;
use crate::editor::{Host, Region, TerminalHost, TextBuffer};

/// Evaluate formulas and fill sequences in selected text
#[derive(Parser, Debug)]
#[command(name = "calculate", version, about = "Evaluate formulas and fill sequences in selected text")]
pub struct CliArgs {
    /// Document to operate on (stdin when absent)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Selection as character offsets; a single offset is a cursor
    #[arg(short, long = "select", global = true, value_name = "START:END")]
    pub select: Vec<Region>,

    /// Select every line
    #[arg(long, global = true, conflicts_with = "select")]
    pub lines: bool,

    /// Write the result back to --file instead of stdout
    #[arg(short, long, global = true, requires = "file")]
    pub in_place: bool,

    /// Settings file (defaults to ~/.config/calculate/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for random functions, for reproducible output
    #[arg(long, global = true, value_name = "N")]
    pub seed: Option<u64>,

    /// Print what the command did as JSON on stderr
    #[arg(long, global = true)]
    pub report: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate each selection as a formula
    Eval {
        /// Replace the formula instead of appending ` = result`
        #[arg(long)]
        replace: bool,

        /// Evaluate FORMULA and insert the result at every selection
        #[arg(long, value_name = "FORMULA")]
        expr: Option<String>,
    },
    /// Fill the selections with a sequence detected from the first one
    Count {
        /// Start value when the first selection is not a sequence seed
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        start: i64,
    },
    /// Sum the selected numbers into the one empty selection
    Sum,
    /// Average the selected numbers into the one empty selection
    Mean,
    /// Standard deviation of the selected numbers into the one empty selection
    Std {
        /// Delta degrees of freedom; the divisor is n - ddof
        #[arg(long, default_value_t = 0)]
        ddof: i64,
    },
    /// Add DELTA to the integer in or around each selection
    Increment {
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        delta: i64,
    },
    /// Replace each selection with EXPRESSION evaluated against its value
    Apply {
        /// Formula using the value symbol (default `x`)
        expression: String,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Change one setting and save it
    Set { key: String, value: String },
    /// Print the settings file location
    Path,
}

impl CliArgs {
    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(crate::config_paths::config_file)
    }

    fn load_settings(&self) -> Result<Settings> {
        match &self.config {
            Some(path) => Settings::load_from(path)
                .with_context(|| format!("Failed to load settings from {}", path.display())),
            None => Ok(Settings::load()),
        }
    }
}

/// Run the parsed command line.
pub fn run(args: CliArgs) -> Result<()> {
    let settings = args.load_settings()?;

    if let Command::Config { action } = &args.command {
        return run_config(&args, settings, action);
    }

    let text = read_document(&args)?;
    let mut buffer = TextBuffer::new(&text);
    let selections = initial_selections(&args, &buffer);
    buffer.set_selections(selections);
    if let Command::Eval {
        expr: Some(expr), ..
    } = &args.command
    {
        buffer.push_prompt_answer(expr.as_str());
    }

    let mut commands = match args.seed {
        Some(seed) => Commands::with_seed(settings, seed),
        None => Commands::new(settings),
    };
    let mut host = TerminalHost::new(buffer);
    let report = dispatch(&mut commands, &mut host, &args.command)?;
    tracing::debug!(
        applied = report.applied(),
        diagnostics = report.diagnostics().len(),
        "command finished"
    );
    if args.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        eprintln!("{json}");
    }

    write_document(&args, &host.into_buffer().contents())
}

fn dispatch<H: Host>(commands: &mut Commands, host: &mut H, command: &Command) -> Result<BatchReport> {
    let report = match command {
        Command::Eval { replace, expr } => {
            let prompt = if expr.is_some() {
                PromptMode::Always
            } else {
                PromptMode::Never
            };
            commands.evaluate_selection(host, *replace, prompt)
        }
        Command::Count { start } => commands.generate_sequence(host, *start),
        Command::Sum => commands.sum_selections(host),
        Command::Mean => commands.mean_selections(host),
        Command::Std { ddof } => commands.std_selections(host, *ddof),
        Command::Increment { delta } => commands.increment_number_at_cursor(host, *delta),
        Command::Apply { expression } => commands.apply_custom_expression(host, expression),
        Command::Config { .. } => bail!("config is not a document command"),
    };
    Ok(report?)
}

fn run_config(args: &CliArgs, mut settings: Settings, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => print!("{}", settings.to_toml()?),
        ConfigAction::Path => match args.config_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("No config directory available"),
        },
        ConfigAction::Set { key, value } => {
            settings.set(key, value)?;
            let path = match &args.config {
                Some(path) => {
                    settings.save_to(path)?;
                    path.clone()
                }
                None => settings.save()?,
            };
            eprintln!("Saved {key} to {}", path.display());
        }
    }
    Ok(())
}

/// Selections for a fresh document: explicit ones, every line, a cursor at
/// the end for `eval --expr`, or else the whole text.
pub fn initial_selections(args: &CliArgs, buffer: &TextBuffer) -> Vec<Region> {
    if args.lines {
        return buffer.line_regions();
    }
    if !args.select.is_empty() {
        return args.select.clone();
    }
    match args.command {
        Command::Eval { expr: Some(_), .. } => vec![Region::cursor(buffer.len_chars())],
        _ => vec![Region::new(0, buffer.len_chars())],
    }
}

fn read_document(args: &CliArgs) -> Result<String> {
    match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn write_document(args: &CliArgs, contents: &str) -> Result<()> {
    match (&args.file, args.in_place) {
        (Some(path), true) => std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display())),
        (None, true) => bail!("--in-place requires --file"),
        (_, false) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_selections() {
        let args = parse(&["calculate", "-s", "0:3", "--select", "5", "eval", "--replace"]);
        assert_eq!(args.select, vec![Region::new(0, 3), Region::cursor(5)]);
        assert!(matches!(args.command, Command::Eval { replace: true, expr: None }));
    }

    #[test]
    fn test_negative_values() {
        let args = parse(&["calculate", "increment", "--delta", "-5"]);
        assert!(matches!(args.command, Command::Increment { delta: -5 }));
        let args = parse(&["calculate", "count", "--start", "-1"]);
        assert!(matches!(args.command, Command::Count { start: -1 }));
    }

    #[test]
    fn test_in_place_requires_file() {
        assert!(CliArgs::try_parse_from(["calculate", "--in-place", "sum"]).is_err());
        assert!(CliArgs::try_parse_from(["calculate", "--lines", "-s", "1:2", "sum"]).is_err());
    }

    #[test]
    fn test_initial_selections() {
        let buffer = TextBuffer::new("1\n2\n");
        let args = parse(&["calculate", "--lines", "sum"]);
        assert_eq!(
            initial_selections(&args, &buffer),
            vec![Region::new(0, 1), Region::new(2, 3)]
        );

        let args = parse(&["calculate", "eval"]);
        assert_eq!(initial_selections(&args, &buffer), vec![Region::new(0, 4)]);

        let args = parse(&["calculate", "eval", "--expr", "1+1"]);
        assert_eq!(initial_selections(&args, &buffer), vec![Region::cursor(4)]);
    }

    #[test]
    fn test_dispatch_runs_command() {
        let mut buffer = TextBuffer::with_selections("2*21", vec![Region::new(0, 4)]);
        let mut commands = Commands::with_seed(Settings::default(), 0);
        let args = parse(&["calculate", "eval", "--replace"]);
        let report = dispatch(&mut commands, &mut buffer, &args.command).unwrap();
        assert_eq!(report.applied(), 1);
        assert_eq!(buffer.contents(), "42");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"], serde_json::json!(["42"]));
        assert_eq!(json["diagnostics"], serde_json::json!([]));
    }
}

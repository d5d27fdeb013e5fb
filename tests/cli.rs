//! Command-line parsing and document round trips

use calculate::cli::{self, CliArgs};
use clap::Parser;
use pretty_assertions::assert_eq;

fn run_on_file(text: &str, argv: &[&str]) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    std::fs::write(&path, text).unwrap();
    let config = dir.path().join("config.toml");

    let mut full = vec!["calculate", "--in-place", "--config", config.to_str().unwrap()];
    full.extend(["--file", path.to_str().unwrap()]);
    full.extend(argv);
    cli::run(CliArgs::try_parse_from(full).unwrap()).unwrap();
    std::fs::read_to_string(&path).unwrap()
}

#[test]
fn test_eval_lines_in_place() {
    let out = run_on_file("1+2\n3*4\n", &["--lines", "eval"]);
    assert_eq!(out, "1+2 = 3\n3*4 = 12\n");
}

#[test]
fn test_count_with_selections() {
    let out = run_on_file("a: _\nb: _\n", &["-s", "3:4", "-s", "8:9", "count", "--start", "0"]);
    assert_eq!(out, "a: 0\nb: 1\n");
}

#[test]
fn test_sum_into_cursor() {
    let out = run_on_file("2\n3\n=", &["-s", "0:1", "-s", "2:3", "-s", "5", "sum"]);
    assert_eq!(out, "2\n3\n=5");
}

#[test]
fn test_eval_expr_appends_at_end() {
    let out = run_on_file("answer: ", &["eval", "--expr", "6*7"]);
    assert_eq!(out, "answer: 42");
}

#[test]
fn test_increment_negative_delta() {
    let out = run_on_file("v10", &["-s", "2", "increment", "--delta", "-20"]);
    assert_eq!(out, "v-10");
}

#[test]
fn test_apply_expression() {
    let out = run_on_file("1\n2\n", &["--lines", "apply", "x ** 2 + i"]);
    assert_eq!(out, "1\n5\n");
}

#[test]
fn test_config_set_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let argv = ["calculate", "--config", config.to_str().unwrap(), "config", "set", "count_symbol", "total"];
    cli::run(CliArgs::try_parse_from(argv).unwrap()).unwrap();

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("count_symbol = \"total\""));

    let argv = ["calculate", "--config", config.to_str().unwrap(), "config", "set", "color", "red"];
    assert!(cli::run(CliArgs::try_parse_from(argv).unwrap()).is_err());
}

#[test]
fn test_bad_region_is_a_parse_error() {
    assert!(CliArgs::try_parse_from(["calculate", "-s", "1:x", "sum"]).is_err());
}

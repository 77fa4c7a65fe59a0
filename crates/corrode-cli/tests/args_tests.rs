use crate::args::{CliArgs, ColorChoice, Command, Emit};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

#[test]
fn test_cli_definition_is_consistent() {
    CliArgs::command().debug_assert();
}

#[test]
fn test_resolve_takes_files_and_emit() {
    let args = CliArgs::try_parse_from(["corrode", "resolve", "a.json", "b.json", "--emit", "tree"]).unwrap();
    let Command::Resolve(resolve) = args.command else {
        panic!("expected resolve");
    };
    assert_eq!(resolve.files, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
    assert_eq!(resolve.emit, Emit::Tree);
}

#[test]
fn test_resolve_defaults_to_diagnostics() {
    let args = CliArgs::try_parse_from(["corrode", "resolve", "a.json"]).unwrap();
    let Command::Resolve(resolve) = args.command else {
        panic!("expected resolve");
    };
    assert_eq!(resolve.emit, Emit::Diagnostics);
    assert_eq!(args.color, ColorChoice::Auto);
    assert!(args.config.is_none());
}

#[test]
fn test_resolve_requires_files() {
    assert!(CliArgs::try_parse_from(["corrode", "resolve"]).is_err());
}

#[test]
fn test_stack_arguments() {
    let args = CliArgs::try_parse_from([
        "corrode", "stack", "snap.json", "--thread", "3", "--frame", "2", "--json",
    ])
    .unwrap();
    let Command::Stack(stack) = args.command else {
        panic!("expected stack");
    };
    assert_eq!(stack.snapshot, PathBuf::from("snap.json"));
    assert_eq!(stack.thread, 3);
    assert_eq!(stack.frame, Some(2));
    assert!(stack.json);
}

#[test]
fn test_stack_requires_thread() {
    assert!(CliArgs::try_parse_from(["corrode", "stack", "snap.json"]).is_err());
}

#[test]
fn test_global_options_after_subcommand() {
    let args = CliArgs::try_parse_from([
        "corrode", "stack", "snap.json", "-t", "1", "--config", "corrode.json", "--color", "never",
    ])
    .unwrap();
    assert_eq!(args.config, Some(PathBuf::from("corrode.json")));
    assert_eq!(args.color, ColorChoice::Never);
}

#[test]
fn test_color_choice() {
    assert!(ColorChoice::Auto.enabled(true));
    assert!(!ColorChoice::Auto.enabled(false));
    assert!(ColorChoice::Always.enabled(false));
    assert!(!ColorChoice::Never.enabled(true));
}

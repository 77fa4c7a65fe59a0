#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;

use corrode_cli::args::{CliArgs, Command, Emit, ResolveArgs, StackArgs};
use corrode_cli::config::{CorrodeConfig, load_or_default};
use corrode_cli::driver;
use corrode_cli::reporter::Reporter;
use corrode_coroutine::ThreadId;

const EXIT_SUCCESS: u8 = 0;
const EXIT_DIAGNOSTICS: u8 = 1;
const EXIT_NOT_RECONSTRUCTED: u8 = 2;

fn main() -> Result<ExitCode> {
    // Zero cost unless CORRODE_LOG or RUST_LOG is set.
    corrode_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let config = load_or_default(args.config.as_deref())?;

    let code = match &args.command {
        Command::Resolve(resolve) => {
            let reporter = Reporter::new(args.color.enabled(std::io::stderr().is_terminal()));
            run_resolve(resolve, &config, &reporter)?
        }
        Command::Stack(stack) => {
            let reporter = Reporter::new(args.color.enabled(std::io::stdout().is_terminal()));
            run_stack(stack, &config, &reporter)?
        }
    };
    Ok(ExitCode::from(code))
}

fn run_resolve(args: &ResolveArgs, config: &CorrodeConfig, reporter: &Reporter) -> Result<u8> {
    let files = driver::read_sources(&args.files)?;
    let run = driver::resolve(files, &config.resolve)?;

    if args.emit == Emit::Tree {
        let trees: Vec<_> = run.files.iter().map(|resolved| &resolved.file).collect();
        let json = serde_json::to_string_pretty(&trees).context("failed to serialize resolved trees")?;
        println!("{json}");
    }

    let diagnostics = reporter.render_diagnostics(run.diagnostics());
    if !diagnostics.is_empty() {
        eprintln!("{diagnostics}");
    }
    eprintln!("{}", reporter.render_summary(&run));

    Ok(if run.has_errors() {
        EXIT_DIAGNOSTICS
    } else {
        EXIT_SUCCESS
    })
}

fn run_stack(args: &StackArgs, config: &CorrodeConfig, reporter: &Reporter) -> Result<u8> {
    let process = driver::read_snapshot(&args.snapshot)?;
    let thread = ThreadId(args.thread);
    let Some(frame) = driver::reconstruct(&process, &config.reconstruction, thread, args.frame)? else {
        eprintln!("{thread}: no coroutine boundary to reconstruct");
        return Ok(EXIT_NOT_RECONSTRUCTED);
    };

    if args.json {
        let json = serde_json::to_string_pretty(&frame).context("failed to serialize frame")?;
        println!("{json}");
    } else {
        println!("{}", reporter.render_frame(&frame));
    }
    Ok(EXIT_SUCCESS)
}

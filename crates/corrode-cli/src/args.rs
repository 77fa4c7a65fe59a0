use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the corrode binary.
#[derive(Parser, Debug)]
#[command(
    name = "corrode",
    version,
    about = "Declaration type resolution and coroutine stack reconstruction"
)]
pub struct CliArgs {
    /// JSON configuration file with `resolve` and `reconstruction` sections.
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// When to color human-readable output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve type references in JSON declaration trees.
    Resolve(ResolveArgs),
    /// Reconstruct the logical coroutine stack of a suspended thread.
    Stack(StackArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Source files as JSON, each a file object or an array of them.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// What to print on stdout.
    #[arg(long, value_enum, default_value_t = Emit::Diagnostics)]
    pub emit: Emit,
}

#[derive(Args, Debug)]
pub struct StackArgs {
    /// Process snapshot as JSON.
    pub snapshot: PathBuf,

    /// Thread to reconstruct.
    #[arg(short = 't', long)]
    pub thread: u32,

    /// Depth of the boundary frame. Defaults to the topmost boundary.
    #[arg(short = 'f', long)]
    pub frame: Option<usize>,

    /// Print the composite frame as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// Diagnostics only.
    Diagnostics,
    /// The resolved trees as JSON, then diagnostics on stderr.
    Tree,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            ColorChoice::Auto => is_terminal,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

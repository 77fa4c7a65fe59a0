//! Tracing configuration.
//!
//! Nothing is installed unless `CORRODE_LOG` or `RUST_LOG` holds filter
//! directives; `CORRODE_LOG` wins when both are set. `CORRODE_LOG_FORMAT`
//! picks the layout:
//!
//! ```bash
//! CORRODE_LOG=debug CORRODE_LOG_FORMAT=tree corrode stack snapshot.json --thread 1
//! CORRODE_LOG="corrode_resolve=trace" corrode resolve shapes.json
//! ```
//!
//! Output always goes to stderr; stdout is reserved for trees and frames.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const LOG_VAR: &str = "CORRODE_LOG";
const FORMAT_VAR: &str = "CORRODE_LOG_FORMAT";

/// Layout of trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Flat `tracing-subscriber` lines, one per event (default).
    Text,
    /// Indented spans via `tracing-tree`. Scope pushes and chain steps nest
    /// under the file, class or frame that caused them.
    Tree,
    /// Newline-delimited JSON, one object per span or event.
    Json,
}

impl LogFormat {
    /// Case-insensitive; anything unrecognised is `Text`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// The directives to filter with, from the corrode variable first.
pub fn filter_directives<'v>(
    corrode_log: Option<&'v str>,
    rust_log: Option<&'v str>,
) -> Option<&'v str> {
    corrode_log.or(rust_log)
}

/// Install the global subscriber when a filter is configured.
pub fn init_tracing() {
    let corrode_log = std::env::var(LOG_VAR).ok();
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let Some(directives) = filter_directives(corrode_log.as_deref(), rust_log.as_deref()) else {
        return;
    };
    let filter = EnvFilter::builder().parse_lossy(directives);
    let format = LogFormat::parse(&std::env::var(FORMAT_VAR).unwrap_or_default());

    let registry = Registry::default().with(filter);
    match format {
        LogFormat::Tree => registry
            .with(
                tracing_tree::HierarchicalLayer::default()
                    .with_indent_amount(2)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_targets(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

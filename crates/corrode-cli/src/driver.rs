//! The two pipelines run over files on disk.

use anyhow::{Context, Result, bail};
use corrode_common::Diagnostic;
use corrode_coroutine::{
    DebugBackend, ExecutionContext, InMemoryProcess, PreflightFrameBuilder, PreflightStackFrame,
    ReconstructionOptions, ThreadId,
};
use corrode_resolve::{DeclarationIndex, ResolveOptions, ResolvedFile, SourceFile, resolve_files};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// =============================================================================
// Resolution
// =============================================================================

/// A JSON source document holds one file or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceDocument {
    Many(Vec<SourceFile>),
    One(Box<SourceFile>),
}

pub fn parse_sources(source: &str) -> Result<Vec<SourceFile>> {
    let document: SourceDocument =
        serde_json::from_str(source).context("failed to parse source file JSON")?;
    Ok(match document {
        SourceDocument::Many(files) => files,
        SourceDocument::One(file) => vec![*file],
    })
}

pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for path in paths {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source: {}", path.display()))?;
        let parsed = parse_sources(&source)
            .with_context(|| format!("failed to load source: {}", path.display()))?;
        debug!(path = %path.display(), files = parsed.len(), "loaded sources");
        files.extend(parsed);
    }
    Ok(files)
}

pub struct ResolveRun {
    pub files: Vec<ResolvedFile>,
}

impl ResolveRun {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|file| file.diagnostics.iter())
    }

    pub fn has_errors(&self) -> bool {
        self.files.iter().any(ResolvedFile::has_errors)
    }
}

/// Index every file's declarations, then resolve each file against it.
pub fn resolve(files: Vec<SourceFile>, options: &ResolveOptions) -> Result<ResolveRun> {
    let index = DeclarationIndex::from_files(&files, options);
    let files = resolve_files(files, &index, options).context("type resolution aborted")?;
    info!(files = files.len(), "resolution finished");
    Ok(ResolveRun { files })
}

// =============================================================================
// Stack reconstruction
// =============================================================================

pub fn read_snapshot(path: &Path) -> Result<InMemoryProcess> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
    InMemoryProcess::from_json(&source)
        .with_context(|| format!("failed to parse snapshot: {}", path.display()))
}

/// The composite frame for `thread`, at the frame of depth `depth` or at
/// the topmost dispatch boundary. `None` when that frame is not a
/// recoverable boundary.
pub fn reconstruct(
    process: &InMemoryProcess,
    options: &ReconstructionOptions,
    thread: ThreadId,
    depth: Option<usize>,
) -> Result<Option<PreflightStackFrame>> {
    let frames = process
        .enumerate_frames(thread)
        .with_context(|| format!("cannot list the frames of {thread}"))?;
    let builder = PreflightFrameBuilder::new(ExecutionContext::new(process, process, options));
    match depth {
        None => Ok(builder.reconstruct_thread(thread)),
        Some(depth) => {
            let Some(frame) = frames.iter().find(|frame| frame.depth == depth) else {
                bail!("{thread} has no frame at depth {depth}");
            };
            Ok(builder.coroutine_exit_frame(frame))
        }
    }
}

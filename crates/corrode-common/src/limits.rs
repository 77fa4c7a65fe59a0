//! Centralized limits and thresholds.
//!
//! Both pipelines walk structures that are acyclic in well-formed input but
//! may be cyclic in practice: type aliases written by users, and completion
//! links read out of a live process. Every such walk is bounded by one of the
//! constants below rather than by a magic number at the call site.

// =============================================================================
// Type Resolution
// =============================================================================

/// Maximum number of alias hops while expanding a type alias chain.
///
/// Cycles are detected separately through a visited set; this bound only
/// protects against absurdly long (but acyclic) chains produced by generated
/// code.
///
/// ```text
/// typealias A = B
/// typealias B = C
/// // ... 64 more hops ...
/// class Z
/// ```
pub const MAX_ALIAS_EXPANSION_DEPTH: u32 = 64;

/// Maximum number of superclasses visited when collecting inherited
/// nested-classifier scopes for a class.
pub const MAX_SUPERCLASS_WALK: u32 = 256;

/// Maximum nesting depth of class declarations the transformer descends into.
///
/// Deeper nesting is an invariant violation rather than a resolution error.
pub const MAX_CLASS_NESTING_DEPTH: u32 = 512;

// =============================================================================
// Coroutine Stack Reconstruction
// =============================================================================

/// Default cap on completion links followed from one continuation.
///
/// Completion graphs read from a running process are acyclic in a healthy
/// runtime, but a corrupted heap or a racing resume can produce a cycle or a
/// very long chain. The walker also keeps an identity set, so this is the
/// last line of defence against pathological non-repeating chains.
pub const MAX_CONTINUATION_CHAIN_STEPS: usize = 4_096;

/// Maximum number of physical frames inspected per thread.
pub const MAX_THREAD_FRAMES: usize = 8_192;

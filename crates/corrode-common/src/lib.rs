//! Common types and utilities for the corrode toolchain.
//!
//! This crate provides foundational types shared by the resolution pass and
//! the coroutine stack reconstructor:
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, codes and message templates)
//! - Centralized limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Diagnostics - structured, position-carrying messages
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticMessage, diagnostic_codes, diagnostic_messages,
    format_message,
};

// Centralized limits and thresholds
pub mod limits;

//! Configuration for stack reconstruction.

use corrode_common::limits::MAX_CONTINUATION_CHAIN_STEPS;
use serde::{Deserialize, Serialize};

/// Names of the runtime's layout plus walk limits.
///
/// The defaults match the standard coroutine runtime; a backend for a
/// different runtime only needs to adjust the names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconstructionOptions {
    /// Upper bound on continuation links followed per walk.
    pub max_chain_steps: usize,
    /// Field holding a continuation's completion link.
    pub completion_field: String,
    /// Field holding the (off by one) suspension label.
    pub label_field: String,
    /// Local variable slot holding the continuation in suspend functions.
    pub continuation_local: String,
    /// Accessor whose frame marks a thread that is suspending, not resuming.
    pub suspended_marker_method: String,
    pub invoke_suspend_method: String,
    pub resume_with_method: String,
    /// Zero-argument accessor giving the root object's display name.
    pub name_accessor: Option<String>,
    /// Dump real and restored frames at debug level.
    pub trace_frames: bool,
}

impl Default for ReconstructionOptions {
    fn default() -> Self {
        ReconstructionOptions {
            max_chain_steps: MAX_CONTINUATION_CHAIN_STEPS,
            completion_field: "completion".to_string(),
            label_field: "label".to_string(),
            continuation_local: "$continuation".to_string(),
            suspended_marker_method: "getCOROUTINE_SUSPENDED".to_string(),
            invoke_suspend_method: "invokeSuspend".to_string(),
            resume_with_method: "resumeWith".to_string(),
            name_accessor: Some("toString".to_string()),
            trace_frames: false,
        }
    }
}

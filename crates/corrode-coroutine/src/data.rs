//! Snapshots produced by a reconstruction.

use crate::backend::{ObjectId, TypeId, Value};
use crate::context::ExecutionContext;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use tracing::trace;

/// Source position a continuation will resume at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeLocation {
    /// The class the location was found in, as loaded in the debuggee.
    pub declaring_type: TypeId,
    pub class_name: String,
    pub method_name: String,
    pub source_file: String,
    pub line: i32,
}

impl fmt::Display for ResumeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({}:{})",
            self.class_name, self.method_name, self.source_file, self.line
        )
    }
}

/// A local variable the state machine moved into a continuation field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpilledVariable {
    pub field_name: String,
    pub name: String,
    pub value: Value,
}

pub type SpilledVariables = SmallVec<[SpilledVariable; 4]>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalStackFrameItem {
    pub continuation: ObjectId,
    pub location: ResumeLocation,
    pub spilled_variables: SpilledVariables,
}

impl fmt::Display for LogicalStackFrameItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.location, self.continuation)
    }
}

/// The logical stack of one coroutine, innermost frame first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoroutineInfoData {
    /// The object the completion chain ended at.
    pub root: ObjectId,
    pub root_type_name: Option<String>,
    pub name: Option<String>,
    pub stack_trace: Vec<LogicalStackFrameItem>,
}

impl CoroutineInfoData {
    /// Describe the chain ending at `root`, whose frames were collected
    /// into `stack_trace`.
    pub fn lookup(
        root: ObjectId,
        stack_trace: Vec<LogicalStackFrameItem>,
        ctx: ExecutionContext<'_>,
    ) -> Self {
        let root_type_name = ctx
            .backend
            .object_type(root)
            .and_then(|ty| ctx.backend.type_name(ty))
            .inspect_err(|err| trace!(%root, error = %err, "root type unavailable"))
            .ok();
        let name = ctx.options.name_accessor.as_deref().and_then(|accessor| {
            match ctx.backend.call_accessor(root, accessor) {
                Ok(Value::Str(name)) => Some(name),
                Ok(_) => None,
                Err(err) => {
                    trace!(%root, error = %err, "root name unavailable");
                    None
                }
            }
        });
        CoroutineInfoData {
            root,
            root_type_name,
            name,
            stack_trace,
        }
    }

    pub fn top_restored_frame(&self) -> Option<&LogicalStackFrameItem> {
        self.stack_trace.first()
    }
}

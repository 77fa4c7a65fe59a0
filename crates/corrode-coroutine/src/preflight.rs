//! The composite frame shown in place of a coroutine's dispatch boundary.
//!
//! A resumed coroutine's physical stack only shows the innermost
//! continuation's `invokeSuspend`; its callers are gone, parked in the
//! completion chain. [`PreflightFrameBuilder`] recovers that chain and
//! fuses it with the boundary frame into one [`PreflightStackFrame`].

use crate::backend::{ObjectId, PhysicalFrame, ThreadId, Value};
use crate::chain::ContinuationChainWalker;
use crate::classifier::{EntryKind, PhysicalFrameClassifier};
use crate::context::ExecutionContext;
use crate::data::{CoroutineInfoData, ResumeLocation};
use crate::manager::ManagerThread;
use serde::Serialize;
use tracing::{Level, debug, span, warn};

// =============================================================================
// Frame model
// =============================================================================

/// What the composite frame displays as its position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameDescriptor {
    /// The first restored logical frame, shown over the real frame.
    Restored {
        location: ResumeLocation,
        frame: PhysicalFrame,
    },
    /// No logical frame was restored; the real boundary frame.
    Real { frame: PhysicalFrame },
}

impl FrameDescriptor {
    /// The physical frame backing the descriptor.
    pub fn physical(&self) -> &PhysicalFrame {
        match self {
            FrameDescriptor::Restored { frame, .. } | FrameDescriptor::Real { frame } => frame,
        }
    }

    pub fn line(&self) -> i32 {
        match self {
            FrameDescriptor::Restored { location, .. } => location.line,
            FrameDescriptor::Real { frame } => frame.line,
        }
    }

    pub fn method_name(&self) -> &str {
        match self {
            FrameDescriptor::Restored { location, .. } => &location.method_name,
            FrameDescriptor::Real { frame } => &frame.method.name,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrigin {
    Spilled,
    This,
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FrameChild {
    pub name: String,
    pub value: Value,
    pub origin: ChildOrigin,
}

/// Receives a frame's children in batches, like a tree node being filled.
pub trait ChildrenSink {
    /// `last` is set on the final batch.
    fn add_children(&mut self, children: Vec<FrameChild>, last: bool);
}

impl ChildrenSink for Vec<FrameChild> {
    fn add_children(&mut self, children: Vec<FrameChild>, _last: bool) {
        self.extend(children);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightStackFrame {
    pub coroutine_info: CoroutineInfoData,
    pub descriptor: FrameDescriptor,
    /// The boundary frame and everything below it.
    pub thread_pre_coroutine_frames: Vec<PhysicalFrame>,
}

impl PreflightStackFrame {
    pub fn is_synthetic(&self) -> bool {
        false
    }

    pub fn is_in_library_content(&self) -> bool {
        false
    }

    /// The first restored frame's spilled variables, then the physical
    /// frame's receiver and locals.
    pub fn compute_children(&self, sink: &mut dyn ChildrenSink) {
        if let Some(first) = self.coroutine_info.top_restored_frame() {
            let spilled = first
                .spilled_variables
                .iter()
                .map(|variable| FrameChild {
                    name: variable.name.clone(),
                    value: variable.value.clone(),
                    origin: ChildOrigin::Spilled,
                })
                .collect();
            sink.add_children(spilled, false);
        }

        let physical = self.descriptor.physical();
        let receiver = physical.this_object.map(|this| FrameChild {
            name: "this".to_string(),
            value: Value::Object(this),
            origin: ChildOrigin::This,
        });
        let locals = physical.locals.iter().map(|local| FrameChild {
            name: local.name.clone(),
            value: local.value.clone(),
            origin: ChildOrigin::Local,
        });
        sink.add_children(receiver.into_iter().chain(locals).collect(), true);
    }

    pub fn children(&self) -> Vec<FrameChild> {
        let mut children = Vec::new();
        self.compute_children(&mut children);
        children
    }
}

// =============================================================================
// Builder
// =============================================================================

pub struct PreflightFrameBuilder<'b> {
    ctx: ExecutionContext<'b>,
    classifier: PhysicalFrameClassifier<'b>,
}

impl<'b> PreflightFrameBuilder<'b> {
    pub fn new(ctx: ExecutionContext<'b>) -> Self {
        Self {
            ctx,
            classifier: PhysicalFrameClassifier::new(ctx),
        }
    }

    /// The composite frame for `frame`, if it is a dispatch boundary whose
    /// coroutine can be recovered.
    pub fn coroutine_exit_frame(&self, frame: &PhysicalFrame) -> Option<PreflightStackFrame> {
        ManagerThread::invoke(|| {
            let _span = span!(Level::DEBUG, "coroutine_exit_frame", thread = %frame.thread, depth = frame.depth)
                .entered();
            let kind = self.classifier.boundary_kind(frame)?;
            if self.ctx.options.trace_frames {
                debug!(?kind, frame = %format_frame(frame), "entry frame found");
            }
            let frames = match self.ctx.backend.enumerate_frames(frame.thread) {
                Ok(frames) => frames,
                Err(err) => {
                    warn!(error = %err, "thread frames unavailable");
                    return None;
                }
            };
            let index = frames.iter().position(|f| f.depth == frame.depth)?;
            let left = self.classifier.left_thread_stack(&frames, index)?;
            self.lookup_continuation(frame, left)
        })
    }

    /// Reconstruct the topmost coroutine boundary of `thread`.
    pub fn reconstruct_thread(&self, thread: ThreadId) -> Option<PreflightStackFrame> {
        ManagerThread::invoke(|| {
            let frames = match self.ctx.backend.enumerate_frames(thread) {
                Ok(frames) => frames,
                Err(err) => {
                    warn!(%thread, error = %err, "thread frames unavailable");
                    return None;
                }
            };
            let boundary = self.classifier.find_boundary(&frames)?;
            self.coroutine_exit_frame(&frames[boundary])
        })
    }

    /// Walk the chain of the continuation `frame` runs for.
    pub fn lookup_continuation(
        &self,
        frame: &PhysicalFrame,
        frames_left: Vec<PhysicalFrame>,
    ) -> Option<PreflightStackFrame> {
        ManagerThread::assert_is_manager_thread();
        if !self.ctx.backend.is_thread_suspended(frame.thread) {
            debug!(thread = %frame.thread, "thread not suspended");
            return None;
        }
        let continuation = self.continuation_of(frame)?;
        let info = ContinuationChainWalker::new(self.ctx).walk(continuation);
        Some(self.preflight(frame, info, frames_left))
    }

    pub fn preflight(
        &self,
        frame: &PhysicalFrame,
        coroutine_info: CoroutineInfoData,
        frames_left: Vec<PhysicalFrame>,
    ) -> PreflightStackFrame {
        let descriptor = match coroutine_info.top_restored_frame() {
            Some(top) => FrameDescriptor::Restored {
                location: top.location.clone(),
                frame: frame.clone(),
            },
            None => FrameDescriptor::Real {
                frame: frame.clone(),
            },
        };
        if self.ctx.options.trace_frames {
            dump_frames(frame, &coroutine_info);
        }
        PreflightStackFrame {
            coroutine_info,
            descriptor,
            thread_pre_coroutine_frames: frames_left,
        }
    }

    fn continuation_of(&self, frame: &PhysicalFrame) -> Option<ObjectId> {
        match self.classifier.entry_kind(frame)? {
            EntryKind::SuspendLambda => frame.this_object,
            EntryKind::SuspendFunction => frame
                .local(&self.ctx.options.continuation_local)
                .and_then(Value::as_object),
        }
    }
}

pub fn format_frame(frame: &PhysicalFrame) -> String {
    format!(
        "{}:{} ({}) #{}",
        frame.method.name,
        frame.line,
        frame.source_file.as_deref().unwrap_or("<unknown>"),
        frame.depth
    )
}

fn dump_frames(frame: &PhysicalFrame, coroutine_info: &CoroutineInfoData) {
    debug!("real frame: {}", format_frame(frame));
    for item in &coroutine_info.stack_trace {
        debug!("\trestored: {item}");
    }
}

#[cfg(test)]
#[path = "../tests/preflight_tests.rs"]
mod tests;

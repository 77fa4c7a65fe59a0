//! Classification of physical frames around the coroutine dispatch loop.
//!
//! When the runtime resumes a coroutine, the thread stack shows the
//! dispatch loop calling `resumeWith`, which calls `invokeSuspend` of the
//! innermost continuation. That frame is the boundary: above it run the
//! resumed coroutine's frames, below it the frames that were on the thread
//! before the coroutine took over.

use crate::backend::PhysicalFrame;
use crate::context::ExecutionContext;
use corrode_common::limits::MAX_THREAD_FRAMES;
use serde::Serialize;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// `invokeSuspend` of a continuation.
    PreFlight,
    /// `resumeWith` of a continuation.
    PreExit,
}

/// How a frame holds the continuation it runs for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// The continuation is the captured `this`.
    SuspendLambda,
    /// The continuation sits in a local slot.
    SuspendFunction,
}

pub struct PhysicalFrameClassifier<'b> {
    ctx: ExecutionContext<'b>,
}

impl<'b> PhysicalFrameClassifier<'b> {
    pub fn new(ctx: ExecutionContext<'b>) -> Self {
        Self { ctx }
    }

    pub fn boundary_kind(&self, frame: &PhysicalFrame) -> Option<BoundaryKind> {
        let options = self.ctx.options;
        let kind = if frame.method.name == options.invoke_suspend_method {
            BoundaryKind::PreFlight
        } else if frame.method.name == options.resume_with_method {
            BoundaryKind::PreExit
        } else {
            return None;
        };
        self.ctx
            .is_well_known_subtype(frame.method.declaring_type, |known| known.base_continuation)
            .then_some(kind)
    }

    /// Index of the topmost boundary frame.
    pub fn find_boundary(&self, frames: &[PhysicalFrame]) -> Option<usize> {
        frames
            .iter()
            .take(MAX_THREAD_FRAMES)
            .position(|frame| self.boundary_kind(frame).is_some())
    }

    pub fn is_suspended_marker(&self, frame: &PhysicalFrame) -> bool {
        frame.method.name == self.ctx.options.suspended_marker_method
    }

    /// Frames from `boundary` to the bottom of the stack, unless a
    /// suspended-marker frame is anywhere on the thread: then a coroutine is
    /// on its way out and the stack cannot be split at any boundary.
    pub fn left_thread_stack(
        &self,
        frames: &[PhysicalFrame],
        boundary: usize,
    ) -> Option<Vec<PhysicalFrame>> {
        if boundary >= frames.len() {
            return None;
        }
        let marker = frames
            .iter()
            .take(MAX_THREAD_FRAMES)
            .find(|f| self.is_suspended_marker(f));
        if let Some(marker) = marker {
            trace!(depth = marker.depth, boundary, "suspended marker on thread");
            return None;
        }
        Some(frames[boundary..].to_vec())
    }

    /// Boundary index and the frames from it onward.
    pub fn split(&self, frames: &[PhysicalFrame]) -> Option<(usize, Vec<PhysicalFrame>)> {
        let boundary = self.find_boundary(frames)?;
        let left = self.left_thread_stack(frames, boundary)?;
        Some((boundary, left))
    }

    pub fn entry_kind(&self, frame: &PhysicalFrame) -> Option<EntryKind> {
        let method = &frame.method;
        if method.name == self.ctx.options.invoke_suspend_method
            && self
                .ctx
                .is_well_known_subtype(method.declaring_type, |known| known.suspend_lambda)
        {
            return Some(EntryKind::SuspendLambda);
        }
        let takes_continuation = method
            .parameter_types
            .last()
            .is_some_and(|&last| self.ctx.is_well_known_subtype(last, |known| known.continuation));
        takes_continuation.then_some(EntryKind::SuspendFunction)
    }

    /// Synthetic `invokeSuspend` frames carry a negative line and are not
    /// shown to users.
    pub fn is_hidden_frame(&self, frame: &PhysicalFrame) -> bool {
        frame.method.name == self.ctx.options.invoke_suspend_method && frame.line < 0
    }
}

#[cfg(test)]
#[path = "../tests/classifier_tests.rs"]
mod tests;

//! Following completion links from a continuation to its root.

use crate::backend::ObjectId;
use crate::context::ExecutionContext;
use crate::data::{CoroutineInfoData, LogicalStackFrameItem};
use crate::manager::ManagerThread;
use crate::mirror::FrameMirror;
use rustc_hash::FxHashSet;
use tracing::{Level, debug, span, trace, warn};

/// Walks a completion chain innermost-first.
///
/// The completion graph lives in another process and is not trusted to be
/// a chain: the walk keeps a visited set and stops after
/// `ReconstructionOptions::max_chain_steps` links.
pub struct ContinuationChainWalker<'b> {
    ctx: ExecutionContext<'b>,
}

impl<'b> ContinuationChainWalker<'b> {
    pub fn new(ctx: ExecutionContext<'b>) -> Self {
        Self { ctx }
    }

    pub fn walk(&self, initial: ObjectId) -> CoroutineInfoData {
        ManagerThread::invoke(|| {
            let _span = span!(Level::DEBUG, "walk_continuation_chain", %initial).entered();
            let (root, stack_trace) = self.collect(FrameMirror::new(initial, self.ctx));
            debug!(%root, frames = stack_trace.len(), "continuation chain walked");
            CoroutineInfoData::lookup(root, stack_trace, self.ctx)
        })
    }

    fn collect(&self, initial: FrameMirror<'b>) -> (ObjectId, Vec<LogicalStackFrameItem>) {
        let max_steps = self.ctx.options.max_chain_steps;
        let mut visited: FxHashSet<ObjectId> = FxHashSet::default();
        let mut frames = Vec::new();
        let mut current = initial;

        while current.is_continuation() {
            if visited.len() >= max_steps {
                warn!(max_steps, "continuation chain longer than the step limit");
                break;
            }
            if !visited.insert(current.object()) {
                warn!(object = %current.object(), "cycle in continuation chain");
                break;
            }

            match current.resume_location() {
                Some(location) => frames.push(LogicalStackFrameItem {
                    continuation: current.object(),
                    location,
                    spilled_variables: current.spilled_variables(),
                }),
                None => trace!(object = %current.object(), "no resolvable location"),
            }

            match current.completion() {
                Some(next) => current = next,
                None => break,
            }
        }
        (current.object(), frames)
    }
}

#[cfg(test)]
#[path = "../tests/chain_tests.rs"]
mod tests;

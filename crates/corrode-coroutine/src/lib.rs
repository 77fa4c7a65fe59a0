//! Logical stack reconstruction for suspended coroutines.
//!
//! A coroutine compiled to a state machine loses its callers from the
//! thread stack once it suspends; they survive only as a chain of
//! continuation objects linked through their `completion` fields. This
//! crate reads that chain out of a suspended debuggee and presents it as a
//! single composite frame at the point where the runtime's dispatch loop
//! resumed the coroutine.
//!
//! Organization:
//! - `backend` - introspection capability traits and identities
//! - `manager` - the manager-thread guard
//! - `metadata` - continuation debug metadata decoding
//! - `mirror` - `FrameMirror`, one continuation object
//! - `chain` - `ContinuationChainWalker`
//! - `classifier` - `PhysicalFrameClassifier`
//! - `preflight` - `PreflightFrameBuilder` and the composite frame
//! - `memory` - an in-memory debuggee

pub mod backend;
pub use backend::{
    DebugBackend, IntrospectionError, LocalVariable, MetadataLookup, MethodRef, ObjectId,
    PhysicalFrame, ThreadId, TypeId, Value, WellKnownTypes,
};

pub mod manager;
pub use manager::ManagerThread;

pub mod options;
pub use options::ReconstructionOptions;

pub mod context;
pub use context::ExecutionContext;

pub mod metadata;
pub use metadata::{FieldVariable, RawDebugMetadata, StackTraceElement};

pub mod data;
pub use data::{CoroutineInfoData, LogicalStackFrameItem, ResumeLocation, SpilledVariable, SpilledVariables};

pub mod mirror;
pub use mirror::FrameMirror;

pub mod chain;
pub use chain::ContinuationChainWalker;

pub mod classifier;
pub use classifier::{BoundaryKind, EntryKind, PhysicalFrameClassifier};

pub mod preflight;
pub use preflight::{
    ChildOrigin, ChildrenSink, FrameChild, FrameDescriptor, PreflightFrameBuilder, PreflightStackFrame,
    format_frame,
};

pub mod memory;
pub use memory::{Fault, InMemoryProcess, ObjectRecord, ThreadRecord, TypeRecord};

#[cfg(test)]
#[path = "../tests/test_fixtures.rs"]
pub mod test_fixtures;

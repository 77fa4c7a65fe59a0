//! The live-process introspection capability.
//!
//! Reconstruction never talks to a debuggee directly. Everything it needs
//! from the suspended process goes through [`DebugBackend`] (objects, types,
//! threads) and [`MetadataLookup`] (compiler-emitted continuation metadata),
//! so the walker and classifier run unchanged against a real debugger
//! connection or the in-memory snapshot used by tests and the CLI.

use crate::metadata::RawDebugMetadata;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Identities and values
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thread#{}", self.0)
    }
}

/// A value read out of the debuggee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Object(ObjectId),
}

impl Value {
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Object(id) => write!(f, "{id}"),
        }
    }
}

// =============================================================================
// Physical frames
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRef {
    pub declaring_type: TypeId,
    pub name: String,
    #[serde(default)]
    pub parameter_types: SmallVec<[TypeId; 4]>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariable {
    pub name: String,
    pub value: Value,
}

/// One frame of a suspended thread's physical stack. Depth 0 is the top.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalFrame {
    pub thread: ThreadId,
    pub depth: usize,
    pub method: MethodRef,
    #[serde(default)]
    pub line: i32,
    #[serde(default)]
    pub source_file: Option<String>,
    /// Captured receiver; `None` for static frames.
    #[serde(default)]
    pub this_object: Option<ObjectId>,
    #[serde(default)]
    pub locals: Vec<LocalVariable>,
}

impl PhysicalFrame {
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .find(|local| local.name == name)
            .map(|local| &local.value)
    }
}

// =============================================================================
// Capabilities
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IntrospectionError {
    #[error("object {0} has been collected")]
    ObjectCollected(ObjectId),
    #[error("{0} is not suspended")]
    ThreadNotSuspended(ThreadId),
    #[error("unknown {0}")]
    UnknownThread(ThreadId),
    #[error("object {object} has no field '{field}'")]
    FieldMissing { object: ObjectId, field: String },
    #[error("object {object} has no accessor '{method}'")]
    AccessorMissing { object: ObjectId, method: String },
    #[error("unknown type {0:?}")]
    UnknownType(TypeId),
    #[error("{operation} timed out")]
    Timeout { operation: String },
}

/// Type identities of the coroutine runtime. Capability checks are always
/// subtype tests against these, never name comparisons.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WellKnownTypes {
    /// Base class of compiled continuation state machines.
    pub base_continuation: Option<TypeId>,
    /// Base class of compiled suspend lambdas.
    pub suspend_lambda: Option<TypeId>,
    /// The continuation interface suspend functions take as last parameter.
    pub continuation: Option<TypeId>,
}

/// Read-only access to a suspended debuggee.
///
/// Every call may cross a process boundary. Callers hold the manager
/// thread (see [`ManagerThread`](crate::ManagerThread)) and must treat any
/// error as "no data".
pub trait DebugBackend {
    fn object_type(&self, object: ObjectId) -> Result<TypeId, IntrospectionError>;

    fn type_name(&self, ty: TypeId) -> Result<String, IntrospectionError>;

    /// A loaded type by fully-qualified name.
    fn find_type(&self, name: &str) -> Option<TypeId>;

    /// Reflexive, transitive subtype test.
    fn is_subtype(&self, ty: TypeId, of: TypeId) -> bool;

    fn read_field(&self, object: ObjectId, field: &str) -> Result<Value, IntrospectionError>;

    /// Invoke a zero-argument method on `object` in the debuggee.
    fn call_accessor(&self, object: ObjectId, method: &str) -> Result<Value, IntrospectionError>;

    /// Frames of `thread`, top first.
    fn enumerate_frames(&self, thread: ThreadId) -> Result<Vec<PhysicalFrame>, IntrospectionError>;

    fn is_thread_suspended(&self, thread: ThreadId) -> bool;

    fn well_known_types(&self) -> &WellKnownTypes;
}

/// Compiler-emitted metadata of continuation classes.
pub trait MetadataLookup {
    fn debug_metadata(&self, ty: TypeId) -> Option<&RawDebugMetadata>;
}

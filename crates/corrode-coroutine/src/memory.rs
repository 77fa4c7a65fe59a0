//! An in-memory debuggee.
//!
//! A snapshot of types, objects and threads, loadable from JSON, that
//! implements both capabilities. Objects can be marked collected or slow to
//! exercise the failure paths.

use crate::backend::{
    DebugBackend, IntrospectionError, MetadataLookup, MethodRef, ObjectId, PhysicalFrame, ThreadId,
    TypeId, Value, WellKnownTypes,
};
use crate::metadata::RawDebugMetadata;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRecord {
    pub id: TypeId,
    pub name: String,
    #[serde(default)]
    pub supertypes: Vec<TypeId>,
    #[serde(default)]
    pub debug_metadata: Option<RawDebugMetadata>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    Collected,
    Timeout,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub type_id: TypeId,
    #[serde(default)]
    pub fields: Vec<(String, Value)>,
    /// Results of zero-argument accessors.
    #[serde(default)]
    pub accessors: Vec<(String, Value)>,
    #[serde(default)]
    pub fault: Option<Fault>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRecord {
    pub id: ThreadId,
    #[serde(default = "default_suspended")]
    pub suspended: bool,
    /// Top first.
    #[serde(default)]
    pub frames: Vec<PhysicalFrame>,
}

fn default_suspended() -> bool {
    true
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InMemoryProcess {
    pub well_known: WellKnownTypes,
    pub types: Vec<TypeRecord>,
    pub objects: Vec<ObjectRecord>,
    pub threads: Vec<ThreadRecord>,
}

impl InMemoryProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    // =========================================================================
    // Building
    // =========================================================================

    pub fn add_type(&mut self, name: impl Into<String>, supertypes: &[TypeId]) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeRecord {
            id,
            name: name.into(),
            supertypes: supertypes.to_vec(),
            debug_metadata: None,
        });
        id
    }

    pub fn set_debug_metadata(&mut self, ty: TypeId, metadata: RawDebugMetadata) {
        if let Some(record) = self.types.iter_mut().find(|t| t.id == ty) {
            record.debug_metadata = Some(metadata);
        }
    }

    pub fn add_object(&mut self, ty: TypeId) -> ObjectId {
        let id = ObjectId(self.objects.len() as u64 + 1);
        self.objects.push(ObjectRecord {
            id,
            type_id: ty,
            fields: Vec::new(),
            accessors: Vec::new(),
            fault: None,
        });
        id
    }

    pub fn set_field(&mut self, object: ObjectId, field: impl Into<String>, value: Value) {
        if let Some(record) = self.objects.iter_mut().find(|o| o.id == object) {
            upsert(&mut record.fields, field.into(), value);
        }
    }

    pub fn set_accessor(&mut self, object: ObjectId, method: impl Into<String>, value: Value) {
        if let Some(record) = self.objects.iter_mut().find(|o| o.id == object) {
            upsert(&mut record.accessors, method.into(), value);
        }
    }

    pub fn set_fault(&mut self, object: ObjectId, fault: Fault) {
        if let Some(record) = self.objects.iter_mut().find(|o| o.id == object) {
            record.fault = Some(fault);
        }
    }

    pub fn add_thread(&mut self, id: ThreadId, suspended: bool, frames: Vec<PhysicalFrame>) {
        self.threads.push(ThreadRecord {
            id,
            suspended,
            frames,
        });
    }

    /// A frame of `thread` at `depth` running `declaring_type.method`.
    pub fn frame(
        thread: ThreadId,
        depth: usize,
        declaring_type: TypeId,
        method: impl Into<String>,
        line: i32,
    ) -> PhysicalFrame {
        PhysicalFrame {
            thread,
            depth,
            method: MethodRef {
                declaring_type,
                name: method.into(),
                parameter_types: SmallVec::new(),
            },
            line,
            source_file: None,
            this_object: None,
            locals: Vec::new(),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn type_record(&self, ty: TypeId) -> Result<&TypeRecord, IntrospectionError> {
        self.types
            .iter()
            .find(|t| t.id == ty)
            .ok_or(IntrospectionError::UnknownType(ty))
    }

    fn live_object(&self, object: ObjectId, operation: &str) -> Result<&ObjectRecord, IntrospectionError> {
        let record = self
            .objects
            .iter()
            .find(|o| o.id == object)
            .ok_or(IntrospectionError::ObjectCollected(object))?;
        match record.fault {
            None => Ok(record),
            Some(Fault::Collected) => Err(IntrospectionError::ObjectCollected(object)),
            Some(Fault::Timeout) => Err(IntrospectionError::Timeout {
                operation: format!("{operation} on {object}"),
            }),
        }
    }

    fn thread(&self, thread: ThreadId) -> Result<&ThreadRecord, IntrospectionError> {
        self.threads
            .iter()
            .find(|t| t.id == thread)
            .ok_or(IntrospectionError::UnknownThread(thread))
    }
}

fn upsert(entries: &mut Vec<(String, Value)>, key: String, value: Value) {
    match entries.iter_mut().find(|(name, _)| *name == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

impl DebugBackend for InMemoryProcess {
    fn object_type(&self, object: ObjectId) -> Result<TypeId, IntrospectionError> {
        self.live_object(object, "type query").map(|o| o.type_id)
    }

    fn type_name(&self, ty: TypeId) -> Result<String, IntrospectionError> {
        self.type_record(ty).map(|t| t.name.clone())
    }

    fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types.iter().find(|t| t.name == name).map(|t| t.id)
    }

    fn is_subtype(&self, ty: TypeId, of: TypeId) -> bool {
        let mut visited: FxHashSet<TypeId> = FxHashSet::default();
        let mut pending = vec![ty];
        while let Some(current) = pending.pop() {
            if current == of {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Ok(record) = self.type_record(current) {
                pending.extend(record.supertypes.iter().copied());
            }
        }
        false
    }

    fn read_field(&self, object: ObjectId, field: &str) -> Result<Value, IntrospectionError> {
        let record = self.live_object(object, "field read")?;
        record
            .fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| IntrospectionError::FieldMissing {
                object,
                field: field.to_string(),
            })
    }

    fn call_accessor(&self, object: ObjectId, method: &str) -> Result<Value, IntrospectionError> {
        let record = self.live_object(object, "accessor call")?;
        record
            .accessors
            .iter()
            .find(|(name, _)| name == method)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| IntrospectionError::AccessorMissing {
                object,
                method: method.to_string(),
            })
    }

    fn enumerate_frames(&self, thread: ThreadId) -> Result<Vec<PhysicalFrame>, IntrospectionError> {
        let record = self.thread(thread)?;
        if !record.suspended {
            return Err(IntrospectionError::ThreadNotSuspended(thread));
        }
        Ok(record.frames.clone())
    }

    fn is_thread_suspended(&self, thread: ThreadId) -> bool {
        self.thread(thread).is_ok_and(|t| t.suspended)
    }

    fn well_known_types(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

impl MetadataLookup for InMemoryProcess {
    fn debug_metadata(&self, ty: TypeId) -> Option<&RawDebugMetadata> {
        self.type_record(ty).ok()?.debug_metadata.as_ref()
    }
}

#[cfg(test)]
#[path = "../tests/memory_tests.rs"]
mod tests;

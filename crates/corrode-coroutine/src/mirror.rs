//! Read-only view over one live continuation object.
//!
//! Every accessor reads the debuggee and every read may fail (object
//! collected, thread resumed, timeout). Failures are logged and reported as
//! "unknown": `false`, `None` or an empty list. Callers treat unknown as the
//! end of the chain.

use crate::backend::{IntrospectionError, ObjectId, TypeId, Value};
use crate::context::ExecutionContext;
use crate::data::{ResumeLocation, SpilledVariable, SpilledVariables};
use crate::manager::ManagerThread;
use crate::metadata::RawDebugMetadata;
use tracing::{trace, warn};

#[derive(Clone, Copy)]
pub struct FrameMirror<'b> {
    object: ObjectId,
    ctx: ExecutionContext<'b>,
}

impl<'b> FrameMirror<'b> {
    pub fn new(object: ObjectId, ctx: ExecutionContext<'b>) -> Self {
        Self { object, ctx }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// The object's type extends the runtime's base continuation.
    pub fn is_continuation(&self) -> bool {
        ManagerThread::assert_is_manager_thread();
        match self.object_type() {
            Some(ty) => self.ctx.is_well_known_subtype(ty, |known| known.base_continuation),
            None => false,
        }
    }

    /// The continuation resumed when this one completes. `None` for
    /// non-continuations, null links and unreadable links.
    pub fn completion(&self) -> Option<FrameMirror<'b>> {
        ManagerThread::assert_is_manager_thread();
        if !self.is_continuation() {
            return None;
        }
        let field = &self.ctx.options.completion_field;
        match self.ctx.backend.read_field(self.object, field) {
            Ok(Value::Object(next)) => Some(FrameMirror::new(next, self.ctx)),
            Ok(Value::Null) => None,
            Ok(other) => {
                warn!(object = %self.object, value = %other, "completion is not an object");
                None
            }
            Err(err) => self.unknown("completion", err),
        }
    }

    /// Where this continuation resumes. `None` when the type carries no
    /// debug metadata or the declaring class is not loaded.
    pub fn resume_location(&self) -> Option<ResumeLocation> {
        ManagerThread::assert_is_manager_thread();
        let (metadata, label) = self.metadata_and_label()?;
        let element = metadata.stack_trace_element(label);
        let Some(declaring_type) = self.ctx.backend.find_type(&element.class_name) else {
            trace!(class = %element.class_name, "resume class not loaded");
            return None;
        };
        Some(ResumeLocation {
            declaring_type,
            class_name: element.class_name,
            method_name: element.method_name,
            source_file: element.source_file,
            line: element.line,
        })
    }

    /// Spilled locals live at the current label, with their current values.
    /// Fields that cannot be read are left out.
    pub fn spilled_variables(&self) -> SpilledVariables {
        ManagerThread::assert_is_manager_thread();
        let Some((metadata, label)) = self.metadata_and_label() else {
            return SpilledVariables::new();
        };
        metadata
            .spilled_variable_mapping(label)
            .into_iter()
            .filter_map(|mapping| {
                match self.ctx.backend.read_field(self.object, &mapping.field_name) {
                    Ok(value) => Some(SpilledVariable {
                        field_name: mapping.field_name,
                        name: mapping.variable_name,
                        value,
                    }),
                    Err(err) => self.unknown("spilled variable", err),
                }
            })
            .collect()
    }

    fn object_type(&self) -> Option<TypeId> {
        match self.ctx.backend.object_type(self.object) {
            Ok(ty) => Some(ty),
            Err(err) => self.unknown("object type", err),
        }
    }

    fn metadata_and_label(&self) -> Option<(&'b RawDebugMetadata, i32)> {
        let ty = self.object_type()?;
        let metadata = self.ctx.metadata.debug_metadata(ty)?;
        let raw = match self.ctx.backend.read_field(self.object, &self.ctx.options.label_field) {
            Ok(value) => value.as_int().unwrap_or(0),
            Err(err) => return self.unknown("label", err),
        };
        Some((metadata, RawDebugMetadata::label_from_field(raw)))
    }

    fn unknown<T>(&self, what: &'static str, err: IntrospectionError) -> Option<T> {
        warn!(object = %self.object, error = %err, "{what} unavailable");
        None
    }
}

#[cfg(test)]
#[path = "../tests/mirror_tests.rs"]
mod tests;

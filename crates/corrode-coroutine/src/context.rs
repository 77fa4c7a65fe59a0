//! The debuggee handles shared by every reconstruction step.

use crate::backend::{DebugBackend, MetadataLookup, TypeId, WellKnownTypes};
use crate::options::ReconstructionOptions;

/// Everything a reconstruction step needs to look at the debuggee.
#[derive(Clone, Copy)]
pub struct ExecutionContext<'b> {
    pub backend: &'b dyn DebugBackend,
    pub metadata: &'b dyn MetadataLookup,
    pub options: &'b ReconstructionOptions,
}

impl<'b> ExecutionContext<'b> {
    pub fn new(
        backend: &'b dyn DebugBackend,
        metadata: &'b dyn MetadataLookup,
        options: &'b ReconstructionOptions,
    ) -> Self {
        Self {
            backend,
            metadata,
            options,
        }
    }

    /// `ty` is a subtype of the well-known type picked by `select`. False
    /// when the backend does not know that type.
    pub fn is_well_known_subtype(
        &self,
        ty: TypeId,
        select: impl FnOnce(&WellKnownTypes) -> Option<TypeId>,
    ) -> bool {
        select(self.backend.well_known_types()).is_some_and(|base| self.backend.is_subtype(ty, base))
    }
}

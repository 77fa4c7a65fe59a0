use thiserror::Error;

/// Invariant violations that abort the resolution pass.
///
/// Unresolvable references are not errors at this level: they become
/// [`TypeRef::Error`](crate::TypeRef::Error) nodes plus diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("type resolution should not be called for {kind}, only for files")]
    UnexpectedNode { kind: &'static str },

    #[error("{kind} '{name}' in {file} must be declared inside {expected}")]
    MisplacedDeclaration {
        kind: &'static str,
        name: String,
        file: String,
        expected: &'static str,
    },

    #[error("class '{name}' in {file} is nested more than {limit} levels deep")]
    NestingTooDeep {
        name: String,
        file: String,
        limit: u32,
    },
}

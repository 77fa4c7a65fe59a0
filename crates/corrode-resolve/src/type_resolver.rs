//! Resolution of a single type reference against a scope stack.

use crate::ast::{
    ErrorTypeRef, ImplicitKind, ResolutionErrorKind, ResolvedTarget, ResolvedTypeRef,
    TypeArgument, TypeRef, UserTypeRef,
};
use crate::index::{AliasExpansionError, DeclarationIndex, SymbolId};
use crate::options::ResolveOptions;
use crate::scope::{Binding, ScopeEntry, ScopeStack};
use corrode_common::{DiagnosticMessage, Span, diagnostic_messages, format_message};
use tracing::trace;

/// Binds one [`TypeRef`] to a declaration.
///
/// The resolver has no state of its own: the result depends only on the
/// reference, the scope stack and the index. Already resolved or errored
/// references come back unchanged.
#[derive(Clone, Copy)]
pub struct SuperTypeResolver<'a> {
    index: &'a DeclarationIndex,
    options: &'a ResolveOptions,
}

impl<'a> SuperTypeResolver<'a> {
    pub fn new(index: &'a DeclarationIndex, options: &'a ResolveOptions) -> Self {
        Self { index, options }
    }

    pub fn resolve(&self, type_ref: &TypeRef, scopes: &ScopeStack) -> TypeRef {
        match type_ref {
            TypeRef::Resolved(_) | TypeRef::Error(_) => type_ref.clone(),
            TypeRef::Implicit(implicit) => match implicit.kind {
                ImplicitKind::Inferred => type_ref.clone(),
                ImplicitKind::Root => self.resolve_builtin(&self.options.root_type, implicit.span),
                ImplicitKind::Unit => self.resolve_builtin(&self.options.unit_type, implicit.span),
            },
            TypeRef::Unresolved(user) => self.resolve_user(user, scopes),
        }
    }

    /// `Array<element>`, for vararg parameters.
    pub fn array_of(&self, element: TypeRef, span: Span) -> TypeRef {
        let array_type = &self.options.array_type;
        match self.index.lookup(array_type) {
            Some(array) => TypeRef::Resolved(ResolvedTypeRef {
                target: ResolvedTarget::Classifier {
                    symbol: array,
                    fq_name: array_type.clone(),
                    expansion: None,
                },
                arguments: vec![TypeArgument::Type(element)],
                nullable: false,
                span,
            }),
            None => error_ref(
                array_type,
                span,
                ResolutionErrorKind::UnresolvedReference,
                diagnostic_messages::MISSING_ARRAY_TYPE,
                &[array_type],
            ),
        }
    }

    fn resolve_builtin(&self, fq_name: &str, span: Span) -> TypeRef {
        match self.index.lookup(fq_name) {
            Some(symbol) => TypeRef::Resolved(ResolvedTypeRef {
                span,
                ..ResolvedTypeRef::classifier(symbol, fq_name)
            }),
            None => error_ref(
                fq_name,
                span,
                ResolutionErrorKind::UnresolvedReference,
                diagnostic_messages::UNRESOLVED_REFERENCE,
                &[fq_name],
            ),
        }
    }

    fn resolve_user(&self, user: &UserTypeRef, scopes: &ScopeStack) -> TypeRef {
        let (head, rest) = match user.name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (user.name.as_str(), None),
        };

        let symbol = match scopes.lookup_entry(head) {
            Some((_, ScopeEntry::Single(Binding::TypeParameter { name, owner }))) => {
                return self.resolve_type_parameter(user, name, owner, rest.is_some());
            }
            Some((_, ScopeEntry::Single(Binding::Classifier(id)))) => {
                match rest {
                    Some(rest) => self.select_nested(*id, rest),
                    None => Some(*id),
                }
            }
            Some((scope, ScopeEntry::Ambiguous(candidates))) => {
                trace!(name = %user.name, scope = scope.label(), "ambiguous reference");
                return self.candidates_error(user, candidates, ResolutionErrorKind::AmbiguousReference);
            }
            Some((scope, ScopeEntry::Conflict(candidates))) => {
                trace!(name = %user.name, scope = scope.label(), "conflicting imports");
                return self.candidates_error(user, candidates, ResolutionErrorKind::ImportConflict);
            }
            None => self.resolve_qualified(&user.name),
        };

        let Some(symbol) = symbol else {
            return unresolved(user);
        };

        let expansion = match self.index.expand_alias(symbol) {
            Ok(expanded) if expanded == symbol => None,
            Ok(expanded) => Some((expanded, self.index.fq_name(expanded).to_string())),
            Err(err @ (AliasExpansionError::Cycle(_) | AliasExpansionError::TooDeep(_))) => {
                return error_ref(
                    &user.name,
                    user.span,
                    ResolutionErrorKind::UnresolvedReference,
                    diagnostic_messages::RECURSIVE_TYPE_ALIAS,
                    &[&user.name, &err.to_string()],
                );
            }
            Err(AliasExpansionError::Dangling(_)) => return unresolved(user),
        };

        TypeRef::Resolved(ResolvedTypeRef {
            target: ResolvedTarget::Classifier {
                symbol,
                fq_name: self.index.fq_name(symbol).to_string(),
                expansion,
            },
            arguments: self.resolve_arguments(&user.arguments, scopes),
            nullable: user.nullable,
            span: user.span,
        })
    }

    fn resolve_type_parameter(
        &self,
        user: &UserTypeRef,
        name: &str,
        owner: &str,
        qualified: bool,
    ) -> TypeRef {
        if qualified {
            return unresolved(user);
        }
        if !user.arguments.is_empty() {
            return error_ref(
                &user.name,
                user.span,
                ResolutionErrorKind::UnresolvedReference,
                diagnostic_messages::TYPE_PARAMETER_WITH_ARGUMENTS,
                &[name],
            );
        }
        TypeRef::Resolved(ResolvedTypeRef {
            target: ResolvedTarget::TypeParameter {
                name: name.to_string(),
                owner: owner.to_string(),
            },
            arguments: Vec::new(),
            nullable: user.nullable,
            span: user.span,
        })
    }

    fn resolve_arguments(&self, arguments: &[TypeArgument], scopes: &ScopeStack) -> Vec<TypeArgument> {
        arguments
            .iter()
            .map(|argument| match argument {
                TypeArgument::Star => TypeArgument::Star,
                TypeArgument::Type(inner) => TypeArgument::Type(self.resolve(inner, scopes)),
            })
            .collect()
    }

    /// `Outer.Inner.Deep` relative to the symbol bound to `Outer`.
    fn select_nested(&self, mut symbol: SymbolId, path: &str) -> Option<SymbolId> {
        for segment in path.split('.') {
            let owner = self.index.expand_alias(symbol).ok()?;
            symbol = self.index.nested_classifier(owner, segment)?;
        }
        Some(symbol)
    }

    /// A name whose first segment is unbound: try the longest prefix that is
    /// a fully-qualified classifier, then descend into nested classifiers.
    fn resolve_qualified(&self, name: &str) -> Option<SymbolId> {
        let segments: Vec<&str> = name.split('.').collect();
        for split in (1..=segments.len()).rev() {
            let prefix = segments[..split].join(".");
            if let Some(symbol) = self.index.lookup(&prefix) {
                if split == segments.len() {
                    return Some(symbol);
                }
                return self.select_nested(symbol, &segments[split..].join("."));
            }
        }
        None
    }

    fn candidates_error(
        &self,
        user: &UserTypeRef,
        candidates: &[Binding],
        reason: ResolutionErrorKind,
    ) -> TypeRef {
        let names: Vec<&str> = candidates
            .iter()
            .map(|binding| match binding {
                Binding::Classifier(id) => self.index.fq_name(*id),
                Binding::TypeParameter { name, .. } => name.as_str(),
            })
            .collect();
        let listed = names.join(", ");
        let message = match reason {
            ResolutionErrorKind::ImportConflict => diagnostic_messages::IMPORT_CONFLICT,
            _ => diagnostic_messages::AMBIGUOUS_REFERENCE,
        };
        error_ref(&user.name, user.span, reason, message, &[&user.name, &listed])
    }
}

fn unresolved(user: &UserTypeRef) -> TypeRef {
    error_ref(
        &user.name,
        user.span,
        ResolutionErrorKind::UnresolvedReference,
        diagnostic_messages::UNRESOLVED_REFERENCE,
        &[&user.name],
    )
}

fn error_ref(
    name: &str,
    span: Span,
    reason: ResolutionErrorKind,
    message: DiagnosticMessage,
    args: &[&str],
) -> TypeRef {
    TypeRef::Error(ErrorTypeRef {
        name: name.to_string(),
        reason,
        code: message.code,
        message: format_message(message.message, args),
        span,
    })
}

#[cfg(test)]
#[path = "../tests/type_resolver_tests.rs"]
mod tests;

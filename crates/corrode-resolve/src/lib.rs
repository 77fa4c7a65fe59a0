//! Declaration-level type resolution.
//!
//! This crate binds every textual type reference that appears in a
//! declaration (supertypes, type-parameter bounds, parameter, return,
//! receiver and alias types) to a declaration from the [`DeclarationIndex`],
//! or replaces it with an explicit error reference.
//!
//! Organization:
//! - `ast` - declaration tree and type reference model
//! - `index` - fully-qualified symbol table (the external declaration index)
//! - `scope` - `Scope` and `ScopeStack` with push/pop discipline
//! - `importing` - per-file importing scopes
//! - `type_resolver` - `SuperTypeResolver`, one reference at a time
//! - `transformer` - `TreeTransformer`, the tree walk
//! - `delegated` - `DelegatedConstructorRewriter`
//!
//! Executable bodies are never entered; resolution stops at declarations.

pub mod ast;
pub use ast::{
    Body, CalleeReference, ClassDeclaration, ClassKind, ConstructorDeclaration, Declaration,
    DeclarationModifiers, DelegatedConstructorCall, DelegationKind, EnumEntryDeclaration,
    ErrorTypeRef, FunctionDeclaration, ImplicitKind, ImplicitTypeRef, ImportDirective,
    PropertyAccessor, PropertyDeclaration, ResolutionErrorKind, ResolvedTarget, ResolvedTypeRef,
    SourceFile, TypeAliasDeclaration, TypeArgument, TypeParameter, TypeRef, UserTypeRef,
    ValueParameter,
};

pub mod index;
pub use index::{AliasExpansionError, DeclarationIndex, Symbol, SymbolId, SymbolKind};

pub mod options;
pub use options::ResolveOptions;

pub mod scope;
pub use scope::{Binding, Collision, Scope, ScopeBuilder, ScopeEntry, ScopeKind, ScopeMark, ScopePriority, ScopeStack};

pub mod importing;
pub use importing::{DefaultImportingScopes, ImportingScopeProvider};

pub mod type_resolver;
pub use type_resolver::SuperTypeResolver;

pub mod delegated;
pub use delegated::DelegatedConstructorRewriter;

pub mod error;
pub use error::TransformError;

pub mod transformer;
pub use transformer::{
    LocalClassContext, Node, ResolvedFile, TreeTransformer, TypeResolveAdapter,
    effective_superclass, resolve_file, resolve_files, resolve_local_class,
};

//! Declaration tree consumed and produced by the resolution pass.
//!
//! The tree is deliberately declaration-only: executable code is kept as an
//! opaque [`Body`] that the resolver never enters. Type references start out
//! as [`TypeRef::Unresolved`] and leave the pass as either
//! [`TypeRef::Resolved`] or [`TypeRef::Error`].

use crate::index::SymbolId;
use bitflags::bitflags;
use corrode_common::Span;
use serde::{Deserialize, Serialize};

// =============================================================================
// Files and imports
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    /// Dotted package name; empty for the root package.
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub imports: Vec<ImportDirective>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            imports: Vec::new(),
            declarations: Vec::new(),
        }
    }

    pub fn with_import(mut self, import: ImportDirective) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_declaration(mut self, declaration: impl Into<Declaration>) -> Self {
        self.declarations.push(declaration.into());
        self
    }

    /// Fully-qualified name of a top-level declaration in this file.
    pub fn qualify(&self, name: &str) -> String {
        if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.package, name)
        }
    }
}

/// `import a.b.C`, `import a.b.C as D`, or `import a.b.*`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDirective {
    pub path: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub all_under: bool,
    #[serde(default)]
    pub span: Span,
}

impl ImportDirective {
    pub fn simple(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
            all_under: false,
            span: Span::dummy(),
        }
    }

    pub fn aliased(path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::simple(path)
        }
    }

    pub fn star(path: impl Into<String>) -> Self {
        Self {
            all_under: true,
            ..Self::simple(path)
        }
    }

    /// The name this import binds, for non-star imports.
    pub fn imported_name(&self) -> Option<&str> {
        if self.all_under {
            return None;
        }
        self.alias
            .as_deref()
            .or_else(|| self.path.rsplit('.').next())
    }
}

// =============================================================================
// Declarations
// =============================================================================

bitflags! {
    /// Modifiers relevant to declaration-level resolution.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DeclarationModifiers: u16 {
        const COMPANION = 1 << 0;
        const INNER = 1 << 1;
        const VARARG = 1 << 2;
        const ABSTRACT = 1 << 3;
        const DATA = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    EnumClass,
    AnnotationClass,
}

impl ClassKind {
    /// Only plain classes (including abstract ones) can be constructor
    /// delegation targets.
    pub fn is_concrete_class(self) -> bool {
        matches!(self, ClassKind::Class)
    }
}

/// The closed set of declaration kinds the transformer handles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Class(ClassDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Function(FunctionDeclaration),
    Property(PropertyDeclaration),
    Constructor(ConstructorDeclaration),
    EnumEntry(EnumEntryDeclaration),
}

impl Declaration {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Class(_) => "class",
            Declaration::TypeAlias(_) => "type alias",
            Declaration::Function(_) => "function",
            Declaration::Property(_) => "property",
            Declaration::Constructor(_) => "constructor",
            Declaration::EnumEntry(_) => "enum entry",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(c) => &c.name,
            Declaration::TypeAlias(a) => &a.name,
            Declaration::Function(f) => &f.name,
            Declaration::Property(p) => &p.name,
            Declaration::Constructor(_) => "<init>",
            Declaration::EnumEntry(e) => &e.name,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDeclaration> {
        match self {
            Declaration::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&ConstructorDeclaration> {
        match self {
            Declaration::Constructor(c) => Some(c),
            _ => None,
        }
    }
}

macro_rules! impl_into_declaration {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Declaration {
            fn from(value: $ty) -> Self {
                Declaration::$variant(value)
            }
        })*
    };
}

impl_into_declaration!(
    ClassDeclaration => Class,
    TypeAliasDeclaration => TypeAlias,
    FunctionDeclaration => Function,
    PropertyDeclaration => Property,
    ConstructorDeclaration => Constructor,
    EnumEntryDeclaration => EnumEntry,
);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: String,
    pub class_kind: ClassKind,
    #[serde(default)]
    pub modifiers: DeclarationModifiers,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    /// Declared supertypes in source order.
    #[serde(default)]
    pub supertypes: Vec<TypeRef>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub span: Span,
}

impl ClassDeclaration {
    pub fn new(name: impl Into<String>, class_kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            class_kind,
            modifiers: DeclarationModifiers::empty(),
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            declarations: Vec::new(),
            span: Span::dummy(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: DeclarationModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn with_type_parameter(mut self, parameter: TypeParameter) -> Self {
        self.type_parameters.push(parameter);
        self
    }

    pub fn with_supertype(mut self, supertype: TypeRef) -> Self {
        self.supertypes.push(supertype);
        self
    }

    pub fn with_declaration(mut self, declaration: impl Into<Declaration>) -> Self {
        self.declarations.push(declaration.into());
        self
    }

    pub fn is_companion(&self) -> bool {
        self.modifiers.contains(DeclarationModifiers::COMPANION)
    }

    pub fn companion(&self) -> Option<&ClassDeclaration> {
        self.declarations
            .iter()
            .filter_map(Declaration::as_class)
            .find(|c| c.is_companion())
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ConstructorDeclaration> {
        self.declarations.iter().filter_map(Declaration::as_constructor)
    }

    pub fn primary_constructor(&self) -> Option<&ConstructorDeclaration> {
        self.constructors().find(|c| c.is_primary)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<TypeRef>,
    #[serde(default)]
    pub span: Span,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
            span: Span::dummy(),
        }
    }

    pub fn with_bound(mut self, bound: TypeRef) -> Self {
        self.bounds.push(bound);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDeclaration {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    pub expanded_type: TypeRef,
    #[serde(default)]
    pub span: Span,
}

impl TypeAliasDeclaration {
    pub fn new(name: impl Into<String>, expanded_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            expanded_type,
            span: Span::dummy(),
        }
    }
}

/// Executable code. Opaque to resolution; local declarations inside it are
/// resolved by a later phase through `resolve_local_class`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub local_declarations: Vec<Declaration>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub receiver_type: Option<TypeRef>,
    #[serde(default)]
    pub value_parameters: Vec<ValueParameter>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub span: Span,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            receiver_type: None,
            value_parameters: Vec::new(),
            return_type,
            body: None,
            span: Span::dummy(),
        }
    }

    pub fn with_type_parameter(mut self, parameter: TypeParameter) -> Self {
        self.type_parameters.push(parameter);
        self
    }

    pub fn with_parameter(mut self, parameter: ValueParameter) -> Self {
        self.value_parameters.push(parameter);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyAccessor {
    pub return_type: TypeRef,
    #[serde(default)]
    pub value_parameters: Vec<ValueParameter>,
    #[serde(default)]
    pub body: Option<Body>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub receiver_type: Option<TypeRef>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub getter: Option<PropertyAccessor>,
    #[serde(default)]
    pub setter: Option<PropertyAccessor>,
    #[serde(default)]
    pub initializer: Option<Body>,
    #[serde(default)]
    pub span: Span,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            receiver_type: None,
            return_type,
            getter: None,
            setter: None,
            initializer: None,
            span: Span::dummy(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueParameter {
    pub name: String,
    pub return_type: TypeRef,
    #[serde(default)]
    pub modifiers: DeclarationModifiers,
    #[serde(default)]
    pub default_value: Option<Body>,
    #[serde(default)]
    pub span: Span,
}

impl ValueParameter {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            return_type,
            modifiers: DeclarationModifiers::empty(),
            default_value: None,
            span: Span::dummy(),
        }
    }

    pub fn vararg(name: impl Into<String>, element_type: TypeRef) -> Self {
        Self {
            modifiers: DeclarationModifiers::VARARG,
            ..Self::new(name, element_type)
        }
    }

    pub fn is_vararg(&self) -> bool {
        self.modifiers.contains(DeclarationModifiers::VARARG)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDeclaration {
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub value_parameters: Vec<ValueParameter>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub delegated_call: Option<DelegatedConstructorCall>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub span: Span,
}

impl ConstructorDeclaration {
    /// A primary constructor with an implicit `super()` delegation.
    pub fn primary(return_type: TypeRef) -> Self {
        Self {
            is_primary: true,
            type_parameters: Vec::new(),
            value_parameters: Vec::new(),
            return_type,
            delegated_call: Some(DelegatedConstructorCall::implicit_super()),
            body: None,
            span: Span::dummy(),
        }
    }

    pub fn secondary(return_type: TypeRef, delegated_call: DelegatedConstructorCall) -> Self {
        Self {
            is_primary: false,
            delegated_call: Some(delegated_call),
            ..Self::primary(return_type)
        }
    }

    pub fn with_parameter(mut self, parameter: ValueParameter) -> Self {
        self.value_parameters.push(parameter);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumEntryDeclaration {
    pub name: String,
    pub return_type: TypeRef,
    #[serde(default)]
    pub span: Span,
}

impl EnumEntryDeclaration {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            return_type,
            span: Span::dummy(),
        }
    }
}

// =============================================================================
// Constructor delegation
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationKind {
    Super,
    This,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "callee", rename_all = "snake_case")]
pub enum CalleeReference {
    /// Bare `super(...)` / `this(...)` keyword call.
    Keyword,
    /// `super<T>(...)` bound to a resolved supertype.
    ExplicitSuper { super_type: TypeRef },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelegatedConstructorCall {
    pub delegation: DelegationKind,
    pub constructed_type: TypeRef,
    pub callee: CalleeReference,
    #[serde(default)]
    pub span: Span,
}

impl DelegatedConstructorCall {
    /// The call a constructor gets when its supertype is not written out:
    /// `super()` constructing the root placeholder.
    pub fn implicit_super() -> Self {
        Self {
            delegation: DelegationKind::Super,
            constructed_type: TypeRef::implicit(ImplicitKind::Root),
            callee: CalleeReference::Keyword,
            span: Span::dummy(),
        }
    }

    pub fn explicit_super(constructed_type: TypeRef) -> Self {
        Self {
            delegation: DelegationKind::Super,
            callee: CalleeReference::ExplicitSuper {
                super_type: constructed_type.clone(),
            },
            constructed_type,
            span: Span::dummy(),
        }
    }

    pub fn this_call(constructed_type: TypeRef) -> Self {
        Self {
            delegation: DelegationKind::This,
            constructed_type,
            callee: CalleeReference::Keyword,
            span: Span::dummy(),
        }
    }

    pub fn is_super(&self) -> bool {
        self.delegation == DelegationKind::Super
    }
}

// =============================================================================
// Type references
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ref", rename_all = "snake_case")]
pub enum TypeRef {
    Unresolved(UserTypeRef),
    Resolved(ResolvedTypeRef),
    Error(ErrorTypeRef),
    Implicit(ImplicitTypeRef),
}

impl TypeRef {
    /// An unresolved reference to `name` without arguments.
    pub fn user(name: impl Into<String>) -> Self {
        TypeRef::Unresolved(UserTypeRef::new(name))
    }

    /// An unresolved reference with type arguments.
    pub fn generic(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        let mut user = UserTypeRef::new(name);
        user.arguments = arguments.into_iter().map(TypeArgument::Type).collect();
        TypeRef::Unresolved(user)
    }

    pub fn implicit(kind: ImplicitKind) -> Self {
        TypeRef::Implicit(ImplicitTypeRef {
            kind,
            span: Span::dummy(),
        })
    }

    pub fn span(&self) -> Span {
        match self {
            TypeRef::Unresolved(t) => t.span,
            TypeRef::Resolved(t) => t.span,
            TypeRef::Error(t) => t.span,
            TypeRef::Implicit(t) => t.span,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TypeRef::Resolved(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TypeRef::Error(_))
    }

    pub fn is_implicit_root(&self) -> bool {
        matches!(
            self,
            TypeRef::Implicit(ImplicitTypeRef {
                kind: ImplicitKind::Root,
                ..
            })
        )
    }

    pub fn as_resolved(&self) -> Option<&ResolvedTypeRef> {
        match self {
            TypeRef::Resolved(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorTypeRef> {
        match self {
            TypeRef::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Visit this reference and every reference nested in its arguments.
    pub fn for_each(&self, f: &mut impl FnMut(&TypeRef)) {
        f(self);
        let arguments = match self {
            TypeRef::Unresolved(t) => &t.arguments,
            TypeRef::Resolved(t) => &t.arguments,
            TypeRef::Error(_) | TypeRef::Implicit(_) => return,
        };
        for argument in arguments {
            if let TypeArgument::Type(inner) = argument {
                inner.for_each(f);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeArgument {
    Star,
    Type(TypeRef),
}

/// A type reference as written in source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserTypeRef {
    /// Possibly dotted: `Map.Entry`, `a.b.C`.
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<TypeArgument>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub span: Span,
}

impl UserTypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            nullable: false,
            span: Span::dummy(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ResolvedTarget {
    Classifier {
        /// The symbol as written; may be a type alias.
        symbol: SymbolId,
        fq_name: String,
        /// The class the alias chain ends in, when `symbol` is an alias.
        #[serde(default)]
        expansion: Option<(SymbolId, String)>,
    },
    TypeParameter {
        name: String,
        /// Fully-qualified name of the declaring class or member.
        owner: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTypeRef {
    pub target: ResolvedTarget,
    #[serde(default)]
    pub arguments: Vec<TypeArgument>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub span: Span,
}

impl ResolvedTypeRef {
    pub fn classifier(symbol: SymbolId, fq_name: impl Into<String>) -> Self {
        Self {
            target: ResolvedTarget::Classifier {
                symbol,
                fq_name: fq_name.into(),
                expansion: None,
            },
            arguments: Vec::new(),
            nullable: false,
            span: Span::dummy(),
        }
    }

    /// The class-like symbol after alias expansion.
    pub fn class_symbol(&self) -> Option<SymbolId> {
        match &self.target {
            ResolvedTarget::Classifier {
                symbol, expansion, ..
            } => Some(expansion.as_ref().map_or(*symbol, |(id, _)| *id)),
            ResolvedTarget::TypeParameter { .. } => None,
        }
    }

    /// Fully-qualified name as written (the alias name for aliases).
    pub fn fq_name(&self) -> &str {
        match &self.target {
            ResolvedTarget::Classifier { fq_name, .. } => fq_name,
            ResolvedTarget::TypeParameter { name, .. } => name,
        }
    }

    /// Fully-qualified name of the expanded class, or of the type parameter.
    pub fn expanded_fq_name(&self) -> &str {
        match &self.target {
            ResolvedTarget::Classifier {
                fq_name, expansion, ..
            } => expansion.as_ref().map_or(fq_name.as_str(), |(_, n)| n.as_str()),
            ResolvedTarget::TypeParameter { name, .. } => name,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionErrorKind {
    UnresolvedReference,
    AmbiguousReference,
    ImportConflict,
}

/// An unresolvable reference. Replaces the original reference so later
/// phases see an explicit error instead of a dangling name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorTypeRef {
    pub name: String,
    pub reason: ResolutionErrorKind,
    pub code: u32,
    pub message: String,
    #[serde(default)]
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicitKind {
    /// Left for a later inference phase.
    Inferred,
    /// Placeholder for the universal root type.
    Root,
    /// The unit builtin (implicit return type of block-bodied functions).
    Unit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplicitTypeRef {
    pub kind: ImplicitKind,
    #[serde(default)]
    pub span: Span,
}

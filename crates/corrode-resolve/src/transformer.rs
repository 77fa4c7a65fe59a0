//! The type-resolution tree walk.
//!
//! [`TreeTransformer`] visits a file's declarations, keeps the scope stack in
//! step with the position in the tree, and hands every declaration-level
//! type reference to [`SuperTypeResolver`]. Executable bodies (function
//! bodies, accessor bodies, initializers, default values) are not entered.
//!
//! Per class the order is fixed:
//! 1. type-parameter bounds and declared supertypes, under the class's
//!    type-parameter scope;
//! 2. the effective superclass is chosen and implicit `super()` calls are
//!    rewritten by [`DelegatedConstructorRewriter`];
//! 3. members and nested classes, under the inherited nested-classifier
//!    scopes, the type parameters, the companion's and the class's own
//!    nested classifiers.

use crate::ast::{
    CalleeReference, ClassDeclaration, ClassKind, ConstructorDeclaration, Declaration,
    DelegatedConstructorCall, EnumEntryDeclaration, ErrorTypeRef, FunctionDeclaration,
    ImplicitKind, PropertyDeclaration, ResolvedTypeRef, SourceFile, TypeAliasDeclaration,
    TypeParameter, TypeRef, ValueParameter,
};
use crate::delegated::DelegatedConstructorRewriter;
use crate::error::TransformError;
use crate::importing::{DefaultImportingScopes, ImportingScopeProvider};
use crate::index::{DeclarationIndex, Symbol, SymbolId};
use crate::options::ResolveOptions;
use crate::scope::{Binding, Scope, ScopeBuilder, ScopeKind, ScopePriority, ScopeStack};
use crate::type_resolver::SuperTypeResolver;
use corrode_common::Diagnostic;
use corrode_common::limits::{MAX_CLASS_NESTING_DEPTH, MAX_SUPERCLASS_WALK};
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{Level, debug, span, trace};

// =============================================================================
// Entry points
// =============================================================================

/// Anything a caller might hand to the resolution pass. Only files are
/// accepted; the other variants exist so misuse is reported rather than
/// silently ignored.
#[derive(Clone, Debug)]
pub enum Node {
    File(SourceFile),
    Declaration(Declaration),
    TypeRef(TypeRef),
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::File(_) => "file",
            Node::Declaration(declaration) => declaration.kind_name(),
            Node::TypeRef(_) => "type reference",
        }
    }
}

/// A file after resolution, with the diagnostics raised while resolving it.
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedFile {
    pub file: SourceFile,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedFile {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Runs a fresh [`TreeTransformer`] per file.
pub struct TypeResolveAdapter<'a> {
    index: &'a DeclarationIndex,
    options: &'a ResolveOptions,
    importing: &'a dyn ImportingScopeProvider,
}

impl<'a> TypeResolveAdapter<'a> {
    pub fn new(
        index: &'a DeclarationIndex,
        options: &'a ResolveOptions,
        importing: &'a dyn ImportingScopeProvider,
    ) -> Self {
        Self {
            index,
            options,
            importing,
        }
    }

    pub fn transform(&self, node: Node) -> Result<ResolvedFile, TransformError> {
        match node {
            Node::File(file) => {
                TreeTransformer::new(self.index, self.options, self.importing).transform_file(file)
            }
            other => Err(TransformError::UnexpectedNode {
                kind: other.kind_name(),
            }),
        }
    }
}

/// Resolve one file with the default importing scopes.
pub fn resolve_file(
    file: SourceFile,
    index: &DeclarationIndex,
    options: &ResolveOptions,
) -> Result<ResolvedFile, TransformError> {
    let importing = DefaultImportingScopes::new(options);
    TypeResolveAdapter::new(index, options, &importing).transform(Node::File(file))
}

/// Resolve `files` with the default importing scopes.
pub fn resolve_files(
    files: Vec<SourceFile>,
    index: &DeclarationIndex,
    options: &ResolveOptions,
) -> Result<Vec<ResolvedFile>, TransformError> {
    let importing = DefaultImportingScopes::new(options);
    let adapter = TypeResolveAdapter::new(index, options, &importing);
    files
        .into_iter()
        .map(|file| adapter.transform(Node::File(file)))
        .collect()
}

/// Where a local class sits, for naming and diagnostics.
#[derive(Clone, Debug, Default)]
pub struct LocalClassContext {
    pub file_name: String,
    pub package: String,
    /// Names of the enclosing classes and member, outermost first.
    pub enclosing: Vec<String>,
}

/// Resolve a class declared inside an executable body.
///
/// `current_scopes` are the scopes visible at the declaration, highest
/// priority first (see [`ScopeStack::snapshot`]). A private transformer is
/// used, so the caller's own stack is never modified.
pub fn resolve_local_class(
    class: &mut ClassDeclaration,
    context: LocalClassContext,
    index: &DeclarationIndex,
    options: &ResolveOptions,
    current_scopes: Vec<Scope>,
) -> Result<Vec<Diagnostic>, TransformError> {
    let mut transformer = TreeTransformer::for_local_class(index, options, context, current_scopes);
    transformer.transform_class(class)?;
    Ok(transformer.take_diagnostics())
}

/// The first declared supertype that resolved to a concrete class other
/// than the root, after alias expansion.
pub fn effective_superclass<'t>(
    index: &DeclarationIndex,
    options: &ResolveOptions,
    supertypes: &'t [TypeRef],
) -> Option<&'t ResolvedTypeRef> {
    let root = index.lookup(&options.root_type);
    supertypes.iter().filter_map(TypeRef::as_resolved).find(|resolved| {
        let Some(class) = resolved
            .class_symbol()
            .and_then(|symbol| index.expand_alias(symbol).ok())
        else {
            return false;
        };
        Some(class) != root
            && index
                .get(class)
                .and_then(Symbol::class_kind)
                .is_some_and(ClassKind::is_concrete_class)
    })
}

// =============================================================================
// TreeTransformer
// =============================================================================

/// Scopes are pushed outermost first, so the newest one is consulted first.
const SCOPE_PRIORITY: ScopePriority = ScopePriority::NewestFirst;

pub struct TreeTransformer<'a> {
    index: &'a DeclarationIndex,
    options: &'a ResolveOptions,
    importing: Option<&'a dyn ImportingScopeProvider>,
    scopes: ScopeStack,
    diagnostics: Vec<Diagnostic>,
    file_name: String,
    package: String,
    /// Names of the classes (and member, for local classes) enclosing the
    /// current position, outermost first.
    class_path: Vec<String>,
}

impl<'a> TreeTransformer<'a> {
    pub fn new(
        index: &'a DeclarationIndex,
        options: &'a ResolveOptions,
        importing: &'a dyn ImportingScopeProvider,
    ) -> Self {
        Self {
            index,
            options,
            importing: Some(importing),
            scopes: ScopeStack::new(SCOPE_PRIORITY),
            diagnostics: Vec::new(),
            file_name: String::new(),
            package: String::new(),
            class_path: Vec::new(),
        }
    }

    pub fn for_local_class(
        index: &'a DeclarationIndex,
        options: &'a ResolveOptions,
        context: LocalClassContext,
        initial_scopes: Vec<Scope>,
    ) -> Self {
        Self {
            index,
            options,
            importing: None,
            scopes: ScopeStack::with_initial_scopes(initial_scopes, SCOPE_PRIORITY),
            diagnostics: Vec::new(),
            file_name: context.file_name,
            package: context.package,
            class_path: context.enclosing,
        }
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn with_scope_cleanup<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mark = self.scopes.mark();
        let result = f(self);
        self.scopes.restore(mark);
        result
    }

    // =========================================================================
    // Files and declarations
    // =========================================================================

    pub fn transform_file(&mut self, mut file: SourceFile) -> Result<ResolvedFile, TransformError> {
        let _span = span!(Level::DEBUG, "transform_file", file = %file.name).entered();
        self.file_name = file.name.clone();
        self.package = file.package.clone();
        self.class_path.clear();

        let importing = self
            .importing
            .map(|provider| provider.importing_scopes(&file, self.index))
            .unwrap_or_default();

        self.with_scope_cleanup(|this| {
            this.scopes.push_all(importing);
            for declaration in &mut file.declarations {
                this.transform_declaration(declaration, None)?;
            }
            Ok(())
        })?;

        debug!(diagnostics = self.diagnostics.len(), "file resolved");
        Ok(ResolvedFile {
            file,
            diagnostics: self.take_diagnostics(),
        })
    }

    /// Dispatch on the declaration kind. `enclosing` is the kind of the
    /// class the declaration is a member of, `None` at top level.
    pub fn transform_declaration(
        &mut self,
        declaration: &mut Declaration,
        enclosing: Option<ClassKind>,
    ) -> Result<(), TransformError> {
        match declaration {
            Declaration::Class(class) => self.transform_class(class),
            Declaration::TypeAlias(alias) => {
                self.transform_type_alias(alias);
                Ok(())
            }
            Declaration::Function(function) => {
                self.transform_function(function);
                Ok(())
            }
            Declaration::Property(property) => {
                self.transform_property(property);
                Ok(())
            }
            Declaration::Constructor(constructor) => {
                if enclosing.is_none() {
                    return Err(self.misplaced("constructor", "<init>", "a class"));
                }
                self.transform_constructor(constructor);
                Ok(())
            }
            Declaration::EnumEntry(entry) => {
                if enclosing != Some(ClassKind::EnumClass) {
                    return Err(self.misplaced("enum entry", &entry.name, "an enum class"));
                }
                self.transform_enum_entry(entry);
                Ok(())
            }
        }
    }

    pub fn transform_class(&mut self, class: &mut ClassDeclaration) -> Result<(), TransformError> {
        if self.class_path.len() as u32 >= MAX_CLASS_NESTING_DEPTH {
            return Err(TransformError::NestingTooDeep {
                name: class.name.clone(),
                file: self.file_name.clone(),
                limit: MAX_CLASS_NESTING_DEPTH,
            });
        }
        let owner = self.qualify(&class.name);
        let _span = span!(Level::DEBUG, "transform_class", class = %owner).entered();

        self.with_scope_cleanup(|this| {
            this.push_type_parameters(&owner, &mut class.type_parameters);
            for supertype in &mut class.supertypes {
                this.resolve_type_ref(supertype);
            }
        });

        if let Some(super_class) =
            effective_superclass(self.index, self.options, &class.supertypes).cloned()
        {
            debug!(super_class = super_class.fq_name(), "effective superclass");
            DelegatedConstructorRewriter::new(&super_class).rewrite_class(class);
        }

        self.resolve_nested_declarations(class, &owner)
    }

    fn resolve_nested_declarations(
        &mut self,
        class: &mut ClassDeclaration,
        owner: &str,
    ) -> Result<(), TransformError> {
        let inherited = self.inherited_nested_scopes(&class.supertypes);
        let companion = class
            .companion()
            .and_then(|companion| self.index.lookup(&format!("{owner}.{}", companion.name)))
            .map(|id| self.nested_classifier_scope(id));
        let own = self
            .index
            .lookup(owner)
            .map(|id| self.nested_classifier_scope(id));
        let class_kind = class.class_kind;

        self.class_path.push(class.name.clone());
        let result = self.with_scope_cleanup(|this| {
            this.scopes.push_all(inherited);
            this.scopes
                .push(type_parameter_scope(owner, &class.type_parameters));
            this.scopes.push_all(companion);
            this.scopes.push_all(own);
            for declaration in &mut class.declarations {
                this.transform_declaration(declaration, Some(class_kind))?;
            }
            Ok(())
        });
        self.class_path.pop();
        result
    }

    fn transform_constructor(&mut self, constructor: &mut ConstructorDeclaration) {
        let owner = self.qualify("<init>");
        self.with_scope_cleanup(|this| {
            this.push_type_parameters(&owner, &mut constructor.type_parameters);
            this.resolve_type_ref(&mut constructor.return_type);
            for parameter in &mut constructor.value_parameters {
                this.transform_value_parameter(parameter);
            }
            if let Some(call) = &mut constructor.delegated_call {
                this.transform_delegated_call(call);
            }
        });
    }

    /// Resolve the delegation target. An implicit `super()` left without a
    /// superclass delegates to the root builtin. `super<T>` shares one
    /// reference between callee and constructed type, so it is reported once.
    fn transform_delegated_call(&mut self, call: &mut DelegatedConstructorCall) {
        if let CalleeReference::ExplicitSuper { super_type } = &mut call.callee {
            let shared = *super_type == call.constructed_type;
            self.resolve_type_ref(super_type);
            if shared {
                call.constructed_type = super_type.clone();
                return;
            }
        }
        self.resolve_type_ref(&mut call.constructed_type);
    }

    fn transform_type_alias(&mut self, alias: &mut TypeAliasDeclaration) {
        let owner = self.qualify(&alias.name);
        self.with_scope_cleanup(|this| {
            this.push_type_parameters(&owner, &mut alias.type_parameters);
            this.resolve_type_ref(&mut alias.expanded_type);
        });
    }

    fn transform_enum_entry(&mut self, entry: &mut EnumEntryDeclaration) {
        self.resolve_type_ref(&mut entry.return_type);
    }

    fn transform_property(&mut self, property: &mut PropertyDeclaration) {
        let owner = self.qualify(&property.name);
        self.with_scope_cleanup(|this| {
            this.push_type_parameters(&owner, &mut property.type_parameters);
            if let Some(receiver) = &mut property.receiver_type {
                this.resolve_type_ref(receiver);
            }
            this.resolve_type_ref(&mut property.return_type);
            for accessor in [&mut property.getter, &mut property.setter].into_iter().flatten() {
                this.resolve_type_ref(&mut accessor.return_type);
                for parameter in &mut accessor.value_parameters {
                    this.transform_value_parameter(parameter);
                }
            }
        });
    }

    fn transform_function(&mut self, function: &mut FunctionDeclaration) {
        let owner = self.qualify(&function.name);
        self.with_scope_cleanup(|this| {
            this.push_type_parameters(&owner, &mut function.type_parameters);
            if let Some(receiver) = &mut function.receiver_type {
                this.resolve_type_ref(receiver);
            }
            for parameter in &mut function.value_parameters {
                this.transform_value_parameter(parameter);
            }
            this.resolve_type_ref(&mut function.return_type);
        });
        if function.body.is_some() {
            trace!(function = %owner, "body left for a later phase");
        }
    }

    /// A vararg parameter's declared element type becomes `Array<element>`
    /// the first time it resolves; already resolved parameters are kept.
    fn transform_value_parameter(&mut self, parameter: &mut ValueParameter) {
        let fresh = !matches!(parameter.return_type, TypeRef::Resolved(_) | TypeRef::Error(_));
        self.resolve_type_ref(&mut parameter.return_type);
        if fresh && parameter.is_vararg() && parameter.return_type.is_resolved() {
            let element = std::mem::replace(
                &mut parameter.return_type,
                TypeRef::implicit(ImplicitKind::Inferred),
            );
            let span = element.span();
            parameter.return_type = self.resolver().array_of(element, span);
            if let TypeRef::Error(error) = &parameter.return_type {
                let error = error.clone();
                self.report(&error);
            }
        }
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Push the scope of `parameters` and resolve their bounds inside it, so
    /// bounds may mention the parameters themselves.
    fn push_type_parameters(&mut self, owner: &str, parameters: &mut [TypeParameter]) {
        if parameters.is_empty() {
            return;
        }
        self.scopes.push(type_parameter_scope(owner, parameters));
        for parameter in parameters {
            for bound in &mut parameter.bounds {
                self.resolve_type_ref(bound);
            }
        }
    }

    fn nested_classifier_scope(&self, class: SymbolId) -> Scope {
        let mut builder = ScopeBuilder::new(ScopeKind::NestedClassifiers, self.index.fq_name(class));
        for &nested in self.index.nested_classifiers(class) {
            if let Some(symbol) = self.index.get(nested) {
                builder.bind(symbol.simple_name.clone(), Binding::Classifier(nested));
            }
        }
        builder.build()
    }

    /// Nested-classifier scopes of the superclass chain, farthest ancestor
    /// first so the nearest one ends up with the highest priority.
    fn inherited_nested_scopes(&self, supertypes: &[TypeRef]) -> Vec<Scope> {
        let root = self.index.lookup(&self.options.root_type);
        let is_superclass = |id: SymbolId| {
            Some(id) != root
                && self
                    .index
                    .get(id)
                    .and_then(Symbol::class_kind)
                    .is_some_and(ClassKind::is_concrete_class)
        };

        let mut next = supertypes
            .iter()
            .filter_map(TypeRef::as_resolved)
            .filter_map(ResolvedTypeRef::class_symbol)
            .find(|&id| is_superclass(id));

        let mut chain: Vec<SymbolId> = Vec::new();
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        while let Some(class) = next {
            if !visited.insert(class) || chain.len() as u32 >= MAX_SUPERCLASS_WALK {
                break;
            }
            chain.push(class);
            next = self
                .index
                .supertypes(class)
                .iter()
                .filter_map(|fq_name| self.index.lookup(fq_name))
                .filter_map(|id| self.index.expand_alias(id).ok())
                .find(|&id| is_superclass(id));
        }

        chain
            .iter()
            .rev()
            .map(|&class| self.nested_classifier_scope(class))
            .collect()
    }

    // =========================================================================
    // References and diagnostics
    // =========================================================================

    fn resolver(&self) -> SuperTypeResolver<'a> {
        SuperTypeResolver::new(self.index, self.options)
    }

    fn resolve_type_ref(&mut self, type_ref: &mut TypeRef) {
        let fresh = !matches!(type_ref, TypeRef::Resolved(_) | TypeRef::Error(_));
        let resolved = self.resolver().resolve(type_ref, &self.scopes);
        if fresh {
            let mut errors: Vec<ErrorTypeRef> = Vec::new();
            resolved.for_each(&mut |t| {
                if let TypeRef::Error(error) = t {
                    errors.push(error.clone());
                }
            });
            for error in &errors {
                self.report(error);
            }
        }
        *type_ref = resolved;
    }

    fn report(&mut self, error: &ErrorTypeRef) {
        debug!(name = %error.name, reason = ?error.reason, "unresolved type reference");
        self.diagnostics.push(Diagnostic::error(
            self.file_name.clone(),
            error.span.start,
            error.span.len(),
            error.message.clone(),
            error.code,
        ));
    }

    fn misplaced(&self, kind: &'static str, name: &str, expected: &'static str) -> TransformError {
        TransformError::MisplacedDeclaration {
            kind,
            name: name.to_string(),
            file: self.file_name.clone(),
            expected,
        }
    }

    /// Fully-qualified name of `name` declared at the current position.
    fn qualify(&self, name: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.class_path.len() + 2);
        if !self.package.is_empty() {
            parts.push(&self.package);
        }
        parts.extend(self.class_path.iter().map(String::as_str));
        parts.push(name);
        parts.join(".")
    }
}

fn type_parameter_scope(owner: &str, parameters: &[TypeParameter]) -> Scope {
    let mut builder = ScopeBuilder::new(ScopeKind::TypeParameters, owner);
    for parameter in parameters {
        builder.bind(
            parameter.name.clone(),
            Binding::TypeParameter {
                name: parameter.name.clone(),
                owner: owner.to_string(),
            },
        );
    }
    builder.build()
}

#[cfg(test)]
#[path = "../tests/transformer_tests.rs"]
mod tests;

//! Declaration index - the symbol table keyed by fully-qualified name.
//!
//! The resolution pass does not own declarations; it consumes an index that
//! some earlier stage (a classpath loader, a source indexer) has filled in.
//! [`DeclarationIndex::from_files`] builds one from source files for tools
//! and tests.

use crate::ast::{ClassDeclaration, ClassKind, Declaration, SourceFile, TypeRef};
use crate::options::ResolveOptions;
use corrode_common::limits::MAX_ALIAS_EXPANSION_DEPTH;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Class {
        class_kind: ClassKind,
        /// Directly nested classifiers, in declaration order.
        nested: Vec<SymbolId>,
        /// Fully-qualified names of declared supertypes.
        supertypes: Vec<String>,
    },
    TypeAlias {
        /// Fully-qualified name of the aliased classifier.
        target: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub fq_name: String,
    pub simple_name: String,
    pub package: String,
    pub outer: Option<SymbolId>,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn class_kind(&self) -> Option<ClassKind> {
        match &self.kind {
            SymbolKind::Class { class_kind, .. } => Some(*class_kind),
            SymbolKind::TypeAlias { .. } => None,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.kind, SymbolKind::TypeAlias { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AliasExpansionError {
    #[error("type alias cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
    #[error("type alias target '{0}' is not declared")]
    Dangling(String),
    #[error("type alias chain starting at '{0}' is too long")]
    TooDeep(String),
}

#[derive(Clone, Debug, Default)]
pub struct DeclarationIndex {
    symbols: Vec<Symbol>,
    by_fq_name: FxHashMap<String, SymbolId>,
    /// Top-level classifiers per package.
    packages: FxHashMap<String, Vec<SymbolId>>,
}

impl DeclarationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index pre-populated with the builtin classifiers named in `options`.
    pub fn with_builtins(options: &ResolveOptions) -> Self {
        let mut index = Self::new();
        index.add_builtin(&options.root_type, ClassKind::Class, &[]);
        index.add_builtin(&options.unit_type, ClassKind::Object, &[&options.root_type]);
        index.add_builtin(&options.array_type, ClassKind::Class, &[&options.root_type]);
        for extra in &options.extra_builtins {
            index.add_builtin(extra, ClassKind::Class, &[&options.root_type]);
        }
        index
    }

    fn add_builtin(&mut self, fq_name: &str, class_kind: ClassKind, supertypes: &[&String]) {
        if self.by_fq_name.contains_key(fq_name) {
            return;
        }
        let (package, name) = split_fq_name(fq_name);
        let supertypes = supertypes.iter().map(|s| s.to_string()).collect();
        self.add_class(package, None, name, class_kind, supertypes);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn add_class(
        &mut self,
        package: &str,
        outer: Option<SymbolId>,
        name: &str,
        class_kind: ClassKind,
        supertypes: Vec<String>,
    ) -> SymbolId {
        let kind = SymbolKind::Class {
            class_kind,
            nested: Vec::new(),
            supertypes,
        };
        self.add_symbol(package, outer, name, kind)
    }

    pub fn add_type_alias(
        &mut self,
        package: &str,
        outer: Option<SymbolId>,
        name: &str,
        target: impl Into<String>,
    ) -> SymbolId {
        let kind = SymbolKind::TypeAlias {
            target: target.into(),
        };
        self.add_symbol(package, outer, name, kind)
    }

    fn add_symbol(
        &mut self,
        package: &str,
        outer: Option<SymbolId>,
        name: &str,
        kind: SymbolKind,
    ) -> SymbolId {
        let fq_name = match outer.and_then(|o| self.get(o)) {
            Some(outer_symbol) => format!("{}.{}", outer_symbol.fq_name, name),
            None if package.is_empty() => name.to_string(),
            None => format!("{package}.{name}"),
        };
        if let Some(&existing) = self.by_fq_name.get(&fq_name) {
            trace!(fq_name = %fq_name, "redeclaration ignored by declaration index");
            return existing;
        }

        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            fq_name: fq_name.clone(),
            simple_name: name.to_string(),
            package: package.to_string(),
            outer,
            kind,
        });
        self.by_fq_name.insert(fq_name, id);

        match outer {
            Some(outer_id) => {
                if let Some(SymbolKind::Class { nested, .. }) =
                    self.symbols.get_mut(outer_id.0 as usize).map(|s| &mut s.kind)
                {
                    nested.push(id);
                }
            }
            None => self.packages.entry(package.to_string()).or_default().push(id),
        }
        id
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn lookup(&self, fq_name: &str) -> Option<SymbolId> {
        self.by_fq_name.get(fq_name).copied()
    }

    pub fn fq_name(&self, id: SymbolId) -> &str {
        self.get(id).map_or("<unknown>", |s| s.fq_name.as_str())
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    pub fn package_members(&self, package: &str) -> &[SymbolId] {
        self.packages.get(package).map_or(&[], Vec::as_slice)
    }

    pub fn nested_classifiers(&self, id: SymbolId) -> &[SymbolId] {
        match self.get(id).map(|s| &s.kind) {
            Some(SymbolKind::Class { nested, .. }) => nested,
            _ => &[],
        }
    }

    pub fn nested_classifier(&self, id: SymbolId, name: &str) -> Option<SymbolId> {
        self.nested_classifiers(id)
            .iter()
            .copied()
            .find(|&nested| self.get(nested).is_some_and(|s| s.simple_name == name))
    }

    pub fn supertypes(&self, id: SymbolId) -> &[String] {
        match self.get(id).map(|s| &s.kind) {
            Some(SymbolKind::Class { supertypes, .. }) => supertypes,
            _ => &[],
        }
    }

    /// Follow a type alias chain to the class it denotes.
    ///
    /// Non-alias symbols expand to themselves. A chain that revisits an
    /// alias is reported as [`AliasExpansionError::Cycle`] with the aliases
    /// in visiting order.
    pub fn expand_alias(&self, id: SymbolId) -> Result<SymbolId, AliasExpansionError> {
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        let mut chain: Vec<String> = Vec::new();
        let mut current = id;
        loop {
            let Some(symbol) = self.get(current) else {
                return Err(AliasExpansionError::Dangling(format!("#{}", current.0)));
            };
            let SymbolKind::TypeAlias { target } = &symbol.kind else {
                return Ok(current);
            };
            if !visited.insert(current) {
                chain.push(symbol.fq_name.clone());
                return Err(AliasExpansionError::Cycle(chain));
            }
            chain.push(symbol.fq_name.clone());
            if chain.len() as u32 > MAX_ALIAS_EXPANSION_DEPTH {
                return Err(AliasExpansionError::TooDeep(self.fq_name(id).to_string()));
            }
            current = self
                .lookup(target)
                .ok_or_else(|| AliasExpansionError::Dangling(target.clone()))?;
        }
    }

    // =========================================================================
    // Building from source
    // =========================================================================

    /// Index every top-level and nested classifier of `files`, on top of the
    /// builtins from `options`.
    ///
    /// Supertype and alias target names are qualified with a best-effort
    /// lookup (explicit imports, enclosing classes, same package, default and
    /// star imports). Names that cannot be qualified are stored as written and
    /// surface later as dangling alias targets.
    pub fn from_files(files: &[SourceFile], options: &ResolveOptions) -> Self {
        let mut index = Self::with_builtins(options);
        let mut pending: Vec<PendingNames> = Vec::new();

        for (file_idx, file) in files.iter().enumerate() {
            for declaration in &file.declarations {
                index.register_declaration(file_idx, &file.package, None, declaration, &mut pending);
            }
        }

        for item in pending {
            let file = &files[item.file];
            let qualified: Vec<String> = item
                .names
                .iter()
                .map(|name| index.qualify(name, file, item.symbol, options))
                .collect();
            if let Some(symbol) = index.symbols.get_mut(item.symbol.0 as usize) {
                match &mut symbol.kind {
                    SymbolKind::Class { supertypes, .. } => *supertypes = qualified,
                    SymbolKind::TypeAlias { target } => {
                        if let Some(first) = qualified.into_iter().next() {
                            *target = first;
                        }
                    }
                }
            }
        }
        index
    }

    fn register_declaration(
        &mut self,
        file: usize,
        package: &str,
        outer: Option<SymbolId>,
        declaration: &Declaration,
        pending: &mut Vec<PendingNames>,
    ) {
        match declaration {
            Declaration::Class(class) => self.register_class(file, package, outer, class, pending),
            Declaration::TypeAlias(alias) => {
                let target = written_name(&alias.expanded_type).unwrap_or_default();
                let id = self.add_type_alias(package, outer, &alias.name, target.clone());
                pending.push(PendingNames {
                    file,
                    symbol: id,
                    names: vec![target],
                });
            }
            _ => {}
        }
    }

    fn register_class(
        &mut self,
        file: usize,
        package: &str,
        outer: Option<SymbolId>,
        class: &ClassDeclaration,
        pending: &mut Vec<PendingNames>,
    ) {
        let names: Vec<String> = class.supertypes.iter().filter_map(written_name).collect();
        let id = self.add_class(package, outer, &class.name, class.class_kind, Vec::new());
        pending.push(PendingNames {
            file,
            symbol: id,
            names,
        });
        for nested in &class.declarations {
            self.register_declaration(file, package, Some(id), nested, pending);
        }
    }

    fn qualify(
        &self,
        name: &str,
        file: &SourceFile,
        context: SymbolId,
        options: &ResolveOptions,
    ) -> String {
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        let join = |prefix: &str| match rest {
            Some(rest) => format!("{prefix}.{rest}"),
            None => prefix.to_string(),
        };

        let mut candidates: Vec<String> = Vec::new();
        for import in file.imports.iter().filter(|i| !i.all_under) {
            if import.imported_name() == Some(head) {
                candidates.push(join(&import.path));
            }
        }
        // Siblings and nested classifiers of enclosing classes.
        let mut outer = self.get(context).and_then(|s| s.outer);
        while let Some(outer_id) = outer {
            let outer_name = self.fq_name(outer_id);
            candidates.push(join(&format!("{outer_name}.{head}")));
            outer = self.get(outer_id).and_then(|s| s.outer);
        }
        candidates.push(join(&file.qualify(head)));
        for import in file.imports.iter().filter(|i| i.all_under) {
            candidates.push(join(&format!("{}.{head}", import.path)));
        }
        for package in &options.default_imports {
            candidates.push(join(&format!("{package}.{head}")));
        }
        candidates.push(name.to_string());

        candidates
            .into_iter()
            .find(|candidate| self.by_fq_name.contains_key(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

struct PendingNames {
    file: usize,
    symbol: SymbolId,
    names: Vec<String>,
}

fn written_name(type_ref: &TypeRef) -> Option<String> {
    match type_ref {
        TypeRef::Unresolved(user) => Some(user.name.clone()),
        TypeRef::Resolved(resolved) => Some(resolved.fq_name().to_string()),
        _ => None,
    }
}

/// Split `a.b.C` into (`a.b`, `C`).
pub fn split_fq_name(fq_name: &str) -> (&str, &str) {
    match fq_name.rsplit_once('.') {
        Some((package, name)) => (package, name),
        None => ("", fq_name),
    }
}

#[cfg(test)]
#[path = "../tests/index_tests.rs"]
mod tests;

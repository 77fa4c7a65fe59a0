//! Lexical scopes and the scope stack used during resolution.
//!
//! A [`Scope`] is an immutable, ordered set of name bindings. The
//! [`ScopeStack`] holds the scopes visible at the current tree position.
//! Traversal code never pops by hand: it brackets each declaration with
//! [`ScopeStack::with_scope_cleanup`] (or a [`ScopeMark`]) so the stack
//! depth is restored on every exit path, including early error returns.

use crate::index::SymbolId;
use indexmap::IndexMap;
use smallvec::{SmallVec, smallvec};

// =============================================================================
// Bindings
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    Classifier(SymbolId),
    TypeParameter { name: String, owner: String },
}

/// What a scope knows about one name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeEntry {
    Single(Binding),
    /// Several equally ranked bindings (e.g. two star imports).
    Ambiguous(SmallVec<[Binding; 2]>),
    /// Several explicit imports binding the name to different declarations.
    Conflict(SmallVec<[Binding; 2]>),
}

impl ScopeEntry {
    pub fn single(&self) -> Option<&Binding> {
        match self {
            ScopeEntry::Single(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[Binding] {
        match self {
            ScopeEntry::Single(binding) => std::slice::from_ref(binding),
            ScopeEntry::Ambiguous(bindings) | ScopeEntry::Conflict(bindings) => bindings,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Importing,
    Package,
    TypeParameters,
    NestedClassifiers,
    Local,
}

/// How a [`ScopeBuilder`] reacts when a name is bound twice to different
/// targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Ambiguous,
    Conflict,
    /// Keep the first binding.
    FirstWins,
}

// =============================================================================
// Scope
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    kind: ScopeKind,
    label: String,
    entries: IndexMap<String, ScopeEntry>,
}

impl Scope {
    pub fn builder(kind: ScopeKind, label: impl Into<String>) -> ScopeBuilder {
        ScopeBuilder::new(kind, label)
    }

    pub fn empty(kind: ScopeKind, label: impl Into<String>) -> Self {
        ScopeBuilder::new(kind, label).build()
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, name: &str) -> Option<&ScopeEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct ScopeBuilder {
    kind: ScopeKind,
    label: String,
    collision: Collision,
    entries: IndexMap<String, ScopeEntry>,
}

impl ScopeBuilder {
    pub fn new(kind: ScopeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            collision: Collision::Ambiguous,
            entries: IndexMap::new(),
        }
    }

    pub fn on_collision(mut self, collision: Collision) -> Self {
        self.collision = collision;
        self
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) -> &mut Self {
        let name = name.into();
        let collision = self.collision;
        match self.entries.get_mut(&name) {
            None => {
                self.entries.insert(name, ScopeEntry::Single(binding));
            }
            Some(entry) if entry.candidates().contains(&binding) => {}
            Some(entry) => {
                let existing = std::mem::replace(entry, ScopeEntry::Ambiguous(SmallVec::new()));
                *entry = match (existing, collision) {
                    (existing, Collision::FirstWins) => existing,
                    (ScopeEntry::Single(first), Collision::Ambiguous) => {
                        ScopeEntry::Ambiguous(smallvec![first, binding])
                    }
                    (ScopeEntry::Single(first), Collision::Conflict) => {
                        ScopeEntry::Conflict(smallvec![first, binding])
                    }
                    (ScopeEntry::Ambiguous(mut all), _) => {
                        all.push(binding);
                        ScopeEntry::Ambiguous(all)
                    }
                    (ScopeEntry::Conflict(mut all), _) => {
                        all.push(binding);
                        ScopeEntry::Conflict(all)
                    }
                };
            }
        }
        self
    }

    pub fn with(mut self, name: impl Into<String>, binding: Binding) -> Self {
        self.bind(name, binding);
        self
    }

    pub fn build(self) -> Scope {
        Scope {
            kind: self.kind,
            label: self.label,
            entries: self.entries,
        }
    }
}

// =============================================================================
// ScopeStack
// =============================================================================

/// Which scopes win when several bind the same name.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScopePriority {
    /// The most recently pushed scope is consulted first.
    #[default]
    NewestFirst,
    /// Scopes are consulted in push order; pushing appends at the lowest
    /// priority.
    OldestFirst,
}

/// Depth of a [`ScopeStack`], captured to restore it later.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScopeMark(usize);

#[derive(Clone, Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    priority: ScopePriority,
}

impl ScopeStack {
    pub fn new(priority: ScopePriority) -> Self {
        Self {
            scopes: Vec::new(),
            priority,
        }
    }

    /// A stack seeded with `scopes`, given highest priority first.
    pub fn with_initial_scopes(scopes: Vec<Scope>, priority: ScopePriority) -> Self {
        let mut stack = Self::new(priority);
        match priority {
            ScopePriority::NewestFirst => stack.push_all(scopes.into_iter().rev()),
            ScopePriority::OldestFirst => stack.push_all(scopes),
        }
        stack
    }

    pub fn priority(&self) -> ScopePriority {
        self.priority
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Push several scopes in order.
    pub fn push_all(&mut self, scopes: impl IntoIterator<Item = Scope>) {
        self.scopes.extend(scopes);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn mark(&self) -> ScopeMark {
        ScopeMark(self.scopes.len())
    }

    /// Pop every scope pushed since `mark`.
    pub fn restore(&mut self, mark: ScopeMark) {
        debug_assert!(
            self.scopes.len() >= mark.0,
            "scope stack shrank below its mark ({} < {})",
            self.scopes.len(),
            mark.0
        );
        self.scopes.truncate(mark.0);
    }

    /// Run `f`, then drop whatever scopes it pushed.
    pub fn with_scope_cleanup<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mark = self.mark();
        let result = f(self);
        self.restore(mark);
        result
    }

    /// Scopes in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        let len = self.scopes.len();
        let priority = self.priority;
        (0..len).map(move |i| match priority {
            ScopePriority::NewestFirst => &self.scopes[len - 1 - i],
            ScopePriority::OldestFirst => &self.scopes[i],
        })
    }

    /// The first scope entry for `name`, with the scope it came from.
    pub fn lookup_entry(&self, name: &str) -> Option<(&Scope, &ScopeEntry)> {
        self.iter()
            .find_map(|scope| scope.get(name).map(|entry| (scope, entry)))
    }

    /// The binding for `name` in the highest-priority scope that has one.
    ///
    /// Returns `None` when the name is unbound, and also when the winning
    /// scope binds it ambiguously; use [`lookup_entry`](Self::lookup_entry)
    /// to tell the two apart.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.lookup_entry(name).and_then(|(_, entry)| entry.single())
    }

    /// Clone of the visible scopes, highest priority first. Suitable for
    /// [`ScopeStack::with_initial_scopes`].
    pub fn snapshot(&self) -> Vec<Scope> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod tests;

//! Per-file importing scopes.

use crate::ast::SourceFile;
use crate::index::{DeclarationIndex, SymbolId};
use crate::options::ResolveOptions;
use crate::scope::{Binding, Collision, Scope, ScopeBuilder, ScopeKind};
use tracing::debug;

/// Source of the importing scopes pushed when the transformer enters a file.
pub trait ImportingScopeProvider {
    /// Scopes visible at the top of `file`, lowest priority first.
    fn importing_scopes(&self, file: &SourceFile, index: &DeclarationIndex) -> Vec<Scope>;
}

/// The usual import precedence, lowest to highest:
/// default star imports, explicit star imports, same-package declarations,
/// explicit (possibly aliased) imports.
#[derive(Clone, Debug, Default)]
pub struct DefaultImportingScopes {
    default_imports: Vec<String>,
}

impl DefaultImportingScopes {
    pub fn new(options: &ResolveOptions) -> Self {
        Self {
            default_imports: options.default_imports.clone(),
        }
    }

    fn star_scope<'p>(
        &self,
        label: &str,
        paths: impl IntoIterator<Item = &'p str>,
        index: &DeclarationIndex,
    ) -> Scope {
        let mut builder = ScopeBuilder::new(ScopeKind::Importing, label).on_collision(Collision::Ambiguous);
        for path in paths {
            for &member in star_members(path, index) {
                if let Some(symbol) = index.get(member) {
                    builder.bind(symbol.simple_name.clone(), Binding::Classifier(member));
                }
            }
        }
        builder.build()
    }
}

impl ImportingScopeProvider for DefaultImportingScopes {
    fn importing_scopes(&self, file: &SourceFile, index: &DeclarationIndex) -> Vec<Scope> {
        let default_star = self.star_scope(
            "default star imports",
            self.default_imports.iter().map(String::as_str),
            index,
        );
        let explicit_star = self.star_scope(
            "star imports",
            file.imports
                .iter()
                .filter(|i| i.all_under)
                .map(|i| i.path.as_str()),
            index,
        );

        let mut package = ScopeBuilder::new(ScopeKind::Package, format!("package {}", file.package))
            .on_collision(Collision::FirstWins);
        for &member in index.package_members(&file.package) {
            if let Some(symbol) = index.get(member) {
                package.bind(symbol.simple_name.clone(), Binding::Classifier(member));
            }
        }

        let mut explicit = ScopeBuilder::new(ScopeKind::Importing, "explicit imports")
            .on_collision(Collision::Conflict);
        for import in file.imports.iter().filter(|i| !i.all_under) {
            let Some(name) = import.imported_name() else {
                continue;
            };
            match index.lookup(&import.path) {
                Some(id) => {
                    explicit.bind(name, Binding::Classifier(id));
                }
                None => debug!(path = %import.path, file = %file.name, "import does not name a classifier"),
            }
        }

        vec![default_star, explicit_star, package.build(), explicit.build()]
    }
}

/// Classifiers brought in by `import path.*`: package members, or the nested
/// classifiers when `path` names a class.
fn star_members<'i>(path: &str, index: &'i DeclarationIndex) -> &'i [SymbolId] {
    if index.has_package(path) {
        return index.package_members(path);
    }
    match index.lookup(path) {
        Some(class) => index.nested_classifiers(class),
        None => &[],
    }
}

#[cfg(test)]
#[path = "../tests/importing_tests.rs"]
mod tests;

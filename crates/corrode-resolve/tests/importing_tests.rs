use super::*;
use crate::ast::{ClassDeclaration, ClassKind, ImportDirective};
use crate::scope::{ScopeEntry, ScopePriority, ScopeStack};

fn fixture() -> (DeclarationIndex, ResolveOptions) {
    let options = ResolveOptions::default();
    let files = vec![
        SourceFile::new("a.kt", "a").with_declaration(ClassDeclaration::new("Foo", ClassKind::Class)),
        SourceFile::new("b.kt", "b")
            .with_declaration(ClassDeclaration::new("Foo", ClassKind::Class))
            .with_declaration(ClassDeclaration::new("Bar", ClassKind::Class)),
        SourceFile::new("c.kt", "c").with_declaration(ClassDeclaration::new("Int", ClassKind::Class)),
    ];
    let index = DeclarationIndex::from_files(&files, &options);
    (index, options)
}

fn stack_for(file: &SourceFile, index: &DeclarationIndex, options: &ResolveOptions) -> ScopeStack {
    let mut stack = ScopeStack::new(ScopePriority::NewestFirst);
    stack.push_all(DefaultImportingScopes::new(options).importing_scopes(file, index));
    stack
}

#[test]
fn test_scopes_are_ordered_lowest_priority_first() {
    let (index, options) = fixture();
    let file = SourceFile::new("main.kt", "app");
    let scopes = DefaultImportingScopes::new(&options).importing_scopes(&file, &index);

    let kinds: Vec<ScopeKind> = scopes.iter().map(Scope::kind).collect();
    assert_eq!(
        kinds,
        vec![ScopeKind::Importing, ScopeKind::Importing, ScopeKind::Package, ScopeKind::Importing]
    );
    assert!(scopes[0].contains("Int"), "default imports come first");
}

#[test]
fn test_explicit_import_beats_star_import() {
    let (index, options) = fixture();
    let file = SourceFile::new("main.kt", "app")
        .with_import(ImportDirective::star("a"))
        .with_import(ImportDirective::simple("b.Foo"));
    let stack = stack_for(&file, &index, &options);

    assert_eq!(
        stack.lookup("Foo"),
        Some(&Binding::Classifier(index.lookup("b.Foo").unwrap()))
    );
}

#[test]
fn test_two_star_imports_are_ambiguous() {
    let (index, options) = fixture();
    let file = SourceFile::new("main.kt", "app")
        .with_import(ImportDirective::star("a"))
        .with_import(ImportDirective::star("b"));
    let stack = stack_for(&file, &index, &options);

    let (_, entry) = stack.lookup_entry("Foo").unwrap();
    assert!(matches!(entry, ScopeEntry::Ambiguous(_)));
    assert!(stack.lookup("Bar").is_some());
}

#[test]
fn test_conflicting_explicit_imports() {
    let (index, options) = fixture();
    let file = SourceFile::new("main.kt", "app")
        .with_import(ImportDirective::simple("a.Foo"))
        .with_import(ImportDirective::simple("b.Foo"));
    let stack = stack_for(&file, &index, &options);

    let (_, entry) = stack.lookup_entry("Foo").unwrap();
    assert!(matches!(entry, ScopeEntry::Conflict(_)));
}

#[test]
fn test_aliased_import_binds_alias_only() {
    let (index, options) = fixture();
    let file = SourceFile::new("main.kt", "app").with_import(ImportDirective::aliased("a.Foo", "AFoo"));
    let stack = stack_for(&file, &index, &options);

    assert!(stack.lookup("AFoo").is_some());
    assert!(stack.lookup("Foo").is_none());
}

#[test]
fn test_star_import_overrides_default_import() {
    let (index, options) = fixture();
    let file = SourceFile::new("main.kt", "app").with_import(ImportDirective::star("c"));
    let stack = stack_for(&file, &index, &options);

    assert_eq!(
        stack.lookup("Int"),
        Some(&Binding::Classifier(index.lookup("c.Int").unwrap()))
    );
}

#[test]
fn test_same_package_declarations_are_visible() {
    let (index, options) = fixture();
    let file = SourceFile::new("other.kt", "b");
    let stack = stack_for(&file, &index, &options);
    assert!(stack.lookup("Bar").is_some());
}

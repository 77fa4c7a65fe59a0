use super::*;
use crate::ast::{ClassDeclaration, ImportDirective, TypeAliasDeclaration};

fn class_supertypes(index: &DeclarationIndex, fq_name: &str) -> Vec<String> {
    let id = index.lookup(fq_name).expect("class should be indexed");
    index.supertypes(id).to_vec()
}

#[test]
fn test_with_builtins_registers_root_unit_and_array() {
    let options = ResolveOptions::default();
    let index = DeclarationIndex::with_builtins(&options);

    for name in ["builtins.Any", "builtins.Unit", "builtins.Array", "builtins.Int"] {
        assert!(index.lookup(name).is_some(), "{name} should be a builtin");
    }
    let unit = index.lookup("builtins.Unit").unwrap();
    assert_eq!(index.get(unit).unwrap().class_kind(), Some(ClassKind::Object));
    assert!(index.has_package("builtins"));
}

#[test]
fn test_add_class_builds_nested_fq_names() {
    let mut index = DeclarationIndex::new();
    let outer = index.add_class("a.b", None, "Outer", ClassKind::Class, Vec::new());
    let inner = index.add_class("a.b", Some(outer), "Inner", ClassKind::Class, Vec::new());

    assert_eq!(index.fq_name(inner), "a.b.Outer.Inner");
    assert_eq!(index.nested_classifier(outer, "Inner"), Some(inner));
    assert_eq!(index.package_members("a.b"), &[outer]);
}

#[test]
fn test_redeclaration_returns_existing_symbol() {
    let mut index = DeclarationIndex::new();
    let first = index.add_class("p", None, "A", ClassKind::Class, Vec::new());
    let second = index.add_class("p", None, "A", ClassKind::Interface, Vec::new());
    assert_eq!(first, second);
    assert_eq!(index.len(), 1);
}

#[test]
fn test_expand_alias_follows_chain() {
    let mut index = DeclarationIndex::new();
    let target = index.add_class("p", None, "Target", ClassKind::Class, Vec::new());
    index.add_type_alias("p", None, "Middle", "p.Target");
    let top = index.add_type_alias("p", None, "Top", "p.Middle");

    assert_eq!(index.expand_alias(top), Ok(target));
    assert_eq!(index.expand_alias(target), Ok(target));
}

#[test]
fn test_expand_alias_reports_cycle() {
    let mut index = DeclarationIndex::new();
    let a = index.add_type_alias("p", None, "A", "p.B");
    index.add_type_alias("p", None, "B", "p.A");

    match index.expand_alias(a) {
        Err(AliasExpansionError::Cycle(chain)) => {
            assert_eq!(chain, vec!["p.A", "p.B", "p.A"]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_expand_alias_reports_dangling_target() {
    let mut index = DeclarationIndex::new();
    let alias = index.add_type_alias("p", None, "Gone", "p.Missing");
    assert_eq!(
        index.expand_alias(alias),
        Err(AliasExpansionError::Dangling("p.Missing".to_string()))
    );
}

#[test]
fn test_from_files_qualifies_supertypes() {
    let options = ResolveOptions::default();
    let lib = SourceFile::new("lib.kt", "lib").with_declaration(ClassDeclaration::new("Base", ClassKind::Class));
    let app = SourceFile::new("app.kt", "app")
        .with_import(ImportDirective::simple("lib.Base"))
        .with_declaration(
            ClassDeclaration::new("Local", ClassKind::Class).with_supertype(TypeRef::user("Any")),
        )
        .with_declaration(
            ClassDeclaration::new("Derived", ClassKind::Class)
                .with_supertype(TypeRef::user("Base"))
                .with_supertype(TypeRef::user("Local")),
        );

    let index = DeclarationIndex::from_files(&[lib, app], &options);

    assert_eq!(class_supertypes(&index, "app.Derived"), vec!["lib.Base", "app.Local"]);
    assert_eq!(class_supertypes(&index, "app.Local"), vec!["builtins.Any"]);
}

#[test]
fn test_from_files_prefers_enclosing_class_members() {
    let options = ResolveOptions::default();
    let file = SourceFile::new("a.kt", "p")
        .with_declaration(ClassDeclaration::new("Node", ClassKind::Class))
        .with_declaration(
            ClassDeclaration::new("Tree", ClassKind::Class)
                .with_declaration(ClassDeclaration::new("Node", ClassKind::Class))
                .with_declaration(
                    ClassDeclaration::new("Leaf", ClassKind::Class).with_supertype(TypeRef::user("Node")),
                ),
        );

    let index = DeclarationIndex::from_files(&[file], &options);
    assert_eq!(class_supertypes(&index, "p.Tree.Leaf"), vec!["p.Tree.Node"]);
}

#[test]
fn test_from_files_qualifies_alias_targets() {
    let options = ResolveOptions::default();
    let file = SourceFile::new("a.kt", "p")
        .with_declaration(ClassDeclaration::new("Real", ClassKind::Class))
        .with_declaration(TypeAliasDeclaration::new("Nick", TypeRef::user("Real")));

    let index = DeclarationIndex::from_files(&[file], &options);
    let nick = index.lookup("p.Nick").unwrap();
    assert_eq!(index.expand_alias(nick), Ok(index.lookup("p.Real").unwrap()));
}

#[test]
fn test_split_fq_name() {
    assert_eq!(split_fq_name("a.b.C"), ("a.b", "C"));
    assert_eq!(split_fq_name("C"), ("", "C"));
}

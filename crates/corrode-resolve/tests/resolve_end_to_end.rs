//! Whole-pass tests: JSON declaration trees in, resolved trees out.

use corrode_common::diagnostic_codes;
use corrode_resolve::{
    CalleeReference, Declaration, DeclarationIndex, ResolveOptions, SourceFile, TypeRef, resolve_files,
};
use serde_json::json;

fn load(value: serde_json::Value) -> Vec<SourceFile> {
    serde_json::from_value(value).expect("fixture should deserialize")
}

fn run(files: Vec<SourceFile>) -> Vec<corrode_resolve::ResolvedFile> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let options = ResolveOptions::default();
    let index = DeclarationIndex::from_files(&files, &options);
    resolve_files(files, &index, &options).expect("resolution should not abort")
}

fn fixture() -> serde_json::Value {
    json!([
        {
            "name": "shapes.kt",
            "package": "shapes",
            "declarations": [
                { "kind": "class", "name": "Shape", "class_kind": "class" },
                {
                    "kind": "class", "name": "Circle", "class_kind": "class",
                    "supertypes": [{ "ref": "unresolved", "name": "Shape" }],
                    "declarations": [
                        {
                            "kind": "constructor", "is_primary": true,
                            "return_type": { "ref": "unresolved", "name": "Circle" },
                            "value_parameters": [
                                { "name": "radius", "return_type": { "ref": "unresolved", "name": "Int" } }
                            ],
                            "delegated_call": {
                                "delegation": "super",
                                "constructed_type": { "ref": "implicit", "kind": "root" },
                                "callee": { "callee": "keyword" }
                            }
                        }
                    ]
                },
                {
                    "kind": "type_alias", "name": "Ring",
                    "expanded_type": { "ref": "unresolved", "name": "Ring" }
                },
                {
                    "kind": "property", "name": "broken",
                    "return_type": { "ref": "unresolved", "name": "Ring", "span": { "start": 40, "end": 44 } }
                }
            ]
        }
    ])
}

#[test]
fn test_implicit_super_call_targets_declared_superclass() {
    let resolved = run(load(fixture()));
    let Declaration::Class(circle) = &resolved[0].file.declarations[1] else {
        panic!("expected Circle");
    };
    let call = circle
        .primary_constructor()
        .and_then(|c| c.delegated_call.as_ref())
        .expect("primary constructor delegates");

    assert_eq!(
        call.constructed_type.as_resolved().map(|r| r.fq_name()),
        Some("shapes.Shape")
    );
    assert!(matches!(call.callee, CalleeReference::ExplicitSuper { .. }));
}

#[test]
fn test_self_referential_alias_is_diagnosed_at_each_use() {
    let resolved = run(load(fixture()));
    let codes: Vec<u32> = resolved[0].diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![diagnostic_codes::RECURSIVE_TYPE_ALIAS, diagnostic_codes::RECURSIVE_TYPE_ALIAS]
    );
    assert_eq!(resolved[0].diagnostics[1].start, 40);
}

#[test]
fn test_every_declaration_reference_leaves_unresolved_state() {
    let resolved = run(load(fixture()));
    let mut leftovers = Vec::new();
    for declaration in &resolved[0].file.declarations {
        collect_unresolved(declaration, &mut leftovers);
    }
    assert!(leftovers.is_empty(), "still unresolved: {leftovers:?}");
}

#[test]
fn test_resolution_is_idempotent() {
    let first = run(load(fixture()));
    let files: Vec<SourceFile> = first.iter().map(|r| r.file.clone()).collect();
    let second = run(files.clone());

    let again: Vec<SourceFile> = second.into_iter().map(|r| r.file).collect();
    assert_eq!(again, files);
}

#[test]
fn test_resolved_tree_serializes() {
    let resolved = run(load(fixture()));
    let value = serde_json::to_value(&resolved[0]).expect("resolved file serializes");
    assert_eq!(value["file"]["name"], "shapes.kt");
    assert_eq!(value["diagnostics"].as_array().map(Vec::len), Some(2));
}

fn collect_unresolved(declaration: &Declaration, out: &mut Vec<String>) {
    match declaration {
        Declaration::Class(class) => {
            for supertype in &class.supertypes {
                push_unresolved(supertype, out);
            }
            for nested in &class.declarations {
                collect_unresolved(nested, out);
            }
        }
        Declaration::TypeAlias(alias) => push_unresolved(&alias.expanded_type, out),
        Declaration::Function(function) => {
            push_unresolved(&function.return_type, out);
            for parameter in &function.value_parameters {
                push_unresolved(&parameter.return_type, out);
            }
        }
        Declaration::Property(property) => push_unresolved(&property.return_type, out),
        Declaration::Constructor(constructor) => {
            push_unresolved(&constructor.return_type, out);
            for parameter in &constructor.value_parameters {
                push_unresolved(&parameter.return_type, out);
            }
            if let Some(call) = &constructor.delegated_call {
                push_unresolved(&call.constructed_type, out);
                if let CalleeReference::ExplicitSuper { super_type } = &call.callee {
                    push_unresolved(super_type, out);
                }
            }
        }
        Declaration::EnumEntry(entry) => push_unresolved(&entry.return_type, out),
    }
}

fn push_unresolved(type_ref: &TypeRef, out: &mut Vec<String>) {
    type_ref.for_each(&mut |t| {
        if let TypeRef::Unresolved(user) = t {
            out.push(user.name.clone());
        }
    });
}

#[test]
fn test_single_file_entry_point_matches_batch() {
    let files = load(fixture());
    let options = ResolveOptions::default();
    let index = DeclarationIndex::from_files(&files, &options);

    let single = corrode_resolve::resolve_file(files[0].clone(), &index, &options).expect("file resolves");
    let batch = resolve_files(files, &index, &options).expect("files resolve");

    assert_eq!(single.file, batch[0].file);
    assert_eq!(single.diagnostics, batch[0].diagnostics);
}

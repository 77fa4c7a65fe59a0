use super::*;

const SNAPSHOT: &str = r#"{
    "wellKnown": { "baseContinuation": 1 },
    "types": [
        { "id": 0, "name": "kotlin.Any" },
        { "id": 1, "name": "kotlin.coroutines.jvm.internal.BaseContinuationImpl", "supertypes": [0] },
        {
            "id": 2,
            "name": "app.MainKt$main$1",
            "supertypes": [1],
            "debugMetadata": { "className": "app.MainKt", "methodName": "main", "lineNumbers": [3] }
        }
    ],
    "objects": [
        {
            "id": 1,
            "typeId": 2,
            "fields": [["label", { "type": "int", "value": 1 }], ["completion", { "type": "null" }]],
            "accessors": [["toString", { "type": "str", "value": "main$1" }]]
        },
        { "id": 2, "typeId": 0, "fault": "collected" }
    ],
    "threads": [
        {
            "id": 1,
            "frames": [
                {
                    "thread": 1,
                    "depth": 0,
                    "method": { "declaringType": 2, "name": "invokeSuspend", "parameterTypes": [] },
                    "line": 3,
                    "thisObject": 1
                }
            ]
        },
        { "id": 2, "suspended": false }
    ]
}"#;

#[test]
fn test_snapshot_loads_from_json() {
    let process = InMemoryProcess::from_json(SNAPSHOT).unwrap();

    assert_eq!(process.types.len(), 3);
    assert_eq!(process.well_known.base_continuation, Some(TypeId(1)));
    assert_eq!(process.well_known.suspend_lambda, None);
    assert!(process.threads[0].suspended);
    assert_eq!(process.threads[0].frames[0].this_object, Some(ObjectId(1)));
    assert!(process.debug_metadata(TypeId(2)).is_some());
}

#[test]
fn test_snapshot_rejects_malformed_json() {
    assert!(InMemoryProcess::from_json("{ \"types\": 3 }").is_err());
}

#[test]
fn test_field_and_accessor_reads() {
    let process = InMemoryProcess::from_json(SNAPSHOT).unwrap();

    assert_eq!(process.read_field(ObjectId(1), "label").unwrap(), Value::Int(1));
    assert_eq!(process.read_field(ObjectId(1), "completion").unwrap(), Value::Null);
    assert_eq!(
        process.call_accessor(ObjectId(1), "toString").unwrap(),
        Value::Str("main$1".to_string())
    );
    assert!(matches!(
        process.read_field(ObjectId(1), "L$0"),
        Err(IntrospectionError::FieldMissing { .. })
    ));
    assert!(matches!(
        process.call_accessor(ObjectId(1), "hashCode"),
        Err(IntrospectionError::AccessorMissing { .. })
    ));
}

#[test]
fn test_faults() {
    let mut process = InMemoryProcess::from_json(SNAPSHOT).unwrap();

    assert_eq!(
        process.object_type(ObjectId(2)),
        Err(IntrospectionError::ObjectCollected(ObjectId(2)))
    );
    assert_eq!(
        process.object_type(ObjectId(99)),
        Err(IntrospectionError::ObjectCollected(ObjectId(99)))
    );

    process.set_fault(ObjectId(1), Fault::Timeout);
    assert!(matches!(
        process.read_field(ObjectId(1), "label"),
        Err(IntrospectionError::Timeout { .. })
    ));
}

#[test]
fn test_subtype_is_transitive_and_reflexive() {
    let process = InMemoryProcess::from_json(SNAPSHOT).unwrap();

    assert!(process.is_subtype(TypeId(2), TypeId(0)));
    assert!(process.is_subtype(TypeId(2), TypeId(2)));
    assert!(!process.is_subtype(TypeId(0), TypeId(2)));
    assert!(!process.is_subtype(TypeId(7), TypeId(0)));
}

#[test]
fn test_subtype_tolerates_cyclic_hierarchy() {
    let mut process = InMemoryProcess::new();
    let a = process.add_type("A", &[TypeId(1)]);
    let b = process.add_type("B", &[a]);
    let unrelated = process.add_type("C", &[]);
    assert!(process.is_subtype(a, b));
    assert!(!process.is_subtype(a, unrelated));
}

#[test]
fn test_type_lookup() {
    let process = InMemoryProcess::from_json(SNAPSHOT).unwrap();
    assert_eq!(process.find_type("app.MainKt$main$1"), Some(TypeId(2)));
    assert_eq!(process.find_type("app.Missing"), None);
    assert_eq!(process.type_name(TypeId(0)).unwrap(), "kotlin.Any");
    assert_eq!(process.type_name(TypeId(5)), Err(IntrospectionError::UnknownType(TypeId(5))));
}

#[test]
fn test_thread_states() {
    let process = InMemoryProcess::from_json(SNAPSHOT).unwrap();

    assert!(process.is_thread_suspended(ThreadId(1)));
    assert!(!process.is_thread_suspended(ThreadId(2)));
    assert!(!process.is_thread_suspended(ThreadId(3)));
    assert_eq!(process.enumerate_frames(ThreadId(1)).unwrap().len(), 1);
    assert_eq!(
        process.enumerate_frames(ThreadId(2)),
        Err(IntrospectionError::ThreadNotSuspended(ThreadId(2)))
    );
    assert_eq!(
        process.enumerate_frames(ThreadId(3)),
        Err(IntrospectionError::UnknownThread(ThreadId(3)))
    );
}

#[test]
fn test_builder_ids_and_upsert() {
    let mut process = InMemoryProcess::new();
    let ty = process.add_type("app.Box", &[]);
    let first = process.add_object(ty);
    let second = process.add_object(ty);
    assert_eq!(first, ObjectId(1));
    assert_eq!(second, ObjectId(2));

    process.set_field(first, "value", Value::Int(1));
    process.set_field(first, "value", Value::Int(2));
    assert_eq!(process.objects[0].fields.len(), 1);
    assert_eq!(process.read_field(first, "value").unwrap(), Value::Int(2));
}

#[test]
fn test_snapshot_survives_serialization() {
    let process = InMemoryProcess::from_json(SNAPSHOT).unwrap();
    let json = serde_json::to_string(&process).unwrap();
    assert_eq!(InMemoryProcess::from_json(&json).unwrap(), process);
}

use super::*;

fn metadata() -> RawDebugMetadata {
    RawDebugMetadata {
        source_file: "Loader.kt".to_string(),
        class_name: "app.LoaderKt".to_string(),
        method_name: "load".to_string(),
        line_numbers: vec![12, 15, 19],
        spilled: vec!["L$0".to_string(), "L$1".to_string(), "I$0".to_string()],
        local_names: vec!["url".to_string(), "buffer".to_string(), "retries".to_string()],
        index_to_label: vec![0, 1, 1],
    }
}

#[test]
fn test_label_field_is_stored_off_by_one() {
    assert_eq!(RawDebugMetadata::label_from_field(1), 0);
    assert_eq!(RawDebugMetadata::label_from_field(3), 2);
    assert_eq!(RawDebugMetadata::label_from_field(0), -1);
}

#[test]
fn test_label_field_out_of_range_is_not_a_label() {
    assert_eq!(RawDebugMetadata::label_from_field(i64::MAX), -1);
}

#[test]
fn test_line_number_per_label() {
    let metadata = metadata();
    assert_eq!(metadata.line_number(0), 12);
    assert_eq!(metadata.line_number(2), 19);
}

#[test]
fn test_line_number_before_first_suspension() {
    assert_eq!(metadata().line_number(-1), -1);
}

#[test]
fn test_line_number_past_last_label() {
    assert_eq!(metadata().line_number(3), -1);
}

#[test]
fn test_stack_trace_element() {
    let element = metadata().stack_trace_element(1);
    assert_eq!(
        element,
        StackTraceElement {
            class_name: "app.LoaderKt".to_string(),
            method_name: "load".to_string(),
            source_file: "Loader.kt".to_string(),
            line: 15,
        }
    );
}

#[test]
fn test_spilled_mapping_filters_by_label() {
    let mapping = metadata().spilled_variable_mapping(1);
    let names: Vec<(&str, &str)> = mapping
        .iter()
        .map(|m| (m.field_name.as_str(), m.variable_name.as_str()))
        .collect();
    assert_eq!(names, vec![("L$1", "buffer"), ("I$0", "retries")]);
}

#[test]
fn test_spilled_mapping_empty_for_unknown_label() {
    assert!(metadata().spilled_variable_mapping(7).is_empty());
    assert!(metadata().spilled_variable_mapping(-1).is_empty());
}

#[test]
fn test_spilled_mapping_ignores_ragged_tail() {
    let mut metadata = metadata();
    metadata.local_names.truncate(1);
    let mapping = metadata.spilled_variable_mapping(0);
    assert_eq!(mapping.len(), 1);
    assert!(metadata.spilled_variable_mapping(1).is_empty());
}

#[test]
fn test_metadata_deserializes_with_missing_fields() {
    let metadata: RawDebugMetadata =
        serde_json::from_str(r#"{"className":"app.MainKt","lineNumbers":[4]}"#).unwrap();
    assert_eq!(metadata.class_name, "app.MainKt");
    assert_eq!(metadata.line_number(0), 4);
    assert!(metadata.spilled.is_empty());
}

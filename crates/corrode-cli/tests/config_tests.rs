use crate::config::{CorrodeConfig, load_config, load_or_default, parse_config};
use std::io::Write;

#[test]
fn test_empty_config_is_default() {
    assert_eq!(parse_config("{}").unwrap(), CorrodeConfig::default());
}

#[test]
fn test_partial_sections_keep_defaults() {
    let config = parse_config(
        r#"{
            "resolve": { "rootType": "std.Object" },
            "reconstruction": { "maxChainSteps": 8, "traceFrames": true }
        }"#,
    )
    .unwrap();

    assert_eq!(config.resolve.root_type, "std.Object");
    assert_eq!(config.resolve.unit_type, "builtins.Unit");
    assert_eq!(config.reconstruction.max_chain_steps, 8);
    assert!(config.reconstruction.trace_frames);
    assert_eq!(config.reconstruction.completion_field, "completion");
}

#[test]
fn test_unknown_section_is_rejected() {
    assert!(parse_config(r#"{ "reslove": {} }"#).is_err());
}

#[test]
fn test_unknown_resolve_option_is_rejected() {
    let err = parse_config(r#"{ "resolve": { "scopePriority": "oldest_first" } }"#).unwrap_err();
    assert!(format!("{err:#}").contains("scopePriority"), "{err:#}");
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "reconstruction": {{ "labelField": "state" }} }}"#).unwrap();

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.reconstruction.label_field, "state");
}

#[test]
fn test_missing_config_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = load_config(&path).unwrap_err();

    assert!(format!("{err}").contains("absent.json"));
}

#[test]
fn test_no_config_path_uses_defaults() {
    assert_eq!(load_or_default(None).unwrap(), CorrodeConfig::default());
}

use crate::tracing_config::{LogFormat, filter_directives};

#[test]
fn test_log_format_parse() {
    assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::parse("text"), LogFormat::Text);
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("yaml"), LogFormat::Text);
}

#[test]
fn test_corrode_log_takes_precedence() {
    assert_eq!(filter_directives(Some("corrode_resolve=trace"), Some("warn")), Some("corrode_resolve=trace"));
    assert_eq!(filter_directives(None, Some("warn")), Some("warn"));
    assert_eq!(filter_directives(None, None), None);
}

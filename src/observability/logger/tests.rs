use super::*;
use crate::function::Value;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_logger_creation() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.log");

    let logger = Logger::new(Some(&log_path), Some("debug"));
    assert!(logger.is_ok());

    let logger = logger.unwrap();
    assert_eq!(logger.log_file(), &log_path);
    assert_eq!(logger.log_level(), "DEBUG");
}

#[test]
fn test_log_file_creation() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("logs").join("test.md");

    let _logger = Logger::new(Some(&log_path), None).unwrap();
    assert!(log_path.exists());

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("# Function Call Log"));
    assert!(content.contains("Log started:"));
}

#[test]
fn test_existing_log_is_appended() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");
    std::fs::write(&log_path, "previous session\n").unwrap();

    let logger = Logger::new(Some(&log_path), None).unwrap();
    logger.log_custom("Note", "second session").unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.starts_with("previous session"));
    assert!(!content.contains("# Function Call Log"));
    assert!(content.contains("### Note"));
}

#[test]
fn test_log_operations() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");
    let logger = Logger::new(Some(&log_path), None).unwrap();

    let def = Definition::new("greet", "Greet a person", json!({"type": "object"}));
    assert!(logger.log_definition(&def, "cache").is_ok());

    let call = Call::new("greet", Params::raw(["\"Ann\"", "30"]));
    assert!(logger.log_resolution("say hi to Ann", &call).is_ok());
    assert!(logger.log_binding("greet", 0).is_ok());
    assert!(logger.log_invocation("greet", "Hello, Ann!", true).is_ok());
    assert!(logger.log_error("model offline", Some("hi")).is_ok());

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("### Definition"));
    assert!(content.contains("**Source:** cache"));
    assert!(content.contains("**Call:** `greet(\"Ann\",30)`"));
    assert!(content.contains("**Deferred slots:** 0"));
    assert!(content.contains("**Result:** Hello, Ann!"));
    assert!(content.contains("**Error:** model offline"));
    assert!(content.contains("**Input:** hi"));
}

#[test]
fn test_debug_level_includes_schema() {
    let temp_dir = tempdir().unwrap();
    let def = Definition::new(
        "weather",
        "Weather in a city",
        json!({"type": "object", "properties": {"city": {"type": "string"}}}),
    );

    let info_path = temp_dir.path().join("info.md");
    let logger = Logger::new(Some(&info_path), None).unwrap();
    logger.log_definition(&def, "definer").unwrap();
    let content = std::fs::read_to_string(&info_path).unwrap();
    assert!(!content.contains("```json"));

    let debug_path = temp_dir.path().join("debug.md");
    let logger = Logger::new(Some(&debug_path), Some("DEBUG")).unwrap();
    logger.log_definition(&def, "definer").unwrap();
    let content = std::fs::read_to_string(&debug_path).unwrap();
    assert!(content.contains("```json"));
    assert!(content.contains("\"city\""));
}

#[test]
fn test_typed_params_rendering() {
    let params = Params::typed([Value::from("Ann"), Value::Int(30)]);
    assert_eq!(format_params(&params), "\"Ann\",30");
}

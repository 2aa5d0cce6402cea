//! YAML parsing with error handling

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with nice error messages
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    parse_yaml(&content, &filename)
}

/// Serialize a value to a YAML string
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String, YamlError> {
    serde_yml::to_string(value).map_err(|e| YamlError::Serialize(e.to_string()))
}

/// Serialize a value and write it to `path`
pub fn write_yaml_file<T: Serialize>(path: &Path, value: &T) -> Result<(), YamlError> {
    let content = to_yaml(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{LabSession, Variable};
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        name: String,
        value: i32,
    }

    #[test]
    fn test_parse_valid_yaml() {
        let yaml = "name: test\nvalue: 42";
        let result: TestStruct = parse_yaml(yaml, "test.yaml").unwrap();
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[test]
    fn test_parse_invalid_yaml_returns_error() {
        let yaml = "name: test\n  invalid indentation";
        let result: Result<TestStruct, _> = parse_yaml(yaml, "test.yaml");
        assert!(matches!(result, Err(YamlError::Syntax(_))));
    }

    #[test]
    fn test_unknown_session_key_reports_filename() {
        let yaml = "formula: x\nsample_count: 10\ncolour: red\n";
        let err = parse_yaml::<LabSession>(yaml, "beam.yaml").unwrap_err();
        match err {
            YamlError::Syntax(syntax) => {
                assert_eq!(syntax.filename, "beam.yaml");
                assert!(syntax.message.contains("colour"), "{}", syntax.message);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_session_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.yaml");
        let session = LabSession::new("2 * x", 50).with_variable(Variable::fixed("x", 1.5));

        write_yaml_file(&path, &session).unwrap();
        let loaded: LabSession = parse_yaml_file(&path).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result: Result<LabSession, _> = parse_yaml_file(&dir.path().join("nope.yaml"));
        assert!(matches!(result, Err(YamlError::Io(_))));
    }
}

//! # Descriptor Validation
//!
//! Checks a parsed `iproj.json` against the descriptor schema. Violations
//! are collected as `(path, message)` pairs and never thrown: a descriptor
//! with a wrongly typed field is still usable, and [`check`] returns a
//! best-effort [`IProject`] built from the fields that passed.
//!
//! Paths are JSON pointers (`/preUsrlibl/1`).

use std::fmt;

use log::warn;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::descriptor::{IProject, ProjectDocument};

const STRING_FIELDS: &[&str] = &[
    "description",
    "version",
    "license",
    "repository",
    "objlib",
    "curlib",
    "buildCommand",
    "compileCommand",
    "iasp",
    "sqlPath",
];

const LIST_FIELDS: &[&str] = &["preUsrlibl", "postUsrlibl", "includePath", "setIBMiEnvCmd"];

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of validating one descriptor read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Validate a descriptor and build its best-effort typed view.
pub fn check(doc: &ProjectDocument) -> (IProject, ValidationResult) {
    let mut violations = Vec::new();
    let mut valid = Map::new();

    for (key, value) in doc.fields().clone() {
        let path = format!("/{}", key);
        if STRING_FIELDS.contains(&key.as_str()) {
            if value.is_string() {
                valid.insert(key, value);
            } else {
                violations.push(Violation::new(
                    path,
                    format!("expected string, found {}", type_name(&value)),
                ));
            }
        } else if LIST_FIELDS.contains(&key.as_str()) {
            match value {
                JsonValue::Array(items) => {
                    let mut strings = Vec::new();
                    for (idx, item) in items.into_iter().enumerate() {
                        if item.is_string() {
                            strings.push(item);
                        } else {
                            violations.push(Violation::new(
                                format!("{}/{}", path, idx),
                                format!("expected string, found {}", type_name(&item)),
                            ));
                        }
                    }
                    valid.insert(key, JsonValue::Array(strings));
                }
                other => violations.push(Violation::new(
                    path,
                    format!("expected array, found {}", type_name(&other)),
                )),
            }
        } else if key == "extensions" {
            match value {
                JsonValue::Object(extensions) => {
                    let mut kept = Map::new();
                    for (name, extension) in extensions {
                        if extension.is_object() {
                            kept.insert(name, extension);
                        } else {
                            violations.push(Violation::new(
                                format!("{}/{}", path, name),
                                format!("expected object, found {}", type_name(&extension)),
                            ));
                        }
                    }
                    valid.insert(key, JsonValue::Object(kept));
                }
                other => violations.push(Violation::new(
                    path,
                    format!("expected object, found {}", type_name(&other)),
                )),
            }
        } else {
            valid.insert(key, value);
        }
    }

    let project = match serde_json::from_value::<IProject>(JsonValue::Object(valid)) {
        Ok(project) => project,
        Err(e) => {
            violations.push(Violation::new("/", e.to_string()));
            IProject::default()
        }
    };

    for violation in &violations {
        warn!("Descriptor schema violation at {}", violation);
    }

    (project, ValidationResult { violations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn doc(text: &str) -> ProjectDocument {
        ProjectDocument::parse(text, Path::new("iproj.json")).unwrap()
    }

    #[test]
    fn test_valid_descriptor() {
        let (project, result) = check(&doc(
            r#"{"curlib": "&CURLIB", "preUsrlibl": ["A"], "extensions": {"v": {}}}"#,
        ));
        assert!(result.is_valid());
        assert_eq!(project.curlib.as_deref(), Some("&CURLIB"));
    }

    #[test]
    fn test_wrong_scalar_type_is_soft() {
        let (project, result) = check(&doc(r#"{"objlib": 42, "curlib": "QGPL"}"#));
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "/objlib");
        assert!(result.violations[0].message.contains("number"));
        assert_eq!(project.objlib, None);
        assert_eq!(project.curlib.as_deref(), Some("QGPL"));
    }

    #[test]
    fn test_list_element_violations_keep_valid_elements() {
        let (project, result) = check(&doc(r#"{"includePath": ["a", 1, "b", null]}"#));
        let paths: Vec<_> = result.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["/includePath/1", "/includePath/3"]);
        assert_eq!(
            project.include_path,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_list_field_must_be_array() {
        let (project, result) = check(&doc(r#"{"postUsrlibl": "QGPL"}"#));
        assert_eq!(result.violations[0].path, "/postUsrlibl");
        assert_eq!(project.post_usrlibl, None);
    }

    #[test]
    fn test_extension_must_be_object() {
        let (project, result) = check(&doc(r#"{"extensions": {"good": {}, "bad": 1}}"#));
        assert_eq!(result.violations[0].path, "/extensions/bad");
        let extensions = project.extensions.unwrap();
        assert!(extensions.contains_key("good"));
        assert!(!extensions.contains_key("bad"));
    }

    #[test]
    fn test_unknown_keys_are_not_violations() {
        let (project, result) = check(&doc(r#"{"vendorSpecific": [1, 2]}"#));
        assert!(result.is_valid());
        assert!(project.other.contains_key("vendorSpecific"));
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation::new("/objlib", "expected string, found number");
        assert_eq!(
            violation.to_string(),
            "/objlib: expected string, found number"
        );
    }

    #[test]
    fn test_violations_are_logged_as_warnings() {
        testing_logger::setup();
        check(&doc(r#"{"iasp": true}"#));
        testing_logger::validate(|captured| {
            let warnings: Vec<_> = captured
                .iter()
                .filter(|log| log.level == log::Level::Warn)
                .collect();
            assert_eq!(warnings.len(), 1);
            assert_eq!(
                warnings[0].body,
                "Descriptor schema violation at /iasp: expected string, found boolean"
            );
        });
    }
}

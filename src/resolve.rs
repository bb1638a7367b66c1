//! # Variable Resolution
//!
//! A symbolic reference is a whole string of the form `&NAME`. Resolution
//! looks `NAME` up in the [`EnvironmentMap`] with a case-sensitive exact
//! match and substitutes the value when the name is present, even if the
//! value is empty. Unknown names leave the literal `&NAME` in place.
//!
//! Substitution is single-level: a value that is itself `&OTHER` is returned
//! as is and never followed.
//!
//! ```
//! use iproj::env::EnvironmentMap;
//! use iproj::resolve::resolve;
//!
//! let mut env = EnvironmentMap::new();
//! env.insert("CURLIB".to_string(), "QGPL".to_string());
//!
//! assert_eq!(resolve("&CURLIB", &env), "QGPL");
//! assert_eq!(resolve("&curlib", &env), "&curlib");
//! assert_eq!(resolve("QTEMP", &env), "QTEMP");
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::env::EnvironmentMap;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&([^\s&]+)$").expect("reference pattern is valid"));

/// Extract `NAME` from a `&NAME` reference.
pub fn variable_name(value: &str) -> Option<&str> {
    REFERENCE
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

/// Build the `&NAME` form of a variable name.
pub fn reference(name: &str) -> String {
    format!("&{}", name)
}

/// Resolve a single string.
pub fn resolve<'a>(value: &'a str, env: &'a EnvironmentMap) -> Cow<'a, str> {
    match variable_name(value).and_then(|name| env.get(name)) {
        Some(resolved) => Cow::Borrowed(resolved.as_str()),
        None => Cow::Borrowed(value),
    }
}

/// Resolve an optional string field.
pub fn resolve_opt(value: Option<&String>, env: &EnvironmentMap) -> Option<String> {
    value.map(|v| resolve(v, env).into_owned())
}

/// Resolve a list element-wise, keeping order and length.
pub fn resolve_list(values: &[String], env: &EnvironmentMap) -> Vec<String> {
    values
        .iter()
        .map(|value| resolve(value, env).into_owned())
        .collect()
}

/// Resolve a JSON scalar or array. Objects are opaque and returned as is.
pub fn resolve_value(value: &JsonValue, env: &EnvironmentMap) -> JsonValue {
    match value {
        JsonValue::String(s) => JsonValue::String(resolve(s, env).into_owned()),
        JsonValue::Array(items) => {
            JsonValue::Array(items.iter().map(|item| resolve_value(item, env)).collect())
        }
        other => other.clone(),
    }
}

/// Whether `concrete` may be represented by `&name`.
///
/// True when `name` is unset (it can be created with that value) or when
/// it already resolves to `concrete`.
pub fn unresolve(concrete: &str, name: &str, env: &EnvironmentMap) -> bool {
    match env.get(name) {
        Some(existing) => existing == concrete,
        None => true,
    }
}

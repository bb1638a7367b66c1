//! # Project Descriptor Schema
//!
//! This module defines the data structures that represent the `iproj.json`
//! project descriptor, in two forms:
//!
//! - **[`IProject`]**: the typed, read-only view used for resolution and
//!   derived state. Unknown keys are kept in [`IProject::other`].
//! - **[`ProjectDocument`]**: the raw JSON object that mutations edit and
//!   write back, so fields the engine does not understand (and fields that
//!   fail validation) are never dropped on rewrite.
//!
//! [`DescriptorField`] names the fields that can carry `&NAME` references.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::env::EnvironmentMap;
use crate::error::{Error, Result};
use crate::resolve::{resolve_list, resolve_opt};

/// Typed view of `iproj.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Target library for compiled objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objlib: Option<String>,
    /// Current library of the build job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curlib: Option<String>,
    /// Libraries placed in front of the user portion of the library list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_usrlibl: Option<Vec<String>>,
    /// Libraries placed after the user portion of the library list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_usrlibl: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_path: Option<Vec<String>>,
    /// Commands run to set up the build environment.
    #[serde(
        default,
        rename = "setIBMiEnvCmd",
        skip_serializing_if = "Option::is_none"
    )]
    pub set_ibmi_env_cmd: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iasp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_path: Option<String>,
    /// Vendor extensions, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, JsonValue>>,
    #[serde(flatten)]
    pub other: Map<String, JsonValue>,
}

impl IProject {
    /// Derive the resolved copy of this descriptor.
    ///
    /// Extensions and unknown keys are carried over untouched.
    pub fn resolve(&self, env: &EnvironmentMap) -> IProject {
        let list = |values: &Option<Vec<String>>| values.as_deref().map(|v| resolve_list(v, env));
        IProject {
            description: self.description.clone(),
            version: self.version.clone(),
            license: self.license.clone(),
            repository: self.repository.clone(),
            objlib: resolve_opt(self.objlib.as_ref(), env),
            curlib: resolve_opt(self.curlib.as_ref(), env),
            pre_usrlibl: list(&self.pre_usrlibl),
            post_usrlibl: list(&self.post_usrlibl),
            include_path: list(&self.include_path),
            set_ibmi_env_cmd: list(&self.set_ibmi_env_cmd),
            build_command: resolve_opt(self.build_command.as_ref(), env),
            compile_command: resolve_opt(self.compile_command.as_ref(), env),
            iasp: resolve_opt(self.iasp.as_ref(), env),
            sql_path: resolve_opt(self.sql_path.as_ref(), env),
            extensions: self.extensions.clone(),
            other: self.other.clone(),
        }
    }

    /// The user portion of the library list: `preUsrlibl ++ postUsrlibl`.
    pub fn user_libraries(&self) -> Vec<String> {
        self.pre_usrlibl
            .iter()
            .chain(self.post_usrlibl.iter())
            .flatten()
            .cloned()
            .collect()
    }

    /// Values currently stored in a field, scalar fields as a one-element
    /// list.
    pub fn field_values(&self, field: DescriptorField) -> Vec<String> {
        let scalar = |value: &Option<String>| -> Vec<String> { value.iter().cloned().collect() };
        let list = |values: &Option<Vec<String>>| -> Vec<String> { values.clone().unwrap_or_default() };
        match field {
            DescriptorField::Objlib => scalar(&self.objlib),
            DescriptorField::Curlib => scalar(&self.curlib),
            DescriptorField::Iasp => scalar(&self.iasp),
            DescriptorField::BuildCommand => scalar(&self.build_command),
            DescriptorField::CompileCommand => scalar(&self.compile_command),
            DescriptorField::PreUsrlibl => list(&self.pre_usrlibl),
            DescriptorField::PostUsrlibl => list(&self.post_usrlibl),
            DescriptorField::IncludePath => list(&self.include_path),
            DescriptorField::SetIbmiEnvCmd => list(&self.set_ibmi_env_cmd),
        }
    }
}

/// Fields of the descriptor that may hold `&NAME` references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DescriptorField {
    Objlib,
    Curlib,
    PreUsrlibl,
    PostUsrlibl,
    IncludePath,
    SetIbmiEnvCmd,
    BuildCommand,
    CompileCommand,
    Iasp,
}

impl DescriptorField {
    /// JSON key of the field.
    pub fn key(self) -> &'static str {
        match self {
            DescriptorField::Objlib => "objlib",
            DescriptorField::Curlib => "curlib",
            DescriptorField::PreUsrlibl => "preUsrlibl",
            DescriptorField::PostUsrlibl => "postUsrlibl",
            DescriptorField::IncludePath => "includePath",
            DescriptorField::SetIbmiEnvCmd => "setIBMiEnvCmd",
            DescriptorField::BuildCommand => "buildCommand",
            DescriptorField::CompileCommand => "compileCommand",
            DescriptorField::Iasp => "iasp",
        }
    }

    /// Whether the field holds a list of strings.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            DescriptorField::PreUsrlibl
                | DescriptorField::PostUsrlibl
                | DescriptorField::IncludePath
                | DescriptorField::SetIbmiEnvCmd
        )
    }

    /// Order in which referenced variables are reported.
    pub const VARIABLE_ORDER: [DescriptorField; 7] = [
        DescriptorField::Curlib,
        DescriptorField::Objlib,
        DescriptorField::PostUsrlibl,
        DescriptorField::PreUsrlibl,
        DescriptorField::IncludePath,
        DescriptorField::Iasp,
        DescriptorField::SetIbmiEnvCmd,
    ];
}

impl fmt::Display for DescriptorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a user library sits relative to the system portion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryPosition {
    PreUsrlibl,
    PostUsrlibl,
}

impl LibraryPosition {
    pub fn field(self) -> DescriptorField {
        match self {
            LibraryPosition::PreUsrlibl => DescriptorField::PreUsrlibl,
            LibraryPosition::PostUsrlibl => DescriptorField::PostUsrlibl,
        }
    }
}

/// Direction of a list move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Raw JSON object backing `iproj.json`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDocument {
    root: Map<String, JsonValue>,
}

impl ProjectDocument {
    /// Parse descriptor text. Anything but a JSON object is rejected.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let value: JsonValue =
            serde_json::from_str(text).map_err(|e| Error::DescriptorParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        match value {
            JsonValue::Object(root) => Ok(Self { root }),
            _ => Err(Error::DescriptorParse {
                path: path.to_path_buf(),
                message: "expected a JSON object at the top level".to_string(),
            }),
        }
    }

    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.root
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root).map_err(|e| Error::Serialization {
            message: e.to_string(),
        })
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(JsonValue::as_str)
    }

    pub fn set_str(&mut self, key: &str, value: impl Into<String>) {
        self.root
            .insert(key.to_string(), JsonValue::String(value.into()));
    }

    /// String elements of a list field. Missing or non-list fields are empty.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.root
            .get(key)
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_list(&mut self, key: &str, values: Vec<String>) {
        let items = values.into_iter().map(JsonValue::String).collect();
        self.root.insert(key.to_string(), JsonValue::Array(items));
    }

    /// Values of a field as a list, scalars as one element.
    pub fn field_values(&self, field: DescriptorField) -> Vec<String> {
        if field.is_list() {
            self.get_list(field.key())
        } else {
            self.get_str(field.key())
                .map(|v| vec![v.to_string()])
                .unwrap_or_default()
        }
    }

    /// Store a field from its list form; scalar fields take the first value.
    pub fn set_field_values(&mut self, field: DescriptorField, values: Vec<String>) {
        if field.is_list() {
            self.set_list(field.key(), values);
        } else if let Some(first) = values.into_iter().next() {
            self.set_str(field.key(), first);
        }
    }
}

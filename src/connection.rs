//! # Remote Connection Interface
//!
//! The engine never talks to an IBM i system itself. Hosts hand it a
//! [`Connection`], and the engine relies only on the contracts below. The
//! transport, authentication and timeouts belong to the implementation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An object as reported by the remote system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbmiObject {
    pub library: String,
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub attribute: String,
    pub text: String,
}

/// A source member of a physical file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbmiMember {
    pub library: String,
    pub file: String,
    pub name: String,
    pub extension: String,
    pub text: String,
}

/// An entry of an IFS directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfsFile {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
}

/// Filter for [`Connection::list_objects`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFilter {
    pub library: String,
    /// Object name or generic name (`*ALL`, `ABC*`).
    pub object: String,
    /// Object types such as `*LIB` or `*FILE`; empty means all.
    pub types: Vec<String>,
}

/// Result of a remote CL or shell command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Capabilities consumed from the remote collaborator
pub trait Connection {
    fn check_object_exists(&self, library: &str, name: &str, object_type: &str) -> Result<bool>;

    fn list_objects(&self, filter: &ObjectFilter) -> Result<Vec<IbmiObject>>;

    fn list_members(&self, library: &str, file: &str) -> Result<Vec<IbmiMember>>;

    fn list_ifs_files(&self, path: &str) -> Result<Vec<IfsFile>>;

    fn run_command(&self, command: &str) -> Result<CommandResult>;

    fn download_directory(&self, remote_path: &str, local_path: &Path) -> Result<()>;

    fn temp_remote_path(&self, name: &str) -> Result<String>;

    /// The system portion of the library list, in search order.
    fn system_library_list(&self) -> Result<Vec<String>>;

    /// Describe library objects by name. Names the system does not know are
    /// absent from the result.
    fn describe_libraries(&self, names: &[String]) -> Result<Vec<IbmiObject>> {
        let mut described = Vec::new();
        for name in names {
            let filter = ObjectFilter {
                library: "QSYS".to_string(),
                object: name.clone(),
                types: vec!["*LIB".to_string()],
            };
            described.extend(self.list_objects(&filter)?);
        }
        Ok(described)
    }
}

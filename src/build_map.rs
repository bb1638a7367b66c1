//! # Build Map
//!
//! Directory-scoped build overrides (`.ibmi.json`) and their inheritance.
//!
//! The effective override of a directory merges every override file from
//! the project root down to that directory; nearer files win field by
//! field and absent fields inherit from the parent. The map of all override
//! files is scanned lazily and cached until invalidated. Any write through
//! [`BuildMap`] invalidates the whole map.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use walkdir::WalkDir;

use crate::defaults::{OVERRIDE_VERSION, SKIPPED_DIRS};
use crate::error::{Error, Result};

/// Target CCSID: a number, or a special value such as `*JOB`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ccsid {
    Number(u32),
    Special(String),
}

impl fmt::Display for Ccsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ccsid::Number(n) => write!(f, "{}", n),
            Ccsid::Special(s) => f.write_str(s),
        }
    }
}

/// Compile settings of an override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objlib: Option<String>,
    #[serde(default, rename = "tgtCcsid", skip_serializing_if = "Option::is_none")]
    pub tgt_ccsid: Option<Ccsid>,
    #[serde(flatten)]
    pub other: Map<String, JsonValue>,
}

/// Contents of one `.ibmi.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSettings>,
    #[serde(flatten)]
    pub other: Map<String, JsonValue>,
}

impl BuildOverride {
    /// Layer `child` on top of `self`.
    pub fn merged_with(&self, child: &BuildOverride) -> BuildOverride {
        let parent_build = self.build.clone().unwrap_or_default();
        let build = match &child.build {
            Some(child_build) => {
                let mut other = parent_build.other.clone();
                other.extend(child_build.other.clone());
                BuildSettings {
                    objlib: child_build.objlib.clone().or(parent_build.objlib),
                    tgt_ccsid: child_build.tgt_ccsid.clone().or(parent_build.tgt_ccsid),
                    other,
                }
            }
            None => parent_build,
        };
        let mut other = self.other.clone();
        other.extend(child.other.clone());
        BuildOverride {
            version: child.version.clone().or_else(|| self.version.clone()),
            build: if self.build.is_none() && child.build.is_none() {
                None
            } else {
                Some(build)
            },
            other,
        }
    }

    pub fn objlib(&self) -> Option<&str> {
        self.build.as_ref().and_then(|b| b.objlib.as_deref())
    }

    pub fn tgt_ccsid(&self) -> Option<&Ccsid> {
        self.build.as_ref().and_then(|b| b.tgt_ccsid.as_ref())
    }
}

/// Override files keyed by directory relative to the project root
pub type OverrideMap = HashMap<PathBuf, BuildOverride>;

fn parse_override(path: &Path) -> Result<Option<BuildOverride>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| Error::OverrideParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Cached map of every override file below a project root
#[derive(Debug)]
pub struct BuildMap {
    root: PathBuf,
    file_name: String,
    map: Mutex<Option<Arc<OverrideMap>>>,
}

impl BuildMap {
    pub fn new(root: PathBuf, file_name: impl Into<String>) -> Self {
        Self {
            root,
            file_name: file_name.into(),
            map: Mutex::new(None),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Directory of `path` relative to the root, or `None` outside the root.
    fn relative_dir(&self, path: &Path) -> Option<PathBuf> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root).ok()?.to_path_buf()
        } else {
            path.to_path_buf()
        };
        if relative
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return None;
        }
        if self.root.join(&relative).is_file() {
            Some(relative.parent().map(Path::to_path_buf).unwrap_or_default())
        } else {
            Some(relative)
        }
    }

    /// Rescan every override file below the root.
    pub fn update_build_map(&self) -> Result<Arc<OverrideMap>> {
        let mut map = OverrideMap::new();
        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && SKIPPED_DIRS
                        .iter()
                        .any(|skipped| entry.file_name() == *skipped))
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path while scanning overrides: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || entry.file_name() != self.file_name.as_str() {
                continue;
            }
            match parse_override(entry.path()) {
                Ok(Some(parsed)) => {
                    let dir = entry
                        .path()
                        .parent()
                        .and_then(|parent| parent.strip_prefix(&self.root).ok())
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    map.insert(dir, parsed);
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring override file: {}", e),
            }
        }

        debug!(
            "Scanned {} override files under {}",
            map.len(),
            self.root.display()
        );
        let map = Arc::new(map);
        *self.map.lock()? = Some(Arc::clone(&map));
        Ok(map)
    }

    /// The cached map, scanning when nothing is cached.
    pub fn build_map(&self) -> Result<Arc<OverrideMap>> {
        if let Some(map) = self.map.lock()?.as_ref() {
            return Ok(Arc::clone(map));
        }
        self.update_build_map()
    }

    /// Replace the cached map; `None` invalidates it.
    pub fn set_build_map(&self, map: Option<OverrideMap>) -> Result<()> {
        *self.map.lock()? = map.map(Arc::new);
        Ok(())
    }

    pub fn invalidate(&self) -> Result<()> {
        self.set_build_map(None)
    }

    /// Effective override for a directory (or the directory of a file).
    pub fn ibmi_json(&self, dir: &Path) -> Result<Option<BuildOverride>> {
        let Some(relative) = self.relative_dir(dir) else {
            return Ok(None);
        };
        let map = self.build_map()?;
        let chain: Vec<&Path> = relative.ancestors().collect();
        let effective = chain
            .into_iter()
            .rev()
            .filter_map(|ancestor| map.get(ancestor))
            .fold(None, |acc: Option<BuildOverride>, next| match acc {
                Some(parent) => Some(parent.merged_with(next)),
                None => Some(next.clone()),
            });
        Ok(effective)
    }

    fn update_override<F>(&self, dir: &Path, update: F) -> Result<()>
    where
        F: FnOnce(&mut BuildSettings),
    {
        let relative = self.relative_dir(dir).ok_or_else(|| Error::Path {
            message: format!(
                "{} is outside project {}",
                dir.display(),
                self.root.display()
            ),
        })?;
        let path = self.root.join(relative).join(&self.file_name);
        let mut contents = parse_override(&path)?.unwrap_or_else(|| BuildOverride {
            version: Some(OVERRIDE_VERSION.to_string()),
            ..Default::default()
        });
        update(contents.build.get_or_insert_with(BuildSettings::default));

        let json = serde_json::to_string_pretty(&contents).map_err(|e| Error::Serialization {
            message: e.to_string(),
        })?;
        fs::write(&path, json)?;
        debug!("Updated override file {}", path.display());
        self.invalidate()
    }

    /// Set `build.objlib` of one directory's override file.
    pub fn set_target_library_for_compiles(&self, dir: &Path, objlib: &str) -> Result<()> {
        self.update_override(dir, |build| build.objlib = Some(objlib.to_string()))
    }

    /// Set `build.tgtCcsid` of one directory's override file.
    pub fn set_target_ccsid_for_compiles(&self, dir: &Path, ccsid: Ccsid) -> Result<()> {
        self.update_override(dir, |build| build.tgt_ccsid = Some(ccsid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (TempDir, BuildMap) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            ".ibmi.json",
            r#"{"version": "0.0.1", "build": {"objlib": "ROOTLIB", "tgtCcsid": 37}}"#,
        );
        write(
            root,
            "qrpglesrc/.ibmi.json",
            r#"{"build": {"objlib": "&RPGLIB"}}"#,
        );
        write(root, "qrpglesrc/nested/hello.rpgle", "**free");
        write(root, "qsqlsrc/tables.sql", "create table t (a int)");
        let map = BuildMap::new(root.to_path_buf(), ".ibmi.json");
        (temp, map)
    }

    #[test]
    fn test_root_override() {
        let (temp, map) = fixture();
        let effective = map.ibmi_json(&temp.path().join("qsqlsrc")).unwrap().unwrap();
        assert_eq!(effective.objlib(), Some("ROOTLIB"));
        assert_eq!(effective.tgt_ccsid(), Some(&Ccsid::Number(37)));
    }

    #[test]
    fn test_child_overrides_parent_field_by_field() {
        let (temp, map) = fixture();
        let effective = map
            .ibmi_json(&temp.path().join("qrpglesrc/nested"))
            .unwrap()
            .unwrap();
        assert_eq!(effective.objlib(), Some("&RPGLIB"));
        assert_eq!(effective.tgt_ccsid(), Some(&Ccsid::Number(37)));
        assert_eq!(effective.version.as_deref(), Some("0.0.1"));
    }

    #[test]
    fn test_file_path_uses_its_directory() {
        let (temp, map) = fixture();
        let effective = map
            .ibmi_json(&temp.path().join("qrpglesrc/nested/hello.rpgle"))
            .unwrap()
            .unwrap();
        assert_eq!(effective.objlib(), Some("&RPGLIB"));
    }

    #[test]
    fn test_relative_path() {
        let (_temp, map) = fixture();
        let effective = map.ibmi_json(Path::new("qrpglesrc")).unwrap().unwrap();
        assert_eq!(effective.objlib(), Some("&RPGLIB"));
    }

    #[test]
    fn test_outside_root_is_none() {
        let (_temp, map) = fixture();
        let other = TempDir::new().unwrap();
        assert!(map.ibmi_json(other.path()).unwrap().is_none());
    }

    #[test]
    fn test_parent_dir_escaping_root_is_none() {
        let (temp, map) = fixture();
        assert!(map.ibmi_json(Path::new("../other")).unwrap().is_none());
        let escaped = temp.path().join("qrpglesrc/../../other");
        assert!(map.ibmi_json(&escaped).unwrap().is_none());
    }

    #[test]
    fn test_no_overrides() {
        let temp = TempDir::new().unwrap();
        let map = BuildMap::new(temp.path().to_path_buf(), ".ibmi.json");
        assert!(map.ibmi_json(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_skipped_dirs_and_malformed_files() {
        let (temp, map) = fixture();
        write(temp.path(), ".logs/.ibmi.json", r#"{"build": {"objlib": "X"}}"#);
        write(temp.path(), "qsqlsrc/.ibmi.json", "{not json");
        let scanned = map.update_build_map().unwrap();
        assert_eq!(scanned.len(), 2);
        assert!(scanned.contains_key(Path::new("")));
        assert!(scanned.contains_key(Path::new("qrpglesrc")));
    }

    #[test]
    fn test_cache_is_stale_until_invalidated() {
        let (temp, map) = fixture();
        assert_eq!(
            map.ibmi_json(&temp.path().join("qsqlsrc"))
                .unwrap()
                .unwrap()
                .objlib(),
            Some("ROOTLIB")
        );

        write(temp.path(), "qsqlsrc/.ibmi.json", r#"{"build": {"objlib": "SQLLIB"}}"#);
        assert_eq!(
            map.ibmi_json(&temp.path().join("qsqlsrc"))
                .unwrap()
                .unwrap()
                .objlib(),
            Some("ROOTLIB")
        );

        map.set_build_map(None).unwrap();
        assert_eq!(
            map.ibmi_json(&temp.path().join("qsqlsrc"))
                .unwrap()
                .unwrap()
                .objlib(),
            Some("SQLLIB")
        );
    }

    #[test]
    fn test_set_build_map_replaces_cache() {
        let (temp, map) = fixture();
        let mut replacement = OverrideMap::new();
        replacement.insert(
            PathBuf::new(),
            BuildOverride {
                build: Some(BuildSettings {
                    objlib: Some("INJECTED".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        map.set_build_map(Some(replacement)).unwrap();
        let effective = map.ibmi_json(temp.path()).unwrap().unwrap();
        assert_eq!(effective.objlib(), Some("INJECTED"));
    }

    #[test]
    fn test_set_target_library_creates_file() {
        let (temp, map) = fixture();
        let dir = temp.path().join("qsqlsrc");
        map.set_target_library_for_compiles(&dir, "&SQLLIB").unwrap();

        let written: BuildOverride =
            serde_json::from_str(&fs::read_to_string(dir.join(".ibmi.json")).unwrap()).unwrap();
        assert_eq!(written.version.as_deref(), Some("0.0.1"));
        assert_eq!(written.objlib(), Some("&SQLLIB"));

        let effective = map.ibmi_json(&dir).unwrap().unwrap();
        assert_eq!(effective.objlib(), Some("&SQLLIB"));
        assert_eq!(effective.tgt_ccsid(), Some(&Ccsid::Number(37)));
    }

    #[test]
    fn test_set_target_ccsid_keeps_other_fields() {
        let (temp, map) = fixture();
        let dir = temp.path().join("qrpglesrc");
        map.set_target_ccsid_for_compiles(&dir, Ccsid::Special("*JOB".to_string()))
            .unwrap();
        let effective = map.ibmi_json(&dir).unwrap().unwrap();
        assert_eq!(effective.objlib(), Some("&RPGLIB"));
        assert_eq!(effective.tgt_ccsid().unwrap().to_string(), "*JOB");
    }
}

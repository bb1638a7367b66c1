//! # Project
//!
//! One resolution engine per project root. A [`Project`] owns the cached
//! views derived from the files under its root:
//!
//! - the descriptor state (raw, resolved, validation result), computed from
//!   a single read of `iproj.json` and `.env`;
//! - the [`BuildMap`] of directory overrides;
//! - the last built library list;
//! - the job log history.
//!
//! Every cache slot holds an `Arc` that is swapped whole, so readers see
//! either the previous or the recomputed value. Mutations read the
//! descriptor from disk, edit the raw document, write it back and clear the
//! state slot before returning; the next read recomputes.
//!
//! A missing `iproj.json` reads as an empty descriptor. Mutations on such a
//! project create the file.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use serde::Serialize;

use crate::build_map::{BuildMap, BuildOverride, Ccsid};
use crate::config::EngineConfig;
use crate::connection::Connection;
use crate::descriptor::{DescriptorField, Direction, IProject, LibraryPosition, ProjectDocument};
use crate::env::{self, EnvironmentMap};
use crate::error::{Error, Result};
use crate::events::{EventBus, ProjectEvent};
use crate::job_log::{JobLogEntry, JobLogInfo, JobLogStore};
use crate::library_list::{LibraryListBuilder, LibraryListEntry};
use crate::resolve::{self, reference, resolve, resolve_list, variable_name};
use crate::validate::{self, ValidationResult};

/// Role a library plays in the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LibraryRole {
    Objlib,
    Curlib,
    PreUsrlibl,
    PostUsrlibl,
}

impl fmt::Display for LibraryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LibraryRole::Objlib => "objlib",
            LibraryRole::Curlib => "curlib",
            LibraryRole::PreUsrlibl => "preUsrlibl",
            LibraryRole::PostUsrlibl => "postUsrlibl",
        };
        f.write_str(name)
    }
}

/// Everything derived from one read of the descriptor and environment
#[derive(Debug, Clone)]
pub struct ProjectState {
    pub unresolved: IProject,
    pub resolved: IProject,
    pub env: EnvironmentMap,
    pub validation: ValidationResult,
}

/// Resolution engine for one project root
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: EngineConfig,
    events: Arc<EventBus>,
    state: Mutex<Option<Arc<ProjectState>>>,
    build_map: BuildMap,
    library_list: Mutex<Option<Arc<Vec<LibraryListEntry>>>>,
    job_logs: Mutex<JobLogStore>,
    deploy_location: Mutex<Option<String>>,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: EngineConfig, events: Arc<EventBus>) -> Self {
        let root = root.into();
        let build_map = BuildMap::new(root.clone(), config.override_file.clone());
        let job_logs = JobLogStore::new(
            config.job_log_path(&root),
            config.output_log_path(&root),
            config.job_log_capacity,
        );
        Self {
            root,
            config,
            events,
            state: Mutex::new(None),
            build_map,
            library_list: Mutex::new(None),
            job_logs: Mutex::new(job_logs),
            deploy_location: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.config.descriptor_path(&self.root)
    }

    pub fn env_path(&self) -> PathBuf {
        self.config.env_path(&self.root)
    }

    pub fn build_map(&self) -> &BuildMap {
        &self.build_map
    }

    /// Folder name of the project root.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    pub fn description(&self) -> Result<Option<String>> {
        Ok(self.snapshot()?.unresolved.description.clone())
    }

    fn emit(&self, event: fn(PathBuf) -> ProjectEvent) {
        self.events.emit(event(self.root.clone()));
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    fn read_document(&self) -> Result<ProjectDocument> {
        let path = self.descriptor_path();
        match fs::read_to_string(&path) {
            Ok(text) => ProjectDocument::parse(&text, &path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ProjectDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn load_state(&self) -> Result<ProjectState> {
        let document = self.read_document()?;
        let env = env::read(&self.env_path())?;
        let (unresolved, validation) = validate::check(&document);
        let resolved = unresolved.resolve(&env);
        debug!("Recomputed state of {}", self.root.display());
        Ok(ProjectState {
            unresolved,
            resolved,
            env,
            validation,
        })
    }

    /// Cached state, recomputed from disk when invalidated.
    pub fn snapshot(&self) -> Result<Arc<ProjectState>> {
        if let Some(state) = self.state.lock()?.as_ref() {
            return Ok(Arc::clone(state));
        }
        let state = Arc::new(self.load_state()?);
        *self.state.lock()? = Some(Arc::clone(&state));
        Ok(state)
    }

    /// Descriptor with variables substituted.
    pub fn state(&self) -> Result<IProject> {
        Ok(self.snapshot()?.resolved.clone())
    }

    /// Descriptor as written.
    pub fn unresolved_state(&self) -> Result<IProject> {
        Ok(self.snapshot()?.unresolved.clone())
    }

    pub fn validation(&self) -> Result<ValidationResult> {
        Ok(self.snapshot()?.validation.clone())
    }

    pub fn env(&self) -> Result<EnvironmentMap> {
        Ok(self.snapshot()?.env.clone())
    }

    pub fn invalidate_state(&self) -> Result<()> {
        *self.state.lock()? = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Descriptor mutations
    // ------------------------------------------------------------------

    /// Apply an edit to the on-disk descriptor. The file is only rewritten
    /// when the edit changed something.
    fn update_descriptor<T, F>(&self, update: F) -> Result<T>
    where
        F: FnOnce(&mut ProjectDocument, &EnvironmentMap) -> T,
    {
        let mut document = self.read_document()?;
        let env = env::read(&self.env_path())?;
        let before = document.clone();
        let outcome = update(&mut document, &env);
        if document != before {
            fs::write(self.descriptor_path(), document.to_json()?)?;
            self.invalidate_state()?;
            self.emit(|root| ProjectEvent::StateChanged { root });
        }
        Ok(outcome)
    }

    /// Write entries to the environment file and invalidate the state.
    pub fn update_env<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        env::upsert(&self.env_path(), entries)?;
        self.invalidate_state()?;
        self.emit(|root| ProjectEvent::StateChanged { root });
        Ok(())
    }

    pub fn set_build_or_compile_command(&self, command: &str, is_build_command: bool) -> Result<()> {
        let field = if is_build_command {
            DescriptorField::BuildCommand
        } else {
            DescriptorField::CompileCommand
        };
        self.update_descriptor(|doc, _| doc.set_str(field.key(), command))
    }

    pub fn set_current_library(&self, library: &str) -> Result<()> {
        self.update_descriptor(|doc, _| doc.set_str(DescriptorField::Curlib.key(), library))
    }

    /// Append `value` unless the literal is already present. A variable
    /// that happens to resolve to `value` is not considered a duplicate.
    fn add_to_list(&self, field: DescriptorField, value: &str) -> Result<bool> {
        self.update_descriptor(|doc, _| {
            let mut values = doc.get_list(field.key());
            if values.iter().any(|existing| existing == value) {
                return false;
            }
            values.push(value.to_string());
            doc.set_list(field.key(), values);
            true
        })
    }

    /// Index of `value` in a list: the first raw match, else the first
    /// element resolving to it.
    fn position_of(values: &[String], value: &str, env: &EnvironmentMap) -> Option<usize> {
        values
            .iter()
            .position(|existing| existing == value)
            .or_else(|| {
                values
                    .iter()
                    .position(|existing| resolve(existing, env) == value)
            })
    }

    fn remove_from_list(&self, field: DescriptorField, value: &str) -> Result<bool> {
        self.update_descriptor(|doc, env| {
            let mut values = doc.get_list(field.key());
            match Self::position_of(&values, value, env) {
                Some(idx) => {
                    values.remove(idx);
                    doc.set_list(field.key(), values);
                    true
                }
                None => false,
            }
        })
    }

    fn move_in_list(&self, field: DescriptorField, value: &str, direction: Direction) -> Result<bool> {
        self.update_descriptor(|doc, env| {
            let mut values = doc.get_list(field.key());
            let Some(idx) = Self::position_of(&values, value, env) else {
                return false;
            };
            let target = match direction {
                Direction::Up if idx > 0 => idx - 1,
                Direction::Down if idx + 1 < values.len() => idx + 1,
                _ => return false,
            };
            values.swap(idx, target);
            doc.set_list(field.key(), values);
            true
        })
    }

    pub fn add_to_include_paths(&self, path: &str) -> Result<bool> {
        self.add_to_list(DescriptorField::IncludePath, path)
    }

    pub fn remove_from_include_paths(&self, path: &str) -> Result<bool> {
        self.remove_from_list(DescriptorField::IncludePath, path)
    }

    pub fn move_include_path(&self, path: &str, direction: Direction) -> Result<bool> {
        self.move_in_list(DescriptorField::IncludePath, path, direction)
    }

    pub fn add_to_library_list(&self, library: &str, position: LibraryPosition) -> Result<bool> {
        self.add_to_list(position.field(), library)
    }

    pub fn remove_from_library_list(&self, library: &str, position: LibraryPosition) -> Result<bool> {
        self.remove_from_list(position.field(), library)
    }

    pub fn move_library(
        &self,
        library: &str,
        position: LibraryPosition,
        direction: Direction,
    ) -> Result<bool> {
        self.move_in_list(position.field(), library, direction)
    }

    /// Replace `value` in the given fields with `&NAME` and store
    /// `NAME=value` in the environment file.
    ///
    /// `NAME` is upper-cased for both the reference and the environment
    /// key. Slots are matched by their resolved value. Returns how many
    /// slots were replaced; nothing is written when none matched.
    pub fn configure_as_variable(
        &self,
        fields: &[DescriptorField],
        name: &str,
        value: &str,
    ) -> Result<usize> {
        let name = name.to_uppercase();
        let variable = reference(&name);

        let document = self.read_document()?;
        let env = env::read(&self.env_path())?;
        let matches = fields
            .iter()
            .flat_map(|field| resolve_list(&document.field_values(*field), &env))
            .filter(|resolved| resolved == value)
            .count();
        if matches == 0 {
            return Ok(0);
        }

        if let Some(previous) = env.get(&name).filter(|_| !resolve::unresolve(value, &name, &env)) {
            warn!(
                "Variable {} is being redefined from '{}' to '{}'",
                name, previous, value
            );
        }
        env::upsert(&self.env_path(), [(name.as_str(), value)])?;

        let replaced = self.update_descriptor(|doc, env| {
            let mut replaced = 0;
            for field in fields {
                let values = doc.field_values(*field);
                if !values.iter().any(|existing| resolve(existing, env) == value) {
                    continue;
                }
                let values: Vec<String> = values
                    .into_iter()
                    .map(|existing| {
                        if resolve(&existing, env) == value {
                            replaced += 1;
                            variable.clone()
                        } else {
                            existing
                        }
                    })
                    .collect();
                doc.set_field_values(*field, values);
            }
            replaced
        })?;
        self.invalidate_state()?;
        Ok(replaced)
    }

    /// Set the top-level `objlib`, literally or through `&VARIABLE`.
    pub fn set_as_target_library_for_compiles(
        &self,
        library: &str,
        variable: Option<&str>,
    ) -> Result<()> {
        let value = match variable {
            Some(variable) => {
                let name = variable.to_uppercase();
                env::upsert(&self.env_path(), [(name.as_str(), library)])?;
                self.invalidate_state()?;
                reference(&name)
            }
            None => library.to_string(),
        };
        self.update_descriptor(|doc, _| doc.set_str(DescriptorField::Objlib.key(), value))
    }

    /// Point one directory's override `objlib` at `&VARIABLE` and store
    /// `VARIABLE=library`.
    pub fn set_target_library_for_compiles(
        &self,
        dir: &Path,
        library: &str,
        variable: &str,
    ) -> Result<()> {
        let name = variable.to_uppercase();
        env::upsert(&self.env_path(), [(name.as_str(), library)])?;
        self.invalidate_state()?;
        self.build_map
            .set_target_library_for_compiles(dir, &reference(&name))?;
        self.emit(|root| ProjectEvent::StateChanged { root });
        self.emit(|root| ProjectEvent::BuildMapChanged { root });
        Ok(())
    }

    pub fn set_target_ccsid_for_compiles(&self, dir: &Path, ccsid: Ccsid) -> Result<()> {
        self.build_map.set_target_ccsid_for_compiles(dir, ccsid)?;
        self.emit(|root| ProjectEvent::BuildMapChanged { root });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// Referenced variable names, de-duplicated, in field order curlib,
    /// objlib, postUsrlibl, preUsrlibl, includePath, iasp, setIBMiEnvCmd.
    pub fn variables(&self) -> Result<Vec<String>> {
        let state = self.snapshot()?;
        let mut names: Vec<String> = Vec::new();
        for field in DescriptorField::VARIABLE_ORDER {
            for value in state.unresolved.field_values(field) {
                if let Some(name) = variable_name(&value) {
                    if !names.iter().any(|existing| existing == name) {
                        names.push(name.to_string());
                    }
                }
            }
        }
        Ok(names)
    }

    /// Referenced names with no entry in the environment file.
    pub fn missing_variables(&self) -> Result<Vec<String>> {
        let env = self.snapshot()?.env.clone();
        Ok(self
            .variables()?
            .into_iter()
            .filter(|name| !env.contains_key(name))
            .collect())
    }

    /// Add an empty entry for every missing variable; returns the names.
    pub fn ensure_variables(&self) -> Result<Vec<String>> {
        let missing = self.missing_variables()?;
        if !missing.is_empty() {
            self.update_env(missing.iter().map(|name| (name.as_str(), "")))?;
        }
        Ok(missing)
    }

    /// Resolved library names and the roles each one plays.
    pub fn object_libraries(&self) -> Result<BTreeMap<String, BTreeSet<LibraryRole>>> {
        let state = self.snapshot()?;
        let resolved = &state.resolved;
        let mut libraries: BTreeMap<String, BTreeSet<LibraryRole>> = BTreeMap::new();
        let mut add = |library: &String, role: LibraryRole| {
            libraries.entry(library.clone()).or_default().insert(role);
        };

        if let Some(objlib) = &resolved.objlib {
            add(objlib, LibraryRole::Objlib);
        }
        if let Some(curlib) = &resolved.curlib {
            add(curlib, LibraryRole::Curlib);
        }
        for library in resolved.pre_usrlibl.iter().flatten() {
            add(library, LibraryRole::PreUsrlibl);
        }
        for library in resolved.post_usrlibl.iter().flatten() {
            add(library, LibraryRole::PostUsrlibl);
        }
        Ok(libraries)
    }

    /// Effective override for a directory with variables substituted.
    pub fn ibmi_json(&self, dir: &Path) -> Result<Option<BuildOverride>> {
        let Some(mut effective) = self.build_map.ibmi_json(dir)? else {
            return Ok(None);
        };
        let env = self.snapshot()?.env.clone();
        if let Some(build) = effective.build.as_mut() {
            build.objlib = resolve::resolve_opt(build.objlib.as_ref(), &env);
            if let Some(Ccsid::Special(special)) = &build.tgt_ccsid {
                let resolved = resolve(special, &env).into_owned();
                build.tgt_ccsid = Some(match resolved.parse::<u32>() {
                    Ok(number) => Ccsid::Number(number),
                    Err(_) => Ccsid::Special(resolved),
                });
            }
        }
        Ok(Some(effective))
    }

    pub fn invalidate_build_map(&self) -> Result<()> {
        self.build_map.invalidate()?;
        self.emit(|root| ProjectEvent::BuildMapChanged { root });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Library list
    // ------------------------------------------------------------------

    /// Last built library list; `None` until [`Project::update_library_list`].
    pub fn library_list(&self) -> Result<Option<Arc<Vec<LibraryListEntry>>>> {
        Ok(self.library_list.lock()?.clone())
    }

    /// Rebuild the library list from the resolved state.
    pub fn update_library_list(&self, connection: &dyn Connection) -> Result<Arc<Vec<LibraryListEntry>>> {
        let state = self.snapshot()?;
        let resolved = &state.resolved;
        let list = Arc::new(
            LibraryListBuilder::new(connection)
                .build(resolved.curlib.as_deref(), &resolved.user_libraries()),
        );
        *self.library_list.lock()? = Some(Arc::clone(&list));
        self.emit(|root| ProjectEvent::LibraryListChanged { root });
        Ok(list)
    }

    pub fn clear_library_list(&self) -> Result<()> {
        *self.library_list.lock()? = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Job logs
    // ------------------------------------------------------------------

    pub fn job_log_path(&self) -> PathBuf {
        self.config.job_log_path(&self.root)
    }

    pub fn read_job_log(&self) -> Result<Option<Arc<JobLogInfo>>> {
        let info = self.job_logs.lock()?.read_job_log()?;
        if info.is_some() {
            self.emit(|root| ProjectEvent::JobLogsChanged { root });
        }
        Ok(info)
    }

    /// Job log runs, oldest first.
    pub fn job_logs(&self) -> Result<Vec<Arc<JobLogInfo>>> {
        Ok(self.job_logs.lock()?.job_logs())
    }

    /// Job log runs, newest first, with the live entry flagged.
    pub fn job_log_history(&self) -> Result<Vec<JobLogEntry>> {
        Ok(self.job_logs.lock()?.history())
    }

    pub fn clear_job_logs(&self) -> Result<()> {
        self.job_logs.lock()?.clear_job_logs();
        self.emit(|root| ProjectEvent::JobLogsChanged { root });
        Ok(())
    }

    pub fn output_log(&self) -> Result<Option<String>> {
        self.job_logs.lock()?.output_log()
    }

    // ------------------------------------------------------------------
    // Deploy location
    // ------------------------------------------------------------------

    pub fn set_deploy_location(&self, location: Option<String>) -> Result<()> {
        *self.deploy_location.lock()? = location;
        Ok(())
    }

    pub fn deploy_location(&self) -> Result<Option<String>> {
        Ok(self.deploy_location.lock()?.clone())
    }

    /// Remote path of a local file under the root, given a deploy location.
    pub fn remote_path(&self, local: &Path) -> Result<Option<String>> {
        let Some(location) = self.deploy_location()? else {
            return Ok(None);
        };
        let relative = local.strip_prefix(&self.root).map_err(|_| Error::Path {
            message: format!(
                "{} is outside project {}",
                local.display(),
                self.root.display()
            ),
        })?;
        let mut remote = location.trim_end_matches('/').to_string();
        for component in relative.components() {
            if let Component::Normal(part) = component {
                remote.push('/');
                remote.push_str(&part.to_string_lossy());
            }
        }
        Ok(Some(remote))
    }
}

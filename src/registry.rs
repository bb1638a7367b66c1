//! # Project Registry
//!
//! Keeps one [`Project`] per root and routes file-change messages to the
//! project that owns the changed path. Hosts feed [`FileChange`]s from
//! whatever watcher they use; the registry invalidates the affected caches
//! before [`ProjectRegistry::handle`] returns and emits a [`ProjectEvent`]
//! for each.
//!
//! Hosts can also register child contributors: functions that add extra
//! nodes under a project in a tree view. They receive the project and must
//! not mutate it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{mpsc::Receiver, Arc, Mutex};

use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::defaults::SKIPPED_DIRS;
use crate::error::{Error, Result};
use crate::events::{EventBus, ProjectEvent};
use crate::project::Project;

/// Kind of filesystem change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
}

/// A filesystem change reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl FileChange {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// A node contributed under a project by an external extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNode {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_value: Option<String>,
}

pub type ChildContributor = Box<dyn Fn(&Project) -> Vec<ExternalNode> + Send + Sync>;

/// What a changed path means to its project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeTarget {
    Descriptor,
    Env,
    Override,
    JobLog,
}

/// Registry of loaded projects
pub struct ProjectRegistry {
    config: EngineConfig,
    events: Arc<EventBus>,
    projects: Mutex<BTreeMap<PathBuf, Arc<Project>>>,
    contributors: Mutex<Vec<ChildContributor>>,
}

impl Default for ProjectRegistry {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ProjectRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            events: Arc::new(EventBus::new()),
            projects: Mutex::new(BTreeMap::new()),
            contributors: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    pub fn subscribe(&self) -> Receiver<ProjectEvent> {
        self.events.subscribe()
    }

    /// Register the project at `root`, or return the one already loaded.
    ///
    /// `root` must contain a descriptor. A descriptor that does not parse
    /// still registers the project; a `LoadFailed` event reports it.
    pub fn load(&self, root: &Path) -> Result<Arc<Project>> {
        if let Some(project) = self.get(root)? {
            return Ok(project);
        }
        if !self.config.descriptor_path(root).is_file() {
            return Err(Error::ProjectNotFound {
                root: root.to_path_buf(),
            });
        }

        let project = Arc::new(Project::new(
            root,
            self.config.clone(),
            Arc::clone(&self.events),
        ));
        self.projects
            .lock()?
            .insert(root.to_path_buf(), Arc::clone(&project));
        info!("Loaded project {}", root.display());

        if let Err(e) = project.snapshot() {
            warn!("Project {} failed to load: {}", root.display(), e);
            self.events.emit(ProjectEvent::LoadFailed {
                root: root.to_path_buf(),
                message: e.to_string(),
            });
        }
        Ok(project)
    }

    /// Load every project below `dir` that has a descriptor.
    pub fn discover(&self, dir: &Path) -> Result<Vec<Arc<Project>>> {
        let mut loaded = Vec::new();
        let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !SKIPPED_DIRS
                    .iter()
                    .any(|skipped| entry.file_name().to_str() == Some(*skipped))
        });
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry below {}: {}", dir.display(), e);
                    continue;
                }
            };
            if entry.file_type().is_file()
                && entry.file_name().to_str() == Some(self.config.descriptor_file.as_str())
            {
                if let Some(root) = entry.path().parent() {
                    loaded.push(self.load(root)?);
                }
            }
        }
        Ok(loaded)
    }

    pub fn get(&self, root: &Path) -> Result<Option<Arc<Project>>> {
        Ok(self.projects.lock()?.get(root).cloned())
    }

    pub fn remove(&self, root: &Path) -> Result<Option<Arc<Project>>> {
        let removed = self.projects.lock()?.remove(root);
        if removed.is_some() {
            debug!("Removed project {}", root.display());
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        self.projects.lock()?.clear();
        Ok(())
    }

    pub fn projects(&self) -> Result<Vec<Arc<Project>>> {
        Ok(self.projects.lock()?.values().cloned().collect())
    }

    /// The project whose root is the longest prefix of `path`.
    pub fn owner(&self, path: &Path) -> Result<Option<Arc<Project>>> {
        let projects = self.projects.lock()?;
        Ok(projects
            .iter()
            .filter(|(root, _)| path.starts_with(root))
            .max_by_key(|(root, _)| root.components().count())
            .map(|(_, project)| Arc::clone(project)))
    }

    fn classify(&self, project: &Project, path: &Path) -> Option<ChangeTarget> {
        if path == project.descriptor_path() {
            Some(ChangeTarget::Descriptor)
        } else if path == project.env_path() {
            Some(ChangeTarget::Env)
        } else if path == project.job_log_path() {
            Some(ChangeTarget::JobLog)
        } else if path.file_name().and_then(|name| name.to_str())
            == Some(self.config.override_file.as_str())
        {
            Some(ChangeTarget::Override)
        } else {
            None
        }
    }

    /// Apply a file change. Returns the root of the project it concerned.
    pub fn handle(&self, change: &FileChange) -> Result<Option<PathBuf>> {
        let Some(project) = self.owner(&change.path)? else {
            return self.handle_unowned(change);
        };
        let root = project.root().to_path_buf();
        let Some(target) = self.classify(&project, &change.path) else {
            return Ok(None);
        };
        debug!("{:?} {:?} in {}", change.kind, target, root.display());

        match target {
            ChangeTarget::Descriptor if change.kind == ChangeKind::Deleted => {
                self.remove(&root)?;
                self.events.emit(ProjectEvent::Removed { root: root.clone() });
            }
            ChangeTarget::Descriptor | ChangeTarget::Env => {
                project.invalidate_state()?;
                match project.snapshot() {
                    Ok(_) => self.events.emit(ProjectEvent::StateChanged { root: root.clone() }),
                    Err(e) => {
                        warn!("Project {} failed to reload: {}", root.display(), e);
                        self.events.emit(ProjectEvent::LoadFailed {
                            root: root.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            ChangeTarget::Override => project.invalidate_build_map()?,
            ChangeTarget::JobLog if change.kind == ChangeKind::Deleted => {
                self.events.emit(ProjectEvent::JobLogsChanged { root: root.clone() });
            }
            ChangeTarget::JobLog => {
                if let Err(e) = project.read_job_log() {
                    warn!("Failed to read job log of {}: {}", root.display(), e);
                }
            }
        }
        Ok(Some(root))
    }

    /// A created descriptor outside every known project registers a new one.
    fn handle_unowned(&self, change: &FileChange) -> Result<Option<PathBuf>> {
        let is_descriptor = change.path.file_name().and_then(|name| name.to_str())
            == Some(self.config.descriptor_file.as_str());
        if change.kind != ChangeKind::Created || !is_descriptor {
            return Ok(None);
        }
        let Some(root) = change.path.parent() else {
            return Ok(None);
        };
        self.load(root)?;
        self.events.emit(ProjectEvent::StateChanged {
            root: root.to_path_buf(),
        });
        Ok(Some(root.to_path_buf()))
    }

    pub fn register_child_contributor<F>(&self, contributor: F) -> Result<()>
    where
        F: Fn(&Project) -> Vec<ExternalNode> + Send + Sync + 'static,
    {
        self.contributors.lock()?.push(Box::new(contributor));
        Ok(())
    }

    /// Nodes from every contributor, in registration order.
    pub fn contributed_children(&self, root: &Path) -> Result<Vec<ExternalNode>> {
        let project = self.get(root)?.ok_or_else(|| Error::ProjectNotFound {
            root: root.to_path_buf(),
        })?;
        let contributors = self.contributors.lock()?;
        Ok(contributors
            .iter()
            .flat_map(|contributor| contributor(&project))
            .collect())
    }
}

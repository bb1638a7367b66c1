//! # iproj
//!
//! This library resolves the state of IBM i projects described by an
//! `iproj.json` descriptor. It is used by the `iproj` command-line tool and
//! is meant to be embedded by editors and other hosts that need the same
//! view of a project: its libraries, commands, include paths and compile
//! overrides with every `&NAME` variable substituted from the project's
//! `.env` file.
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//! use iproj::config::EngineConfig;
//! use iproj::events::EventBus;
//! use iproj::project::Project;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join("iproj.json"),
//!     r#"{"curlib": "&CURLIB", "preUsrlibl": ["&lib1"]}"#,
//! ).unwrap();
//! std::fs::write(dir.path().join(".env"), "CURLIB=QGPL\nlib1=SYSTOOLS\n").unwrap();
//!
//! let project = Project::new(dir.path(), EngineConfig::default(), Arc::new(EventBus::new()));
//! let state = project.state().unwrap();
//! assert_eq!(state.curlib.as_deref(), Some("QGPL"));
//! assert_eq!(project.variables().unwrap(), vec!["CURLIB", "lib1"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Variables (`env`, `resolve`)**: the `.env` file and `&NAME`
//!   substitution. A name with no entry stays as the literal `&NAME`.
//! - **Descriptor (`descriptor`, `validate`)**: the typed `iproj.json` model,
//!   the raw JSON document mutations are applied to, and schema checks that
//!   report violations without failing the read.
//! - **Project (`project`)**: the per-root engine that caches resolved state
//!   and applies every descriptor mutation.
//! - **Library list (`library_list`, `connection`)**: classified `SYS`/`CUR`/
//!   `USR` library list built against a host-supplied [`connection::Connection`].
//! - **Overrides (`build_map`)**: directory-level `.ibmi.json` files with
//!   parent-to-child inheritance.
//! - **Job logs (`job_log`, `ring_buffer`)**: parsed `.logs/joblog.json` runs
//!   kept in a bounded history.
//! - **Registry (`registry`, `events`)**: one engine per root, file-change
//!   dispatch and change notifications.

pub mod build_map;
pub mod config;
pub mod connection;
pub mod defaults;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod events;
pub mod job_log;
pub mod library_list;
pub mod output;
pub mod project;
pub mod registry;
pub mod resolve;
pub mod ring_buffer;
pub mod validate;

#[cfg(test)]
mod ring_buffer_proptest;

//! # Library List
//!
//! Builds the ordered, classified library list of a project from its
//! resolved state and the remote system:
//!
//! 1. the system portion, in the order the remote reports it (`SYS`);
//! 2. the current library (`CUR`), even when the remote cannot describe it;
//! 3. `preUsrlibl ++ postUsrlibl` as resolved (`USR`), without deduplication.
//!
//! Names that still read `&NAME` are queried like any other and simply fail
//! to resolve remotely. A failed remote query is logged and drops only the
//! entries it was asked about; the build itself always completes.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::connection::{Connection, IbmiObject};

/// Portion of the library list an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LibraryType {
    Sys,
    Cur,
    Usr,
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LibraryType::Sys => "SYS",
            LibraryType::Cur => "CUR",
            LibraryType::Usr => "USR",
        };
        f.write_str(name)
    }
}

/// One entry of the library list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryListEntry {
    pub library_info: IbmiObject,
    pub library_type: LibraryType,
    /// `false` for a current library the remote could not describe.
    pub resolved: bool,
}

/// Library object descriptions keyed by upper-cased name.
type Described = HashMap<String, IbmiObject>;

/// Builds library lists against a remote connection
pub struct LibraryListBuilder<'a> {
    connection: &'a dyn Connection,
}

impl<'a> LibraryListBuilder<'a> {
    pub fn new(connection: &'a dyn Connection) -> Self {
        Self { connection }
    }

    /// Describe each name with its own remote call.
    fn describe(&self, names: &[String]) -> Described {
        let mut described = Described::new();
        for name in names {
            let key = name.to_uppercase();
            if described.contains_key(&key) {
                continue;
            }
            match self.connection.describe_libraries(std::slice::from_ref(name)) {
                Ok(objects) => described.extend(
                    objects
                        .into_iter()
                        .map(|object| (object.name.to_uppercase(), object)),
                ),
                Err(e) => warn!("Failed to describe library {}: {}", name, e),
            }
        }
        described
    }

    fn entries(
        names: &[String],
        described: &Described,
        library_type: LibraryType,
    ) -> Vec<LibraryListEntry> {
        names
            .iter()
            .filter_map(|name| described.get(&name.to_uppercase()))
            .map(|info| LibraryListEntry {
                library_info: info.clone(),
                library_type,
                resolved: true,
            })
            .collect()
    }

    /// Produce the full library list for resolved library names.
    pub fn build(&self, curlib: Option<&str>, user_libraries: &[String]) -> Vec<LibraryListEntry> {
        let system = match self.connection.system_library_list() {
            Ok(system) => system,
            Err(e) => {
                warn!("Failed to query the system library list: {}", e);
                Vec::new()
            }
        };

        let mut list = Self::entries(&system, &self.describe(&system), LibraryType::Sys);

        if let Some(curlib) = curlib {
            let described = self.describe(&[curlib.to_string()]);
            let entry = match described.get(&curlib.to_uppercase()) {
                Some(info) => LibraryListEntry {
                    library_info: info.clone(),
                    library_type: LibraryType::Cur,
                    resolved: true,
                },
                None => {
                    debug!("Current library {} did not resolve", curlib);
                    LibraryListEntry {
                        library_info: IbmiObject {
                            library: "QSYS".to_string(),
                            name: curlib.to_string(),
                            object_type: "*LIB".to_string(),
                            ..Default::default()
                        },
                        library_type: LibraryType::Cur,
                        resolved: false,
                    }
                }
            };
            list.push(entry);
        }

        list.extend(Self::entries(
            user_libraries,
            &self.describe(user_libraries),
            LibraryType::Usr,
        ));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::mock::MockConnection;

    fn names(list: &[LibraryListEntry]) -> Vec<(String, LibraryType)> {
        list.iter()
            .map(|entry| (entry.library_info.name.clone(), entry.library_type))
            .collect()
    }

    fn connection() -> MockConnection {
        MockConnection::default()
            .with_system_library("QSYS", "System Library")
            .with_system_library("QUSRSYS", "User System Library")
            .with_library("QGPL", "General Purpose Library")
            .with_library("SYSTOOLS", "System tools")
            .with_library("MYLIB", "Project library")
    }

    #[test]
    fn test_order_is_sys_cur_usr() {
        let conn = connection();
        let libs = vec!["SYSTOOLS".to_string(), "MYLIB".to_string()];
        let list = LibraryListBuilder::new(&conn).build(Some("QGPL"), &libs);
        assert_eq!(
            names(&list),
            vec![
                ("QSYS".to_string(), LibraryType::Sys),
                ("QUSRSYS".to_string(), LibraryType::Sys),
                ("QGPL".to_string(), LibraryType::Cur),
                ("SYSTOOLS".to_string(), LibraryType::Usr),
                ("MYLIB".to_string(), LibraryType::Usr),
            ]
        );
        assert!(list.iter().all(|entry| entry.resolved));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let conn = connection();
        let libs = vec![
            "MYLIB".to_string(),
            "SYSTOOLS".to_string(),
            "MYLIB".to_string(),
        ];
        let list = LibraryListBuilder::new(&conn).build(None, &libs);
        let usr: Vec<_> = list
            .iter()
            .filter(|e| e.library_type == LibraryType::Usr)
            .map(|e| e.library_info.name.as_str())
            .collect();
        assert_eq!(usr, vec!["MYLIB", "SYSTOOLS", "MYLIB"]);
    }

    #[test]
    fn test_unresolved_user_library_is_omitted() {
        let conn = connection();
        let libs = vec!["&lib1".to_string(), "MYLIB".to_string()];
        let list = LibraryListBuilder::new(&conn).build(None, &libs);
        assert_eq!(list.len(), 3);
        assert_eq!(list[2].library_info.name, "MYLIB");
    }

    #[test]
    fn test_unresolved_current_library_is_marked() {
        let conn = connection();
        let list = LibraryListBuilder::new(&conn).build(Some("&CURLIB"), &[]);
        let cur = list
            .iter()
            .find(|e| e.library_type == LibraryType::Cur)
            .unwrap();
        assert_eq!(cur.library_info.name, "&CURLIB");
        assert!(!cur.resolved);
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let conn = connection();
        let list = LibraryListBuilder::new(&conn).build(None, &["mylib".to_string()]);
        assert_eq!(list.last().unwrap().library_info.name, "MYLIB");
    }

    #[test]
    fn test_remote_failures_do_not_abort() {
        let mut conn = connection();
        conn.fail_system_list = true;
        let list = LibraryListBuilder::new(&conn).build(Some("QGPL"), &["MYLIB".to_string()]);
        assert_eq!(
            names(&list),
            vec![
                ("QGPL".to_string(), LibraryType::Cur),
                ("MYLIB".to_string(), LibraryType::Usr),
            ]
        );

        conn.fail_system_list = false;
        conn.fail_describe = true;
        let list = LibraryListBuilder::new(&conn).build(Some("QGPL"), &["MYLIB".to_string()]);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].library_type, LibraryType::Cur);
        assert!(!list[0].resolved);
    }

    #[test]
    fn test_rejected_name_leaves_others_described() {
        let mut conn = connection();
        conn.fail_references = true;
        let libs = vec![
            "MYLIB".to_string(),
            "&lib1".to_string(),
            "SYSTOOLS".to_string(),
        ];
        let list = LibraryListBuilder::new(&conn).build(None, &libs);
        let usr: Vec<_> = list
            .iter()
            .filter(|e| e.library_type == LibraryType::Usr)
            .map(|e| e.library_info.name.as_str())
            .collect();
        assert_eq!(usr, vec!["MYLIB", "SYSTOOLS"]);
    }

    #[test]
    fn test_entry_serializes_with_type_tags() {
        let conn = connection();
        let list = LibraryListBuilder::new(&conn).build(Some("QGPL"), &[]);
        let json = serde_json::to_value(&list[2]).unwrap();
        assert_eq!(json["libraryType"], "CUR");
        assert_eq!(json["libraryInfo"]["type"], "*LIB");
    }
}

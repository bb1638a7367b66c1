//! # Variable Store
//!
//! Reads and writes the project's `.env` file: one `NAME=value` entry per
//! line, CRLF or LF terminated. Updates rewrite single lines in place so
//! comments, ordering and the file's line-ending style survive.
//!
//! ```
//! use iproj::env;
//!
//! let map = env::parse("CURLIB=QGPL\r\nlib1=SYSTOOLS\r\nEMPTY=\r\n");
//! assert_eq!(map.get("CURLIB").map(String::as_str), Some("QGPL"));
//! assert_eq!(map.get("EMPTY").map(String::as_str), Some(""));
//! assert!(map.get("MISSING").is_none());
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use crate::error::Result;

/// Variable name to value mapping
pub type EnvironmentMap = BTreeMap<String, String>;

/// Line terminator used by an environment file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect the terminator of existing content. Content without any
    /// CRLF pair is treated as LF.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Split text into lines using its detected terminator.
fn split_lines(text: &str) -> Vec<&str> {
    let ending = LineEnding::detect(text).as_str();
    text.split(ending).collect()
}

/// Split a `NAME=VALUE` line on its first `=`.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    line.split_once('=')
}

/// Parse environment file content into a map.
///
/// Lines without `=` are ignored. When a name appears twice the later line
/// wins.
pub fn parse(text: &str) -> EnvironmentMap {
    split_lines(text)
        .into_iter()
        .filter_map(split_entry)
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Serialize a map as one `NAME=value` line per entry.
pub fn serialize(map: &EnvironmentMap, ending: LineEnding) -> String {
    map.iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(ending.as_str())
}

/// Apply entries to existing content.
///
/// Each entry replaces every line starting with `NAME=`, so duplicates
/// read back as the new value; entries with no such line are appended. All other lines keep their position.
pub fn upsert_text<I, K, V>(text: &str, entries: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let ending = LineEnding::detect(text);
    let terminator = ending.as_str();
    let trailing = text.ends_with(terminator);
    let body = if trailing {
        &text[..text.len() - terminator.len()]
    } else {
        text
    };

    let mut lines: Vec<String> = if body.is_empty() && !trailing {
        Vec::new()
    } else {
        body.split(terminator).map(str::to_string).collect()
    };

    for (name, value) in entries {
        let name = name.as_ref();
        let prefix = format!("{}=", name);
        let line = format!("{}{}", prefix, value.as_ref());
        let mut replaced = false;
        for existing in lines.iter_mut().filter(|existing| existing.starts_with(&prefix)) {
            existing.clone_from(&line);
            replaced = true;
        }
        if !replaced {
            lines.push(line);
        }
    }

    let mut output = lines.join(terminator);
    if trailing {
        output.push_str(terminator);
    }
    output
}

/// Read the environment file; a missing file is an empty map.
pub fn read(path: &Path) -> Result<EnvironmentMap> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(EnvironmentMap::new()),
        Err(e) => Err(e.into()),
    }
}

/// Read a single entry. `None` means the name has no line at all.
pub fn read_value(path: &Path, name: &str) -> Result<Option<String>> {
    Ok(read(path)?.remove(name))
}

/// Write entries into the environment file, creating it when missing.
pub fn upsert<I, K, V>(path: &Path, entries: I) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    let updated = upsert_text(&existing, entries);
    debug!("Updating environment file {}", path.display());
    fs::write(path, updated)?;
    Ok(())
}

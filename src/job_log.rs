//! # Job Log Store
//!
//! Parses the job log written by the build tool (`.logs/joblog.json`, a
//! JSON array of compiled-object records) and keeps the most recent runs in
//! a [`RingBuffer`].
//!
//! Timestamps use the host export format `YYYY-MM-DD-HH.MM.SS.ffffff`:
//!
//! ```
//! use iproj::job_log::parse_date_time;
//!
//! let time = parse_date_time("2023-07-14-14.54.44.168562000").unwrap();
//! assert_eq!(time.to_string(), "2023-07-14 14:54:44");
//! assert!(parse_date_time("2021-12-12-21-30-34-07141").is_err());
//! assert!(parse_date_time("").is_err());
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ring_buffer::RingBuffer;

/// One message of an object's compile job log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageInfo {
    pub msgid: String,
    #[serde(rename = "type")]
    pub msg_type: String,
    /// 0, 10, 20, 30 or 40 and above.
    pub severity: u32,
    pub message_time: String,
    pub message_text: String,
    pub second_level: String,
    pub from_program: String,
    pub from_library: String,
    pub from_module: String,
    pub from_procedure: String,
    pub from_instruction: String,
    pub to_program: String,
    pub to_library: String,
    pub to_module: String,
    pub to_procedure: String,
    pub to_instruction: String,
}

/// One compiled object and the messages its command produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectInfo {
    pub cmd: String,
    pub cmd_time: String,
    pub object: String,
    pub source: String,
    pub output: String,
    pub failed: bool,
    pub msgs: Vec<MessageInfo>,
}

/// A parsed job log run
#[derive(Debug, Clone, PartialEq)]
pub struct JobLogInfo {
    pub objects: Vec<ObjectInfo>,
    /// Command time of the first object; `None` for an empty log.
    pub created_time: Option<NaiveDateTime>,
    /// Show only failed objects.
    pub show_failed_objects: bool,
    /// Minimum message severity shown.
    pub severity_level: u32,
}

impl JobLogInfo {
    pub fn new(objects: Vec<ObjectInfo>) -> Result<Self> {
        let created_time = match objects.first() {
            Some(first) => Some(parse_date_time(&first.cmd_time)?),
            None => None,
        };
        Ok(Self {
            objects,
            created_time,
            show_failed_objects: false,
            severity_level: 0,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.objects.iter().filter(|object| object.failed).count()
    }

    /// Objects after the failed-only filter.
    pub fn visible_objects(&self) -> impl Iterator<Item = &ObjectInfo> {
        self.objects
            .iter()
            .filter(move |object| !self.show_failed_objects || object.failed)
    }

    /// Messages of an object at or above the severity level.
    pub fn visible_messages<'a>(
        &self,
        object: &'a ObjectInfo,
    ) -> impl Iterator<Item = &'a MessageInfo> {
        let level = self.severity_level;
        object.msgs.iter().filter(move |msg| msg.severity >= level)
    }
}

fn date_time_error(input: &str, message: impl Into<String>) -> Error {
    Error::DateTimeParse {
        input: input.to_string(),
        message: message.into(),
    }
}

fn parse_number<T: std::str::FromStr>(input: &str, part: &str, name: &str) -> Result<T> {
    part.parse()
        .map_err(|_| date_time_error(input, format!("invalid {} '{}'", name, part)))
}

/// Parse a `YYYY-MM-DD-HH.MM.SS[.fraction]` timestamp.
///
/// The fraction may itself contain dots; it is validated and truncated.
pub fn parse_date_time(input: &str) -> Result<NaiveDateTime> {
    let segments: Vec<&str> = input.split('-').collect();
    if segments.len() != 4 {
        return Err(date_time_error(
            input,
            format!("expected 4 '-' separated segments, found {}", segments.len()),
        ));
    }

    let time: Vec<&str> = segments[3].split('.').collect();
    if time.len() < 3 {
        return Err(date_time_error(
            input,
            format!(
                "expected hour, minute and second separated by '.', found {} parts",
                time.len()
            ),
        ));
    }

    let fraction = time[3..].concat();
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(date_time_error(
            input,
            format!("invalid fractional seconds '{}'", fraction),
        ));
    }

    let year: i32 = parse_number(input, segments[0], "year")?;
    let month: u32 = parse_number(input, segments[1], "month")?;
    let day: u32 = parse_number(input, segments[2], "day")?;
    let hour: u32 = parse_number(input, time[0], "hour")?;
    let minute: u32 = parse_number(input, time[1], "minute")?;
    let second: u32 = parse_number(input, time[2], "second")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(|| date_time_error(input, "date or time out of range"))
}

/// A history entry as presented to callers
#[derive(Debug, Clone)]
pub struct JobLogEntry {
    pub info: Arc<JobLogInfo>,
    /// The entry mirrors the job log file currently on disk.
    pub live: bool,
}

/// Job log reader with bounded in-memory history
#[derive(Debug)]
pub struct JobLogStore {
    job_log_path: PathBuf,
    output_log_path: PathBuf,
    history: RingBuffer<Arc<JobLogInfo>>,
}

impl JobLogStore {
    pub fn new(job_log_path: PathBuf, output_log_path: PathBuf, capacity: usize) -> Self {
        Self {
            job_log_path,
            output_log_path,
            history: RingBuffer::new(capacity),
        }
    }

    pub fn job_log_path(&self) -> &Path {
        &self.job_log_path
    }

    pub fn exists(&self) -> bool {
        self.job_log_path.is_file()
    }

    /// Parse the job log file and record it in the history.
    ///
    /// A missing file (including one deleted while reading) is `Ok(None)`.
    pub fn read_job_log(&mut self) -> Result<Option<Arc<JobLogInfo>>> {
        let content = match fs::read_to_string(&self.job_log_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let objects: Vec<ObjectInfo> =
            serde_json::from_str(&content).map_err(|e| Error::JobLogParse {
                path: self.job_log_path.clone(),
                message: e.to_string(),
            })?;

        let info = Arc::new(JobLogInfo::new(objects)?);
        debug!(
            "Read job log {} with {} objects",
            self.job_log_path.display(),
            info.objects.len()
        );
        self.history.add(Arc::clone(&info));
        Ok(Some(info))
    }

    /// Recorded runs, oldest first.
    pub fn job_logs(&self) -> Vec<Arc<JobLogInfo>> {
        self.history.to_vec()
    }

    /// Recorded runs, newest first. Only the newest entry can be live, and
    /// only while the job log file exists.
    pub fn history(&self) -> Vec<JobLogEntry> {
        let live = self.exists();
        self.history
            .to_vec()
            .into_iter()
            .rev()
            .enumerate()
            .map(|(idx, info)| JobLogEntry {
                info,
                live: live && idx == 0,
            })
            .collect()
    }

    pub fn clear_job_logs(&mut self) {
        self.history.clear();
    }

    /// Free-text build output next to the job log.
    pub fn output_log(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.output_log_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

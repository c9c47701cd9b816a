//! The incoming upload as seen by the checks.

use crate::codes::CheckCode;
use crate::error::CheckError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What the uploader asks the server to do with this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Upload one file listed in the .changes.
    #[default]
    Upload,
    /// All files have been sent; only the .changes itself is checked.
    Done,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Upload => "upload",
            Action::Done => "done",
        }
    }
}

impl FromStr for Action {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(Action::Upload),
            "done" => Ok(Action::Done),
            other => Err(CheckError::with_detail(
                CheckCode::ActionUnknown,
                format!("unknown action {other:?}"),
            )),
        }
    }
}

/// Request headers in arrival order. Lookup ignores ASCII case.
#[derive(Debug, Clone, Default)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Headers(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

/// One upload request. Built once by the caller and never mutated by the checks.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name of the uploaded file as listed in the .changes.
    pub filename: String,
    pub headers: Headers,
    /// Destination directory, relative to the upload root (a leading `/` is ignored).
    pub dirname: String,
    /// Name of the .changes file inside the destination.
    pub changes: Option<String>,
    pub action: Action,
    /// Where the front end spooled the request body.
    pub tempfile: PathBuf,
}

impl UploadRequest {
    pub fn new(filename: impl Into<String>, tempfile: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            headers: Headers::new(),
            dirname: String::new(),
            changes: None,
            action: Action::Upload,
            tempfile: tempfile.into(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn dirname(mut self, dirname: impl Into<String>) -> Self {
        self.dirname = dirname.into();
        self
    }

    pub fn changes(mut self, changes: impl Into<String>) -> Self {
        self.changes = Some(changes.into());
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn tempfile_path(&self) -> &Path {
        &self.tempfile
    }
}

//! Error type returned by a failing check.

use crate::codes::{CheckCode, Response};
use thiserror::Error;

/// A check failed. The code is the only thing reported to the uploader; the
/// detail is for logs.
#[derive(Debug, Error)]
#[error("{code}")]
pub struct CheckError {
    pub code: CheckCode,
    pub detail: Option<String>,
}

impl CheckError {
    pub fn new(code: CheckCode) -> Self {
        Self { code, detail: None }
    }

    pub fn with_detail(code: CheckCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
        }
    }

    pub fn response(&self) -> Response {
        self.code.response()
    }
}

impl From<CheckCode> for CheckError {
    fn from(code: CheckCode) -> Self {
        CheckError::new(code)
    }
}

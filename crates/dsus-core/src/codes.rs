//! Response codes returned by the upload checks.
//!
//! The numeric values, labels and descriptions are part of the wire contract
//! with the HTTP front end and must not change.

use serde::Serialize;
use std::fmt;

/// Every outcome a check can report. `Ok` is the only success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckCode {
    Ok,

    ChangesEmpty,
    ActionUnknown,
    FilenameEmpty,
    DestinationError,
    ChangesNotFound,
    SessionExpired,
    LengthEmpty,
    LengthError,
    FileUnexpected,
    /// The changes file exists but the manifest loader refused it.
    ChangesBadFormat,

    ChecksumError,
    BinaryError,
    SignatureError,

    FilesError,
}

/// Coarse grouping of codes, used by callers that only care about who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeClass {
    Success,
    /// The request itself is incomplete or inconsistent with the changes file.
    RequestMalformed,
    /// The uploaded bytes are wrong (checksum, binary, signature).
    ContentInvalid,
    /// The manifest accumulated rejects while being loaded.
    Aggregate,
}

impl CheckCode {
    /// All codes in table order.
    pub const ALL: [CheckCode; 15] = [
        CheckCode::Ok,
        CheckCode::ChangesEmpty,
        CheckCode::ActionUnknown,
        CheckCode::FilenameEmpty,
        CheckCode::DestinationError,
        CheckCode::ChangesNotFound,
        CheckCode::SessionExpired,
        CheckCode::LengthEmpty,
        CheckCode::LengthError,
        CheckCode::FileUnexpected,
        CheckCode::ChangesBadFormat,
        CheckCode::ChecksumError,
        CheckCode::BinaryError,
        CheckCode::SignatureError,
        CheckCode::FilesError,
    ];

    pub fn as_u16(self) -> u16 {
        match self {
            CheckCode::Ok => 200,
            CheckCode::ChangesEmpty => 431,
            CheckCode::ActionUnknown => 432,
            CheckCode::FilenameEmpty => 433,
            CheckCode::DestinationError => 434,
            CheckCode::ChangesNotFound => 435,
            CheckCode::SessionExpired => 436,
            CheckCode::LengthEmpty => 437,
            CheckCode::LengthError => 438,
            CheckCode::FileUnexpected => 439,
            CheckCode::ChangesBadFormat => 440,
            CheckCode::ChecksumError => 451,
            CheckCode::BinaryError => 452,
            CheckCode::SignatureError => 453,
            CheckCode::FilesError => 471,
        }
    }

    pub fn from_u16(code: u16) -> Option<CheckCode> {
        CheckCode::ALL.iter().copied().find(|c| c.as_u16() == code)
    }

    /// Short label (the reason phrase of the response).
    pub fn label(self) -> &'static str {
        match self {
            CheckCode::Ok => "OK",
            CheckCode::ChangesEmpty => "Empty changes",
            CheckCode::ActionUnknown => "Unknown action",
            CheckCode::FilenameEmpty => "Empty filename",
            CheckCode::DestinationError => "Destination error",
            CheckCode::ChangesNotFound => "Changes not found",
            CheckCode::SessionExpired => "Session expired",
            CheckCode::LengthEmpty => "Length empty",
            CheckCode::LengthError => "Length conflict",
            CheckCode::FileUnexpected => "File unexpected",
            CheckCode::ChangesBadFormat => "Changes bad format",
            CheckCode::ChecksumError => "Checksum error",
            CheckCode::BinaryError => "Binary error",
            CheckCode::SignatureError => "Signature error",
            CheckCode::FilesError => "Files error",
        }
    }

    /// Longer description (the response body).
    pub fn description(self) -> &'static str {
        match self {
            CheckCode::Ok => "OK",
            CheckCode::ChangesEmpty => "Changes param not specified",
            CheckCode::ActionUnknown => "Unknown action",
            CheckCode::FilenameEmpty => "Filename not specified",
            CheckCode::DestinationError => "Destination directory not found",
            CheckCode::ChangesNotFound => "Changes file not found",
            CheckCode::SessionExpired => "Upload session expired",
            CheckCode::LengthEmpty => "Content-Length header not specified",
            CheckCode::LengthError => "Length header not match .changes",
            CheckCode::FileUnexpected => "Send .changes file first",
            CheckCode::ChangesBadFormat => "Changes file could not be parsed",
            CheckCode::ChecksumError => "Checksum not match .changes",
            CheckCode::BinaryError => "Binary error",
            CheckCode::SignatureError => "Key not found in the keyring",
            CheckCode::FilesError => "Upload check_hashes error",
        }
    }

    pub fn class(self) -> CodeClass {
        match self {
            CheckCode::Ok => CodeClass::Success,
            CheckCode::ChecksumError | CheckCode::BinaryError | CheckCode::SignatureError => {
                CodeClass::ContentInvalid
            }
            CheckCode::FilesError => CodeClass::Aggregate,
            _ => CodeClass::RequestMalformed,
        }
    }

    pub fn is_success(self) -> bool {
        self == CheckCode::Ok
    }

    pub fn response(self) -> Response {
        Response {
            code: self.as_u16(),
            label: self.label(),
            description: self.description(),
        }
    }
}

impl fmt::Display for CheckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.label())
    }
}

/// Status/message triple handed back to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub code: u16,
    pub label: &'static str,
    pub description: &'static str,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code, self.label, self.description)
    }
}

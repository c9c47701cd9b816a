pub mod config;
pub mod logging;

pub mod checks;
pub mod checksum;
pub mod codes;
pub mod error;
pub mod external;
pub mod manifest;
pub mod request;

pub use checks::{UploadChecker, UploadContext};
pub use codes::{CheckCode, Response};
pub use error::CheckError;
pub use request::{Action, UploadRequest};

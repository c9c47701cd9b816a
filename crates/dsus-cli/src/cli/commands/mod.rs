//! CLI command handlers. Each command is in its own file.

pub(super) mod check;
mod checksum;
mod codes;

pub use check::{run_check, CheckArgs};
pub use checksum::run_checksum;
pub use codes::run_codes;

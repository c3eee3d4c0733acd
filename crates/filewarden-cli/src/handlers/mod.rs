//! Command handlers, split by domain.

mod catalog;
mod checking;
mod repair;

pub use catalog::catalog_add;
pub use checking::{checking_cancel, checking_execute, checking_start, checking_status};
pub use repair::{checking_repair, mapping_layout};

use anyhow::Result;
use serde::Serialize;

/// Where command results go: plain lines, or one JSON document on stdout.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as pretty JSON when in JSON mode. Returns whether it did.
    pub fn json<T: Serialize>(&self, value: &T) -> Result<bool> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(self.json)
    }

    /// Print a human-readable line unless in JSON mode.
    pub fn line(&self, text: impl AsRef<str>) {
        if !self.json {
            println!("{}", text.as_ref());
        }
    }
}

//! Catalog commands.

use super::Output;
use anyhow::Result;
use filewarden_core::FileWarden;
use std::process::ExitCode;

pub fn catalog_add(warden: &FileWarden, output: &Output, uris: &[String]) -> Result<ExitCode> {
    let records = warden.add_files(uris)?;
    if !output.json(&records)? {
        for record in &records {
            output.line(format!("{}\t{}", record.id, record.uri));
        }
    }
    Ok(ExitCode::SUCCESS)
}

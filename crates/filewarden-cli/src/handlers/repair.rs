//! Repair command.

use super::Output;
use anyhow::Result;
use filewarden_core::{FileWarden, MappingLayout};
use std::path::Path;
use std::process::ExitCode;

pub fn mapping_layout(legacy: bool, has_headers: bool, delimiter: char) -> MappingLayout {
    let layout = if legacy {
        MappingLayout::legacy()
    } else {
        MappingLayout::default()
    };
    // Delimiters are validated as ASCII when parsed.
    layout
        .with_headers(has_headers)
        .with_delimiter(delimiter as u8)
}

pub fn checking_repair(
    warden: &FileWarden,
    output: &Output,
    mapping_file: &Path,
    layout: MappingLayout,
    log: bool,
) -> Result<ExitCode> {
    let summary = warden.repair_from_file(mapping_file, layout, log)?;

    if !output.json(&summary)? {
        for outcome in &summary.outcomes {
            output.line(outcome.to_string());
        }
        output.line(format!(
            "{} moved, {} skipped, {} errors.",
            summary.moved, summary.skipped, summary.errors
        ));
    }

    match &summary.aborted {
        Some(abort) => {
            eprintln!(
                "Repair stopped at line {}: {}. Remaining rows were not processed.",
                abort.line, abort.message
            );
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_layout_flags() {
        let layout = mapping_layout(true, true, ';');
        assert_eq!(layout.expected_column, 0);
        assert_eq!(layout.current_column, 1);
        assert!(layout.has_headers);
        assert_eq!(layout.delimiter, b';');

        assert_eq!(mapping_layout(false, false, ','), MappingLayout::default());
    }
}

//! Checking run commands.

use super::Output;
use anyhow::Result;
use filewarden_core::FileWarden;
use serde_json::json;
use std::process::ExitCode;

pub fn checking_start(warden: &FileWarden, output: &Output) -> Result<ExitCode> {
    let started = warden.start_checking()?;
    let run = warden.checking_status()?;

    if output.json(&json!({ "started": started, "run": run }))? {
        return Ok(ExitCode::SUCCESS);
    }

    if started {
        output.line(format!(
            "Checking run requested for {} files. Run `filewarden checking-execute <seconds>` to process it.",
            run.total_to_check
        ));
    } else {
        output.line(
            "A checking run is already requested. Use `filewarden checking-execute <seconds>` to continue it.",
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub fn checking_cancel(warden: &FileWarden, output: &Output) -> Result<ExitCode> {
    let run = warden.cancel_checking()?;
    if !output.json(&run)? {
        output.line("Checking run cancelled.");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn checking_execute(
    warden: &FileWarden,
    output: &Output,
    seconds: u64,
    log: bool,
) -> Result<ExitCode> {
    let report = warden.execute_checking(seconds, log)?;
    if output.json(&report)? {
        return Ok(ExitCode::SUCCESS);
    }

    if report.aborted {
        output.line("No checking run requested. Use `filewarden checking-start` first.");
        return Ok(ExitCode::SUCCESS);
    }

    for missing in &report.missing_files {
        let path = missing
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "unresolvable".to_string());
        output.line(format!("missing: {} ({})", missing.uri, path));
    }

    output.line(format!(
        "Checked {} files in this slice: {}/{} checked, {} missing.",
        report.files_just_checked,
        report.files_checked_count,
        report.files_to_check,
        report.files_missing_count
    ));

    if report.finished {
        output.line("Checking run finished.");
    } else {
        output.line("Run `filewarden checking-execute <seconds>` again to continue.");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn checking_status(warden: &FileWarden, output: &Output) -> Result<ExitCode> {
    let run = warden.checking_status()?;
    if output.json(&run)? {
        return Ok(ExitCode::SUCCESS);
    }

    output.line(format!("Status: {}", run.status));
    output.line(format!(
        "Progress: {}/{} ({:.1}%)",
        run.checked_count,
        run.total_to_check,
        run.progress_percent()
    ));
    output.line(format!("Missing: {}", run.missing_count));
    if let Some(requested_at) = &run.requested_at {
        output.line(format!("Requested at: {}", requested_at));
    }
    if let Some(updated_at) = &run.updated_at {
        output.line(format!("Updated at: {}", updated_at));
    }
    Ok(ExitCode::SUCCESS)
}

//! Concatenation of the normalized outputs using the engine's concat
//! demuxer.
//!
//! The demuxer is driven by a list artifact naming each input in order.
//! The list is a tempfile so it is removed when it goes out of scope, on
//! the failure paths as much as on success.

use crate::config::PipelineConfig;
use crate::error::{CoreResult, PipelineError};
use crate::external::{run_with_timeout, RunOutcome};

use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::Builder as TempFileBuilder;

/// Base name of the final concatenated output inside the output folder.
const FINAL_OUTPUT_STEM: &str = "final_concatenated";

/// Escapes a path for a single-quoted concat list token. An embedded
/// apostrophe would terminate the token, so it becomes `'\''`.
fn escape_list_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// Builds the concat demuxer command: pure stream copy plus the two
/// timestamp-interoperability flags, overwriting any existing output.
pub fn build_concat_command(engine: &str, list_file: &Path, output: &Path) -> Command {
    let mut cmd = Command::new(engine);
    cmd.args(["-hide_banner", "-nostdin", "-y"])
        .args(["-f", "concat", "-safe", "0"])
        .arg("-i")
        .arg(list_file)
        .args(["-c", "copy"])
        .args(["-avoid_negative_ts", "make_zero"])
        .args(["-fflags", "+genpts"])
        .arg(output);
    cmd
}

/// Writes the ordered list artifact the concat demuxer reads.
fn write_concat_list(inputs: &[PathBuf], dir: &Path) -> CoreResult<tempfile::NamedTempFile> {
    let mut list = TempFileBuilder::new()
        .prefix("concat_list_")
        .suffix(".txt")
        .tempfile_in(dir)?;
    for input in inputs {
        writeln!(list, "file '{}'", escape_list_path(input))?;
    }
    list.flush()?;
    Ok(list)
}

/// Concatenates the normalized outputs, in the exact order given, into
/// `final_concatenated.<ext>` inside the output folder.
///
/// The extension is taken from the first input. Both timeout and engine
/// failure are fatal to the batch; no partial final output is reported as
/// success.
pub fn concatenate(
    engine: &str,
    inputs: &[PathBuf],
    config: &PipelineConfig,
) -> CoreResult<PathBuf> {
    if inputs.is_empty() {
        return Err(PipelineError::ConcatenationFailure {
            reason: "no normalized files to concatenate".to_string(),
        });
    }

    let ext = inputs[0]
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    let output = config.output_dir.join(format!("{FINAL_OUTPUT_STEM}.{ext}"));

    info!(
        "Concatenating {} files into '{}'",
        inputs.len(),
        output.display()
    );

    // Dropped at the end of this function on every path.
    let list = write_concat_list(inputs, &config.output_dir)?;
    debug!("Concat list at '{}'", list.path().display());

    let mut cmd = build_concat_command(engine, list.path(), &output);
    match run_with_timeout(&mut cmd, config.concat_timeout)? {
        RunOutcome::TimedOut(_) => Err(PipelineError::ConcatenationTimeout {
            seconds: config.concat_timeout.as_secs(),
        }),
        RunOutcome::Completed(status, output_text) => {
            if !status.success() {
                return Err(PipelineError::ConcatenationFailure {
                    reason: format!(
                        "engine exited with {}: {}",
                        status,
                        output_text.stderr_tail(3)
                    ),
                });
            }
            if !output.is_file() || std::fs::metadata(&output)?.len() == 0 {
                return Err(PipelineError::ConcatenationFailure {
                    reason: "final output file is missing or empty".to_string(),
                });
            }
            Ok(output)
        }
    }
}

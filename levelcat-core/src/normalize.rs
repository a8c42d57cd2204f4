//! Transform-pass invocation: rewrite the audio track to the target
//! loudness while stream-copying the video.
//!
//! The second loudnorm pass is linear (two-pass): it is handed all five
//! measured values from the analysis pass so the filter applies one
//! consistent correction instead of adjusting dynamically.

use crate::config::PipelineConfig;
use crate::error::{CoreResult, PipelineError};
use crate::external::{run_with_timeout, RunOutcome};
use crate::loudness::report::LoudnessReport;

use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Derives the normalized output path for an input: same base name with a
/// `_normalized` suffix and the original extension, inside `output_dir`.
pub fn normalized_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    output_dir.join(format!("{stem}_normalized.{ext}"))
}

/// Builds the transform command for one input and its measured report.
pub fn build_normalize_command(
    engine: &str,
    input: &Path,
    report: &LoudnessReport,
    output: &Path,
    config: &PipelineConfig,
) -> Command {
    let t = &config.targets;
    let a = &config.audio;
    let filter = format!(
        "loudnorm=linear=true:I={}:LRA={}:TP={}:\
         measured_I={}:measured_TP={}:measured_LRA={}:measured_thresh={}:offset={}",
        t.integrated,
        t.loudness_range,
        t.true_peak,
        report.input_i,
        report.input_tp,
        report.input_lra,
        report.input_thresh,
        report.target_offset
    );

    let mut cmd = Command::new(engine);
    cmd.args(["-hide_banner", "-nostdin", "-y"])
        .arg("-i")
        .arg(input)
        .args(["-c:v", "copy"])
        .arg("-af")
        .arg(filter)
        .arg("-c:a")
        .arg(&a.codec)
        .arg("-b:a")
        .arg(&a.bitrate)
        .arg("-ar")
        .arg(a.sample_rate.to_string())
        .arg(output);
    cmd
}

/// Normalizes the audio of one input file, returning the output path.
///
/// Unlike measurement there is no safe fallback output, so a timeout or a
/// failed invocation is fatal for this file; the caller's failure policy
/// decides whether the batch continues.
pub fn normalize_audio(
    engine: &str,
    input: &Path,
    report: &LoudnessReport,
    config: &PipelineConfig,
) -> CoreResult<PathBuf> {
    let output = normalized_output_path(input, &config.output_dir);
    debug!(
        "Normalizing '{}' -> '{}'",
        input.display(),
        output.display()
    );

    let mut cmd = build_normalize_command(engine, input, report, &output, config);
    match run_with_timeout(&mut cmd, config.normalize_timeout)? {
        RunOutcome::TimedOut(_) => Err(PipelineError::NormalizationTimeout {
            path: input.to_path_buf(),
            seconds: config.normalize_timeout.as_secs(),
        }),
        RunOutcome::Completed(status, output_text) => {
            if !status.success() {
                return Err(PipelineError::NormalizationFailure {
                    path: input.to_path_buf(),
                    reason: format!("engine exited with {}: {}", status, output_text.stderr_tail(3)),
                });
            }
            // The engine can exit zero without producing usable output.
            if !output.is_file() || std::fs::metadata(&output)?.len() == 0 {
                return Err(PipelineError::NormalizationFailure {
                    path: input.to_path_buf(),
                    reason: "output file is missing or empty".to_string(),
                });
            }
            Ok(output)
        }
    }
}

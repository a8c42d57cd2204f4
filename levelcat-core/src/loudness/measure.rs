//! Analysis-pass invocation of the external engine.

use crate::config::PipelineConfig;
use crate::error::{CoreResult, PipelineError};
use crate::external::{run_with_timeout, RunOutcome};
use crate::loudness::report::LoudnessReport;

use log::{debug, warn};
use std::path::Path;
use std::process::Command;

/// Builds the analysis-only command: scan the audio with the loudnorm
/// filter at the configured targets and print the measurement as JSON,
/// discarding the media output entirely.
pub fn build_measure_command(engine: &str, input: &Path, config: &PipelineConfig) -> Command {
    let t = &config.targets;
    let mut cmd = Command::new(engine);
    cmd.args(["-hide_banner", "-nostdin"])
        .arg("-i")
        .arg(input)
        .arg("-vn")
        .arg("-af")
        .arg(format!(
            "loudnorm=I={}:LRA={}:TP={}:print_format=json",
            t.integrated, t.loudness_range, t.true_peak
        ))
        .args(["-f", "null", "-"]);
    cmd
}

/// Measures the loudness of one input file.
///
/// The engine's full diagnostic text is captured line by line and scanned
/// for the embedded report block. A non-zero exit is not itself fatal here:
/// if the block made it out before the engine died, the measurement is
/// still usable, and if it did not, parsing fails anyway.
pub fn measure_loudness(
    engine: &str,
    input: &Path,
    config: &PipelineConfig,
) -> CoreResult<LoudnessReport> {
    debug!("Measuring loudness of '{}'", input.display());

    let mut cmd = build_measure_command(engine, input, config);
    match run_with_timeout(&mut cmd, config.measure_timeout)? {
        RunOutcome::TimedOut(_) => Err(PipelineError::MeasurementTimeout {
            path: input.to_path_buf(),
            seconds: config.measure_timeout.as_secs(),
        }),
        RunOutcome::Completed(status, output) => {
            if !status.success() {
                warn!(
                    "Measurement of '{}' exited with {}: {}",
                    input.display(),
                    status,
                    output.stderr_tail(3)
                );
            }
            LoudnessReport::from_engine_output(&output.combined_text(), input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use std::ffi::OsStr;
    use std::path::PathBuf;

    fn test_config() -> PipelineConfig {
        PipelineConfig::new(PathBuf::from("/in"), PathBuf::from("/out"))
    }

    #[test]
    fn test_build_measure_command() {
        let config = test_config();
        let cmd = build_measure_command("ffmpeg", Path::new("/in/a.mp4"), &config);

        assert_eq!(cmd.get_program(), OsStr::new("ffmpeg"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert!(args.contains(&OsStr::new("-vn")));
        assert!(args.contains(&OsStr::new("-af")));
        assert!(args.contains(&OsStr::new(
            "loudnorm=I=-16:LRA=11:TP=-1.5:print_format=json"
        )));
        // Output goes to the null sink, not to a file.
        assert!(args.contains(&OsStr::new("null")));
        assert_eq!(args.last(), Some(&OsStr::new("-")));
    }
}

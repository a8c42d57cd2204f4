//! Pipeline configuration structures and defaults.
//!
//! Every tunable of the batch pipeline lives here as a named field with a
//! documented default. Instances are created by consumers of the library
//! (like levelcat-cli) and passed to `run_pipeline`.

use std::path::PathBuf;
use std::time::Duration;

/// Loudness targets for the two-pass normalization filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessTargets {
    /// Integrated loudness target in LUFS. Valid range is -70.0 to -5.0.
    pub integrated: f64,

    /// Maximum true peak in dBTP. Valid range is -9.0 to 0.0.
    pub true_peak: f64,

    /// Loudness range target in LU. Valid range is 1.0 to 20.0.
    pub loudness_range: f64,
}

impl Default for LoudnessTargets {
    fn default() -> Self {
        Self {
            integrated: -16.0,
            true_peak: -1.5,
            loudness_range: 11.0,
        }
    }
}

/// Audio re-encode profile applied during normalization.
///
/// The video stream is always stream-copied; only the audio track is
/// re-encoded with these settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioProfile {
    /// Audio codec passed to the engine (e.g. "aac")
    pub codec: String,

    /// Audio bitrate (e.g. "192k")
    pub bitrate: String,

    /// Output sample rate in Hz
    pub sample_rate: u32,
}

impl Default for AudioProfile {
    fn default() -> Self {
        Self {
            codec: "aac".to_string(),
            bitrate: "192k".to_string(),
            sample_rate: 48_000,
        }
    }
}

/// What to do when normalization fails for one file.
///
/// Measurement failures are never fatal (the pipeline degrades to an
/// assumed loudness), but a failed normalization produces no output file,
/// so the batch must either drop the file or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Exclude the file from the batch and keep processing the rest.
    Skip,
    /// Stop the whole batch on the first normalization failure.
    Abort,
}

/// Main configuration for the batch pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // ---- Path Configuration ----
    /// Folder containing the input videos and the manifest file
    pub source_dir: PathBuf,

    /// Folder where normalized files and the final output are written
    pub output_dir: PathBuf,

    /// Engine binary to invoke (name on PATH or an explicit path)
    pub engine: String,

    /// Manifest file name looked up inside `source_dir`
    pub manifest_name: String,

    // ---- Normalization Settings ----
    /// Loudness targets for both the analysis and transform passes
    pub targets: LoudnessTargets,

    /// Audio re-encode profile for the transform pass
    pub audio: AudioProfile,

    // ---- Timeouts ----
    /// Bounded wait for one measurement invocation (default 10 minutes)
    pub measure_timeout: Duration,

    /// Bounded wait for one normalization invocation (default 5 minutes)
    pub normalize_timeout: Duration,

    /// Bounded wait for the concatenation invocation (default 5 minutes)
    pub concat_timeout: Duration,

    // ---- Failure Handling ----
    /// Batch behavior when a file fails to normalize
    pub failure_policy: FailurePolicy,
}

impl PipelineConfig {
    /// Creates a configuration with default targets, audio profile,
    /// timeouts, and the `files.txt` manifest convention.
    pub fn new(source_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            source_dir,
            output_dir,
            engine: "ffmpeg".to_string(),
            manifest_name: "files.txt".to_string(),
            targets: LoudnessTargets::default(),
            audio: AudioProfile::default(),
            measure_timeout: Duration::from_secs(600),
            normalize_timeout: Duration::from_secs(300),
            concat_timeout: Duration::from_secs(300),
            failure_policy: FailurePolicy::Skip,
        }
    }
}

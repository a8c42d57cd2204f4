//! Batch orchestration: measure, normalize, concatenate.
//!
//! Per file the stages run strictly in sequence; the batch only moves on to
//! concatenation after every file has reached a terminal state. Output
//! order always equals manifest order.

use crate::concat;
use crate::config::{FailurePolicy, PipelineConfig};
use crate::error::CoreResult;
use crate::external;
use crate::loudness::{measure_loudness, LoudnessReport};
use crate::manifest;
use crate::normalize::normalize_audio;

use log::{error, info, warn};
use std::path::PathBuf;

/// Where a file's loudness report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoudnessSource {
    /// The analysis pass succeeded
    Measured,
    /// Measurement failed; the default assumption was substituted
    Assumed,
}

/// One fully processed input file, in manifest order.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub original_path: PathBuf,
    pub normalized_path: PathBuf,
    pub report: LoudnessReport,
    pub source: LoudnessSource,
}

/// A file excluded from the batch by a fatal normalization failure under
/// the skip policy.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Terminal output of the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Successfully normalized files, preserving manifest order
    pub processed: Vec<ProcessedFile>,

    /// Files dropped by the failure policy
    pub skipped: Vec<SkippedFile>,

    /// Path of the final concatenated output; `None` only when the
    /// manifest had nothing to do
    pub concatenated: Option<PathBuf>,
}

/// Runs the whole batch: manifest, per-file measure and normalize, final
/// concatenation.
///
/// Measurement failures degrade to the assumed report and never abort the
/// batch. Normalization failures follow `config.failure_policy`. A manifest
/// with zero usable entries returns an empty successful result without ever
/// invoking the engine.
pub fn run_pipeline(config: &PipelineConfig) -> CoreResult<BatchResult> {
    let manifest = manifest::read_manifest(&config.source_dir, &config.manifest_name)?;

    if manifest.entries.is_empty() {
        info!("Nothing to do: manifest has no usable entries");
        return Ok(BatchResult::default());
    }

    external::check_engine(&config.engine)?;
    std::fs::create_dir_all(&config.output_dir)?;

    let total = manifest.entries.len();
    let mut result = BatchResult::default();

    for (index, entry) in manifest.entries.iter().enumerate() {
        let position = index + 1;
        info!(
            "[{}/{}] Measuring loudness of '{}'",
            position, total, entry.relative_path
        );

        let (report, source) = match measure_loudness(&config.engine, &entry.resolved_path, config)
        {
            Ok(report) => {
                info!(
                    "[{}/{}] Measured {:.1} LUFS (peak {:.1} dBTP, range {:.1} LU)",
                    position, total, report.input_i, report.input_tp, report.input_lra
                );
                (report, LoudnessSource::Measured)
            }
            Err(e) => {
                warn!(
                    "[{}/{}] Measurement failed ({}); assuming source already at target",
                    position, total, e
                );
                (
                    LoudnessReport::assumed(&config.targets),
                    LoudnessSource::Assumed,
                )
            }
        };

        info!(
            "[{}/{}] Normalizing '{}'",
            position, total, entry.relative_path
        );
        match normalize_audio(&config.engine, &entry.resolved_path, &report, config) {
            Ok(normalized_path) => {
                result.processed.push(ProcessedFile {
                    original_path: entry.resolved_path.clone(),
                    normalized_path,
                    report,
                    source,
                });
            }
            Err(e) => match config.failure_policy {
                FailurePolicy::Abort => {
                    error!(
                        "[{}/{}] Normalization of '{}' failed, aborting batch: {}",
                        position, total, entry.relative_path, e
                    );
                    return Err(e);
                }
                FailurePolicy::Skip => {
                    error!(
                        "[{}/{}] Normalization of '{}' failed, excluding it from the batch: {}",
                        position, total, entry.relative_path, e
                    );
                    result.skipped.push(SkippedFile {
                        path: entry.resolved_path.clone(),
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    let normalized: Vec<PathBuf> = result
        .processed
        .iter()
        .map(|p| p.normalized_path.clone())
        .collect();
    let final_path = concat::concatenate(&config.engine, &normalized, config)?;

    info!(
        "Batch complete: {} processed, {} skipped, output '{}'",
        result.processed.len(),
        result.skipped.len(),
        final_path.display()
    );
    result.concatenated = Some(final_path);
    Ok(result)
}

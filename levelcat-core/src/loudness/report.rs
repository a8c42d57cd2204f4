//! Structured loudness report extracted from the engine's analysis output.
//!
//! The engine prints the measurement as a JSON block embedded in its
//! diagnostic stream, surrounded by unrelated log lines. The block is found
//! by scanning, never by assuming it is the only content. Field values may
//! be JSON numbers or quoted numeric strings depending on the engine build.

use crate::config::LoudnessTargets;
use crate::error::{CoreResult, PipelineError};

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// The five measured values reported by the analysis pass.
///
/// All five fields must be present and numeric for a report to exist at
/// all; a block missing any of them is a failure, never a partial report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessReport {
    /// Integrated loudness in LUFS
    pub input_i: f64,

    /// True peak in dBTP
    pub input_tp: f64,

    /// Loudness range in LU
    pub input_lra: f64,

    /// Gating threshold used by the measurement
    pub input_thresh: f64,

    /// Offset the engine suggests to hit the target
    pub target_offset: f64,
}

/// Raw decode of the embedded block before numeric coercion.
#[derive(Debug, Deserialize)]
struct RawReport {
    input_i: Option<Value>,
    input_tp: Option<Value>,
    input_lra: Option<Value>,
    input_thresh: Option<Value>,
    target_offset: Option<Value>,
}

impl LoudnessReport {
    /// The fallback report used when measurement fails: the source is
    /// assumed to already sit at the target, so the transform pass applies
    /// an identity-leaning correction instead of a guess.
    pub fn assumed(targets: &LoudnessTargets) -> Self {
        Self {
            input_i: targets.integrated,
            input_tp: targets.true_peak,
            input_lra: targets.loudness_range,
            input_thresh: targets.integrated - 10.0,
            target_offset: 0.0,
        }
    }

    /// Extracts the report from the engine's captured diagnostic text.
    ///
    /// `path` is the input file being measured, used for error context.
    pub fn from_engine_output(text: &str, path: &Path) -> CoreResult<Self> {
        let block = find_report_block(text).ok_or_else(|| {
            PipelineError::MeasurementParseFailure {
                path: path.to_path_buf(),
            }
        })?;

        let raw: RawReport = serde_json::from_str(block).map_err(|e| {
            log::debug!("Loudness block failed to decode: {}", e);
            PipelineError::MeasurementParseFailure {
                path: path.to_path_buf(),
            }
        })?;

        Ok(Self {
            input_i: coerce_field(&raw.input_i, "input_i", path)?,
            input_tp: coerce_field(&raw.input_tp, "input_tp", path)?,
            input_lra: coerce_field(&raw.input_lra, "input_lra", path)?,
            input_thresh: coerce_field(&raw.input_thresh, "input_thresh", path)?,
            target_offset: coerce_field(&raw.target_offset, "target_offset", path)?,
        })
    }
}

/// Coerces one raw field to f64, accepting numbers and quoted numeric
/// strings. Anything else fails naming the field.
fn coerce_field(value: &Option<Value>, field: &str, path: &Path) -> CoreResult<f64> {
    let missing = || PipelineError::MeasurementFieldMissing {
        path: path.to_path_buf(),
        field: field.to_string(),
    };

    match value {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(missing),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| missing()),
        _ => Err(missing()),
    }
}

/// Scans the text for a self-contained `{ ... }` block containing the
/// integrated-loudness field.
///
/// The loudnorm block is flat JSON without nested braces, so plain brace
/// matching is sufficient; candidate blocks that do not mention `input_i`
/// are skipped so unrelated braced output cannot shadow the report.
fn find_report_block(text: &str) -> Option<&str> {
    for (open, _) in text.match_indices('{') {
        let mut depth = 0usize;
        for (offset, ch) in text[open..].char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let block = &text[open..open + offset + ch.len_utf8()];
                        if block.contains("input_i") {
                            return Some(block);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    None
}

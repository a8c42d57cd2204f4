// levelcat-core/tests/pipeline_tests.rs
//
// End-to-end pipeline tests against a stub engine script, so the batch
// state machine is observable without a real ffmpeg installation.

#![cfg(unix)]

use levelcat_core::{
    run_pipeline, FailurePolicy, LoudnessSource, PipelineConfig, PipelineError,
};
use std::error::Error;
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Stub that answers every mode: -version probe, analysis (JSON block on
/// stderr, quoted values, surrounded by noise), and transform/concat
/// (creates the last argument as the output file).
const STUB_ENGINE: &str = r#"#!/bin/sh
case "$*" in
  *-version*)
    echo "stub engine"
    exit 0
    ;;
  *"-f null"*)
    cat >&2 <<'EOF'
[Parsed_loudnorm_0 @ 0x5555]
{
    "input_i" : "-23.40",
    "input_tp" : "-5.10",
    "input_lra" : "6.80",
    "input_thresh" : "-33.55",
    "target_offset" : "0.30"
}
EOF
    exit 0
    ;;
  *)
    for last; do :; done
    echo "stub output" > "$last"
    exit 0
    ;;
esac
"#;

/// Variant whose analysis pass dies without printing a report.
const STUB_ENGINE_MEASURE_FAILS: &str = r#"#!/bin/sh
case "$*" in
  *-version*)
    exit 0
    ;;
  *"-f null"*)
    echo "boom" >&2
    exit 1
    ;;
  *)
    for last; do :; done
    echo "stub output" > "$last"
    exit 0
    ;;
esac
"#;

/// Variant whose transform pass fails for inputs named 'bad'.
const STUB_ENGINE_BAD_NORMALIZE: &str = r#"#!/bin/sh
case "$*" in
  *-version*)
    exit 0
    ;;
  *"-f null"*)
    cat >&2 <<'EOF'
{ "input_i" : "-23.40", "input_tp" : "-5.10", "input_lra" : "6.80", "input_thresh" : "-33.55", "target_offset" : "0.30" }
EOF
    exit 0
    ;;
  *bad*)
    echo "cannot transform" >&2
    exit 1
    ;;
  *)
    for last; do :; done
    echo "stub output" > "$last"
    exit 0
    ;;
esac
"#;

fn write_stub_engine(dir: &Path, body: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join("stub-engine.sh");
    fs::write(&path, body)?;
    let mut perms = fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms)?;
    Ok(path)
}

fn setup_batch(
    source_dir: &Path,
    output_dir: &Path,
    engine: &Path,
    files: &[&str],
) -> Result<PipelineConfig, Box<dyn Error>> {
    for name in files {
        File::create(source_dir.join(name))?;
    }
    fs::write(source_dir.join("files.txt"), files.join("\n"))?;

    let mut config = PipelineConfig::new(source_dir.to_path_buf(), output_dir.to_path_buf());
    config.engine = engine.to_string_lossy().into_owned();
    Ok(config)
}

#[test]
fn test_happy_path_preserves_manifest_order() -> Result<(), Box<dyn Error>> {
    let source = tempdir()?;
    let output = tempdir()?;
    let engine = write_stub_engine(source.path(), STUB_ENGINE)?;

    // Manifest order deliberately not alphabetical.
    let config = setup_batch(source.path(), output.path(), &engine, &["b.mp4", "a.mp4"])?;
    let result = run_pipeline(&config)?;

    assert_eq!(result.processed.len(), 2);
    assert!(result.skipped.is_empty());
    assert!(result.processed[0].original_path.ends_with("b.mp4"));
    assert!(result.processed[1].original_path.ends_with("a.mp4"));

    for file in &result.processed {
        assert_eq!(file.source, LoudnessSource::Measured);
        assert_eq!(file.report.input_i, -23.4);
        assert!(file.normalized_path.is_file());
    }

    let final_path = result.concatenated.expect("final output expected");
    assert_eq!(final_path, output.path().join("final_concatenated.mp4"));
    assert!(final_path.is_file());
    Ok(())
}

#[test]
fn test_measurement_failure_degrades_to_assumed() -> Result<(), Box<dyn Error>> {
    let source = tempdir()?;
    let output = tempdir()?;
    let engine = write_stub_engine(source.path(), STUB_ENGINE_MEASURE_FAILS)?;

    let config = setup_batch(source.path(), output.path(), &engine, &["a.mp4"])?;
    let result = run_pipeline(&config)?;

    // The file is still normalized and concatenated, with the default
    // loudness assumption substituted for the failed measurement.
    assert_eq!(result.processed.len(), 1);
    assert_eq!(result.processed[0].source, LoudnessSource::Assumed);
    assert_eq!(result.processed[0].report.input_i, config.targets.integrated);
    assert_eq!(result.processed[0].report.target_offset, 0.0);
    assert!(result.concatenated.is_some());
    Ok(())
}

#[test]
fn test_normalization_failure_skips_file_and_continues() -> Result<(), Box<dyn Error>> {
    let source = tempdir()?;
    let output = tempdir()?;
    let engine = write_stub_engine(source.path(), STUB_ENGINE_BAD_NORMALIZE)?;

    let config = setup_batch(
        source.path(),
        output.path(),
        &engine,
        &["a.mp4", "bad.mp4", "c.mp4"],
    )?;
    let result = run_pipeline(&config)?;

    // The failing file is excluded; the files after it are still processed.
    assert_eq!(result.processed.len(), 2);
    assert!(result.processed[0].original_path.ends_with("a.mp4"));
    assert!(result.processed[1].original_path.ends_with("c.mp4"));
    assert_eq!(result.skipped.len(), 1);
    assert!(result.skipped[0].path.ends_with("bad.mp4"));
    assert!(result.concatenated.is_some());
    Ok(())
}

#[test]
fn test_normalization_failure_aborts_when_configured() -> Result<(), Box<dyn Error>> {
    let source = tempdir()?;
    let output = tempdir()?;
    let engine = write_stub_engine(source.path(), STUB_ENGINE_BAD_NORMALIZE)?;

    let mut config = setup_batch(
        source.path(),
        output.path(),
        &engine,
        &["a.mp4", "bad.mp4", "c.mp4"],
    )?;
    config.failure_policy = FailurePolicy::Abort;

    match run_pipeline(&config) {
        Err(PipelineError::NormalizationFailure { path, .. }) => {
            assert!(path.ends_with("bad.mp4"));
        }
        other => panic!("Unexpected result: {:?}", other),
    }

    // No final output was produced.
    assert!(!output.path().join("final_concatenated.mp4").exists());
    Ok(())
}

#[test]
fn test_empty_manifest_never_invokes_engine() -> Result<(), Box<dyn Error>> {
    let source = tempdir()?;
    let output = tempdir()?;
    fs::write(source.path().join("files.txt"), "# nothing here\n\n")?;

    // A nonexistent engine proves the pipeline returns before any
    // invocation, including the availability probe.
    let mut config = PipelineConfig::new(source.path().to_path_buf(), output.path().to_path_buf());
    config.engine = "surely-no-such-engine-binary-42".to_string();

    let result = run_pipeline(&config)?;
    assert!(result.processed.is_empty());
    assert!(result.skipped.is_empty());
    assert!(result.concatenated.is_none());
    Ok(())
}

#[test]
fn test_missing_entry_excluded_with_batch_continuing() -> Result<(), Box<dyn Error>> {
    let source = tempdir()?;
    let output = tempdir()?;
    let engine = write_stub_engine(source.path(), STUB_ENGINE)?;

    // Only a.mp4 exists on disk; the manifest also names b.mp4.
    File::create(source.path().join("a.mp4"))?;
    fs::write(source.path().join("files.txt"), "a.mp4\n# skip\n\nb.mp4\n")?;

    let mut config = PipelineConfig::new(source.path().to_path_buf(), output.path().to_path_buf());
    config.engine = engine.to_string_lossy().into_owned();

    let result = run_pipeline(&config)?;
    assert_eq!(result.processed.len(), 1);
    assert!(result.processed[0].original_path.ends_with("a.mp4"));
    assert!(result.concatenated.is_some());
    Ok(())
}

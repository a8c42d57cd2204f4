//! Manifest reading for the batch pipeline.
//!
//! The manifest is a plain text file in the source folder listing one input
//! path per line, relative to that folder. Blank lines and lines starting
//! with `#` are skipped. Entries whose resolved file does not exist are
//! excluded with a warning; the batch continues with the remaining files.

use crate::error::{CoreResult, PipelineError};

use std::path::{Path, PathBuf};

/// One usable line of the manifest, resolved against the source folder.
#[derive(Debug, Clone)]
pub struct InputDescriptor {
    /// The path exactly as written in the manifest
    pub relative_path: String,

    /// The path resolved against the source folder
    pub resolved_path: PathBuf,

    /// Whether the resolved file existed when the manifest was read
    pub exists: bool,
}

/// The parsed manifest: usable entries in manifest order, plus the entries
/// that were excluded because their file is missing.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Entries whose file exists, preserving manifest line order.
    /// This order is the concatenation order of the final output.
    pub entries: Vec<InputDescriptor>,

    /// Entries excluded because the resolved file does not exist
    pub missing: Vec<InputDescriptor>,
}

/// Reads and resolves the manifest file from the source folder.
///
/// Returns `PipelineError::ManifestNotFound` if the manifest file itself is
/// absent. A manifest with zero usable entries is not an error; the caller
/// decides whether an empty batch is terminal.
pub fn read_manifest(source_dir: &Path, manifest_name: &str) -> CoreResult<Manifest> {
    let manifest_path = source_dir.join(manifest_name);
    if !manifest_path.is_file() {
        return Err(PipelineError::ManifestNotFound(manifest_path));
    }

    let content = std::fs::read_to_string(&manifest_path)?;
    let mut manifest = Manifest::default();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let resolved_path = source_dir.join(trimmed);
        let exists = resolved_path.is_file();
        let descriptor = InputDescriptor {
            relative_path: trimmed.to_string(),
            resolved_path,
            exists,
        };

        if exists {
            manifest.entries.push(descriptor);
        } else {
            log::warn!(
                "Manifest entry '{}' not found at '{}', excluding it from the batch",
                descriptor.relative_path,
                descriptor.resolved_path.display()
            );
            manifest.missing.push(descriptor);
        }
    }

    log::debug!(
        "Manifest '{}': {} usable entries, {} missing",
        manifest_path.display(),
        manifest.entries.len(),
        manifest.missing.len()
    );

    Ok(manifest)
}

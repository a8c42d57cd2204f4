//! Interactions with the external media engine.
//!
//! The engine (an ffmpeg-compatible binary) is invoked as a subprocess for
//! every pipeline stage. This module provides the availability probe and the
//! timeout-bounded command runner used by all invokers.

use crate::error::{CoreResult, PipelineError};

use std::io;
use std::process::{Command, Stdio};

pub mod command;

pub use command::{run_with_timeout, EngineOutput, RunOutcome};

/// Checks that the engine binary is available and executable.
///
/// Runs `<engine> -version` with discarded output. Used once before the
/// first real invocation so a misconfigured engine path fails fast instead
/// of failing on the first file.
pub fn check_engine(engine: &str) -> CoreResult<()> {
    let result = Command::new(engine)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found engine: {}", engine);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::error!("Engine '{}' not found", engine);
            Err(PipelineError::EngineNotFound(engine.to_string()))
        }
        Err(e) => Err(PipelineError::CommandStart {
            command: engine.to_string(),
            source: e,
        }),
    }
}

// levelcat-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Levelcat: batch loudness normalization and concatenation",
    long_about = "Measures each video listed in the source folder's manifest, rewrites \
                  its audio to the target loudness with the engine's two-pass loudnorm \
                  filter, and concatenates the results into one output video."
)]
pub struct Cli {
    /// Folder containing the input videos and the files.txt manifest
    #[arg(value_name = "SOURCE_DIR", default_value = ".")]
    pub source_dir: PathBuf,

    /// Folder where normalized files and the final output are written
    #[arg(value_name = "OUTPUT_DIR", default_value = "./normalized")]
    pub output_dir: PathBuf,

    /// Engine binary to invoke (name on PATH or an explicit path)
    #[arg(value_name = "ENGINE", default_value = "ffmpeg")]
    pub engine: String,

    /// Optional: Override the integrated loudness target in LUFS
    #[arg(long, value_name = "LUFS", allow_negative_numbers = true)]
    pub target_i: Option<f64>,

    /// Optional: Override the maximum true peak in dBTP
    #[arg(long, value_name = "DBTP", allow_negative_numbers = true)]
    pub target_tp: Option<f64>,

    /// Optional: Override the loudness range target in LU
    #[arg(long, value_name = "LU")]
    pub target_lra: Option<f64>,

    /// Manifest file name looked up inside SOURCE_DIR
    #[arg(long, value_name = "NAME", default_value = "files.txt")]
    pub manifest: String,

    /// Stop the whole batch when a file fails to normalize
    /// (by default the file is excluded and the batch continues)
    #[arg(long)]
    pub abort_on_failure: bool,
}

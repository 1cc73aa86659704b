//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Mirror Confluence spaces and page trees into offline HTML.
///
/// Spaces and page titles come from a YAML document, credentials from an
/// env file. Every page is written to `DEST_FOLDER/{space}/{ancestors...}/{title}/index.html`
/// with its attachments next to it.
#[derive(Parser, Debug)]
#[command(name = "confluence-export")]
#[command(author, version, about)]
pub struct Args {
    /// Directory the export tree is written to (created if absent)
    #[arg(value_name = "DEST_FOLDER")]
    pub dest_folder: PathBuf,

    /// Export target document [default: ~/.secrets/confluence-export.yaml]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Credentials env file [default: ~/.secrets/atlassian.env]
    #[arg(short, long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Pages exported concurrently (1-16)
    #[arg(short = 'j', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub jobs: u8,

    /// Attachment downloads per page run concurrently (1-32)
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub attachment_jobs: u8,

    /// Per-request attachment download timeout in seconds (1-3600)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub download_timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

//! One export run: configuration, client, exporter, progress and summary.

use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use confluence_export::config::{self, ServiceCredentials};
use confluence_export::export::{ExportOptions, Exporter, RunReport};
use confluence_export::gateway::ConfluenceClient;
use confluence_export::hierarchy::{DEFAULT_MAX_DEPTH, SpaceTarget};
use confluence_export::layout::ExportLayout;
use tracing::{debug, error, info, warn};

use crate::app::exit::{self, ProcessExit};
use crate::app::{progress, terminal};
use crate::cli::Args;

pub(crate) async fn run_export(args: Args) -> Result<ProcessExit> {
    terminal::init_tracing(terminal::resolve_default_log_level(&args));
    debug!(?args, "CLI arguments parsed");
    info!("confluence-export starting");

    let Some((credentials, targets)) = load_configuration(&args) else {
        return Ok(ProcessExit::Failure);
    };

    if !args.dest_folder.exists() {
        std::fs::create_dir_all(&args.dest_folder).with_context(|| {
            format!("failed to create destination folder {}", args.dest_folder.display())
        })?;
        info!(dir = %args.dest_folder.display(), "Created destination folder");
    }

    let client = ConfluenceClient::with_download_timeout(
        credentials,
        Duration::from_secs(args.download_timeout),
    )
    .context("failed to build HTTP client")?;

    let options = ExportOptions {
        page_jobs: usize::from(args.jobs),
        attachment_jobs: usize::from(args.attachment_jobs),
        max_depth: DEFAULT_MAX_DEPTH,
    };
    let exporter = Exporter::new(&client, ExportLayout::new(&args.dest_folder), options);

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        args.no_progress,
        terminal::is_dumb_terminal(),
    );
    let (spinner, stop) = progress::spawn_progress_ui(use_spinner, exporter.stats());

    let report = exporter.run(&targets).await;

    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = spinner {
        let _ = handle.await;
    }

    log_summary(&report, &args.dest_folder);
    Ok(exit::exit_for_report(&report))
}

/// Loads credentials and targets; logs and returns `None` on any configuration error.
fn load_configuration(args: &Args) -> Option<(ServiceCredentials, Vec<SpaceTarget>)> {
    let Some(env_file) = args.env_file.clone().or_else(config::default_env_file_path) else {
        error!("HOME is not set; pass --env-file explicitly");
        return None;
    };
    let Some(config_file) = args.config.clone().or_else(config::default_config_path) else {
        error!("HOME is not set; pass --config explicitly");
        return None;
    };

    let credentials = match config::load_credentials(&env_file) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "Configuration error");
            return None;
        }
    };
    let targets = match config::load_targets(&config_file) {
        Ok(targets) => targets,
        Err(e) => {
            error!(error = %e, "Configuration error");
            return None;
        }
    };

    info!(
        url = credentials.base_url(),
        user = credentials.username(),
        targets = targets.len(),
        "Configuration loaded"
    );
    Some((credentials, targets))
}

fn log_summary(report: &RunReport, dest: &Path) {
    for space in &report.spaces {
        for title in &space.missing {
            warn!(space = %space.space_key, title = %title, "Named page was not found");
        }
        for failure in &space.failures {
            warn!(
                space = %space.space_key,
                page_id = %failure.page_id,
                title = %failure.title,
                reason = %failure.reason,
                "Page was not exported"
            );
        }
    }

    info!(
        dest = %dest.display(),
        pages_exported = report.pages_exported(),
        pages_failed = report.pages_failed(),
        missing = report.missing_pages(),
        attachments_downloaded = report.attachments_downloaded(),
        attachments_failed = report.attachments_failed(),
        "Export complete"
    );
}

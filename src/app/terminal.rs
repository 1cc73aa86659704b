//! Terminal capability checks and tracing setup.

use std::io::IsTerminal;

use crate::cli::Args;

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_use_spinner(
    stderr_is_terminal: bool,
    quiet: bool,
    no_progress: bool,
    dumb_terminal: bool,
) -> bool {
    stderr_is_terminal && !quiet && !no_progress && !dumb_terminal
}

/// Quiet wins over verbose.
pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// `RUST_LOG` wins over `default_level`.
pub(crate) fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_spinner_requires_interactive_stderr() {
        assert!(should_use_spinner(true, false, false, false));
        assert!(!should_use_spinner(false, false, false, false));
        assert!(!should_use_spinner(true, true, false, false));
        assert!(!should_use_spinner(true, false, true, false));
        assert!(!should_use_spinner(true, false, false, true));
    }

    #[test]
    fn test_log_level_from_flags() {
        let level = |argv: &[&str]| resolve_default_log_level(&Args::try_parse_from(argv).unwrap());
        assert_eq!(level(&["confluence-export", "out"]), "info");
        assert_eq!(level(&["confluence-export", "-v", "out"]), "debug");
        assert_eq!(level(&["confluence-export", "-vvv", "out"]), "trace");
        assert_eq!(level(&["confluence-export", "-q", "-v", "out"]), "error");
    }
}

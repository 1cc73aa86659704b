//! Exit code logic for the export process.

use std::process::ExitCode;

use confluence_export::export::RunReport;

/// Process outcome, mapped to exit codes 0, 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Everything configured was exported.
    Success,
    /// Some pages were exported, but something failed, was missing or was cut short.
    Partial,
    /// Nothing was exported and something went wrong, or the run could not start.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Determines the process exit outcome from exported pages and whether anything went wrong.
pub(crate) fn determine_exit_outcome(exported: usize, has_issues: bool) -> ProcessExit {
    if !has_issues {
        ProcessExit::Success
    } else if exported > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

pub(crate) fn exit_for_report(report: &RunReport) -> ProcessExit {
    determine_exit_outcome(report.pages_exported(), report.has_issues())
}

#[cfg(test)]
mod tests {
    use super::*;
    use confluence_export::export::{PageFailure, SpaceReport};

    #[test]
    fn test_exit_outcome_success_when_no_issues() {
        assert_eq!(determine_exit_outcome(3, false), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_for_empty_run() {
        assert_eq!(determine_exit_outcome(0, false), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_partial_when_mixed() {
        assert_eq!(determine_exit_outcome(2, true), ProcessExit::Partial);
    }

    #[test]
    fn test_exit_outcome_failure_when_nothing_exported() {
        assert_eq!(determine_exit_outcome(0, true), ProcessExit::Failure);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ProcessExit::Success.code(), 0);
        assert_eq!(ProcessExit::Partial.code(), 1);
        assert_eq!(ProcessExit::Failure.code(), 2);
    }

    #[test]
    fn test_exit_for_report_with_failed_page() {
        let report = RunReport {
            spaces: vec![SpaceReport {
                space_key: "ENG".to_string(),
                pages_exported: 1,
                failures: vec![PageFailure {
                    page_id: "2".to_string(),
                    title: "Broken".to_string(),
                    reason: "disk full".to_string(),
                }],
                ..SpaceReport::default()
            }],
        };
        assert_eq!(exit_for_report(&report), ProcessExit::Partial);
    }
}

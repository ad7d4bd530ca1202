//! Colored log lines, the history scan spinner, and the run summary.
//!
//! Everything here writes to stderr except the summary, which goes to stdout.
//! Destructive actions and failures are printed at every verbosity level;
//! skip decisions at every level but quiet.

use crate::cleanup::{
    BranchOutcome, BranchReport, CleanupCallbacks, CleanupReport, SkipReason, TagOutcome,
};
use crate::config::Config;
use crate::constants::PROGRESS_TICK_MS;
use crate::history::HistoryIndex;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;

/// Callbacks that print nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl CleanupCallbacks for NoOpCallbacks {
    fn on_removing_branch(&self, _branch: &str, _short_ref: &str) {}
    fn on_removing_tag(&self, _tag: &str, _short_ref: &str) {}
    fn on_failure(&self, _message: &str) {}
}

/// Callbacks writing the process log to stderr.
pub struct LogCallbacks {
    config: Config,
    spinner: RefCell<Option<ProgressBar>>,
}

impl LogCallbacks {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            spinner: RefCell::new(None),
        }
    }
}

impl Drop for LogCallbacks {
    // A fatal scan error never reaches on_scan_complete.
    fn drop(&mut self) {
        if let Some(spinner) = self.spinner.get_mut().take() {
            spinner.finish_and_clear();
        }
    }
}

impl CleanupCallbacks for LogCallbacks {
    fn on_target(&self, target: &str) {
        if self.config.is_verbose() {
            eprintln!("{} {}", "Merged baseline:".cyan(), target.white().bold());
        }
    }

    fn on_scan_start(&self, branch: &str) {
        if self.config.is_verbose() {
            eprintln!("  {}", format!("Reading history of {}...", branch).dimmed());
        }
        *self.spinner.borrow_mut() = create_scan_spinner(&self.config, branch);
    }

    fn on_scan_complete(&self, branch: &str, merged: &HistoryIndex) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
        if self.config.is_verbose() {
            eprintln!(
                "  {}",
                format!("{} change ids merged into {}", merged.len(), branch).dimmed()
            );
        }
    }

    fn on_removing_branch(&self, branch: &str, short_ref: &str) {
        eprintln!("{}", removal_line(&self.config, "branch", branch, short_ref));
    }

    fn on_removing_tag(&self, tag: &str, short_ref: &str) {
        eprintln!("{}", removal_line(&self.config, "tag", tag, short_ref));
    }

    fn on_failure(&self, message: &str) {
        print_error(message);
    }

    fn on_branch_complete(&self, report: &BranchReport) {
        if let Some(line) = skip_line(&self.config, report) {
            eprintln!("{}", line);
        }
    }
}

/// Log line for a skipped branch. Silent only in quiet mode.
fn skip_line(config: &Config, report: &BranchReport) -> Option<String> {
    if config.is_quiet() {
        return None;
    }
    let BranchOutcome::Skipped(reason) = &report.outcome else {
        return None;
    };
    Some(format!(
        "{} {} ({})",
        "Keeping".dimmed(),
        report.branch,
        format_skip_reason(reason).dimmed()
    ))
}

/// Spinner shown while a protected branch's history streams in.
/// `None` in quiet or verbose mode.
fn create_scan_spinner(config: &Config, branch: &str) -> Option<ProgressBar> {
    if config.is_quiet() || config.is_verbose() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Reading merged history of {}...", branch));
    spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    Some(spinner)
}

fn removal_line(config: &Config, kind: &str, name: &str, short_ref: &str) -> String {
    let verb = if config.dry_run {
        "Would remove"
    } else {
        "Removing"
    };
    format!(
        "{} {} {} ({}) ...",
        verb.yellow(),
        kind,
        name.white().bold(),
        short_ref.cyan()
    )
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

pub fn print_working_dir(path: &Path, config: &Config) {
    if !config.is_verbose() {
        return;
    }
    eprintln!(
        "{} {}",
        "Working in:".cyan(),
        path.display().to_string().white().bold()
    )
}

pub fn print_summary(report: &CleanupReport, duration: Duration, config: &Config) {
    if config.is_quiet() {
        print_quiet_summary(report);
    } else {
        print_normal_summary(report, duration, config);
    }
}

fn print_quiet_summary(report: &CleanupReport) {
    println!("{}", format_counts(report));
}

fn print_normal_summary(report: &CleanupReport, duration: Duration, config: &Config) {
    let removed = report.deleted().count();
    let failed: Vec<_> = report.failed().collect();

    if removed == 0 && failed.is_empty() {
        println!(
            "{}",
            format!("Nothing merged into {} to clean up", report.target).dimmed()
        );
        return;
    }

    let heading = if config.dry_run {
        "Would remove"
    } else {
        "Removed"
    };
    println!(
        "{}",
        format!("{} ({}):", heading, removed).green().bold()
    );
    for entry in report.deleted() {
        println!("  {} {}", entry.branch.white(), format_tag(entry).dimmed());
    }

    if !failed.is_empty() {
        println!("{}", format!("Failed ({}):", failed.len()).red().bold());
        for entry in failed {
            if let BranchOutcome::Failed { error, .. } = &entry.outcome {
                println!("  {} {}", entry.branch.white(), error.red());
            }
        }
    }

    println!(
        "{}: {} in {}",
        "Total".white().bold(),
        format_counts(report),
        format_duration(duration)
    );
}

fn format_counts(report: &CleanupReport) -> String {
    format!(
        "{}/{} branches removed, {} failed",
        report.deleted().count(),
        report.branches.len(),
        report.failed().count()
    )
}

fn format_tag(report: &BranchReport) -> String {
    match report.tag() {
        Some(TagOutcome::Deleted { .. }) | Some(TagOutcome::WouldDelete { .. }) => {
            "(+ .mailed tag)".to_string()
        }
        Some(TagOutcome::Failed { .. }) => "(.mailed tag not removed)".to_string(),
        Some(TagOutcome::Absent) | None => String::new(),
    }
}

fn format_skip_reason(reason: &SkipReason) -> &'static str {
    match reason {
        SkipReason::Protected => "protected",
        SkipReason::CheckedOut => "checked out",
        SkipReason::NoChangeId => "no Change-Id",
        SkipReason::NotSubmitted => "not merged",
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

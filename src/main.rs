use clap::Parser;
use git_cleanup::config::{Config, Verbosity};
use git_cleanup::git::GitCli;
use git_cleanup::{cleanup, output};
use std::time::Instant;

/// Delete local branches whose change has already been merged upstream.
///
/// A branch is removed when the Change-Id at its tip appears in the history of
/// the target branch. Its `<branch>.mailed` tag goes with it.
#[derive(Parser, Debug)]
#[command(name = "git-cleanup", version)]
struct Cli {
    /// Branch whose history counts as merged (master or dev.*); defaults to
    /// the checked-out branch
    target: Option<String>,

    /// Only print removals, errors and a one-line summary
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print every git command and skip decision
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be removed without deleting anything
    #[arg(short = 'n', long)]
    dry_run: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            verbosity: Verbosity::from_flags(self.quiet, self.verbose),
            dry_run: self.dry_run,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    let cwd = std::env::current_dir()?;
    output::print_working_dir(&cwd, &config);

    let client = GitCli::new(cwd, config.git_logger());
    let callbacks = output::LogCallbacks::new(config);

    let start = Instant::now();
    let report = cleanup::run(&client, cli.target.as_deref(), &config, &callbacks)?;
    output::print_summary(&report, start.elapsed(), &config);

    Ok(())
}

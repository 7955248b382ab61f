use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Args};
use tracing::{debug, info, warn};

use elvish_upgrade::driver::{self, FileOutcome, FileReport, Mode};
use elvish_upgrade::FixError;

use super::with_jobs;

const STDIN_NAME: &str = "<stdin>";

#[derive(Args)]
pub struct UpgradeArgs {
    /// Scripts to upgrade in place (reads stdin and writes stdout when none are given)
    pub files: Vec<PathBuf>,
    /// List files that would change without writing them (exit 1 if any)
    #[arg(long, requires = "files", conflicts_with = "dump_tree")]
    pub check: bool,
    /// Print the parsed syntax tree of each input instead of upgrading it
    #[arg(long)]
    pub dump_tree: bool,
    /// Number of files processed in parallel (default: one per CPU)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
    /// Log more: -v for each upgraded file, -vv for every stage
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Run the tool. Returns the process exit status.
pub fn cmd_upgrade(args: UpgradeArgs) -> i32 {
    let UpgradeArgs {
        files,
        check,
        dump_tree,
        jobs,
        verbose: _,
    } = args;

    if files.is_empty() {
        return upgrade_stdin(dump_tree);
    }
    if dump_tree {
        return dump_files(&files);
    }

    let mode = if check { Mode::Check } else { Mode::Write };
    let reports = with_jobs(jobs, || driver::fix_files(&files, mode));
    summarize(&reports, mode)
}

fn upgrade_stdin(dump_tree: bool) -> i32 {
    let result = driver::read_all(STDIN_NAME, io::stdin().lock()).and_then(|bytes| {
        if dump_tree {
            Ok(driver::parse_bytes(STDIN_NAME, &bytes)?.dump())
        } else {
            driver::fix(STDIN_NAME, &bytes)
        }
    });
    match result {
        Ok(text) => write_stdout(&text),
        Err(err) => {
            skipped(&err);
            1
        }
    }
}

fn dump_files(files: &[PathBuf]) -> i32 {
    let mut status = 0;
    for file in files {
        match driver::dump_file(file) {
            Ok(dump) => {
                if files.len() > 1 {
                    println!("# {}", file.display());
                }
                if write_stdout(&dump) != 0 {
                    return 1;
                }
            }
            Err(err) => {
                skipped(&err);
                status = 1;
            }
        }
    }
    status
}

/// Report every file in input order and pick the exit status.
fn summarize(reports: &[FileReport], mode: Mode) -> i32 {
    let mut changed = 0usize;
    let mut failed = 0usize;

    for report in reports {
        let path = report.path.display();
        match &report.result {
            Ok(FileOutcome::Upgraded) => {
                changed += 1;
                info!("upgraded {}", path);
            }
            Ok(FileOutcome::WouldUpgrade) => {
                changed += 1;
                eprintln!("would upgrade: {}", path);
            }
            Ok(FileOutcome::Unchanged) => debug!("unchanged {}", path),
            Err(err) => {
                failed += 1;
                skipped(err);
            }
        }
    }

    info!(
        files = reports.len(),
        changed,
        failed,
        "done"
    );

    if failed > 0 || (mode == Mode::Check && changed > 0) {
        1
    } else {
        0
    }
}

fn skipped(err: &FixError) {
    err.render();
    warn!("skipped {}", err.name());
}

fn write_stdout(text: &str) -> i32 {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: cannot write output: {}", e);
            1
        }
    }
}

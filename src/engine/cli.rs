//! CLI command handlers: thin glue between parsed arguments and the library operations.

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::engine::arg_parser::{Cli, Commands, FilterArgs};
use crate::engine::store::load_index;
use crate::engine::tools::format_size;
use crate::utils::{Colors, apply_file_to_opts, load_repo_toml, setup_logging};
use crate::{
    CheckReport, DedupeReport, IndexDiff, IndexFilters, IndexStats, IndexSummary, Opts, Repo,
    VerifyReport, check, dedupe, diff_indexes, index_dir, index_stats, init_repo, locate,
    reset_repo, resolve_index_path, verify_index,
};

/// Opts from the repository config document (if any), then CLI flags on top.
fn setup_opts(cli: &Cli, root: Option<&Path>) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = root.and_then(load_repo_toml) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if let Some(n) = cli.workers {
        opts.num_threads = Some(n);
    }
    if let Some(p) = cli.parallel_walk {
        opts.parallel_walk = p;
    }
    setup_logging(opts.verbose);
    opts
}

/// CLI filter flags override the config document's filters field by field.
fn merge_filters(base: &IndexFilters, args: &FilterArgs, after_ns: Option<i64>) -> IndexFilters {
    let extensions = if args.extensions.is_empty() {
        base.extensions.clone()
    } else {
        Some(args.extensions.clone())
    };
    IndexFilters::new(
        extensions,
        args.min_size.unwrap_or(base.min_size_bytes),
        after_ns.or(base.after_ns),
    )
}

/// Parse `YYYY-MM-DD` as local midnight, in nanoseconds since epoch.
pub fn parse_date(date: &str) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("date format must be YYYY-MM-DD, got '{date}'"))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_local_timezone(Local).earliest())
        .with_context(|| format!("'{date}' has no local midnight"))?;
    midnight
        .timestamp_nanos_opt()
        .with_context(|| format!("'{date}' is out of range"))
}

/// Dispatch a parsed command line.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let repo = Repo::discover(&cwd);
    let opts = setup_opts(cli, repo.as_ref().ok().map(|r| r.root.as_path()));

    if let Commands::Init = cli.command {
        return handle_init(&cwd);
    }
    let repo = repo?;

    match &cli.command {
        Commands::Init => {}
        Commands::Index { filters, after } => {
            let after_ns = after.as_deref().map(parse_date).transpose()?;
            let opts = Opts {
                filters: merge_filters(&opts.filters, filters, after_ns),
                ..opts
            };
            info!("Indexing root: {}", repo.root.display());
            let summary = index_dir(&repo.root, &repo.index_path, &opts)?;
            print_index_summary(&summary);
        }
        Commands::Stats => print_stats(&index_stats(&load_index(&repo.index_path))),
        Commands::Clean { link, filters } => {
            let filters = merge_filters(&opts.filters, filters, None);
            let mode = if *link { "Symlink" } else { "Delete" };
            info!("Cleaning duplicates (Mode: {})...", mode);
            let report = dedupe(&repo.index_path, *link, Some(&filters))?;
            print_dedupe_report(&report, *link);
        }
        Commands::Check { prune } => {
            info!("Checking index integrity...");
            let report = check(&repo.index_path, *prune)?;
            print_check_report(&report);
        }
        Commands::Reset { force } => handle_reset(&repo, *force)?,
        Commands::Locate { file } => handle_locate(&repo, file)?,
        Commands::Verify => {
            let index = load_index(&repo.index_path);
            if index.is_empty() {
                info!("Index is empty or missing.");
                return Ok(());
            }
            let report = verify_index(&index, &opts)?;
            print_verify_report(&report);
        }
        Commands::Diff { target } => handle_diff(&repo, target)?,
    }
    Ok(())
}

fn handle_init(dir: &Path) -> Result<()> {
    if init_repo(dir)? {
        info!(
            "Initialization complete. Created {}",
            Repo::at(dir).store_dir.display()
        );
    } else {
        info!("Repository already exists in {}", dir.display());
    }
    Ok(())
}

fn handle_reset(repo: &Repo, force: bool) -> Result<()> {
    if !force && !confirm_reset(repo)? {
        info!("Reset aborted.");
        return Ok(());
    }
    reset_repo(repo)?;
    info!("Repository reset. {} has been removed.", repo.store_dir.display());
    Ok(())
}

fn confirm_reset(repo: &Repo) -> Result<bool> {
    warn!("This deletes the index. Files already deleted or linked by clean are not restored.");
    print!("Are you sure you want to delete {}? [y/N]: ", repo.store_dir.display());
    std::io::stdout().flush().context("flush prompt")?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("read confirmation")?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn handle_locate(repo: &Repo, file: &Path) -> Result<()> {
    let index = load_index(&repo.index_path);
    let (_, entry) = locate(&index, file)?;
    match entry {
        Some(entry) => {
            info!(
                "Match found: this content exists {} time(s) in the repository.",
                entry.paths.len()
            );
            for p in &entry.paths {
                info!(" - {}", p);
            }
        }
        None => info!("No match: this content is not present in the index."),
    }
    Ok(())
}

fn handle_diff(repo: &Repo, target: &Path) -> Result<()> {
    let remote_path = resolve_index_path(target)?;
    if !repo.index_path.exists() {
        bail!("local repository not initialized, run `init` first");
    }
    let local = load_index(&repo.index_path);
    info!("Loading remote index from '{}'...", remote_path.display());
    let remote = load_index(&remote_path);
    print_diff(&diff_indexes(&local, &remote), &repo.root, &remote_path);
    Ok(())
}

fn print_index_summary(summary: &IndexSummary) {
    info!("Operation complete.");
    info!(" - Cached    : {} (Unchanged)", summary.skipped);
    info!(" - Indexed   : {} (New/Modified)", summary.indexed);
    info!(" - Pruned    : {} (Deleted)", summary.pruned);
    if summary.failed > 0 {
        warn!(" - Failed    : {} (Unreadable)", summary.failed);
    }
}

fn print_stats(stats: &IndexStats) {
    info!("Unique Content : {}", stats.unique_contents);
    info!("Total Files    : {}", stats.total_files);
    info!("Total Size     : {}", format_size(stats.total_size));
    info!("Duplicates     : {}", stats.duplicates);
    info!("Reclaimable    : {}", format_size(stats.reclaimable));
}

fn print_dedupe_report(report: &DedupeReport, use_links: bool) {
    info!("Clean complete. Processed {} files.", report.processed);
    if !use_links {
        info!("Space reclaimed: {}", format_size(report.bytes_reclaimed));
    }
    if !report.failed.is_empty() {
        warn!("{} duplicates could not be cleaned and stay indexed", report.failed.len());
    }
    if !report.missing_masters.is_empty() {
        warn!("{} entries skipped (master file missing)", report.missing_masters.len());
    }
}

fn print_check_report(report: &CheckReport) {
    for p in &report.missing {
        info!("{} {}", Colors::colorize(Colors::MISSING, "Missing:"), p.display());
    }
    if report.pruned {
        info!(
            "Check complete. Pruned {} missing paths and {} empty entries.",
            report.missing.len(),
            report.entries_removed
        );
    } else {
        info!("Check complete. Found {} missing files.", report.missing.len());
        if !report.missing.is_empty() {
            info!("Tip: run `check --prune` to clean the index.");
        }
    }
}

fn print_verify_report(report: &VerifyReport) {
    info!("Verified {} files", report.total());
    if report.is_healthy() {
        info!("{}", Colors::colorize(Colors::OK, "Result: PASSED. All files are healthy."));
        return;
    }
    info!("{}", Colors::colorize(Colors::CORRUPT, "Result: FAILED. Issues detected."));
    if !report.corrupt.is_empty() {
        info!("[!] CORRUPTED FILES ({}):", report.corrupt.len());
        for c in &report.corrupt {
            info!(
                "  - {} (expected {}, got {})",
                c.path.display(),
                c.expected_prefix(),
                c.actual_prefix()
            );
        }
    }
    if !report.missing.is_empty() {
        info!("[!] MISSING FILES ({}):", report.missing.len());
        for p in &report.missing {
            info!("  - {}", p.display());
        }
    }
    if !report.errors.is_empty() {
        info!("[!] READ ERRORS ({}):", report.errors.len());
        for (p, msg) in &report.errors {
            info!("  - {}: {}", p.display(), msg);
        }
    }
}

fn print_diff(diff: &IndexDiff, local_root: &Path, remote_path: &Path) {
    info!("Local Path  : {}", local_root.display());
    info!("Target Path : {}", remote_path.display());
    info!("Total Local Files  : {}", diff.local_total);
    info!("Total Target Files : {}", diff.remote_total);
    info!(
        "{} {} files ({} shared)",
        Colors::colorize(Colors::INFO, "[=] OVERLAP    :"),
        diff.common.len(),
        format_size(diff.shared_bytes)
    );
    info!("[-] LOCAL ONLY : {} files", diff.local_only.len());
    info!("[+] TARGET ONLY: {} files", diff.remote_only.len());
    if !diff.remote_preview.is_empty() {
        info!("Content found in target but missing locally:");
        for (path, size) in &diff.remote_preview {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            info!(" - {:<30} ({})", name, format_size(*size));
        }
        let more = diff.remote_only.len().saturating_sub(diff.remote_preview.len());
        if more > 0 {
            info!("   ... and {} more.", more);
        }
    }
}

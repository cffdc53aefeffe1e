//! Common walk loop: consumes an iterator of walk outcomes and sends candidate files to path_tx.

use crossbeam_channel::Sender;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::engine::tools::{is_ignored_name, should_include_in_walk};

use super::context::PipelineContext;

/// One result from a directory walk.
pub enum WalkOutcome {
    /// Anything that is not a directory: regular files and symlinks (symlinks are not followed).
    File(PathBuf),
    Dir,
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a jwalk result into [`WalkOutcome`].
pub fn to_outcome_jwalk(r: Result<jwalk::DirEntry<((), ())>, jwalk::Error>) -> WalkOutcome {
    match r {
        Ok(entry) if entry.file_type().is_dir() => WalkOutcome::Dir,
        Ok(entry) => WalkOutcome::File(entry.path()),
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) if entry.file_type().is_dir() => WalkOutcome::Dir,
        Ok(entry) => WalkOutcome::File(entry.into_path()),
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

fn jwalk_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    use jwalk::Parallelism;
    use std::time::Duration;
    let ignored = ctx.ignored.clone();
    Box::new(
        jwalk::WalkDir::new(&ctx.root)
            .follow_links(false)
            .skip_hidden(false)
            .parallelism(Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_secs(60),
            })
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|child| match child {
                    Ok(e) => {
                        !(e.file_type().is_dir()
                            && e.file_name()
                                .to_str()
                                .is_some_and(|n| is_ignored_name(n, &ignored)))
                    }
                    Err(_) => true,
                });
            })
            .into_iter()
            .map(to_outcome_jwalk),
    )
}

fn walkdir_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    use walkdir::WalkDir;
    let ignored = ctx.ignored.clone();
    Box::new(
        WalkDir::new(&ctx.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |e| {
                !(e.depth() > 0
                    && e.file_type().is_dir()
                    && e.file_name()
                        .to_str()
                        .is_some_and(|n| is_ignored_name(n, &ignored)))
            })
            .map(to_outcome_walkdir),
    )
}

pub fn spawn_walk_thread(
    path_tx: Sender<PathBuf>,
    path_count_tx: Sender<usize>,
    ctx: PipelineContext,
    parallel_walk: bool,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let iter: Box<dyn Iterator<Item = WalkOutcome>> = match parallel_walk {
            true => jwalk_iter(&ctx),
            false => walkdir_iter(&ctx),
        };
        run_walk_loop(path_tx, path_count_tx, ctx, iter)
    })
}

/// Consume `iter`, send included file paths to `path_tx`, record walk errors in `skipped_paths`.
/// Sends the candidate count on `path_count_tx` and drops `path_tx` when done.
pub fn run_walk_loop<I>(
    path_tx: Sender<PathBuf>,
    path_count_tx: Sender<usize>,
    ctx: PipelineContext,
    iter: I,
) -> usize
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        match outcome {
            WalkOutcome::File(path) => {
                if should_include_in_walk(&path, &ctx.root, &ctx.ignored) {
                    if path_tx.send(path).is_err() {
                        break;
                    }
                    count += 1;
                }
            }
            WalkOutcome::Dir => {}
            WalkOutcome::Err { msg, path } => {
                let path = path.unwrap_or_else(|| PathBuf::from("<no-path>"));
                ctx.skipped_paths
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push((path, msg));
            }
        }
    }
    let _ = path_count_tx.send(count);
    drop(path_tx);
    count
}

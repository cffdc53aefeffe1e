//! Open-file limit detection for capping the hashing pool (Unix).

use log::debug;

/// Descriptors a hashing worker may hold at once (the file being read plus a stat).
pub const FDS_PER_WORKER: usize = 2;

/// Fraction of the soft limit the pool may use; the rest is left for the walk and the store.
const FD_LIMIT_FRACTION: f64 = 0.5;

/// Soft limit on open file descriptors, or `None` when unlimited or unavailable.
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur as u64)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Largest worker count that keeps the pool within its share of the FD limit.
pub fn max_workers_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    Some((usable / FDS_PER_WORKER).max(1))
}

/// Apply the FD cap to a requested worker count.
pub fn cap_workers(requested: usize) -> usize {
    match max_workers_by_fd_limit() {
        Some(cap) if cap < requested => {
            debug!("Capping workers {} -> {} (FD limit)", requested, cap);
            cap
        }
        _ => requested,
    }
}

pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod repo_toml;
pub mod tempfiles;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, cap_workers, max_open_fds, max_workers_by_fd_limit};
pub use logger::{Colors, setup_logging};
pub use repo_toml::{CONFIG_TEMPLATE, RepoToml, apply_file_to_opts, load_repo_toml};
pub use tempfiles::{rename_temp_to_final, temp_path_for, write_atomic};

//! Engine module: hashing, persistence, reconciliation and CLI plumbing

pub mod arg_parser;
pub mod cli;
pub mod filters;
pub mod hashing;
pub mod parallel;
pub mod probe;
pub mod progress;
pub mod reconcile;
pub mod store;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, FilterArgs};
pub use cli::handle_run;
pub use filters::should_index;
pub use hashing::{digest_equals, hash_bytes, hash_file, hash_file_chunked, hash_reader};
pub use parallel::worker_count;
pub use probe::{MetadataProbe, MimeProbe, UNKNOWN_CONTENT_TYPE};
pub use reconcile::{Reconciler, Reconciliation, Signature};
pub use store::{load_index, save_index};
pub use tools::{format_size, glob_match, has_ignored_component, mtime_changed, should_include_in_walk};

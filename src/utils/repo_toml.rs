//! Load `.boxfile/config.toml` (CLI only). The library never reads it; callers pass [`Opts`].

use serde::Deserialize;
use std::path::Path;

use crate::utils::config::PackagePaths;
use crate::{IndexFilters, Opts};

/// Template written by `init`. Every key is optional.
pub const CONFIG_TEMPLATE: &str = r#"# boxfile repository settings. Command-line flags override these.
[settings]
# verbose = false
# workers = 8
# parallel_walk = false
# ignore = ["target", "build"]
# extensions = [".jpg", ".png"]
# min_size = 0
"#;

#[derive(Debug, Default, Deserialize)]
pub struct RepoToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    verbose: Option<bool>,
    workers: Option<usize>,
    parallel_walk: Option<bool>,
    ignore: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    min_size: Option<u64>,
}

/// Load the config document for the repository at `root`. None if missing or unreadable.
pub fn load_repo_toml(root: &Path) -> Option<RepoToml> {
    let path = PackagePaths::get().config_path(root);
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($settings:expr, $opts:expr, $field:ident => $opts_field:ident) => {
        if let Some(v) = $settings.$field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &RepoToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, verbose => verbose);
    apply_file_opt!(s, opts, parallel_walk => parallel_walk);
    apply_file_opt!(s, opts, ignore => ignore);
    if let Some(n) = s.workers {
        opts.num_threads = Some(n);
    }
    if s.extensions.is_some() || s.min_size.is_some() {
        opts.filters = IndexFilters::new(
            s.extensions.clone().or_else(|| opts.filters.extensions.clone()),
            s.min_size.unwrap_or(opts.filters.min_size_bytes),
            opts.filters.after_ns,
        );
    }
}

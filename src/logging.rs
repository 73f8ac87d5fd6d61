//! Log setup.
//!
//! The terminal belongs to the TUI, so log records go to a file. The filter
//! comes from `RUST_LOG` and defaults to `info`.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

/// A fresh log file name in the system temp directory.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("genovista-{:08x}.log", rand::random::<u32>()))
}

/// Installs the global logger, appending to `path` (or a temp file).
///
/// Returns the path actually used.
pub fn init(path: Option<&Path>) -> io::Result<PathBuf> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_log_path);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(io::Error::other)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path() {
        let path = default_log_path();
        assert!(path.starts_with(std::env::temp_dir()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("genovista-"));
        assert!(name.ends_with(".log"));
    }
}

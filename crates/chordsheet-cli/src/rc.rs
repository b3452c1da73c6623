use std::path::PathBuf;

use anyhow::Result;
use chordsheet::{Renderer, Typesetter};

/// Configuration files in reading order: environment variable naming the
/// file, then the default location.
const RC_SOURCES: [(&str, &str); 3] = [
    ("CHORDRCSYS", "/usr/local/etc/chordrc"),
    ("CHORDRC", "~/.chordrc"),
    ("CHORDRCLOCAL", "./.chordrc"),
];

fn expand_path(path: &str) -> Option<PathBuf> {
    match shellexpand::full(path) {
        Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
        Err(err) => {
            log::debug!("cannot expand {path}: {err}");
            None
        }
    }
}

/// Paths of the configuration files to try, in order.
pub fn rc_paths() -> Vec<PathBuf> {
    RC_SOURCES
        .iter()
        .filter_map(|(var, default)| match std::env::var(var) {
            Ok(path) => expand_path(&path),
            Err(_) => expand_path(default),
        })
        .collect()
}

/// Feed every readable configuration file to the typesetter. Files that are
/// missing or unreadable are skipped.
pub fn read_all<R: Renderer>(ts: &mut Typesetter<R>) -> Result<()> {
    for path in rc_paths() {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::debug!("skipping {}: {err}", path.display());
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        ts.process_config(&path.to_string_lossy(), &text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_pass_through() {
        assert_eq!(expand_path("./.chordrc"), Some(PathBuf::from("./.chordrc")));
    }

    #[test]
    fn undefined_variables_skip_the_file() {
        assert_eq!(expand_path("$CHORDSHEET_TEST_SURELY_UNSET/chordrc"), None);
    }
}

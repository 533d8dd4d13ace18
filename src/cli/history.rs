//! # History File Management
//!
//! Interactive sessions persist line history to `~/.rookdb_history`. The
//! `ROOKDB_HISTORY` environment variable overrides the location; setting it
//! to an empty string disables persistence. rustyline handles the file I/O
//! itself.

use std::env;
use std::path::PathBuf;

const DEFAULT_HISTORY_FILE: &str = ".rookdb_history";
const HISTORY_ENV_VAR: &str = "ROOKDB_HISTORY";

pub fn history_path() -> Option<PathBuf> {
    if let Ok(custom_path) = env::var(HISTORY_ENV_VAR) {
        if custom_path.is_empty() {
            return None;
        }
        return Some(PathBuf::from(custom_path));
    }

    env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(DEFAULT_HISTORY_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the env-var mutations cannot race each other.
    #[test]
    fn env_var_overrides_and_disables_history() {
        env::set_var(HISTORY_ENV_VAR, "/custom/path");
        assert_eq!(history_path(), Some(PathBuf::from("/custom/path")));

        env::set_var(HISTORY_ENV_VAR, "");
        assert_eq!(history_path(), None);

        env::remove_var(HISTORY_ENV_VAR);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

const CONFIG_FILE: &str = "config.json";

/// Application data directory (`$XDG_DATA_HOME/<name>` on desktop).
///
/// Not created here; `AppConfig::save` creates it on first write.
pub fn data_dir(name: &str) -> PathBuf {
    dirs_fallback().join(name)
}

/// Default location of the settings file.
pub fn config_path(name: &str) -> PathBuf {
    data_dir(name).join(CONFIG_FILE)
}

fn dirs_fallback() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg);
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lives_inside_the_data_dir() {
        let path = config_path("scanwerk");
        assert!(path.ends_with("scanwerk/config.json"));
        assert_eq!(path.parent(), Some(data_dir("scanwerk").as_path()));
    }
}

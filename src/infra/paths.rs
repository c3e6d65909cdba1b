// src/infra/paths.rs — Config file location
//
// TIERGATE_HOME overrides everything. Otherwise config lives in ~/.tiergate/.

use std::path::PathBuf;

fn tiergate_home() -> Option<PathBuf> {
    std::env::var_os("TIERGATE_HOME").map(PathBuf::from)
}

/// Configuration directory: $TIERGATE_HOME/ or ~/.tiergate/
pub fn config_dir() -> PathBuf {
    if let Some(home) = tiergate_home() {
        return home;
    }
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(".tiergate"),
        None => PathBuf::from(".tiergate"),
    }
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_name() {
        assert!(config_file_path().ends_with("config.toml"));
    }
}

use dirs::home_dir;
use std::{env, path::PathBuf};

const HOME_ENV: &str = "LEDGER_CORE_HOME";
const DEFAULT_DIR_NAME: &str = ".ledger_core";
const LEDGER_DIR: &str = "ledgers";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.ledger_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding the per-account record files.
pub fn ledgers_dir() -> PathBuf {
    ledgers_dir_in(app_data_dir())
}

pub fn ledgers_dir_in(base: impl Into<PathBuf>) -> PathBuf {
    base.into().join(LEDGER_DIR)
}

pub fn config_file_in(base: impl Into<PathBuf>) -> PathBuf {
    base.into().join(CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn layout_under_base_dir() {
        let base = Path::new("/data/ledger");
        assert_eq!(ledgers_dir_in(base), Path::new("/data/ledger/ledgers"));
        assert_eq!(
            config_file_in(base),
            Path::new("/data/ledger/config/config.json")
        );
    }
}

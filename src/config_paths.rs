//! Where the settings file lives on disk.

use std::path::PathBuf;

const APP_NAME: &str = "calculate";
const SETTINGS_FILE: &str = "config.toml";

/// Directory holding the settings file, `None` when the platform gives no
/// home to put it in.
///
/// An absolute `$XDG_CONFIG_HOME` takes precedence on every platform.
pub fn config_dir() -> Option<PathBuf> {
    let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    resolve(xdg, platform_config_home())
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

/// Relative XDG values are invalid and ignored.
fn resolve(xdg_config_home: Option<PathBuf>, fallback: Option<PathBuf>) -> Option<PathBuf> {
    xdg_config_home
        .filter(|dir| dir.is_absolute())
        .or(fallback)
        .map(|base| base.join(APP_NAME))
}

#[cfg(windows)]
fn platform_config_home() -> Option<PathBuf> {
    // roaming %APPDATA%
    dirs::config_dir()
}

#[cfg(not(windows))]
fn platform_config_home() -> Option<PathBuf> {
    // ~/.config on macOS too, not ~/Library
    dirs::home_dir().map(|home| home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_xdg_home_wins() {
        let dir = resolve(Some(PathBuf::from("/xdg")), Some(PathBuf::from("/home/u/.config")));
        assert_eq!(dir, Some(PathBuf::from("/xdg/calculate")));
    }

    #[test]
    fn test_relative_xdg_home_is_ignored() {
        let dir = resolve(Some(PathBuf::from("xdg")), Some(PathBuf::from("/home/u/.config")));
        assert_eq!(dir, Some(PathBuf::from("/home/u/.config/calculate")));
        assert_eq!(resolve(None, None), None);
    }

    #[test]
    fn test_settings_file_name() {
        if let Some(file) = config_file() {
            assert!(file.ends_with("calculate/config.toml"));
        }
    }
}

//! Application directories for Portal.
//!
//! Everything lives under a single home directory:
//! - Linux/macOS: `~/.portal`
//! - Windows: `%APPDATA%\portal`
//!
//! Can be overridden with the `PORTAL_HOME` environment variable.

use std::path::{Path, PathBuf};

/// Application name for directory paths
pub const APP_NAME: &str = "portal";

/// Home directory name on Linux/macOS
pub const HOME_DIR_NAME: &str = ".portal";

/// Environment variable overriding the home directory
pub const HOME_ENV_VAR: &str = "PORTAL_HOME";

/// Application directories structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Root directory holding config and credentials
    pub home: PathBuf,
}

impl AppDirs {
    /// Resolve the application directories from the process environment.
    pub fn new() -> Option<Self> {
        let override_home = std::env::var(HOME_ENV_VAR).ok();
        Self::resolve(override_home.as_deref(), dirs::home_dir())
    }

    /// Build directories rooted at an explicit path.
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve directories from an optional override and the user's home dir.
    ///
    /// Relative overrides are resolved against the current directory so the
    /// config never lands somewhere unexpected.
    pub fn resolve(override_home: Option<&str>, user_home: Option<PathBuf>) -> Option<Self> {
        if let Some(raw) = override_home.filter(|s| !s.trim().is_empty()) {
            let home = PathBuf::from(raw);
            let home = if home.is_relative() {
                match std::env::current_dir() {
                    Ok(cwd) => cwd.join(home),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            value = raw,
                            "PORTAL_HOME is relative but the current directory is unavailable"
                        );
                        return user_home.map(default_home);
                    }
                }
            } else {
                home
            };
            return Some(Self { home });
        }

        user_home.map(default_home)
    }

    /// Path of the optional config file (`config.toml`)
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Path of the file-based token fallback (`auth.json`)
    pub fn auth_file(&self) -> PathBuf {
        self.home.join("auth.json")
    }

    /// Ensure the home directory exists, owner-only on Unix.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        ensure_private_dir(&self.home)
    }
}

fn default_home(user_home: PathBuf) -> AppDirs {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or(user_home);
        AppDirs {
            home: base.join(APP_NAME),
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        AppDirs {
            home: user_home.join(HOME_DIR_NAME),
        }
    }
}

fn ensure_private_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dirs = AppDirs::resolve(Some("/tmp/portal-test"), Some(PathBuf::from("/home/u")))
            .expect("dirs");
        assert_eq!(dirs.home, PathBuf::from("/tmp/portal-test"));
        assert_eq!(dirs.config_file(), PathBuf::from("/tmp/portal-test/config.toml"));
        assert_eq!(dirs.auth_file(), PathBuf::from("/tmp/portal-test/auth.json"));
    }

    #[test]
    fn test_blank_override_ignored() {
        let dirs = AppDirs::resolve(Some("  "), Some(PathBuf::from("/home/u"))).expect("dirs");
        #[cfg(not(target_os = "windows"))]
        assert_eq!(dirs.home, PathBuf::from("/home/u/.portal"));
        #[cfg(target_os = "windows")]
        assert!(dirs.home.ends_with(APP_NAME));
    }

    #[test]
    fn test_relative_override_is_absolutized() {
        let dirs = AppDirs::resolve(Some("rel-home"), None).expect("dirs");
        assert!(dirs.home.is_absolute());
        assert!(dirs.home.ends_with("rel-home"));
    }

    #[test]
    fn test_no_home_at_all() {
        assert!(AppDirs::resolve(None, None).is_none());
    }

    #[test]
    fn test_ensure_dirs_creates_home() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dirs = AppDirs::at(tmp.path().join("nested").join("home"));
        dirs.ensure_dirs().expect("ensure");
        assert!(dirs.home.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dirs.home).expect("meta").permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }
}

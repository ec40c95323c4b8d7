// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

static HOME_DIR: OnceLock<PathBuf> = OnceLock::new();

/// A custom data directory override, set only by `set_custom_data_dir`.
/// The directory will be created if it doesn't exist when set.
static CUSTOM_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// The resolved data directory, combining custom override or platform defaults.
/// On macOS, this is `~/Library/Application Support/Tilawa`.
/// On Linux/FreeBSD, this is `$XDG_DATA_HOME/tilawa`.
static CURRENT_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// The resolved config directory.
/// On Linux/FreeBSD, this is `$XDG_CONFIG_HOME/tilawa`.
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// File name of the ayah-position index database.
pub const AYAH_INDEX_FILE_NAME: &str = "ayahinfo.db";

/// Returns the path to the user's home directory.
pub fn home_dir() -> &'static PathBuf {
    HOME_DIR.get_or_init(|| dirs::home_dir().unwrap_or_else(std::env::temp_dir))
}

/// Returns the path to the configuration directory used by Tilawa.
pub fn config_dir() -> &'static PathBuf {
    CONFIG_DIR.get_or_init(|| {
        if let Some(custom_dir) = CUSTOM_DATA_DIR.get() {
            custom_dir.join("config")
        } else if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| home_dir().join("AppData").join("Roaming"))
                .join("Tilawa")
        } else if cfg!(any(target_os = "linux", target_os = "freebsd")) {
            if let Ok(flatpak_xdg_config) = std::env::var("FLATPAK_XDG_CONFIG_HOME") {
                flatpak_xdg_config.into()
            } else {
                dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"))
            }
            .join("tilawa")
        } else {
            home_dir().join(".config").join("tilawa")
        }
    })
}

/// Returns the path to the data directory used by Tilawa.
pub fn data_dir() -> &'static PathBuf {
    CURRENT_DATA_DIR.get_or_init(|| {
        if let Some(custom_dir) = CUSTOM_DATA_DIR.get() {
            custom_dir.clone()
        } else if cfg!(any(target_os = "linux", target_os = "freebsd")) {
            if let Ok(flatpak_xdg_data) = std::env::var("FLATPAK_XDG_DATA_HOME") {
                flatpak_xdg_data.into()
            } else {
                dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local").join("share"))
            }
            .join("tilawa")
        } else {
            dirs::data_local_dir()
                .unwrap_or_else(|| home_dir().join(".tilawa"))
                .join("Tilawa")
        }
    })
}

/// Sets a custom directory for all user data, overriding the default data
/// directory. Must be called before any other path operation that depends on
/// the data directory. Relative paths are canonicalized when possible and the
/// directory is created if missing.
///
/// # Panics
///
/// Panics if called after the data directory has been initialized (e.g., via
/// `data_dir` or `config_dir`), or if the directory cannot be created.
pub fn set_custom_data_dir<P: ?Sized + AsRef<Path>>(dir: &P) -> &'static PathBuf {
    if CURRENT_DATA_DIR.get().is_some() || CONFIG_DIR.get().is_some() {
        panic!("set_custom_data_dir called after data_dir or config_dir was initialized");
    }
    CUSTOM_DATA_DIR.get_or_init(|| {
        let mut path = dir.as_ref().to_path_buf();
        if path.is_relative() {
            if let Ok(abs) = path.canonicalize() {
                path = abs;
            }
        }

        std::fs::create_dir_all(&path).unwrap_or_else(|e| {
            panic!(
                "failed to create custom data directory {}: {e}",
                path.display()
            )
        });

        path
    })
}

/// Returns the path to the logs directory.
pub fn logs_dir() -> &'static PathBuf {
    static LOGS_DIR: OnceLock<PathBuf> = OnceLock::new();
    LOGS_DIR.get_or_init(|| {
        if cfg!(target_os = "macos") {
            home_dir().join("Library/Logs/Tilawa")
        } else {
            data_dir().join("logs")
        }
    })
}

/// Returns the path to the database directory.
///
/// Holds both the settings database and downloaded reference databases such
/// as the ayah-position index.
pub fn database_dir() -> &'static PathBuf {
    static DATABASE_DIR: OnceLock<PathBuf> = OnceLock::new();
    DATABASE_DIR.get_or_init(|| data_dir().join("databases"))
}

/// Returns the root of the recitation audio cache. Each reciter gets its own
/// subdirectory below it.
pub fn audio_dir() -> &'static PathBuf {
    static AUDIO_DIR: OnceLock<PathBuf> = OnceLock::new();
    AUDIO_DIR.get_or_init(|| data_dir().join("audio"))
}

/// Returns the path to the ayah-position index database.
pub fn ayah_index_file() -> &'static PathBuf {
    static AYAH_INDEX_FILE: OnceLock<PathBuf> = OnceLock::new();
    AYAH_INDEX_FILE.get_or_init(|| database_dir().join(AYAH_INDEX_FILE_NAME))
}

/// Returns the path to the `settings.db` key-value database.
pub fn settings_db_file() -> &'static PathBuf {
    static SETTINGS_DB_FILE: OnceLock<PathBuf> = OnceLock::new();
    SETTINGS_DB_FILE.get_or_init(|| database_dir().join("settings.db"))
}

/// Returns the path to an optional user supplied reciter catalog.
pub fn reciters_file() -> &'static PathBuf {
    static RECITERS_FILE: OnceLock<PathBuf> = OnceLock::new();
    RECITERS_FILE.get_or_init(|| config_dir().join("reciters.json"))
}

/// Returns true when `path` exists and is a regular file.
pub fn file_exists(path: impl AsRef<Path>) -> bool { path.as_ref().is_file() }

/// Creates `dir` and all of its parents. Succeeds when it already exists.
pub fn make_directory(dir: impl AsRef<Path>) -> io::Result<()> { std::fs::create_dir_all(dir) }

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn make_directory_is_idempotent() {
        let tempdir = TempDir::new().unwrap();
        let dir = tempdir.path().join("audio").join("minshawi");

        make_directory(&dir).unwrap();
        make_directory(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn file_exists_ignores_directories() {
        let tempdir = TempDir::new().unwrap();
        assert!(!file_exists(tempdir.path()));

        let file = tempdir.path().join(AYAH_INDEX_FILE_NAME);
        std::fs::write(&file, b"x").unwrap();
        assert!(file_exists(&file));
    }
}

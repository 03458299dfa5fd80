// ============================================================================
// SETTINGS: persisted engine defaults (TOML)
// ============================================================================

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::ColorData;
use crate::{log_info, log_warn};

const SETTINGS_FILE: &str = "pixelsmith_settings.toml";

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings I/O error: {}", e),
            SettingsError::Parse(e) => write!(f, "invalid settings file: {}", e),
            SettingsError::Serialize(e) => write!(f, "could not serialize settings: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<toml::de::Error> for SettingsError {
    fn from(e: toml::de::Error) -> Self {
        SettingsError::Parse(e)
    }
}

impl From<toml::ser::Error> for SettingsError {
    fn from(e: toml::ser::Error) -> Self {
        SettingsError::Serialize(e)
    }
}

/// Missing keys take their default, so older files keep loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Undo entries kept per document, base state included.
    pub history_limit: usize,
    /// Snapshot memory cap per document in MiB; 0 means no cap.
    pub history_memory_mb: usize,
    /// RGBA background for new canvases and for compositing loaded images.
    pub background: [f32; 4],
    /// Directory searched for ASCII raster stamps.
    pub stamp_dir: PathBuf,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: 50,
            history_memory_mb: 512,
            background: [1.0, 1.0, 0.95, 1.0],
            stamp_dir: PathBuf::from("stamps"),
            default_width: 800,
            default_height: 800,
        }
    }
}

impl Settings {
    pub fn background_color(&self) -> ColorData {
        ColorData::from_array(self.background)
    }

    /// `None` when the cap is disabled.
    pub fn history_memory_bytes(&self) -> Option<usize> {
        match self.history_memory_mb {
            0 => None,
            mb => Some(mb.saturating_mul(1024 * 1024)),
        }
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        log_info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    /// Read the per-user settings file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log_warn!("ignoring settings at {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// On Linux:   ~/.config/pixelsmith/pixelsmith_settings.toml  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\Pixelsmith\pixelsmith_settings.toml
    /// On macOS:   ~/Library/Application Support/Pixelsmith/pixelsmith_settings.toml
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("pixelsmith");
            return Some(config_dir.join(SETTINGS_FILE));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            return Some(PathBuf::from(appdata).join("Pixelsmith").join(SETTINGS_FILE));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("Pixelsmith")
                    .join(SETTINGS_FILE),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join(SETTINGS_FILE)))
        }
    }
}

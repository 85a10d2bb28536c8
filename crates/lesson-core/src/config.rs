use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::color::{ColorError, Palette, RgbColor};

pub const QUALIFIER: &str = "com";
pub const ORGANIZATION: &str = "studymark";
pub const APPLICATION: &str = "studymark";

pub const DEFAULT_INDICATOR: &str = "✎";

pub fn config_root() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).map(|p| p.config_dir().to_path_buf())
}

pub fn data_root() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).map(|p| p.data_dir().to_path_buf())
}

pub fn settings_path() -> Option<PathBuf> {
    config_root().map(|dir| dir.join("config.toml"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("palette entry `{name}`: {source}")]
    Color {
        name: String,
        #[source]
        source: ColorError,
    },
}

// On-disk shape; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    palette: BTreeMap<String, String>,
    active_color: Option<String>,
    indicator: Option<String>,
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub palette: Palette,
    pub active_color: RgbColor,
    /// Glyph drawn after annotated text.
    pub indicator: String,
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let palette = Palette::default();
        let active_color = palette
            .nth(0)
            .map(|(_, c)| c)
            .unwrap_or(RgbColor::new(0xff, 0xf1, 0x76));
        Self {
            palette,
            active_color,
            indicator: DEFAULT_INDICATOR.to_string(),
            data_dir: None,
        }
    }
}

impl Settings {
    /// User palette entries extend (or override) the presets.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = toml::from_str(text)?;
        let mut settings = Settings::default();
        for (name, value) in &raw.palette {
            let color = RgbColor::parse(value).map_err(|source| ConfigError::Color {
                name: name.clone(),
                source,
            })?;
            settings.palette.insert(name, color);
        }
        if let Some(active) = raw.active_color.as_deref() {
            settings.active_color =
                settings
                    .palette
                    .resolve(active)
                    .map_err(|source| ConfigError::Color {
                        name: "active_color".into(),
                        source,
                    })?;
        }
        if let Some(glyph) = raw.indicator.filter(|g| !g.trim().is_empty()) {
            settings.indicator = glyph;
        }
        settings.data_dir = raw.data_dir;
        Ok(settings)
    }

    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn load_default() -> Result<Self, ConfigError> {
        match settings_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Where mark collections live: the override, else the platform data dir.
    pub fn marks_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(data_root)
            .map(|dir| dir.join("marks"))
    }
}

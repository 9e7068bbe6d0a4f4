use crate::error::GardenError;
use crate::plant::{PlantKind, Rgb};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub garden: GardenSettings,
    #[serde(default)]
    pub log: LogSettings,
    /// Scroll-triggered page sections; defaults apply when empty
    #[serde(default)]
    pub sections: Vec<SectionSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GardenSettings {
    pub history_cap: Option<usize>,
    pub history_retain: Option<usize>,
    pub startup_plants: Option<usize>,
    pub low_power: Option<bool>,
    pub pixel_scale: Option<u32>,  // Surface pixels per terminal column
    pub paper: Option<[u8; 3]>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogSettings {
    pub level: Option<String>,
    pub file: Option<PathBuf>,  // Interactive mode only logs when this is set
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionSettings {
    pub id: String,
    pub kind: PlantKind,
    pub x: f32,
}

impl GardenSettings {
    pub fn paper(&self) -> Rgb {
        self.paper.map(Rgb::from).unwrap_or(Rgb::new(250, 246, 242))
    }
}

impl Settings {
    /// Load the user config file. A missing file is not an error.
    pub fn load() -> Result<Self, GardenError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, GardenError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, GardenError> {
        Ok(toml::from_str(content)?)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("watergarden")
            .join("config.toml")
    }
}

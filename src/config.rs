use crate::plant::{PlantKind, Rgb};
use crate::settings::Settings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// Fixed seed for reproducible output, entropy otherwise
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Configuration for the `grow` command
#[derive(Clone)]
pub struct GrowConfig {
    pub kind: Option<PlantKind>,
    pub origin: Option<(f32, f32)>,
    pub width: u32,
    pub height: u32,
    pub extra: usize,
    pub out: PathBuf,
    pub json: bool,
    pub paper: Option<Rgb>,
    pub seed: Option<u64>,
    pub low_power: bool,
}

/// Configuration for the `garden` command
#[derive(Clone)]
pub struct GardenConfig {
    pub out: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub time_step: f32,
    pub seed: Option<u64>,
    pub pixel_scale: u32,
    pub paper: Rgb,
    pub session: SessionConfig,
}

/// A page section that grows a plant the first time it scrolls into view
#[derive(Clone, Debug, PartialEq)]
pub struct SectionSpec {
    pub id: String,
    pub kind: PlantKind,
    /// Horizontal position as a fraction of the canvas width
    pub x: f32,
}

impl SectionSpec {
    pub fn new(id: &str, kind: PlantKind, x: f32) -> Self {
        Self {
            id: id.to_string(),
            kind,
            x,
        }
    }

    pub fn defaults() -> Vec<SectionSpec> {
        vec![
            SectionSpec::new("publications", PlantKind::Flower, 0.15),
            SectionSpec::new("experience", PlantKind::Tree, 0.85),
            SectionSpec::new("education", PlantKind::Fern, 0.20),
            SectionSpec::new("research-interest", PlantKind::Vine, 0.80),
            SectionSpec::new("skills", PlantKind::Flower, 0.25),
        ]
    }
}

/// Tunables for a garden session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Evict once the pointer-planted history grows past this
    pub history_cap: usize,
    /// How many recent plants survive an eviction
    pub history_retain: usize,
    pub startup_plants: usize,
    pub low_power: bool,
    pub sections: Vec<SectionSpec>,
}

impl SessionConfig {
    pub fn new(low_power: bool) -> Self {
        let (history_cap, history_retain) = if low_power { (25, 18) } else { (40, 30) };
        Self {
            history_cap,
            history_retain,
            startup_plants: 7,
            low_power,
            sections: SectionSpec::defaults(),
        }
    }

    /// Defaults overridden by whatever the settings file provides
    pub fn from_settings(settings: &Settings, low_power_flag: bool) -> Self {
        let g = &settings.garden;
        let low_power = low_power_flag || g.low_power.unwrap_or(false);
        let mut config = Self::new(low_power);

        if let Some(cap) = g.history_cap {
            config.history_cap = cap.max(1);
        }
        if let Some(retain) = g.history_retain {
            config.history_retain = retain;
        }
        config.history_retain = config.history_retain.min(config.history_cap);
        if let Some(n) = g.startup_plants {
            config.startup_plants = n;
        }
        if !settings.sections.is_empty() {
            config.sections = settings
                .sections
                .iter()
                .map(|s| SectionSpec::new(&s.id, s.kind, s.x.clamp(0.0, 1.0)))
                .collect();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        use rand::Rng;
        let a: u64 = seeded_rng(Some(9)).gen();
        let b: u64 = seeded_rng(Some(9)).gen();
        assert_eq!(a, b);
    }

    #[test]
    fn low_power_tightens_history() {
        let normal = SessionConfig::new(false);
        let low = SessionConfig::new(true);
        assert_eq!((normal.history_cap, normal.history_retain), (40, 30));
        assert_eq!((low.history_cap, low.history_retain), (25, 18));
        assert_eq!(normal.sections.len(), 5);
    }

    #[test]
    fn settings_override_defaults() {
        let settings = Settings::parse(
            "[garden]\nhistory_cap = 5\nhistory_retain = 9\nlow_power = true\n\n[[sections]]\nid = \"a\"\nkind = \"vine\"\nx = 1.5\n",
        )
        .unwrap();
        let c = SessionConfig::from_settings(&settings, false);
        assert!(c.low_power);
        assert_eq!(c.history_cap, 5);
        // retain can never exceed the cap
        assert_eq!(c.history_retain, 5);
        assert_eq!(c.sections, vec![SectionSpec::new("a", PlantKind::Vine, 1.0)]);
    }
}

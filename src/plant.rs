//! Plant catalog
//!
//! Each plant kind is a fixed grammar, branch angle, and a five-color
//! watercolor palette. The tables are static; nothing here is mutable.

use clap::ValueEnum;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// An opaque RGB pigment color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Shift each channel independently by up to `amount` in either direction
    pub fn jitter<R: Rng + ?Sized>(self, amount: i32, rng: &mut R) -> Self {
        let mut j = |v: u8| -> u8 {
            let delta = ((rng.gen::<f32>() - 0.5) * amount as f32 * 2.0).floor() as i32;
            (v as i32 + delta).clamp(0, 255) as u8
        };
        Self {
            r: j(self.r),
            g: j(self.g),
            b: j(self.b),
        }
    }

    /// Normalized channels in 0.0..=1.0
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb::new(c[0], c[1], c[2])
    }
}

/// Immutable description of a plant: grammar, geometry, and pigments
#[derive(Debug)]
pub struct PlantType {
    pub axiom: &'static str,
    pub rules: &'static [(char, &'static str)],
    /// Branch angle in degrees
    pub angle: f32,
    pub iterations: u32,
    pub palette: [Rgb; 5],
}

impl PlantType {
    /// Iteration count, trimmed by one generation on low-power devices
    pub fn iterations(&self, low_power: bool) -> u32 {
        if low_power {
            self.iterations.saturating_sub(1).max(2)
        } else {
            self.iterations
        }
    }

    /// Pick a palette color, optionally jittered with probability `jitter_chance`
    pub fn sample_color<R: Rng + ?Sized>(&self, rng: &mut R, jitter_chance: f64, amount: i32) -> Rgb {
        let base = self.palette[rng.gen_range(0..self.palette.len())];
        if rng.gen_bool(jitter_chance) {
            base.jitter(amount, rng)
        } else {
            base
        }
    }
}

static FLOWER: PlantType = PlantType {
    axiom: "F",
    rules: &[('F', "FF[+F][-F]")],
    angle: 35.0,
    iterations: 3,
    palette: [
        Rgb::new(216, 112, 147), // pale violet red
        Rgb::new(255, 105, 180), // hot pink
        Rgb::new(218, 112, 214), // orchid
        Rgb::new(238, 130, 238), // violet
        Rgb::new(199, 21, 133),  // medium violet red
    ],
};

static FERN: PlantType = PlantType {
    axiom: "F",
    rules: &[('F', "F[+F]F[-F]")],
    angle: 28.0,
    iterations: 3,
    palette: [
        Rgb::new(46, 139, 87),
        Rgb::new(34, 139, 34),
        Rgb::new(107, 142, 35),
        Rgb::new(60, 179, 113),
        Rgb::new(85, 107, 47),
    ],
};

static VINE: PlantType = PlantType {
    axiom: "F",
    rules: &[('F', "F[+F][-F]F")],
    angle: 32.0,
    iterations: 3,
    palette: [
        Rgb::new(70, 130, 180),
        Rgb::new(100, 149, 237),
        Rgb::new(135, 206, 235),
        Rgb::new(123, 104, 238),
        Rgb::new(95, 158, 160),
    ],
};

static TREE: PlantType = PlantType {
    axiom: "F",
    rules: &[('F', "FF[++F][--F]")],
    angle: 30.0,
    iterations: 3,
    palette: [
        Rgb::new(160, 82, 45),
        Rgb::new(139, 69, 19),
        Rgb::new(210, 180, 140),
        Rgb::new(188, 143, 143),
        Rgb::new(205, 133, 63),
    ],
};

/// The closed set of plant kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PlantKind {
    Flower,
    Fern,
    Vine,
    Tree,
}

impl PlantKind {
    pub const ALL: [PlantKind; 4] = [
        PlantKind::Flower,
        PlantKind::Fern,
        PlantKind::Vine,
        PlantKind::Tree,
    ];

    pub fn plant_type(self) -> &'static PlantType {
        match self {
            PlantKind::Flower => &FLOWER,
            PlantKind::Fern => &FERN,
            PlantKind::Vine => &VINE,
            PlantKind::Tree => &TREE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlantKind::Flower => "flower",
            PlantKind::Fern => "fern",
            PlantKind::Vine => "vine",
            PlantKind::Tree => "tree",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl std::fmt::Display for PlantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_power_drops_one_generation_but_not_below_two() {
        let flower = PlantKind::Flower.plant_type();
        assert_eq!(flower.iterations(false), 3);
        assert_eq!(flower.iterations(true), 2);

        let shallow = PlantType {
            axiom: "F",
            rules: &[],
            angle: 10.0,
            iterations: 2,
            palette: [Rgb::WHITE; 5],
        };
        assert_eq!(shallow.iterations(true), 2);
    }

    #[test]
    fn jitter_stays_within_amount_and_clamps() {
        let mut rng = StdRng::seed_from_u64(7);
        let base = Rgb::new(250, 5, 128);
        for _ in 0..500 {
            let c = base.jitter(16, &mut rng);
            assert!((c.r as i32 - 250).abs() <= 16);
            assert!((c.g as i32 - 5).abs() <= 16);
            assert!((c.b as i32 - 128).abs() <= 16);
        }
    }

    #[test]
    fn every_kind_has_a_well_formed_rule() {
        for kind in PlantKind::ALL {
            let pt = kind.plant_type();
            for (_, replacement) in pt.rules {
                let opens = replacement.matches('[').count();
                let closes = replacement.matches(']').count();
                assert_eq!(opens, closes, "{} rule is unbalanced", kind);
            }
        }
    }

    #[test]
    fn kind_names_round_trip_through_serde() {
        let json = serde_json::to_string(&PlantKind::Vine).unwrap();
        assert_eq!(json, "\"vine\"");
        let back: PlantKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PlantKind::Vine);
    }
}

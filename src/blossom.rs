//! Radial watercolor blossoms placed at branch tips

use crate::plant::{PlantType, Rgb};
use crate::stroke::layered_alpha;
use crate::surface::Surface;
use crate::turtle::{EndpointCandidate, Point, SizeClass};
use rand::prelude::*;
use std::f32::consts::TAU;

const BASE_RADIUS: f32 = 12.0;
const PETAL_LAYERS: usize = 3;
const CENTER_LAYERS: usize = 3;
const HIGHLIGHT_CHANCE: f64 = 0.5;

/// Warm tones for the flower center
pub const CENTER_PALETTE: [Rgb; 3] = [
    Rgb::new(255, 223, 100),
    Rgb::new(255, 200, 80),
    Rgb::new(255, 180, 120),
];

/// A filled shape in a blossom
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mark {
    Ellipse {
        center: Point,
        rx: f32,
        ry: f32,
        rotation: f32,
        color: Rgb,
        alpha: f32,
    },
    Disc {
        center: Point,
        radius: f32,
        color: Rgb,
        alpha: f32,
    },
}

fn size_multiplier<R: Rng + ?Sized>(size: SizeClass, rng: &mut R) -> f32 {
    match size {
        SizeClass::Large => rng.gen_range(1.4..1.75),
        SizeClass::Medium => rng.gen_range(1.0..1.25),
        SizeClass::Small => rng.gen_range(0.65..0.83),
    }
}

struct Petal {
    angle: f32,
    length: f32,
    width: f32,
}

/// Plan every shape of one blossom, back to front
pub fn blossom_marks<R: Rng + ?Sized>(site: &EndpointCandidate, plant: &PlantType, rng: &mut R) -> Vec<Mark> {
    let base = BASE_RADIUS * size_multiplier(site.size, rng);
    let petal_count = rng.gen_range(5..10);
    let center = Point::new(site.pos.x, site.pos.y + (rng.gen::<f32>() - 0.5) * 8.0);
    let angle_step = TAU / petal_count as f32;

    let petals: Vec<Petal> = (0..petal_count)
        .map(|i| Petal {
            angle: i as f32 * angle_step + (rng.gen::<f32>() - 0.5) * 0.4,
            length: base * rng.gen_range(0.7..1.4),
            width: base * rng.gen_range(0.25..0.6),
        })
        .collect();

    let mut marks = Vec::with_capacity(petal_count * PETAL_LAYERS + CENTER_LAYERS + 1);
    for petal in &petals {
        let (sin, cos) = petal.angle.sin_cos();
        for layer in 0..PETAL_LAYERS {
            let color = plant.sample_color(rng, 0.5, 14);
            let grow = layer as f32 * 2.0;
            // petal-local offset, then rotated into place
            let lx = petal.length * 0.65;
            let ly = (rng.gen::<f32>() - 0.5) * 3.0;
            marks.push(Mark::Ellipse {
                center: Point::new(center.x + lx * cos - ly * sin, center.y + lx * sin + ly * cos),
                rx: petal.length * 0.9 + grow,
                ry: petal.width + grow,
                rotation: petal.angle + (rng.gen::<f32>() - 0.5) * 0.2,
                color,
                alpha: layered_alpha(0.45 - layer as f32 * 0.1),
            });
        }
    }

    let core = base * rng.gen_range(0.22..0.36);
    let core_color = CENTER_PALETTE[rng.gen_range(0..CENTER_PALETTE.len())];
    for layer in 0..CENTER_LAYERS {
        marks.push(Mark::Disc {
            center,
            radius: core + layer as f32 * 1.5,
            color: core_color,
            alpha: layered_alpha(0.8 - layer as f32 * 0.2),
        });
    }

    if site.size == SizeClass::Large && rng.gen_bool(HIGHLIGHT_CHANCE) {
        marks.push(Mark::Disc {
            center: Point::new(center.x - core * 0.3, center.y - core * 0.3),
            radius: core * 0.4,
            color: Rgb::WHITE,
            // the highlight's wash (0.3) and brush (0.6) differ
            alpha: 0.6 * 0.3,
        });
    }

    marks
}

pub fn paint_blossom<R: Rng + ?Sized>(surface: &mut Surface, site: &EndpointCandidate, plant: &PlantType, rng: &mut R) {
    for mark in blossom_marks(site, plant, rng) {
        match mark {
            Mark::Ellipse { center, rx, ry, rotation, color, alpha } => {
                surface.fill_ellipse(center, rx, ry, rotation, color, alpha)
            }
            Mark::Disc { center, radius, color, alpha } => surface.fill_disc(center, radius, color, alpha),
        }
    }
}

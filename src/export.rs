//! The `grow` command: plan one or more plants and write them as a PNG or JSON

use crate::config::{seeded_rng, GrowConfig};
use crate::error::GardenError;
use crate::growth::{paint_plan, plan_growth, GrowthPlan};
use crate::plant::PlantKind;
use crate::surface::Surface;
use crate::turtle::Point;
use rand::prelude::*;
use std::io::{self, Write};
use tracing::info;

/// Plan every plant the config asks for. The first one goes at the requested
/// origin (bottom center by default); extras land at random spots along the
/// lower part of the canvas.
pub fn plan_all<R: Rng + ?Sized>(config: &GrowConfig, rng: &mut R) -> Vec<GrowthPlan> {
    let (w, h) = (config.width as f32, config.height as f32);
    let pick_kind = |rng: &mut R| config.kind.unwrap_or_else(|| PlantKind::random(rng));

    let origin = config
        .origin
        .map(|(x, y)| Point::new(x, y))
        .unwrap_or(Point::new(w / 2.0, h * 0.9));

    let mut plans = Vec::with_capacity(1 + config.extra);
    let kind = pick_kind(rng);
    plans.push(plan_growth(kind, origin, config.low_power, rng));

    for _ in 0..config.extra {
        let kind = pick_kind(rng);
        let origin = Point::new(rng.gen_range(0.0..w.max(1.0)), h * rng.gen_range(0.70..0.95));
        plans.push(plan_growth(kind, origin, config.low_power, rng));
    }
    plans
}

pub fn run(config: GrowConfig) -> Result<(), GardenError> {
    let mut rng = seeded_rng(config.seed);
    let plans = plan_all(&config, &mut rng);

    if config.json {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &plans)?;
        writeln!(out)?;
        return Ok(());
    }

    let mut surface = Surface::new(config.width, config.height);
    for plan in &plans {
        paint_plan(&mut surface, plan, &mut rng);
    }
    surface.to_image(config.paper).save(&config.out)?;

    info!(path = %config.out.display(), plants = plans.len(), "image written");
    Ok(())
}

//! One plant's growth, from grammar to pixels
//!
//! [`plan_growth`] does all the geometry up front. The plan can then be
//! painted in one go with [`paint_plan`], or revealed step by step through a
//! [`Growth`], which an external frame pump drives one segment per frame.

use crate::blossom::paint_blossom;
use crate::grammar::expand;
use crate::plant::PlantKind;
use crate::selector::{dedupe_by_distance, select_sites, MIN_SITE_DISTANCE};
use crate::stroke::paint_segment;
use crate::surface::Surface;
use crate::turtle::{walk, EndpointCandidate, Point, Segment, WalkParams};
use rand::prelude::*;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Pause between the last segment and the first blossom
pub const BLOOM_DELAY: Duration = Duration::from_millis(200);
/// Spacing between consecutive blossoms
pub const BLOOM_SPACING: Duration = Duration::from_millis(300);

/// Geometry for one plant, ready to paint
#[derive(Debug, Clone, Serialize)]
pub struct GrowthPlan {
    pub kind: PlantKind,
    pub origin: Point,
    pub program_len: usize,
    pub params: WalkParams,
    pub segments: Vec<Segment>,
    pub tip: EndpointCandidate,
    /// Raw candidates, in walk order
    pub candidates: Vec<EndpointCandidate>,
    /// Candidates left after proximity dedupe, topmost first
    pub kept: Vec<EndpointCandidate>,
    pub sites: Vec<EndpointCandidate>,
}

/// Expand, walk, and pick blossom sites for a plant rooted at `origin`
pub fn plan_growth<R: Rng + ?Sized>(kind: PlantKind, origin: Point, low_power: bool, rng: &mut R) -> GrowthPlan {
    let plant = kind.plant_type();
    let program = expand(plant.axiom, plant.rules, plant.iterations(low_power));
    let params = WalkParams::sample(rng);
    let walked = walk(&program, origin, plant.angle, &params, rng);

    let kept = dedupe_by_distance(walked.candidates.clone(), MIN_SITE_DISTANCE);
    let sites = select_sites(&kept, rng);

    info!(
        kind = %kind,
        base_x = origin.x.round(),
        base_y = origin.y.round(),
        tip_x = walked.topmost.pos.x.round(),
        tip_y = walked.topmost.pos.y.round(),
        candidates = walked.candidates.len(),
        kept = kept.len(),
        blossoms = sites.len(),
        "plant grown"
    );
    for (i, s) in sites.iter().enumerate() {
        debug!(
            n = i + 1,
            x = s.pos.x.round(),
            y = s.pos.y.round(),
            depth = s.depth,
            size = s.size.name(),
            "blossom site"
        );
    }

    GrowthPlan {
        kind,
        origin,
        program_len: program.len(),
        params,
        segments: walked.segments,
        tip: walked.topmost,
        candidates: walked.candidates,
        kept,
        sites,
    }
}

/// Paint a whole plan synchronously
pub fn paint_plan<R: Rng + ?Sized>(surface: &mut Surface, plan: &GrowthPlan, rng: &mut R) {
    let plant = plan.kind.plant_type();
    for segment in &plan.segments {
        paint_segment(surface, segment, plant, rng);
    }
    for site in &plan.sites {
        paint_blossom(surface, site, plant, rng);
    }
}

/// A blossom to paint once `delay` has elapsed
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledBlossom {
    pub kind: PlantKind,
    pub site: EndpointCandidate,
    pub delay: Duration,
}

/// One unit of animated work
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Paint this segment now
    Segment(PlantKind, Segment),
    /// All segments are down; schedule these blossoms
    Bloom(Vec<ScheduledBlossom>),
}

/// Incremental reveal of a plan: one segment per step, then the blossoms.
pub struct Growth {
    plan: GrowthPlan,
    next_segment: usize,
    bloomed: bool,
    stopped: bool,
}

impl Growth {
    pub fn new(plan: GrowthPlan) -> Self {
        Self {
            plan,
            next_segment: 0,
            bloomed: false,
            stopped: false,
        }
    }

    /// Stop revealing. Blossoms already handed out stay scheduled.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_finished(&self) -> bool {
        self.stopped || self.bloomed
    }

    #[cfg(test)]
    pub fn progress(&self) -> (usize, usize) {
        (self.next_segment, self.plan.segments.len())
    }
}

impl Iterator for Growth {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.stopped || self.bloomed {
            return None;
        }

        if let Some(segment) = self.plan.segments.get(self.next_segment) {
            self.next_segment += 1;
            return Some(Step::Segment(self.plan.kind, *segment));
        }

        self.bloomed = true;
        let kind = self.plan.kind;
        let blossoms = self
            .plan
            .sites
            .iter()
            .enumerate()
            .map(|(i, site)| ScheduledBlossom {
                kind,
                site: *site,
                delay: BLOOM_DELAY + BLOOM_SPACING * i as u32,
            })
            .collect();
        Some(Step::Bloom(blossoms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(seed: u64) -> GrowthPlan {
        let mut rng = StdRng::seed_from_u64(seed);
        plan_growth(PlantKind::Flower, Point::new(200.0, 300.0), false, &mut rng)
    }

    #[test]
    fn plan_is_consistent() {
        let p = plan(1);
        assert_eq!(p.segments.len(), 64);
        assert!(!p.sites.is_empty() && p.sites.len() <= 3);
        assert_eq!(p.sites[0], p.kept[0]);
        assert!(p.kept.len() <= p.candidates.len());
        assert!(p.tip.pos.y < p.origin.y);
        assert_eq!(p.segments[0].start, p.origin);
    }

    #[test]
    fn low_power_plans_are_smaller() {
        let mut rng = StdRng::seed_from_u64(2);
        let small = plan_growth(PlantKind::Fern, Point::new(0.0, 0.0), true, &mut rng);
        assert_eq!(small.segments.len(), 16);
    }

    #[test]
    fn animation_reveals_one_segment_per_step_then_blooms() {
        let p = plan(3);
        let total = p.segments.len();
        let sites = p.sites.clone();
        let steps: Vec<Step> = Growth::new(p).collect();

        assert_eq!(steps.len(), total + 1);
        assert!(steps[..total].iter().all(|s| matches!(s, Step::Segment(PlantKind::Flower, _))));
        match &steps[total] {
            Step::Bloom(blossoms) => {
                assert_eq!(blossoms.len(), sites.len());
                for (i, b) in blossoms.iter().enumerate() {
                    assert_eq!(b.site, sites[i]);
                    assert_eq!(b.delay, BLOOM_DELAY + BLOOM_SPACING * i as u32);
                }
            }
            other => panic!("expected bloom, got {:?}", other),
        }
    }

    #[test]
    fn stop_ends_the_reveal_before_blooming() {
        let mut g = Growth::new(plan(4));
        assert!(matches!(g.next(), Some(Step::Segment(..))));
        assert!(matches!(g.next(), Some(Step::Segment(..))));
        g.stop();
        assert!(g.is_finished());
        assert_eq!(g.next(), None);
        assert_eq!(g.progress().0, 2);
    }

    #[test]
    fn synchronous_paint_touches_the_surface() {
        let p = plan(5);
        let mut rng = StdRng::seed_from_u64(50);
        let mut surface = Surface::new(400, 400);
        paint_plan(&mut surface, &p, &mut rng);
        let tip = p.sites[0].pos;
        assert!(surface.pixel(tip.x as u32, tip.y as u32).unwrap()[3] > 0.0);
        assert!(!surface.is_blank());
    }

    #[test]
    fn plan_serializes_for_inspection() {
        let json = serde_json::to_value(plan(6)).unwrap();
        assert_eq!(json["kind"], "flower");
        assert_eq!(json["segments"].as_array().unwrap().len(), 64);
        assert!(json["sites"][0]["size"].is_string());
    }
}

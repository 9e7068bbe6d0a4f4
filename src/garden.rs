//! Garden session
//!
//! Owns the shared surface and everything that outlives a single plant:
//! the pointer-planted history, which sections have already grown, the
//! in-flight animated growths and the blossoms waiting on their timers.
//!
//! The frame pump is [`GardenSession::tick`]. Growths interleave on the one
//! surface with no coordination; the last stroke drawn wins.

use crate::blossom::paint_blossom;
use crate::config::{SectionSpec, SessionConfig};
use crate::growth::{paint_plan, plan_growth, Growth, ScheduledBlossom, Step};
use crate::plant::PlantKind;
use crate::stroke::paint_segment;
use crate::surface::Surface;
use crate::turtle::Point;
use chrono::{DateTime, Utc};
use rand::prelude::*;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info};

/// A pointer-planted plant, kept so it can be replayed after an eviction
#[derive(Clone, Debug, PartialEq)]
pub struct PlantInstance {
    pub origin: Point,
    pub kind: PlantKind,
    pub created: DateTime<Utc>,
}

/// Vertical placement of a section on the virtual page, in surface pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionRect {
    pub top: f32,
    pub height: f32,
}

/// Sections stacked down a virtual page that scrolls behind a fixed canvas
#[derive(Clone, Debug)]
pub struct PageLayout {
    pub viewport_height: f32,
    pub rects: Vec<SectionRect>,
}

impl PageLayout {
    /// First section starts just below the fold, the rest follow most of a
    /// viewport apart
    pub fn stacked(sections: usize, viewport_height: f32) -> Self {
        let height = viewport_height * 0.6;
        let rects = (0..sections)
            .map(|i| SectionRect {
                top: viewport_height * (1.0 + i as f32 * 0.9),
                height,
            })
            .collect();
        Self {
            viewport_height,
            rects,
        }
    }

    pub fn max_scroll(&self) -> f32 {
        self.rects
            .last()
            .map(|r| (r.top + r.height - self.viewport_height).max(0.0))
            .unwrap_or(0.0)
    }

    /// Fraction of a section inside the viewport at `scroll`
    pub fn visible_fraction(&self, index: usize, scroll: f32) -> f32 {
        let Some(r) = self.rects.get(index) else {
            return 0.0;
        };
        if r.height <= 0.0 {
            return 0.0;
        }
        let top = r.top - scroll;
        let bottom = top + r.height;
        let overlap = bottom.min(self.viewport_height) - top.max(0.0);
        (overlap / r.height).clamp(0.0, 1.0)
    }
}

struct PendingBlossom {
    due: Instant,
    blossom: ScheduledBlossom,
}

pub struct GardenSession<R: Rng> {
    surface: Surface,
    rng: R,
    config: SessionConfig,
    layout: PageLayout,
    scroll: f32,
    history: VecDeque<PlantInstance>,
    grown: Vec<bool>,
    growths: Vec<Growth>,
    pending: Vec<PendingBlossom>,
}

impl<R: Rng> GardenSession<R> {
    pub fn new(surface: Surface, rng: R, config: SessionConfig) -> Self {
        let (_, height) = surface.size();
        let layout = PageLayout::stacked(config.sections.len(), height as f32);
        let grown = vec![false; config.sections.len()];
        Self {
            surface,
            rng,
            config,
            layout,
            scroll: 0.0,
            history: VecDeque::new(),
            grown,
            growths: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn history(&self) -> impl Iterator<Item = &PlantInstance> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.config.sections
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn is_grown(&self, index: usize) -> bool {
        self.grown.get(index).copied().unwrap_or(false)
    }

    /// Animated growths and timed blossoms still outstanding
    pub fn busy(&self) -> bool {
        !self.growths.is_empty() || !self.pending.is_empty()
    }

    /// Grow one plant. Animated growths are revealed by [`tick`](Self::tick).
    pub fn grow(&mut self, kind: PlantKind, origin: Point, animate: bool) {
        let plan = plan_growth(kind, origin, self.config.low_power, &mut self.rng);
        if animate {
            self.growths.push(Growth::new(plan));
        } else {
            paint_plan(&mut self.surface, &plan, &mut self.rng);
        }
    }

    /// Plant a random kind where the pointer landed, then prune if needed
    pub fn plant_at_pointer(&mut self, origin: Point) -> PlantKind {
        let kind = PlantKind::random(&mut self.rng);
        self.grow(kind, origin, true);
        self.remember(kind, origin);
        self.prune();
        kind
    }

    /// Fill the lower part of the canvas with a few finished plants
    pub fn seed_startup(&mut self) {
        let (width, height) = self.surface.size();
        for _ in 0..self.config.startup_plants {
            let kind = PlantKind::random(&mut self.rng);
            let x = self.rng.gen::<f32>() * width as f32;
            let y = height as f32 * (0.70 + self.rng.gen::<f32>() * 0.25);
            let origin = Point::new(x, y);
            self.grow(kind, origin, false);
            self.remember(kind, origin);
        }
        debug!(plants = self.config.startup_plants, "startup garden seeded");
    }

    fn remember(&mut self, kind: PlantKind, origin: Point) {
        self.history.push_back(PlantInstance {
            origin,
            kind,
            created: Utc::now(),
        });
    }

    /// Where a section's plant is rooted at the current scroll position
    pub fn section_origin(&self, index: usize) -> Option<Point> {
        let section = self.config.sections.get(index)?;
        let rect = self.layout.rects.get(index)?;
        let (width, _) = self.surface.size();
        let top = rect.top - self.scroll;
        Some(Point::new(width as f32 * section.x, top + rect.height * 0.7))
    }

    /// Scroll the page. Sections at least half visible grow once, animated.
    /// Returns the ids of sections that started growing.
    pub fn scroll_to(&mut self, scroll: f32) -> Vec<String> {
        self.scroll = scroll.clamp(0.0, self.layout.max_scroll());
        self.reveal_sections(true)
    }

    fn reveal_sections(&mut self, animate: bool) -> Vec<String> {
        let mut triggered = Vec::new();
        for i in 0..self.config.sections.len() {
            if self.grown[i] || self.layout.visible_fraction(i, self.scroll) < 0.5 {
                continue;
            }
            self.grown[i] = true;
            let kind = self.config.sections[i].kind;
            if let Some(origin) = self.section_origin(i) {
                debug!(section = %self.config.sections[i].id, "section in view");
                self.grow(kind, origin, animate);
                triggered.push(self.config.sections[i].id.clone());
            }
        }
        triggered
    }

    /// Sweep down the whole page, growing each section without animation
    /// where it first comes into view, then return to the current scroll.
    pub fn grow_all_sections(&mut self) {
        let resume = self.scroll;
        let stride = (self.layout.viewport_height * 0.05).max(1.0);
        let end = self.layout.max_scroll();

        let mut scroll: f32 = 0.0;
        loop {
            self.scroll = scroll.min(end);
            self.reveal_sections(false);
            if scroll >= end {
                break;
            }
            scroll += stride;
        }
        self.scroll = resume;
    }

    /// Once history passes the cap: clear, keep the most recent plants, and
    /// replay them plus every grown section without animation.
    ///
    /// Animated growths still in flight keep drawing over the replay.
    fn prune(&mut self) {
        if self.history.len() <= self.config.history_cap {
            return;
        }

        let evicted = self.history.len().saturating_sub(self.config.history_retain);
        self.history.drain(..evicted);
        self.surface.clear();

        let replay: Vec<(PlantKind, Point)> = self.history.iter().map(|p| (p.kind, p.origin)).collect();
        for (kind, origin) in replay {
            self.grow(kind, origin, false);
        }
        for i in 0..self.config.sections.len() {
            if !self.grown[i] {
                continue;
            }
            if let Some(origin) = self.section_origin(i) {
                self.grow(self.config.sections[i].kind, origin, false);
            }
        }

        info!(evicted, kept = self.history.len(), "garden pruned");
    }

    /// Advance every animated growth by one step and paint due blossoms.
    /// Returns true if anything was drawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut drew = false;

        for growth in &mut self.growths {
            match growth.next() {
                Some(Step::Segment(kind, segment)) => {
                    paint_segment(&mut self.surface, &segment, kind.plant_type(), &mut self.rng);
                    drew = true;
                }
                Some(Step::Bloom(blossoms)) => {
                    self.pending.extend(blossoms.into_iter().map(|blossom| PendingBlossom {
                        due: now + blossom.delay,
                        blossom,
                    }));
                }
                None => {}
            }
        }
        self.growths.retain(|g| !g.is_finished());

        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                let b = self.pending.swap_remove(i).blossom;
                paint_blossom(&mut self.surface, &b.site, b.kind.plant_type(), &mut self.rng);
                drew = true;
            } else {
                i += 1;
            }
        }

        drew
    }

    /// Stop every animated reveal. Blossoms already scheduled still open.
    pub fn stop_growths(&mut self) {
        for g in &mut self.growths {
            g.stop();
        }
        self.growths.clear();
    }

    /// Forget everything: history, grown flags, animations, and pixels
    pub fn teardown(&mut self) {
        self.stop_growths();
        self.pending.clear();
        self.history.clear();
        self.grown.iter_mut().for_each(|g| *g = false);
        self.surface.clear();
        info!("garden cleared");
    }
}

//! Blossom site selection
//!
//! Branch ends cluster heavily near the crown, so candidates are first thinned
//! by distance (topmost of each cluster wins) and then two or three sites are
//! picked, biased toward the top with an occasional lower branch.

use crate::turtle::EndpointCandidate;
use rand::prelude::*;

/// Candidates closer than this collapse into one
pub const MIN_SITE_DISTANCE: f32 = 6.0;

/// Chance the second blossom goes to a lower branch
pub const SECOND_LOWER_CHANCE: f64 = 0.25;
/// Chance the third blossom goes to a lower branch
pub const THIRD_LOWER_CHANCE: f64 = 0.5;
/// Chance of a third blossom when at least three sites survive
pub const THIRD_SITE_CHANCE: f64 = 0.5;
/// The lower pool starts this far down the top-to-bottom order
pub const LOWER_POOL_START: f32 = 0.4;
/// Indices tried, in order, for a third blossom that is not a lower pick
const THIRD_SITE_WINDOW: [usize; 3] = [2, 3, 4];

/// Sort by height (topmost first) and drop any candidate within `min_dist`
/// of one already kept.
pub fn dedupe_by_distance(mut candidates: Vec<EndpointCandidate>, min_dist: f32) -> Vec<EndpointCandidate> {
    candidates.sort_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let min_sq = min_dist * min_dist;
    let mut kept: Vec<EndpointCandidate> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !kept.iter().any(|k| k.pos.distance_sq(c.pos) < min_sq) {
            kept.push(c);
        }
    }
    kept
}

/// Random unused index from the lower part of the list
fn pick_lower<R: Rng + ?Sized>(len: usize, used: &mut Vec<usize>, rng: &mut R) -> Option<usize> {
    if len <= 1 {
        return None;
    }
    let start = ((len as f32 * LOWER_POOL_START).floor() as usize).max(1);
    let pool: Vec<usize> = (start..len).filter(|i| !used.contains(i)).collect();
    let idx = *pool.choose(rng)?;
    used.push(idx);
    Some(idx)
}

fn pick_in_window(len: usize, used: &mut Vec<usize>) -> Option<usize> {
    let idx = THIRD_SITE_WINDOW
        .iter()
        .copied()
        .find(|&i| i < len && !used.contains(&i))?;
    used.push(idx);
    Some(idx)
}

/// Choose up to three blossom sites from deduplicated, top-sorted candidates.
///
/// The first site is always `unique[0]`. No index is used twice.
pub fn select_sites<R: Rng + ?Sized>(unique: &[EndpointCandidate], rng: &mut R) -> Vec<EndpointCandidate> {
    let len = unique.len();
    if len == 0 {
        return Vec::new();
    }

    let desired = if len >= 3 && rng.gen_bool(THIRD_SITE_CHANCE) { 3 } else { 2 };
    let mut used: Vec<usize> = vec![0];

    if len >= 2 {
        let lower = if rng.gen_bool(SECOND_LOWER_CHANCE) {
            pick_lower(len, &mut used, rng)
        } else {
            None
        };
        if lower.is_none() && !used.contains(&1) {
            used.push(1);
        }
    }

    if desired == 3 {
        let lower = if rng.gen_bool(THIRD_LOWER_CHANCE) {
            pick_lower(len, &mut used, rng)
        } else {
            None
        };
        if lower.is_none() {
            pick_in_window(len, &mut used);
        }
    }

    used.into_iter().map(|i| unique[i]).collect()
}

//! Turtle walk over an expanded L-system string
//!
//! The walk turns draw/turn/branch symbols into line segments and collects
//! the places where branches end, which later become blossom sites.
//!
//! Symbols:
//! - `F` draw forward
//! - `+` / `-` turn by the branch angle (plus noise)
//! - `[` / `]` save / restore the cursor
//!
//! Anything else is ignored.

use rand::prelude::*;
use serde::Serialize;
use std::f32::consts::FRAC_PI_2;

/// Default multiplicative step decay band applied after each draw
pub const STEP_DECAY: (f32, f32) = (0.84, 0.91);

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// Cursor snapshot; copied onto the stack at `[`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorState {
    pub x: f32,
    pub y: f32,
    /// Radians, screen space (y grows downward, so "up" is -PI/2)
    pub heading: f32,
    pub step: f32,
}

impl CursorState {
    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A drawn line, tagged with the branch depth it was drawn at
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub step: f32,
    pub depth: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Large,
    Medium,
    Small,
}

impl SizeClass {
    pub fn for_depth(depth: usize) -> Self {
        match depth {
            0 => SizeClass::Large,
            1 => SizeClass::Medium,
            _ => SizeClass::Small,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SizeClass::Large => "large",
            SizeClass::Medium => "medium",
            SizeClass::Small => "small",
        }
    }
}

/// A potential blossom site
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EndpointCandidate {
    pub pos: Point,
    pub depth: usize,
    pub size: SizeClass,
}

impl EndpointCandidate {
    pub fn new(pos: Point, depth: usize) -> Self {
        Self {
            pos,
            depth,
            size: SizeClass::for_depth(depth),
        }
    }
}

/// Whole-plant walk parameters, sampled once per plant
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WalkParams {
    /// Initial heading in radians
    pub heading: f32,
    /// Overall size factor (already folded into `step`)
    pub scale: f32,
    /// Initial step length
    pub step: f32,
    /// Left/right lean applied on every draw
    pub bend_bias: f32,
    /// Amplitude of per-draw heading noise
    pub wobble: f32,
    /// Amplitude of per-turn angle noise
    pub turn_noise: f32,
    pub decay: (f32, f32),
}

impl WalkParams {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let scale = rng.gen_range(0.9..1.4);
        Self {
            heading: -FRAC_PI_2 + (rng.gen::<f32>() - 0.5) * 0.15,
            scale,
            step: rng.gen_range(9.0..13.0) * scale,
            bend_bias: (rng.gen::<f32>() - 0.5) * 0.18,
            wobble: 0.02,
            turn_noise: 0.3,
            decay: STEP_DECAY,
        }
    }

    /// Noise-free parameters: straight up, fixed step, fixed decay
    pub fn still(step: f32) -> Self {
        Self {
            heading: -FRAC_PI_2,
            scale: 1.0,
            step,
            bend_bias: 0.0,
            wobble: 0.0,
            turn_noise: 0.0,
            decay: (STEP_DECAY.0, STEP_DECAY.0),
        }
    }
}

/// Everything one walk produces
#[derive(Debug, Clone, Serialize)]
pub struct Walk {
    pub segments: Vec<Segment>,
    pub candidates: Vec<EndpointCandidate>,
    pub topmost: EndpointCandidate,
    /// Stack depth left over at the end; zero for well-formed strings
    pub open_branches: usize,
}

fn noise<R: Rng + ?Sized>(rng: &mut R, amplitude: f32) -> f32 {
    if amplitude == 0.0 {
        0.0
    } else {
        (rng.gen::<f32>() - 0.5) * amplitude
    }
}

/// Interpret `program` starting at `origin`
pub fn walk<R: Rng + ?Sized>(
    program: &str,
    origin: Point,
    angle_deg: f32,
    params: &WalkParams,
    rng: &mut R,
) -> Walk {
    let angle = angle_deg.to_radians();
    let mut cursor = CursorState {
        x: origin.x,
        y: origin.y,
        heading: params.heading,
        step: params.step,
    };
    let mut stack: Vec<CursorState> = Vec::with_capacity(32);
    let mut segments = Vec::new();
    let mut candidates = Vec::new();
    let mut branch: Vec<EndpointCandidate> = Vec::new();
    let mut topmost = EndpointCandidate::new(origin, 0);

    for symbol in program.chars() {
        match symbol {
            'F' => {
                cursor.heading += params.bend_bias * 0.04 + noise(rng, params.wobble);

                let start = cursor.position();
                cursor.x += cursor.heading.cos() * cursor.step;
                cursor.y += cursor.heading.sin() * cursor.step;
                let end = cursor.position();

                segments.push(Segment {
                    start,
                    end,
                    step: cursor.step,
                    depth: stack.len(),
                });

                let (lo, hi) = params.decay;
                cursor.step *= rng.gen_range(lo..=hi);

                let tip = EndpointCandidate::new(end, stack.len());
                branch.push(tip);
                if tip.pos.y < topmost.pos.y {
                    topmost = tip;
                }
            }
            '+' => cursor.heading += angle + noise(rng, params.turn_noise),
            '-' => cursor.heading -= angle + noise(rng, params.turn_noise),
            '[' => {
                stack.push(cursor);
                branch.clear();
            }
            ']' => {
                if let Some(last) = branch.last() {
                    candidates.push(*last);
                }
                if let Some(saved) = stack.pop() {
                    cursor = saved;
                }
                branch.clear();
            }
            _ => {}
        }
    }

    candidates.push(topmost);

    Walk {
        segments,
        candidates,
        topmost,
        open_branches: stack.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::expand;

    fn still_walk(program: &str) -> Walk {
        let mut rng = StdRng::seed_from_u64(1);
        walk(program, Point::new(0.0, 0.0), 35.0, &WalkParams::still(10.0), &mut rng)
    }

    #[test]
    fn flower_generation_one() {
        let program = expand("F", &[('F', "FF[+F][-F]")], 1);
        let w = still_walk(&program);

        assert_eq!(w.segments.len(), 4);
        assert_eq!(w.open_branches, 0);
        // two branch closes plus the forced topmost point
        assert_eq!(w.candidates.len(), 3);

        let depths: Vec<usize> = w.segments.iter().map(|s| s.depth).collect();
        assert_eq!(depths, vec![0, 0, 1, 1]);

        // trunk goes straight up with no noise
        assert!(w.segments[0].start.x.abs() < 1e-4);
        assert!((w.segments[0].end.y + 10.0).abs() < 1e-4);
        assert!((w.segments[1].step - 8.4).abs() < 1e-4);

        // the branch tips climb above the trunk, so the topmost point is a tip
        let top = w.candidates.last().unwrap();
        assert_eq!(top.depth, 1);
        assert!(top.pos.y < w.segments[1].end.y);
        assert!((top.pos.y - w.candidates[0].pos.y).abs() < 1e-4);

        // branch tips are medium sized and mirror each other
        assert_eq!(w.candidates[0].size, SizeClass::Medium);
        assert!((w.candidates[0].pos.x + w.candidates[1].pos.x).abs() < 1e-3);
    }

    #[test]
    fn zero_iterations_draws_one_segment() {
        for kind in crate::plant::PlantKind::ALL {
            let pt = kind.plant_type();
            let program = expand(pt.axiom, pt.rules, 0);
            let w = still_walk(&program);
            assert_eq!(w.segments.len(), 1);
            assert_eq!(w.candidates.len(), 1);
        }
    }

    #[test]
    fn empty_program_still_yields_origin_candidate() {
        let w = still_walk("");
        assert!(w.segments.is_empty());
        assert_eq!(w.candidates.len(), 1);
        assert_eq!(w.candidates[0].pos, Point::new(0.0, 0.0));
    }

    #[test]
    fn stray_close_is_ignored() {
        let w = still_walk("]]F]");
        assert_eq!(w.segments.len(), 1);
        assert_eq!(w.open_branches, 0);
        // the last `]` closes a branch list containing the draw
        assert_eq!(w.candidates.len(), 2);
    }

    #[test]
    fn unknown_symbols_are_no_ops() {
        let w = still_walk("XFYZ");
        assert_eq!(w.segments.len(), 1);
    }

    #[test]
    fn depth_tracks_stack_and_stack_drains() {
        let mut rng = StdRng::seed_from_u64(99);
        for kind in crate::plant::PlantKind::ALL {
            let pt = kind.plant_type();
            let program = expand(pt.axiom, pt.rules, pt.iterations);
            let params = WalkParams::sample(&mut rng);
            let w = walk(&program, Point::new(100.0, 300.0), pt.angle, &params, &mut rng);

            assert_eq!(w.open_branches, 0);
            assert_eq!(w.segments.len(), program.matches('F').count());

            let mut depth = 0usize;
            let mut seg = w.segments.iter();
            for ch in program.chars() {
                match ch {
                    '[' => depth += 1,
                    ']' => depth -= 1,
                    'F' => assert_eq!(seg.next().unwrap().depth, depth),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn step_shrinks_along_a_path() {
        let mut rng = StdRng::seed_from_u64(5);
        let pt = crate::plant::PlantKind::Fern.plant_type();
        let program = expand(pt.axiom, pt.rules, pt.iterations);
        let params = WalkParams::sample(&mut rng);
        let w = walk(&program, Point::new(0.0, 0.0), pt.angle, &params, &mut rng);

        // consecutive draws with no bracket in between continue the same path
        let mut idx = 0;
        let mut prev_was_draw = false;
        for ch in program.chars() {
            match ch {
                'F' => {
                    if prev_was_draw {
                        assert!(w.segments[idx].step < w.segments[idx - 1].step);
                    }
                    idx += 1;
                    prev_was_draw = true;
                }
                '+' | '-' => {}
                _ => prev_was_draw = false,
            }
        }
    }

    #[test]
    fn sampled_params_fall_in_their_bands() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let p = WalkParams::sample(&mut rng);
            assert!(p.scale >= 0.9 && p.scale < 1.4);
            assert!(p.step >= 9.0 * 0.9 && p.step < 13.0 * 1.4);
            assert!((p.heading + FRAC_PI_2).abs() <= 0.0751);
            assert!(p.bend_bias.abs() <= 0.0901);
        }
    }

    #[test]
    fn step_decay_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..100 {
            let params = WalkParams::sample(&mut rng);
            let w = walk("FFFF", Point::new(0.0, 0.0), 35.0, &params, &mut rng);
            assert!((w.segments[0].step - params.step).abs() < 1e-4);
            for pair in w.segments.windows(2) {
                let ratio = pair[1].step / pair[0].step;
                assert!(
                    (STEP_DECAY.0 - 1e-4..=STEP_DECAY.1 + 1e-4).contains(&ratio),
                    "decay ratio {}",
                    ratio
                );
            }
        }
    }

    #[test]
    fn turn_noise_is_bounded() {
        let heading = |s: &Segment| (s.end.y - s.start.y).atan2(s.end.x - s.start.x);
        let angle = 35f32.to_radians();
        // only turn noise; no lean and no wobble
        let params = WalkParams {
            turn_noise: 0.3,
            ..WalkParams::still(10.0)
        };
        let mut rng = StdRng::seed_from_u64(29);
        let mut spread = 0.0f32;
        for _ in 0..200 {
            for (program, sign) in [("F+F", 1.0), ("F-F", -1.0)] {
                let w = walk(program, Point::new(0.0, 0.0), 35.0, &params, &mut rng);
                let turn = heading(&w.segments[1]) - heading(&w.segments[0]);
                let off = turn * sign - angle;
                assert!(off.abs() <= params.turn_noise / 2.0 + 1e-4, "turn off by {}", off);
                spread = spread.max(off.abs());
            }
        }
        // the noise is actually applied
        assert!(spread > 0.05);
    }
}

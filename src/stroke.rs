//! Watercolor brush strokes for plant segments
//!
//! Each segment is laid down as three translucent, slightly misregistered
//! passes (some curved) followed by a wide faint shadow wash. Nothing is
//! cached: every call re-rolls every pass.

use crate::plant::{PlantType, Rgb};
use crate::surface::{StrokePath, Surface};
use crate::turtle::{Point, Segment};
use rand::prelude::*;

pub const PASSES: usize = 3;
/// Chance a pass is drawn as a quadratic curve instead of a line
pub const CURVE_CHANCE: f64 = 0.7;
/// Chance a pass color gets per-channel jitter
pub const COLOR_JITTER_CHANCE: f64 = 0.6;
pub const COLOR_JITTER: i32 = 16;
/// Extra width per depth level
pub const DEPTH_WIDTH_GAIN: f32 = 0.1;

/// A layer whose wash and brush both carry opacity `a` lands at `a * a`
pub fn layered_alpha(a: f32) -> f32 {
    a * a
}

/// One planned brush stroke
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushStroke {
    pub path: StrokePath,
    pub width: f32,
    pub color: Rgb,
    pub alpha: f32,
    pub feather: f32,
}

fn spread<R: Rng + ?Sized>(rng: &mut R, amount: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * amount
}

/// Plan the passes for one segment; the shadow wash is last
pub fn watercolor_strokes<R: Rng + ?Sized>(segment: &Segment, plant: &PlantType, rng: &mut R) -> Vec<BrushStroke> {
    let main_stem = segment.depth == 0;
    let base_width = (segment.step * 0.35).max(0.8);
    let organic = 1.0 + spread(rng, 0.3);
    let depth_gain = 1.0 + segment.depth as f32 * DEPTH_WIDTH_GAIN;
    let width = base_width * organic * depth_gain;

    let offset_spread = if main_stem { 1.5 } else { 2.5 };
    let curve_spread = if main_stem { 3.0 } else { 6.0 };
    let mid = segment.start.lerp(segment.end, 0.5);

    let mut strokes = Vec::with_capacity(PASSES + 1);
    for pass in 0..PASSES {
        let alpha = layered_alpha((0.4 - pass as f32 * 0.1) * (1.0 + spread(rng, 0.2)));
        let pass_width = width + pass as f32 * rng.gen_range(0.6..1.0);
        let color = plant.sample_color(rng, COLOR_JITTER_CHANCE, COLOR_JITTER);

        let ox = spread(rng, offset_spread);
        let oy = spread(rng, offset_spread);
        let from = Point::new(segment.start.x + ox, segment.start.y + oy);
        let to = Point::new(segment.end.x + ox, segment.end.y + oy);
        let ctrl = Point::new(mid.x + spread(rng, curve_spread), mid.y + spread(rng, curve_spread));

        let path = if rng.gen_bool(CURVE_CHANCE) {
            StrokePath::Quad { from, ctrl, to }
        } else {
            StrokePath::Line { from, to }
        };

        strokes.push(BrushStroke {
            path,
            width: pass_width,
            color,
            alpha,
            feather: 0.0,
        });
    }

    let shadow = plant.palette[rng.gen_range(0..plant.palette.len())];
    strokes.push(BrushStroke {
        path: StrokePath::Line {
            from: segment.start,
            to: segment.end,
        },
        width: width * rng.gen_range(1.5..2.1),
        color: shadow,
        alpha: rng.gen_range(0.08..0.16),
        feather: rng.gen_range(2.0..5.0),
    });

    strokes
}

/// Paint one segment onto the surface
pub fn paint_segment<R: Rng + ?Sized>(surface: &mut Surface, segment: &Segment, plant: &PlantType, rng: &mut R) {
    for s in watercolor_strokes(segment, plant, rng) {
        surface.stroke(&s.path, s.width, s.color, s.alpha, s.feather);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::PlantKind;

    fn segment(depth: usize) -> Segment {
        Segment {
            start: Point::new(50.0, 80.0),
            end: Point::new(52.0, 68.0),
            step: 12.0,
            depth,
        }
    }

    fn near_palette(c: Rgb, plant: &PlantType) -> bool {
        plant.palette.iter().any(|p| {
            (p.r as i32 - c.r as i32).abs() <= COLOR_JITTER
                && (p.g as i32 - c.g as i32).abs() <= COLOR_JITTER
                && (p.b as i32 - c.b as i32).abs() <= COLOR_JITTER
        })
    }

    #[test]
    fn three_passes_then_a_straight_shadow() {
        let plant = PlantKind::Flower.plant_type();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let strokes = watercolor_strokes(&segment(1), plant, &mut rng);
            assert_eq!(strokes.len(), PASSES + 1);

            let shadow = strokes[PASSES];
            assert!(!shadow.path.is_curved());
            assert!(shadow.alpha >= 0.08 && shadow.alpha < 0.16);
            assert!(shadow.feather >= 2.0);
            assert!(plant.palette.contains(&shadow.color));
            assert!(shadow.width > strokes[0].width);
        }
    }

    #[test]
    fn pass_opacity_falls_and_width_grows() {
        let plant = PlantKind::Fern.plant_type();
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..200 {
            let strokes = watercolor_strokes(&segment(0), plant, &mut rng);
            for pair in strokes[..PASSES].windows(2) {
                assert!(pair[1].alpha < pair[0].alpha);
                assert!(pair[1].width > pair[0].width);
            }
            for s in &strokes[..PASSES] {
                assert!(near_palette(s.color, plant));
            }
        }
    }

    #[test]
    fn pass_opacity_is_squared_but_shadow_is_not() {
        let plant = PlantKind::Flower.plant_type();
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let strokes = watercolor_strokes(&segment(1), plant, &mut rng);
            for (pass, s) in strokes[..PASSES].iter().enumerate() {
                let nominal = 0.4 - pass as f32 * 0.1;
                let lo = layered_alpha(nominal * 0.9) - 1e-6;
                let hi = layered_alpha(nominal * 1.1) + 1e-6;
                assert!(s.alpha >= lo && s.alpha <= hi, "pass {} alpha {}", pass, s.alpha);
            }
            assert!(strokes[PASSES].alpha >= 0.08);
        }
        assert!((layered_alpha(0.4) - 0.16).abs() < 1e-6);
    }

    #[test]
    fn both_path_shapes_occur() {
        let plant = PlantKind::Vine.plant_type();
        let mut rng = StdRng::seed_from_u64(30);
        let mut curved = 0;
        let mut straight = 0;
        for _ in 0..100 {
            for s in &watercolor_strokes(&segment(2), plant, &mut rng)[..PASSES] {
                if s.path.is_curved() {
                    curved += 1;
                } else {
                    straight += 1;
                }
            }
        }
        assert!(curved > straight);
        assert!(straight > 0);
    }

    #[test]
    fn tiny_segments_keep_a_minimum_width() {
        let plant = PlantKind::Tree.plant_type();
        let mut rng = StdRng::seed_from_u64(2);
        let seg = Segment { step: 0.1, ..segment(0) };
        let strokes = watercolor_strokes(&seg, plant, &mut rng);
        assert!(strokes[0].width >= 0.8 * 0.85);
    }

    #[test]
    fn painting_marks_the_surface() {
        let plant = PlantKind::Flower.plant_type();
        let mut rng = StdRng::seed_from_u64(9);
        let mut surface = Surface::new(100, 100);
        paint_segment(&mut surface, &segment(0), plant, &mut rng);
        assert!(surface.pixel(51, 74).unwrap()[3] > 0.0);
    }
}

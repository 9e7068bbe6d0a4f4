//! Append-only raster surface
//!
//! Shapes are built as `kurbo` geometry and rasterized by `tiny-skia` into a
//! premultiplied RGBA pixmap. Everything is composited source-over; drawing
//! outside the bounds is clipped silently.

use crate::plant::Rgb;
use crate::turtle::Point;
use image::{Rgba, RgbaImage};
use kurbo::{BezPath, Circle, Ellipse, PathEl, Shape};
use tiny_skia::{Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

/// Flattening tolerance for curved shapes, in pixels
const TOLERANCE: f64 = 0.1;
/// Concentric passes used to fake a soft brush edge
const FEATHER_RINGS: usize = 4;

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x as f64, p.y as f64)
    }
}

/// Path a brush follows
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokePath {
    Line { from: Point, to: Point },
    Quad { from: Point, ctrl: Point, to: Point },
}

impl StrokePath {
    #[cfg(test)]
    pub fn is_curved(&self) -> bool {
        matches!(self, StrokePath::Quad { .. })
    }

    pub fn to_bez(&self) -> BezPath {
        let mut path = BezPath::new();
        match *self {
            StrokePath::Line { from, to } => {
                path.move_to(from);
                path.line_to(to);
            }
            StrokePath::Quad { from, ctrl, to } => {
                path.move_to(from);
                path.quad_to(ctrl, to);
            }
        }
        path
    }
}

/// Convert kurbo path elements into a tiny-skia path; `None` when empty or non-finite
fn skia_path(elements: impl IntoIterator<Item = PathEl>) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in elements {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn paint(color: Rgb, alpha: f32) -> Option<Paint<'static>> {
    if !(alpha > 0.0) {
        return None;
    }
    let [r, g, b] = color.to_unit();
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba(r, g, b, alpha.min(1.0))?);
    paint.anti_alias = true;
    Some(paint)
}

pub struct Surface {
    width: u32,
    height: u32,
    /// `None` for a zero-sized surface
    pixmap: Option<Pixmap>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixmap: Pixmap::new(width, height),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(Color::TRANSPARENT);
        }
    }

    /// Premultiplied pixel in `0.0..=1.0`, or `None` outside the surface
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        let px = self.pixmap.as_ref()?.pixel(x, y)?;
        let unit = |v: u8| v as f32 / 255.0;
        Some([unit(px.red()), unit(px.green()), unit(px.blue()), unit(px.alpha())])
    }

    /// True if nothing has been drawn since the last clear
    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        self.pixmap
            .as_ref()
            .map_or(true, |p| p.pixels().iter().all(|px| px.alpha() == 0))
    }

    fn stroke_once(&mut self, path: &Path, width: f32, paint: &Paint<'_>) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(path, paint, &stroke, Transform::identity(), None);
    }

    /// Stroke a path with round caps and joins.
    ///
    /// `feather` widens the soft edge in pixels: the stroke is laid down as
    /// a few concentric passes that together reach `alpha` on the core and
    /// fade toward `width + 2 * feather`.
    pub fn stroke(&mut self, path: &StrokePath, width: f32, color: Rgb, alpha: f32, feather: f32) {
        if !(width > 0.0) {
            return;
        }
        let Some(skia) = skia_path(path.to_bez().path_elements(TOLERANCE)) else {
            return;
        };

        if !(feather > 0.0) {
            if let Some(p) = paint(color, alpha) {
                self.stroke_once(&skia, width, &p);
            }
            return;
        }

        let ring_alpha = 1.0 - (1.0 - alpha.clamp(0.0, 1.0)).powf(1.0 / FEATHER_RINGS as f32);
        let Some(p) = paint(color, ring_alpha) else {
            return;
        };
        for ring in 0..FEATHER_RINGS {
            let grow = 2.0 * feather * ring as f32 / (FEATHER_RINGS - 1) as f32;
            self.stroke_once(&skia, width + grow, &p);
        }
    }

    fn fill_shape(&mut self, shape: &impl Shape, color: Rgb, alpha: f32) {
        let Some(p) = paint(color, alpha) else {
            return;
        };
        let Some(path) = skia_path(shape.path_elements(TOLERANCE)) else {
            return;
        };
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(&path, &p, FillRule::Winding, Transform::identity(), None);
        }
    }

    /// Fill an ellipse rotated by `rotation` radians around its center
    pub fn fill_ellipse(&mut self, center: Point, rx: f32, ry: f32, rotation: f32, color: Rgb, alpha: f32) {
        if !(rx > 0.0 && ry > 0.0) {
            return;
        }
        let ellipse = Ellipse::new(center, (rx as f64, ry as f64), rotation as f64);
        self.fill_shape(&ellipse, color, alpha);
    }

    pub fn fill_disc(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32) {
        if !(radius > 0.0) {
            return;
        }
        self.fill_shape(&Circle::new(center, radius as f64), color, alpha);
    }

    /// Flatten to 8-bit RGBA, optionally over an opaque paper color
    pub fn to_image(&self, paper: Option<Rgb>) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        let Some(pixmap) = self.pixmap.as_ref() else {
            return img;
        };

        for (i, px) in pixmap.pixels().iter().enumerate() {
            let x = i as u32 % self.width;
            let y = i as u32 / self.width;
            let out = match paper {
                Some(bg) => {
                    let keep = 255 - px.alpha() as u32;
                    let over = |c: u8, b: u8| (c as u32 + (b as u32 * keep + 127) / 255).min(255) as u8;
                    Rgba([over(px.red(), bg.r), over(px.green(), bg.g), over(px.blue(), bg.b), 255])
                }
                None => {
                    let c = px.demultiply();
                    Rgba([c.red(), c.green(), c.blue(), c.alpha()])
                }
            };
            img.put_pixel(x, y, out);
        }
        img
    }
}

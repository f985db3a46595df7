//! CPU drawing surface.
//!
//! Views paint in logical pixels; the canvas maps them onto an RGBA buffer
//! at a fractional scale factor. All drawing honours the current
//! translation and clip rectangle and composites with source-over blending,
//! so a transparent backing stays transparent where nothing is painted.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

/// Straight (non-premultiplied) RGBA.
pub type Color = [u8; 4];

pub const TRANSPARENT: Color = [0, 0, 0, 0];

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn inset(&self, d: f32) -> Self {
        Self::new(
            self.x + d,
            self.y + d,
            (self.w - 2.0 * d).max(0.0),
            (self.h - 2.0 * d).max(0.0),
        )
    }
}

/// Per-corner radii in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corners {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl Corners {
    pub const fn all(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: r,
            bottom_left: r,
        }
    }

    pub const fn top(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: 0.0,
            bottom_left: 0.0,
        }
    }

    pub const fn bottom(r: f32) -> Self {
        Self {
            top_left: 0.0,
            top_right: 0.0,
            bottom_right: r,
            bottom_left: r,
        }
    }

    fn scaled(&self, s: f32, limit: f32) -> Self {
        let f = |r: f32| (r * s).clamp(0.0, limit);
        Self {
            top_left: f(self.top_left),
            top_right: f(self.top_right),
            bottom_right: f(self.bottom_right),
            bottom_left: f(self.bottom_left),
        }
    }
}

/// Half-open device-pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl Bounds {
    fn intersect(self, other: Bounds) -> Bounds {
        Bounds {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// RGBA render target.
pub struct Canvas {
    image: RgbaImage,
    scale: f32,
    origin: (f32, f32),
    clip: Bounds,
}

impl Canvas {
    /// Create a `width`×`height` device-pixel canvas filled with `background`.
    pub fn new(width: u32, height: u32, scale: f32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(background)),
            scale,
            origin: (0.0, 0.0),
            clip: Bounds {
                x0: 0,
                y0: 0,
                x1: width as i32,
                y1: height as i32,
            },
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Map a logical point to device coordinates.
    pub fn to_device(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x + self.origin.0) * self.scale,
            (y + self.origin.1) * self.scale,
        )
    }

    fn device_bounds(&self, rect: Rect) -> Bounds {
        let (x0, y0) = self.to_device(rect.x, rect.y);
        let (x1, y1) = self.to_device(rect.right(), rect.bottom());
        Bounds {
            x0: x0.round() as i32,
            y0: y0.round() as i32,
            x1: x1.round() as i32,
            y1: y1.round() as i32,
        }
    }

    /// Run `f` with the origin moved by `(dx, dy)` logical pixels.
    pub fn translated<R>(&mut self, dx: f32, dy: f32, f: impl FnOnce(&mut Canvas) -> R) -> R {
        let saved = self.origin;
        self.origin = (saved.0 + dx, saved.1 + dy);
        let out = f(self);
        self.origin = saved;
        out
    }

    /// Run `f` with drawing restricted to `rect` (intersected with the
    /// current clip).
    pub fn clipped<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Canvas) -> R) -> R {
        let saved = self.clip;
        self.clip = saved.intersect(self.device_bounds(rect));
        let out = f(self);
        self.clip = saved;
        out
    }

    /// Composite `color` onto one device pixel with the given coverage.
    pub fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < self.clip.x0 || x >= self.clip.x1 || y < self.clip.y0 || y >= self.clip.y1 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        blend_pixel(pixel, color, coverage);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let b = self.device_bounds(rect).intersect(self.clip);
        if b.is_empty() || color[3] == 0 {
            return;
        }
        for y in b.y0..b.y1 {
            for x in b.x0..b.x1 {
                blend_pixel(self.image.get_pixel_mut(x as u32, y as u32), color, 1.0);
            }
        }
    }

    /// Fill a rectangle with independently rounded corners, anti-aliased
    /// along the curves.
    pub fn fill_round_rect(&mut self, rect: Rect, corners: Corners, color: Color) {
        let (fx0, fy0) = self.to_device(rect.x, rect.y);
        let (fx1, fy1) = self.to_device(rect.right(), rect.bottom());
        let limit = ((fx1 - fx0).min(fy1 - fy0) / 2.0).max(0.0);
        let r = corners.scaled(self.scale, limit);

        let b = Bounds {
            x0: fx0.floor() as i32,
            y0: fy0.floor() as i32,
            x1: fx1.ceil() as i32,
            y1: fy1.ceil() as i32,
        }
        .intersect(self.clip);
        if b.is_empty() || color[3] == 0 {
            return;
        }

        for y in b.y0..b.y1 {
            let py = y as f32 + 0.5;
            for x in b.x0..b.x1 {
                let px = x as f32 + 0.5;
                let edge = edge_coverage(px, fx0, fx1) * edge_coverage(py, fy0, fy1);
                if edge <= 0.0 {
                    continue;
                }
                let corner = corner_coverage(px, py, fx0, fy0, fx1, fy1, &r);
                let coverage = edge * corner;
                if coverage > 0.0 {
                    blend_pixel(self.image.get_pixel_mut(x as u32, y as u32), color, coverage);
                }
            }
        }
    }

    /// Paint the parts of `rect` that lie outside its rounded corners.
    ///
    /// Used to round off content that was drawn with a rectangular clip.
    pub fn fill_corner_cutouts(&mut self, rect: Rect, corners: Corners, color: Color) {
        let (fx0, fy0) = self.to_device(rect.x, rect.y);
        let (fx1, fy1) = self.to_device(rect.right(), rect.bottom());
        let limit = ((fx1 - fx0).min(fy1 - fy0) / 2.0).max(0.0);
        let r = corners.scaled(self.scale, limit);

        let b = Bounds {
            x0: fx0.floor() as i32,
            y0: fy0.floor() as i32,
            x1: fx1.ceil() as i32,
            y1: fy1.ceil() as i32,
        }
        .intersect(self.clip);
        if b.is_empty() || color[3] == 0 {
            return;
        }

        for y in b.y0..b.y1 {
            let py = y as f32 + 0.5;
            for x in b.x0..b.x1 {
                let px = x as f32 + 0.5;
                let corner = corner_coverage(px, py, fx0, fy0, fx1, fy1, &r);
                if corner >= 1.0 {
                    continue;
                }
                let edge = edge_coverage(px, fx0, fx1) * edge_coverage(py, fy0, fy1);
                let coverage = edge * (1.0 - corner);
                if coverage > 0.0 {
                    blend_pixel(self.image.get_pixel_mut(x as u32, y as u32), color, coverage);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let rect = Rect::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0);
        self.fill_round_rect(rect, Corners::all(radius), color);
    }

    /// Draw `source` stretched over `rect`.
    pub fn draw_image(&mut self, source: &RgbaImage, rect: Rect) {
        self.draw_image_masked(source, rect, None);
    }

    /// Draw `source` cropped to cover a circle centred at `(cx, cy)`.
    pub fn draw_image_circle(&mut self, source: &RgbaImage, cx: f32, cy: f32, radius: f32) {
        let rect = Rect::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0);
        let side = (radius * 2.0 * self.scale).round().max(1.0) as u32;
        let mut mask = GrayImage::new(side, side);
        let center = (side / 2) as i32;
        draw_filled_circle_mut(&mut mask, (center, center), center, Luma([255u8]));

        let square = cover_crop(source);
        self.draw_image_masked(&square, rect, Some(&mask));
    }

    fn draw_image_masked(&mut self, source: &RgbaImage, rect: Rect, mask: Option<&GrayImage>) {
        let dest = self.device_bounds(rect);
        let (w, h) = ((dest.x1 - dest.x0).max(0) as u32, (dest.y1 - dest.y0).max(0) as u32);
        if w == 0 || h == 0 || source.width() == 0 || source.height() == 0 {
            return;
        }
        let resized = image::imageops::resize(source, w, h, image::imageops::FilterType::Triangle);
        let visible = dest.intersect(self.clip);
        if visible.is_empty() {
            return;
        }
        for y in visible.y0..visible.y1 {
            for x in visible.x0..visible.x1 {
                let (sx, sy) = ((x - dest.x0) as u32, (y - dest.y0) as u32);
                let coverage = match mask {
                    Some(m) if sx < m.width() && sy < m.height() => m.get_pixel(sx, sy)[0] as f32 / 255.0,
                    Some(_) => 0.0,
                    None => 1.0,
                };
                let src = resized.get_pixel(sx, sy).0;
                blend_pixel(self.image.get_pixel_mut(x as u32, y as u32), src, coverage);
            }
        }
    }

    /// Repeat `tile` at its natural logical size across `rect`, anchored at
    /// the rectangle's top-left corner.
    pub fn tile_image(&mut self, tile: &RgbaImage, rect: Rect) {
        let (tw, th) = (tile.width(), tile.height());
        if tw == 0 || th == 0 {
            return;
        }
        let dest = self.device_bounds(rect);
        let visible = dest.intersect(self.clip);
        if visible.is_empty() {
            return;
        }
        for y in visible.y0..visible.y1 {
            let ly = ((y - dest.y0) as f32 + 0.5) / self.scale;
            let sy = (ly.floor() as u32) % th;
            for x in visible.x0..visible.x1 {
                let lx = ((x - dest.x0) as f32 + 0.5) / self.scale;
                let sx = (lx.floor() as u32) % tw;
                let src = tile.get_pixel(sx, sy).0;
                blend_pixel(self.image.get_pixel_mut(x as u32, y as u32), src, 1.0);
            }
        }
    }
}

/// Centre-crop to a square so circular avatars keep their aspect ratio.
fn cover_crop(source: &RgbaImage) -> RgbaImage {
    let side = source.width().min(source.height());
    let x = (source.width() - side) / 2;
    let y = (source.height() - side) / 2;
    image::imageops::crop_imm(source, x, y, side, side).to_image()
}

fn edge_coverage(p: f32, lo: f32, hi: f32) -> f32 {
    ((p - lo + 0.5).min(hi - p + 0.5)).clamp(0.0, 1.0)
}

fn corner_coverage(px: f32, py: f32, x0: f32, y0: f32, x1: f32, y1: f32, r: &Corners) -> f32 {
    let (cx, cy, radius) = if px < x0 + r.top_left && py < y0 + r.top_left {
        (x0 + r.top_left, y0 + r.top_left, r.top_left)
    } else if px > x1 - r.top_right && py < y0 + r.top_right {
        (x1 - r.top_right, y0 + r.top_right, r.top_right)
    } else if px > x1 - r.bottom_right && py > y1 - r.bottom_right {
        (x1 - r.bottom_right, y1 - r.bottom_right, r.bottom_right)
    } else if px < x0 + r.bottom_left && py > y1 - r.bottom_left {
        (x0 + r.bottom_left, y1 - r.bottom_left, r.bottom_left)
    } else {
        return 1.0;
    };
    let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
    (radius - dist + 0.5).clamp(0.0, 1.0)
}

/// Source-over compositing of a straight-alpha colour.
fn blend_pixel(dst: &mut Rgba<u8>, src: Color, coverage: f32) {
    let sa = f32::from(src[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let v = (f32::from(src[c]) * sa + f32::from(dst[c]) * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

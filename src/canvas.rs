// Canvas surface module
// The viewport-sized bitmap that filters render into and strokes paint onto

use crate::image_loader::ImageData;
use image::{imageops::FilterType, Rgba, RgbaImage};

/// Radius of the dot painted when a stroke starts
pub const DOT_RADIUS: f32 = 5.0;

/// Width of stroke segments
pub const STROKE_WIDTH: f32 = 10.0;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A point in canvas-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Mutable bitmap whose size tracks the viewport
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    pixels: RgbaImage,
}

impl CanvasSurface {
    /// Create a canvas of the given size, fully transparent
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Current pixels
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Owned copy of the current pixels
    pub fn snapshot(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Match the bitmap to the viewport. A size change discards all content;
    /// the same size leaves the bitmap alone. Returns whether the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.pixels.dimensions() == (width, height) {
            return false;
        }
        self.pixels = RgbaImage::new(width, height);
        true
    }

    /// Fill the whole bitmap with opaque white
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = WHITE;
        }
    }

    /// Filled circle of `DOT_RADIUS` centered on `at`
    pub fn paint_dot(&mut self, at: Point, color: Rgba<u8>) {
        self.fill_where(at, at, DOT_RADIUS, color);
    }

    /// Round-capped line of `STROKE_WIDTH` from `from` to `to`
    pub fn draw_stroke(&mut self, from: Point, to: Point, color: Rgba<u8>) {
        self.fill_where(from, to, STROKE_WIDTH / 2.0, color);
    }

    /// Replace the content with `image` scaled to fit and centered on white
    pub fn draw_image_fitted(&mut self, image: &ImageData) {
        self.clear();
        let (cw, ch) = self.pixels.dimensions();
        if cw == 0 || ch == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }

        let (w, h) = fit_within(image.width(), image.height(), cw, ch);
        let scaled;
        let src = if (w, h) == (image.width(), image.height()) {
            &image.rgba
        } else {
            scaled = image::imageops::resize(&image.rgba, w, h, FilterType::Triangle);
            &scaled
        };

        let x = i64::from((cw - w) / 2);
        let y = i64::from((ch - h) / 2);
        image::imageops::overlay(&mut self.pixels, src, x, y);
    }

    /// Paint every pixel whose center lies within `radius` of the segment `a`-`b`.
    /// A zero-length segment is a disc; otherwise a capsule, which gives round
    /// caps and joins.
    fn fill_where(&mut self, a: Point, b: Point, radius: f32, color: Rgba<u8>) {
        let (w, h) = self.pixels.dimensions();
        if w == 0 || h == 0 {
            return;
        }

        let min_x = (a.x.min(b.x) - radius).floor().max(0.0) as u32;
        let min_y = (a.y.min(b.y) - radius).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x) + radius).ceil().min(w as f32 - 1.0);
        let max_y = (a.y.max(b.y) + radius).ceil().min(h as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        let r2 = radius * radius;
        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let p = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                if distance_sq_to_segment(p, a, b) <= r2 {
                    self.pixels.put_pixel(px, py, color);
                }
            }
        }
    }
}

/// Largest size with the image's aspect ratio that fits in the bounds
fn fit_within(img_w: u32, img_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let scale = (max_w as f32 / img_w as f32).min(max_h as f32 / img_h as f32);
    let w = ((img_w as f32 * scale).round() as u32).clamp(1, max_w);
    let h = ((img_h as f32 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}

fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    (p.x - cx).powi(2) + (p.y - cy).powi(2)
}

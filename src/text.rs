// Text rendering module
// Shapes and rasterizes UI labels with cosmic-text into the frame buffer

use crate::overlay::Frame;
use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache};
use std::collections::HashMap;

/// Shaped buffers kept before the cache is flushed
const MAX_CACHED_LABELS: usize = 64;

/// Text, size and wrap width, with the floats stored as bits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LabelKey {
    text: String,
    size: u32,
    max_width: Option<u32>,
}

impl LabelKey {
    fn new(text: &str, size: f32, max_width: Option<f32>) -> Self {
        Self {
            text: text.to_string(),
            size: size.to_bits(),
            max_width: max_width.map(f32::to_bits),
        }
    }
}

/// Owns the font database, glyph cache and shaped labels. Loading system
/// fonts is slow, so one painter lives for the whole session.
pub struct TextPainter {
    font_system: FontSystem,
    swash_cache: SwashCache,
    labels: HashMap<LabelKey, Buffer>,
}

impl TextPainter {
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    fn with_font_system(font_system: FontSystem) -> Self {
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            labels: HashMap::new(),
        }
    }

    fn shape(font_system: &mut FontSystem, text: &str, size: f32, max_width: Option<f32>) -> Buffer {
        let metrics = Metrics::new(size, size * 1.3);
        let mut buffer = Buffer::new(font_system, metrics);
        buffer.set_size(font_system, max_width, None);
        buffer.set_text(font_system, text, Attrs::new().family(Family::SansSerif), Shaping::Advanced);
        buffer.shape_until_scroll(font_system, false);
        buffer
    }

    /// Make sure `text` is shaped and cached
    fn ensure_shaped(&mut self, key: &LabelKey, text: &str, size: f32, max_width: Option<f32>) {
        if self.labels.contains_key(key) {
            return;
        }
        if self.labels.len() >= MAX_CACHED_LABELS {
            self.labels.clear();
        }
        let buffer = Self::shape(&mut self.font_system, text, size, max_width);
        self.labels.insert(key.clone(), buffer);
    }

    /// Width and height of `text` laid out within `max_width`
    pub fn measure(&mut self, text: &str, size: f32, max_width: Option<f32>) -> (f32, f32) {
        let key = LabelKey::new(text, size, max_width);
        self.ensure_shaped(&key, text, size, max_width);
        let Some(buffer) = self.labels.get(&key) else {
            return (0.0, 0.0);
        };
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height = height.max(run.line_top + run.line_height);
        }
        (width, height)
    }

    /// Draw `text` with its top-left corner at (x, y), wrapping at `max_width`
    pub fn draw(
        &mut self,
        frame: &mut Frame<'_>,
        x: i32,
        y: i32,
        text: &str,
        size: f32,
        max_width: Option<f32>,
        rgb: [u8; 3],
    ) {
        let key = LabelKey::new(text, size, max_width);
        self.ensure_shaped(&key, text, size, max_width);
        let Some(buffer) = self.labels.get_mut(&key) else {
            return;
        };
        let color = Color::rgb(rgb[0], rgb[1], rgb[2]);
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            color,
            |gx, gy, w, h, c| {
                if c.a() == 0 {
                    return;
                }
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        frame.blend_pixel(x + gx + dx, y + gy + dy, [c.r(), c.g(), c.b()], c.a());
                    }
                }
            },
        );
    }
}

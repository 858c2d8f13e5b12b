// Overlay module
// Software rendering of the toolbar, preset menu and notice box, plus the
// hit testing that turns clicks on them into UI events

use crate::app::UiEvent;
use crate::filters::{Preset, ORIGINAL};
use crate::text::TextPainter;
use image::{Rgba, RgbaImage};

/// Height of the toolbar strip above the canvas
pub const TOOLBAR_HEIGHT: u32 = 48;

/// Menu geometry
pub const MENU_ITEM_HEIGHT: u32 = 25;
pub const MENU_WIDTH: u32 = 180;

const TOOLBAR_BG: [u8; 4] = [40, 40, 40, 255];
const BUTTON_BG: [u8; 4] = [70, 70, 70, 255];
const BUTTON_ACTIVE_BG: [u8; 4] = [40, 120, 200, 255];
const BUTTON_MARGIN: u32 = 4;
const LABEL_SIZE: f32 = 14.0;
/// Shown behind transparent canvas pixels
const BACKDROP: [u8; 3] = [224, 224, 224];

/// A BGRA (wl_shm Argb8888) pixel buffer
pub struct Frame<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a mut [u8], width: u32, height: u32) -> Self {
        Self { data, width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        (idx + 3 < self.data.len()).then_some(idx)
    }

    /// Alpha-blend one pixel
    pub fn blend_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3], alpha: u8) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let a = alpha as u32;
        let px = &mut self.data[idx..idx + 4];
        px[0] = ((rgb[2] as u32 * a + px[0] as u32 * (255 - a)) / 255) as u8;
        px[1] = ((rgb[1] as u32 * a + px[1] as u32 * (255 - a)) / 255) as u8;
        px[2] = ((rgb[0] as u32 * a + px[2] as u32 * (255 - a)) / 255) as u8;
        px[3] = 255;
    }

    /// Fill a rectangle with an RGBA color, blending when not opaque
    pub fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]) {
        for y in rect.y..rect.y + rect.h as i32 {
            for x in rect.x..rect.x + rect.w as i32 {
                self.blend_pixel(x, y, [rgba[0], rgba[1], rgba[2]], rgba[3]);
            }
        }
    }

    /// One-pixel outline
    pub fn stroke_rect(&mut self, rect: Rect, rgba: [u8; 4]) {
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.x + rect.w as i32 - 1, rect.y + rect.h as i32 - 1);
        for x in x0..=x1 {
            self.blend_pixel(x, y0, [rgba[0], rgba[1], rgba[2]], rgba[3]);
            self.blend_pixel(x, y1, [rgba[0], rgba[1], rgba[2]], rgba[3]);
        }
        for y in y0..=y1 {
            self.blend_pixel(x0, y, [rgba[0], rgba[1], rgba[2]], rgba[3]);
            self.blend_pixel(x1, y, [rgba[0], rgba[1], rgba[2]], rgba[3]);
        }
    }

    /// Copy the canvas in at row `top`, compositing transparency over the backdrop
    pub fn blit_canvas(&mut self, canvas: &RgbaImage, top: u32) {
        for (x, y, &Rgba([r, g, b, a])) in canvas.enumerate_pixels() {
            let (fx, fy) = (x as i32, (y + top) as i32);
            let Some(idx) = self.index(fx, fy) else {
                continue;
            };
            let px = &mut self.data[idx..idx + 4];
            px.copy_from_slice(&[BACKDROP[2], BACKDROP[1], BACKDROP[0], 255]);
            self.blend_pixel(fx, fy, [r, g, b], a);
        }
    }
}

/// Axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && py >= self.y as f64
            && px < (self.x + self.w as i32) as f64
            && py < (self.y + self.h as i32) as f64
    }
}

/// Toolbar buttons, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
    Swatch,
    PaintMode,
    Reset,
    TakePicture,
    Save,
    Original,
}

impl ToolbarButton {
    pub const ALL: [ToolbarButton; 6] = [
        ToolbarButton::Swatch,
        ToolbarButton::PaintMode,
        ToolbarButton::Reset,
        ToolbarButton::TakePicture,
        ToolbarButton::Save,
        ToolbarButton::Original,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolbarButton::Swatch => "Color",
            ToolbarButton::PaintMode => "Paint",
            ToolbarButton::Reset => "Reset",
            ToolbarButton::TakePicture => "Photo",
            ToolbarButton::Save => "Save",
            ToolbarButton::Original => "Original",
        }
    }

    /// Event fired when the button is clicked
    pub fn event(self) -> UiEvent {
        match self {
            ToolbarButton::Swatch => UiEvent::SwatchClicked,
            ToolbarButton::PaintMode => UiEvent::PaintModeToggled,
            ToolbarButton::Reset => UiEvent::ResetClicked,
            ToolbarButton::TakePicture => UiEvent::CaptureClicked,
            ToolbarButton::Save => UiEvent::SaveClicked,
            ToolbarButton::Original => UiEvent::PresetClicked(ORIGINAL.to_string()),
        }
    }
}

/// Equal-width buttons spread across the toolbar
pub fn toolbar_layout(width: u32) -> Vec<(ToolbarButton, Rect)> {
    let count = ToolbarButton::ALL.len() as u32;
    let slot = width / count;
    ToolbarButton::ALL
        .iter()
        .enumerate()
        .map(|(i, &button)| {
            let rect = Rect::new(
                (i as u32 * slot + BUTTON_MARGIN) as i32,
                BUTTON_MARGIN as i32,
                slot.saturating_sub(BUTTON_MARGIN * 2),
                TOOLBAR_HEIGHT - BUTTON_MARGIN * 2,
            );
            (button, rect)
        })
        .collect()
}

/// Button under the pointer, if any
pub fn toolbar_hit(width: u32, x: f64, y: f64) -> Option<ToolbarButton> {
    toolbar_layout(width)
        .into_iter()
        .find(|(_, rect)| rect.contains(x, y))
        .map(|(button, _)| button)
}

/// What the toolbar reflects from the session
pub struct ToolbarView {
    pub swatch: [u8; 3],
    pub paint_mode_active: bool,
    /// Some while a device request is outstanding; animates the photo/save buttons
    pub busy_phase: Option<f32>,
}

pub fn draw_toolbar(frame: &mut Frame<'_>, text: &mut TextPainter, view: &ToolbarView) {
    let width = frame.width();
    frame.fill_rect(Rect::new(0, 0, width, TOOLBAR_HEIGHT), TOOLBAR_BG);

    for (button, rect) in toolbar_layout(width) {
        let bg = match button {
            ToolbarButton::PaintMode if view.paint_mode_active => BUTTON_ACTIVE_BG,
            _ => BUTTON_BG,
        };
        frame.fill_rect(rect, bg);

        if button == ToolbarButton::Swatch {
            let chip = Rect::new(rect.x + 6, rect.y + 6, 28, rect.h.saturating_sub(12));
            frame.fill_rect(chip, [view.swatch[0], view.swatch[1], view.swatch[2], 255]);
            frame.stroke_rect(chip, [200, 200, 200, 255]);
        }

        if let (Some(phase), ToolbarButton::TakePicture | ToolbarButton::Save) = (view.busy_phase, button) {
            let pulse = (phase * std::f32::consts::TAU).sin() * 0.5 + 0.5;
            let bar = Rect::new(rect.x, rect.y + rect.h as i32 - 3, (rect.w as f32 * pulse) as u32, 3);
            frame.fill_rect(bar, [230, 180, 40, 255]);
        }

        let label = button.label();
        let (tw, th) = text.measure(label, LABEL_SIZE, None);
        let label_x = if button == ToolbarButton::Swatch {
            rect.x + 40
        } else {
            rect.x + ((rect.w as f32 - tw) / 2.0) as i32
        };
        let label_y = rect.y + ((rect.h as f32 - th) / 2.0) as i32;
        text.draw(frame, label_x, label_y, label, LABEL_SIZE, None, [255, 255, 255]);
    }
}

/// Right-click menu listing the filter presets
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PresetMenu {
    visible: bool,
    pos: (i32, i32),
    hover: Option<usize>,
}

impl PresetMenu {
    /// Preset names in menu order, "original" first
    pub fn items() -> Vec<&'static str> {
        std::iter::once(ORIGINAL)
            .chain(Preset::ALL.iter().map(|p| p.name()))
            .collect()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show at the pointer, shifted to stay inside the surface
    pub fn open_at(&mut self, x: f64, y: f64, width: u32, height: u32) {
        let menu_height = (Self::items().len() as u32 * MENU_ITEM_HEIGHT) as i32;
        let mut pos = (x as i32, y as i32);
        if pos.0 + MENU_WIDTH as i32 > width as i32 {
            pos.0 = width as i32 - MENU_WIDTH as i32;
        }
        if pos.1 + menu_height > height as i32 {
            pos.1 = height as i32 - menu_height;
        }
        self.pos = (pos.0.max(0), pos.1.max(0));
        self.visible = true;
        self.hover = None;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.hover = None;
    }

    /// Index of the item under the pointer
    pub fn item_at(&self, x: f64, y: f64) -> Option<usize> {
        if !self.visible {
            return None;
        }
        let count = Self::items().len();
        let area = Rect::new(self.pos.0, self.pos.1, MENU_WIDTH, count as u32 * MENU_ITEM_HEIGHT);
        if !area.contains(x, y) {
            return None;
        }
        let idx = ((y - self.pos.1 as f64) / MENU_ITEM_HEIGHT as f64) as usize;
        (idx < count).then_some(idx)
    }

    /// Update the hovered item; returns whether it changed
    pub fn hover(&mut self, x: f64, y: f64) -> bool {
        let hover = self.item_at(x, y);
        let changed = hover != self.hover;
        self.hover = hover;
        changed
    }

    pub fn draw(&self, frame: &mut Frame<'_>, text: &mut TextPainter) {
        if !self.visible {
            return;
        }
        let items = Self::items();
        for (i, item) in items.iter().enumerate() {
            let row = Rect::new(
                self.pos.0,
                self.pos.1 + (i as u32 * MENU_ITEM_HEIGHT) as i32,
                MENU_WIDTH,
                MENU_ITEM_HEIGHT,
            );
            let bg = if self.hover == Some(i) {
                [80, 180, 180, 230]
            } else {
                [60, 60, 60, 230]
            };
            frame.fill_rect(row, bg);
            text.draw(frame, row.x + 10, row.y + 4, item, LABEL_SIZE, None, [255, 255, 255]);
        }
        let outline = Rect::new(self.pos.0, self.pos.1, MENU_WIDTH, items.len() as u32 * MENU_ITEM_HEIGHT);
        frame.stroke_rect(outline, [100, 100, 100, 255]);
    }
}

fn notice_width(surface_width: u32) -> u32 {
    surface_width.saturating_sub(40).min(420)
}

/// Notice box centered on the surface, tall enough for `text_height`
pub fn notice_bounds(width: u32, height: u32, text_height: f32) -> Rect {
    let box_w = notice_width(width);
    let box_h = text_height as u32 + 80;
    Rect::new(
        (width.saturating_sub(box_w) / 2) as i32,
        (height.saturating_sub(box_h) / 2) as i32,
        box_w,
        box_h,
    )
}

/// Centered notice box over a dimmed screen. Returns the box bounds,
/// which are what a dismissing click has to hit.
pub fn draw_notice(frame: &mut Frame<'_>, text: &mut TextPainter, message: &str) -> Rect {
    let (width, height) = (frame.width(), frame.height());
    frame.fill_rect(Rect::new(0, 0, width, height), [0, 0, 0, 140]);

    let wrap = notice_width(width).saturating_sub(40) as f32;
    let (_, text_h) = text.measure(message, 16.0, Some(wrap));
    let bounds = notice_bounds(width, height, text_h);

    frame.fill_rect(bounds, [250, 250, 250, 255]);
    frame.stroke_rect(bounds, [120, 120, 120, 255]);
    text.draw(frame, bounds.x + 20, bounds.y + 20, message, 16.0, Some(wrap), [20, 20, 20]);

    let hint = "OK";
    let (hint_w, _) = text.measure(hint, LABEL_SIZE, None);
    text.draw(
        frame,
        bounds.x + bounds.w as i32 - 20 - hint_w as i32,
        bounds.y + bounds.h as i32 - 30,
        hint,
        LABEL_SIZE,
        None,
        [40, 120, 200],
    );
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_hit_maps_to_events() {
        let width = 600;
        let layout = toolbar_layout(width);
        assert_eq!(layout.len(), 6);
        for (button, rect) in &layout {
            let (cx, cy) = (rect.x as f64 + rect.w as f64 / 2.0, rect.y as f64 + rect.h as f64 / 2.0);
            assert_eq!(toolbar_hit(width, cx, cy), Some(*button));
        }
        assert_eq!(toolbar_hit(width, 10.0, TOOLBAR_HEIGHT as f64 + 5.0), None);
        assert_eq!(ToolbarButton::Reset.event(), UiEvent::ResetClicked);
        assert_eq!(ToolbarButton::Original.event(), UiEvent::PresetClicked("original".to_string()));
    }

    #[test]
    fn menu_lists_original_then_presets() {
        let items = PresetMenu::items();
        assert_eq!(items[0], "original");
        assert_eq!(items.len(), Preset::ALL.len() + 1);
        assert!(items.contains(&"crossProcess"));
    }

    #[test]
    fn menu_is_kept_inside_and_hit_tested() {
        let mut menu = PresetMenu::default();
        assert_eq!(menu.item_at(5.0, 5.0), None);

        menu.open_at(590.0, 590.0, 600, 600);
        let height = PresetMenu::items().len() as i32 * MENU_ITEM_HEIGHT as i32;
        assert_eq!(menu.pos, (600 - MENU_WIDTH as i32, 600 - height));

        let (x, y) = (menu.pos.0 as f64 + 5.0, menu.pos.1 as f64 + MENU_ITEM_HEIGHT as f64 * 1.5);
        assert_eq!(menu.item_at(x, y), Some(1));
        assert!(menu.hover(x, y));
        assert!(!menu.hover(x, y));

        menu.close();
        assert_eq!(menu.item_at(x, y), None);
    }

    #[test]
    fn notice_box_is_centered_and_clickable() {
        let bounds = notice_bounds(800, 600, 40.0);
        assert_eq!(bounds, Rect::new(190, 240, 420, 120));
        assert!(bounds.contains(400.0, 300.0));
        assert!(!bounds.contains(10.0, 10.0));

        let narrow = notice_bounds(100, 600, 40.0);
        assert_eq!((narrow.x, narrow.w), (20, 60));
    }

    #[test]
    fn frame_blending_writes_bgra() {
        let mut data = vec![0u8; 2 * 2 * 4];
        let mut frame = Frame::new(&mut data, 2, 2);
        frame.blend_pixel(1, 0, [255, 0, 0], 255);
        frame.blend_pixel(5, 5, [255, 0, 0], 255);
        assert_eq!(&data[4..8], &[0, 0, 255, 255]);
    }

    #[test]
    fn canvas_transparency_shows_backdrop() {
        let mut canvas = RgbaImage::new(1, 2);
        canvas.put_pixel(0, 1, Rgba([0, 255, 0, 255]));
        let mut data = vec![0u8; 3 * 4];
        let mut frame = Frame::new(&mut data, 1, 3);
        frame.blit_canvas(&canvas, 1);
        assert_eq!(&data[0..4], &[0, 0, 0, 0]);
        assert_eq!(&data[4..8], &[BACKDROP[2], BACKDROP[1], BACKDROP[0], 255]);
        assert_eq!(&data[8..12], &[0, 255, 0, 255]);
    }
}

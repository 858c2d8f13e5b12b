// Application controller module
// Owns the session state and routes UI events to the canvas, filters,
// paint tool and device bridge

use crate::bridge::{CameraConfig, CaptureRequest, Completion, DeviceBridge, Platform, SaveRequest, BridgeError};
use crate::canvas::{CanvasSurface, Point};
use crate::filters::{FilterApplier, FilterSelection};
use crate::image_loader::ImageData;
use crate::notice::Notice;
use crate::paint::{PaintTool, StrokeOp};
use crate::palette::{NamedColor, Palette};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::sync::Arc;

/// Input the frontend feeds into the controller
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The host finished starting up; nothing is handled before this
    Ready { width: u32, height: u32 },
    Resize { width: u32, height: u32 },
    SwatchClicked,
    ResetClicked,
    PaintModeToggled,
    PresetClicked(String),
    CaptureClicked,
    SaveClicked,
    DragStart(Point),
    DragMove(Point),
    DragEnd,
}

/// State shared by the event handlers for the lifetime of the screen
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub current_color_index: usize,
    pub paint_mode_active: bool,
    pub last_loaded_image: Option<Arc<ImageData>>,
}

/// Main application controller
pub struct AppController<B: DeviceBridge> {
    session: SessionState,
    palette: Palette,
    platform: Platform,
    bridge: B,
    canvas: CanvasSurface,
    filters: FilterApplier,
    paint: PaintTool,
    /// Stand-in photo for hosts without a camera
    placeholder: Arc<ImageData>,
    ready: bool,
    /// Generation of the most recently issued image load
    load_generation: u64,
    loads: Vec<(u64, CaptureRequest)>,
    saves: Vec<SaveRequest>,
    notices: VecDeque<Notice>,
}

impl<B: DeviceBridge> AppController<B> {
    pub fn new(palette: Palette, platform: Platform, bridge: B, placeholder: ImageData) -> Self {
        Self {
            session: SessionState::default(),
            palette,
            platform,
            bridge,
            canvas: CanvasSurface::new(0, 0),
            filters: FilterApplier::new(),
            paint: PaintTool::new(),
            placeholder: Arc::new(placeholder),
            ready: false,
            load_generation: 0,
            loads: Vec::new(),
            saves: Vec::new(),
            notices: VecDeque::new(),
        }
    }

    /// Image shown once the screen is ready
    pub fn with_initial_image(mut self, image: ImageData) -> Self {
        self.session.last_loaded_image = Some(Arc::new(image));
        self
    }

    #[cfg(test)]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn canvas(&self) -> &CanvasSurface {
        &self.canvas
    }

    #[cfg(test)]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[cfg(test)]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Color strokes are painted with
    pub fn current_color(&self) -> NamedColor {
        self.palette.get(self.session.current_color_index)
    }

    pub fn paint_mode_active(&self) -> bool {
        self.session.paint_mode_active
    }

    /// Whether any device request is still outstanding
    pub fn is_busy(&self) -> bool {
        !self.loads.is_empty() || !self.saves.is_empty()
    }

    /// The notice currently blocking input, if any
    pub fn current_notice(&self) -> Option<Notice> {
        self.notices.front().copied()
    }

    /// Close the current notice. Returns whether one was open.
    pub fn dismiss_notice(&mut self) -> bool {
        self.notices.pop_front().is_some()
    }

    /// Handle one UI event. Returns whether anything visible changed.
    pub fn handle(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::Ready { width, height } => {
                if self.ready {
                    return self.resize(width, height);
                }
                info!("Screen ready at {}x{}", width, height);
                self.ready = true;
                self.resize(width, height);
                if let Some(image) = self.session.last_loaded_image.clone() {
                    self.filters.apply_preset(&mut self.canvas, &image, None);
                }
                true
            }
            _ if !self.ready => {
                debug!("Ignoring {:?} before ready", event);
                false
            }
            UiEvent::Resize { width, height } => self.resize(width, height),
            // A drag that started before a notice opened still has to finish
            UiEvent::DragEnd => {
                self.paint.drag_end();
                false
            }
            _ if self.current_notice().is_some() => {
                debug!("Ignoring {:?} while a notice is open", event);
                false
            }
            UiEvent::SwatchClicked => {
                self.session.current_color_index = self.palette.next_index(self.session.current_color_index);
                info!("Color: {}", self.current_color().name);
                true
            }
            UiEvent::ResetClicked => {
                self.canvas.clear();
                true
            }
            UiEvent::PaintModeToggled => {
                self.session.paint_mode_active = !self.session.paint_mode_active;
                info!("Paint mode: {}", self.session.paint_mode_active);
                true
            }
            UiEvent::PresetClicked(name) => self.apply_preset(&name),
            UiEvent::CaptureClicked => self.take_picture(),
            UiEvent::SaveClicked => self.save_to_gallery(),
            UiEvent::DragStart(at) => {
                let op = self.paint.drag_start(self.session.paint_mode_active, at);
                self.draw(op)
            }
            UiEvent::DragMove(to) => {
                let op = self.paint.drag_move(self.session.paint_mode_active, to);
                self.draw(op)
            }
        }
    }

    /// Apply finished device requests. Returns whether anything visible changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        let mut finished = Vec::new();
        self.loads.retain_mut(|(generation, request)| match request.try_complete() {
            Completion::Waiting => true,
            Completion::Done(result) => {
                finished.push((*generation, result));
                false
            }
            Completion::Abandoned => {
                finished.push((*generation, Err(BridgeError::Abandoned)));
                false
            }
        });
        for (generation, result) in finished {
            if generation != self.load_generation {
                debug!("Dropping stale image load #{} (latest #{})", generation, self.load_generation);
                continue;
            }
            match result {
                Ok(image) => {
                    info!("Loaded image {}x{}", image.width(), image.height());
                    let image = Arc::new(image);
                    self.session.last_loaded_image = Some(image.clone());
                    self.filters.apply_preset(&mut self.canvas, &image, None);
                }
                Err(e) => {
                    warn!("Capture failed: {}", e);
                    self.notices.push_back(Notice::CaptureFailed);
                }
            }
            changed = true;
        }

        let mut saved = Vec::new();
        self.saves.retain_mut(|request| match request.try_complete() {
            Completion::Waiting => true,
            Completion::Done(result) => {
                saved.push(result);
                false
            }
            Completion::Abandoned => {
                saved.push(Err(BridgeError::Abandoned));
                false
            }
        });
        for result in saved {
            match result {
                Ok(path) => {
                    info!("Saved to gallery: {}", path.display());
                    self.notices.push_back(Notice::SavedToGallery);
                }
                Err(e) => {
                    warn!("Save failed: {}", e);
                    self.notices.push_back(Notice::SaveFailed);
                }
            }
            changed = true;
        }

        changed
    }

    fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.canvas.resize(width, height) {
            debug!("Canvas resized to {}x{}", width, height);
            true
        } else {
            false
        }
    }

    fn draw(&mut self, op: Option<StrokeOp>) -> bool {
        let color = self.current_color().rgba;
        match op {
            Some(StrokeOp::Dot(at)) => self.canvas.paint_dot(at, color),
            Some(StrokeOp::Segment { from, to }) => self.canvas.draw_stroke(from, to, color),
            None => return false,
        }
        true
    }

    fn apply_preset(&mut self, name: &str) -> bool {
        let selection = match name.parse::<FilterSelection>() {
            Ok(selection) => selection,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };
        let Some(image) = self.session.last_loaded_image.clone() else {
            debug!("No image loaded, ignoring preset {}", name);
            return false;
        };
        info!("Applying preset {}", name);
        self.filters.apply_preset(&mut self.canvas, &image, Some(selection));
        true
    }

    fn take_picture(&mut self) -> bool {
        self.load_generation += 1;
        let request = if self.platform.is_native() {
            let config = CameraConfig::for_canvas_height(self.canvas.height());
            info!("Requesting photo (target height {})", config.target_height);
            self.bridge.get_picture(&config)
        } else {
            self.notices.push_back(Notice::CaptureUnavailable);
            CaptureRequest::ready(Ok((*self.placeholder).clone()))
        };
        self.loads.push((self.load_generation, request));
        true
    }

    fn save_to_gallery(&mut self) -> bool {
        if !self.platform.is_native() {
            self.notices.push_back(Notice::SaveUnavailable);
            return true;
        }
        info!("Saving {}x{} canvas to gallery", self.canvas.width(), self.canvas.height());
        let request = self.bridge.save_image_data_to_library(self.canvas.snapshot());
        self.saves.push(request);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Pending;
    use futures::channel::oneshot;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    type CaptureSender = oneshot::Sender<Result<ImageData, BridgeError>>;
    type SaveSender = oneshot::Sender<Result<PathBuf, BridgeError>>;

    /// Bridge that records calls and lets the test complete them
    #[derive(Default)]
    struct ScriptedBridge {
        pictures: Vec<(CameraConfig, CaptureSender)>,
        saves: Vec<(RgbaImage, SaveSender)>,
    }

    impl DeviceBridge for ScriptedBridge {
        fn get_picture(&mut self, config: &CameraConfig) -> CaptureRequest {
            let (tx, pending) = Pending::channel();
            self.pictures.push((*config, tx));
            pending
        }

        fn save_image_data_to_library(&mut self, image: RgbaImage) -> SaveRequest {
            let (tx, pending) = Pending::channel();
            self.saves.push((image, tx));
            pending
        }
    }

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> ImageData {
        ImageData::new(RgbaImage::from_pixel(w, h, Rgba([rgb[0], rgb[1], rgb[2], 255])))
    }

    fn controller(platform: Platform) -> AppController<ScriptedBridge> {
        let mut app = AppController::new(
            Palette::default(),
            platform,
            ScriptedBridge::default(),
            solid(4, 4, [9, 9, 9]),
        );
        app.handle(UiEvent::Ready { width: 100, height: 50 });
        app
    }

    fn pixel(app: &AppController<ScriptedBridge>, x: u32, y: u32) -> Rgba<u8> {
        *app.canvas().pixels().get_pixel(x, y)
    }

    #[test]
    fn events_before_ready_are_ignored() {
        let mut app = AppController::new(Palette::default(), Platform::Native, ScriptedBridge::default(), solid(1, 1, [0, 0, 0]));
        assert!(!app.handle(UiEvent::SwatchClicked));
        assert!(!app.handle(UiEvent::CaptureClicked));
        assert!(!app.handle(UiEvent::Resize { width: 10, height: 10 }));
        assert_eq!(app.session().current_color_index, 0);
        assert!(app.bridge().pictures.is_empty());
        assert_eq!(app.canvas().width(), 0);

        assert!(app.handle(UiEvent::Ready { width: 10, height: 20 }));
        assert_eq!((app.canvas().width(), app.canvas().height()), (10, 20));
    }

    #[test]
    fn swatch_cycles_through_palette() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::SwatchClicked);
        assert_eq!(app.session().current_color_index, 1);
        assert_eq!(app.current_color().name, "green");
        for _ in 1..app.palette().len() {
            app.handle(UiEvent::SwatchClicked);
        }
        assert_eq!(app.current_color().name, "red");
    }

    #[test]
    fn reset_twice_is_all_white() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::ResetClicked);
        let once = app.canvas().snapshot();
        app.handle(UiEvent::ResetClicked);
        assert_eq!(app.canvas().snapshot(), once);
        assert!(once.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn drags_do_nothing_without_paint_mode() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::ResetClicked);
        let before = app.canvas().snapshot();
        assert!(!app.handle(UiEvent::DragStart(Point::new(10.0, 10.0))));
        assert!(!app.handle(UiEvent::DragMove(Point::new(40.0, 20.0))));
        app.handle(UiEvent::DragEnd);
        assert_eq!(app.canvas().snapshot(), before);
    }

    #[test]
    fn paint_mode_draws_with_current_color() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::ResetClicked);
        app.handle(UiEvent::PaintModeToggled);
        app.handle(UiEvent::SwatchClicked);
        assert!(app.paint_mode_active());

        assert!(app.handle(UiEvent::DragStart(Point::new(10.0, 10.0))));
        assert!(app.handle(UiEvent::DragMove(Point::new(10.0, 10.0))));
        assert!(app.handle(UiEvent::DragMove(Point::new(50.0, 10.0))));
        app.handle(UiEvent::DragEnd);

        let green = Rgba([0, 128, 0, 255]);
        assert_eq!(pixel(&app, 10, 10), green);
        assert_eq!(pixel(&app, 30, 10), green);
        assert_eq!(pixel(&app, 30, 30), WHITE);

        app.handle(UiEvent::PaintModeToggled);
        assert!(!app.paint_mode_active());
    }

    #[test]
    fn browser_capture_warns_and_loads_placeholder() {
        let mut app = controller(Platform::Browser);
        assert!(app.handle(UiEvent::CaptureClicked));
        assert!(app.poll());
        assert!(app.bridge().pictures.is_empty());
        assert_eq!(app.current_notice(), Some(Notice::CaptureUnavailable));
        assert_eq!(pixel(&app, 50, 25), Rgba([9, 9, 9, 255]));
        assert!(app.session().last_loaded_image.is_some());
    }

    #[test]
    fn browser_save_never_reaches_device() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::SaveClicked);
        app.poll();
        assert!(app.bridge().saves.is_empty());
        assert_eq!(app.current_notice(), Some(Notice::SaveUnavailable));
    }

    #[test]
    fn notice_blocks_input_until_dismissed() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::SaveClicked);
        assert!(!app.handle(UiEvent::SwatchClicked));
        assert_eq!(app.session().current_color_index, 0);
        assert!(app.handle(UiEvent::Resize { width: 60, height: 60 }));

        assert!(app.dismiss_notice());
        assert!(!app.dismiss_notice());
        assert!(app.handle(UiEvent::SwatchClicked));
    }

    #[test]
    fn drag_end_is_honoured_while_a_notice_is_open() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::ResetClicked);
        app.handle(UiEvent::PaintModeToggled);
        app.handle(UiEvent::DragStart(Point::new(10.0, 10.0)));

        app.handle(UiEvent::SaveClicked);
        assert!(app.current_notice().is_some());
        app.handle(UiEvent::DragEnd);
        assert!(app.dismiss_notice());

        // No segment joins the finished drag to the next move
        assert!(!app.handle(UiEvent::DragMove(Point::new(50.0, 10.0))));
        assert_eq!(pixel(&app, 30, 10), WHITE);
        assert_eq!(pixel(&app, 50, 10), WHITE);
    }

    #[test]
    fn native_capture_uses_canvas_height_and_renders_result() {
        let mut app = controller(Platform::Native);
        app.handle(UiEvent::CaptureClicked);
        assert!(app.is_busy());
        assert!(!app.poll());

        let (config, tx) = app.bridge.pictures.pop().unwrap();
        assert_eq!(config, CameraConfig::for_canvas_height(50));
        tx.send(Ok(solid(10, 10, [200, 0, 0]))).unwrap();

        assert!(app.poll());
        assert!(!app.is_busy());
        assert_eq!(app.current_notice(), None);
        assert_eq!(pixel(&app, 50, 25), Rgba([200, 0, 0, 255]));
        assert_eq!(pixel(&app, 5, 25), WHITE);
    }

    #[test]
    fn native_capture_failure_shows_error_and_keeps_state() {
        let mut app = controller(Platform::Native);
        app.handle(UiEvent::ResetClicked);
        let before = app.canvas().snapshot();
        app.handle(UiEvent::CaptureClicked);
        let (_, tx) = app.bridge.pictures.pop().unwrap();
        tx.send(Err(BridgeError::CameraExit(exit_failure()))).unwrap();

        assert!(app.poll());
        assert_eq!(app.current_notice(), Some(Notice::CaptureFailed));
        assert_eq!(app.canvas().snapshot(), before);
        assert!(app.session().last_loaded_image.is_none());
    }

    #[test]
    fn abandoned_capture_counts_as_failure() {
        let mut app = controller(Platform::Native);
        app.handle(UiEvent::CaptureClicked);
        app.bridge.pictures.clear();
        assert!(app.poll());
        assert_eq!(app.current_notice(), Some(Notice::CaptureFailed));
    }

    #[test]
    fn stale_capture_results_are_dropped() {
        let mut app = controller(Platform::Native);
        app.handle(UiEvent::CaptureClicked);
        app.handle(UiEvent::CaptureClicked);
        let (_, second) = app.bridge.pictures.pop().unwrap();
        let (_, first) = app.bridge.pictures.pop().unwrap();

        second.send(Ok(solid(10, 10, [0, 0, 200]))).unwrap();
        app.poll();
        first.send(Ok(solid(10, 10, [200, 0, 0]))).unwrap();
        app.poll();

        assert_eq!(pixel(&app, 50, 25), Rgba([0, 0, 200, 255]));
        assert!(!app.is_busy());
    }

    #[test]
    fn native_save_reports_success_and_failure() {
        let mut app = controller(Platform::Native);
        app.handle(UiEvent::ResetClicked);
        app.handle(UiEvent::SaveClicked);
        let (image, tx) = app.bridge.saves.pop().unwrap();
        assert_eq!(image.dimensions(), (100, 50));
        tx.send(Ok(PathBuf::from("/gallery/a.png"))).unwrap();
        assert!(app.poll());
        assert_eq!(app.current_notice(), Some(Notice::SavedToGallery));
        app.dismiss_notice();

        app.handle(UiEvent::SaveClicked);
        let (_, tx) = app.bridge.saves.pop().unwrap();
        tx.send(Err(BridgeError::Unavailable)).unwrap();
        app.poll();
        assert_eq!(app.current_notice(), Some(Notice::SaveFailed));
    }

    #[test]
    fn presets_rerender_the_last_image() {
        let mut app = AppController::new(Palette::default(), Platform::Browser, ScriptedBridge::default(), solid(1, 1, [0, 0, 0]))
            .with_initial_image(solid(10, 10, [200, 100, 50]));
        app.handle(UiEvent::Ready { width: 20, height: 20 });
        assert_eq!(pixel(&app, 10, 10), Rgba([200, 100, 50, 255]));

        assert!(app.handle(UiEvent::PresetClicked("sinCity".to_string())));
        let filtered = pixel(&app, 10, 10);
        assert_eq!(filtered[0], filtered[1]);
        assert_eq!(filtered[1], filtered[2]);

        // Painting is overwritten by the next render
        app.handle(UiEvent::PaintModeToggled);
        app.handle(UiEvent::DragStart(Point::new(10.0, 10.0)));
        assert!(app.handle(UiEvent::PresetClicked("original".to_string())));
        assert_eq!(pixel(&app, 10, 10), Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn unknown_preset_or_missing_image_changes_nothing() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::ResetClicked);
        let before = app.canvas().snapshot();
        assert!(!app.handle(UiEvent::PresetClicked("lomo".to_string())));
        assert!(!app.handle(UiEvent::PresetClicked("original".to_string())));
        assert!(!app.handle(UiEvent::PresetClicked("bogus".to_string())));
        assert_eq!(app.canvas().snapshot(), before);
    }

    #[test]
    fn identical_resize_is_a_no_op() {
        let mut app = controller(Platform::Browser);
        app.handle(UiEvent::ResetClicked);
        assert!(!app.handle(UiEvent::Resize { width: 100, height: 50 }));
        assert_eq!(pixel(&app, 0, 0), WHITE);
        assert!(app.handle(UiEvent::Resize { width: 80, height: 50 }));
        assert_eq!(pixel(&app, 0, 0), Rgba([0, 0, 0, 0]));
    }

    #[cfg(unix)]
    fn exit_failure() -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(1 << 8)
    }

    #[cfg(not(unix))]
    fn exit_failure() -> std::process::ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(1)
    }
}

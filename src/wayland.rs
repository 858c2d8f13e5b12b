// Wayland integration module
// Hosts the editing screen on a full-screen layer surface and turns
// pointer, touch and keyboard input into controller events

use crate::app::{AppController, UiEvent};
use crate::bridge::DeviceBridge;
use crate::canvas::Point;
use crate::filters::{Preset, ORIGINAL};
use crate::overlay::{self, Frame, PresetMenu, Rect, ToolbarView, TOOLBAR_HEIGHT};
use crate::paint::TouchTracker;
use crate::text::TextPainter;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_layer, delegate_output, delegate_pointer,
    delegate_registry, delegate_seat, delegate_shm, delegate_touch,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Keysym, Modifiers},
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        touch::TouchHandler,
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{
        slot::{Buffer, SlotPool},
        Shm, ShmHandler,
    },
};
use std::time::{Duration, Instant};
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_keyboard, wl_output, wl_pointer, wl_seat, wl_shm, wl_surface, wl_touch},
    Connection, QueueHandle,
};

/// Mouse button constants
const BTN_LEFT: u32 = 272;
const BTN_RIGHT: u32 = 273;

/// Smallest surface that still fits the toolbar and some canvas
const MIN_WIDTH: u32 = 240;
const MIN_HEIGHT: u32 = TOOLBAR_HEIGHT + 64;

/// Maximum buffer size (64MB to avoid Wayland buffer issues)
const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Seconds per busy-indicator cycle
const BUSY_CYCLE_SECS: f32 = 1.2;

/// Busy-indicator frame interval
const BUSY_REDRAW_INTERVAL: Duration = Duration::from_millis(100);

type Controller = AppController<Box<dyn DeviceBridge>>;

/// What a key press does
#[derive(Debug, Clone, PartialEq)]
enum KeyAction {
    Exit,
    DismissNotice,
    CloseMenu,
    Event(UiEvent),
    Ignore,
}

/// Map a key to its action. An open notice takes every key first, then the menu.
fn key_action(keysym: Keysym, utf8: Option<&str>, notice_open: bool, menu_open: bool) -> KeyAction {
    if notice_open {
        let confirm = keysym == Keysym::Escape
            || keysym == Keysym::Return
            || keysym == Keysym::KP_Enter
            || keysym == Keysym::space;
        return if confirm { KeyAction::DismissNotice } else { KeyAction::Ignore };
    }
    if keysym == Keysym::Escape && menu_open {
        return KeyAction::CloseMenu;
    }
    if keysym == Keysym::Escape || keysym == Keysym::q {
        return KeyAction::Exit;
    }

    let event = match utf8 {
        Some("c") => UiEvent::SwatchClicked,
        Some("p") => UiEvent::PaintModeToggled,
        Some("r") => UiEvent::ResetClicked,
        Some("t") | Some(" ") => UiEvent::CaptureClicked,
        Some("s") => UiEvent::SaveClicked,
        Some("o") => UiEvent::PresetClicked(ORIGINAL.to_string()),
        Some(digit) => match digit.parse::<usize>() {
            Ok(n @ 1..=9) => match Preset::ALL.get(n - 1) {
                Some(preset) => UiEvent::PresetClicked(preset.name().to_string()),
                None => return KeyAction::Ignore,
            },
            _ => return KeyAction::Ignore,
        },
        None => return KeyAction::Ignore,
    };
    KeyAction::Event(event)
}

/// What a pointer press or touch lands on
#[derive(Debug, Clone, PartialEq)]
enum Target {
    /// Whether the press landed on the notice box
    Notice(bool),
    Menu(Option<usize>),
    Toolbar(Option<UiEvent>),
    Canvas(Point),
}

/// Main Wayland application state
struct WaylandApp {
    registry_state: RegistryState,
    seat_state: SeatState,
    output_state: OutputState,
    shm: Shm,
    layer_shell: LayerShell,
    compositor_state: CompositorState,

    controller: Controller,
    text: TextPainter,
    should_exit: bool,

    layer_surface: Option<LayerSurface>,
    pool: Option<SlotPool>,
    buffer: Option<Buffer>,
    width: u32,
    height: u32,
    configured: bool,

    pointer_pos: (f64, f64),
    /// Left button went down on the canvas
    pointer_dragging: bool,
    touches: TouchTracker,

    menu: PresetMenu,
    /// Notice box as last drawn
    notice_bounds: Option<Rect>,
    /// Frame callback requested and not yet delivered
    frame_pending: bool,
    last_draw: Instant,
    started: Instant,
}

impl WaylandApp {
    fn new(
        registry_state: RegistryState,
        seat_state: SeatState,
        output_state: OutputState,
        shm: Shm,
        layer_shell: LayerShell,
        compositor_state: CompositorState,
        controller: Controller,
    ) -> Self {
        Self {
            registry_state,
            seat_state,
            output_state,
            shm,
            layer_shell,
            compositor_state,
            controller,
            text: TextPainter::new(),
            should_exit: false,
            layer_surface: None,
            pool: None,
            buffer: None,
            width: 0,
            height: 0,
            configured: false,
            pointer_pos: (0.0, 0.0),
            pointer_dragging: false,
            touches: TouchTracker::new(),
            menu: PresetMenu::default(),
            notice_bounds: None,
            frame_pending: false,
            last_draw: Instant::now(),
            started: Instant::now(),
        }
    }

    fn canvas_height(&self) -> u32 {
        self.height.saturating_sub(TOOLBAR_HEIGHT)
    }

    /// Surface coordinates to canvas coordinates
    fn canvas_point(x: f64, y: f64) -> Point {
        Point::new(x as f32, (y - TOOLBAR_HEIGHT as f64) as f32)
    }

    /// Work out what a press at (x, y) hits, topmost layer first
    fn target_at(&self, x: f64, y: f64) -> Target {
        if self.controller.current_notice().is_some() {
            Target::Notice(self.notice_bounds.is_some_and(|b| b.contains(x, y)))
        } else if self.menu.is_visible() {
            Target::Menu(self.menu.item_at(x, y))
        } else if y < TOOLBAR_HEIGHT as f64 {
            Target::Toolbar(overlay::toolbar_hit(self.width, x, y).map(|b| b.event()))
        } else {
            Target::Canvas(Self::canvas_point(x, y))
        }
    }

    /// Feed an event to the controller and redraw if it changed anything
    fn dispatch(&mut self, qh: &QueueHandle<Self>, event: UiEvent) {
        let mut changed = self.controller.handle(event);
        changed |= self.controller.poll();
        if changed || self.controller.is_busy() {
            self.draw(qh);
        }
    }

    /// Primary press. Returns whether a canvas drag started.
    fn press(&mut self, qh: &QueueHandle<Self>, x: f64, y: f64) -> bool {
        match self.target_at(x, y) {
            Target::Notice(false) => false,
            Target::Notice(true) => {
                if self.controller.dismiss_notice() {
                    self.draw(qh);
                }
                false
            }
            Target::Menu(item) => {
                self.menu.close();
                match item.and_then(|i| PresetMenu::items().get(i).copied()) {
                    Some(name) => self.dispatch(qh, UiEvent::PresetClicked(name.to_string())),
                    None => self.draw(qh),
                }
                false
            }
            Target::Toolbar(Some(event)) => {
                self.dispatch(qh, event);
                false
            }
            Target::Toolbar(None) => false,
            Target::Canvas(at) => {
                self.dispatch(qh, UiEvent::DragStart(at));
                true
            }
        }
    }

    fn handle_key(&mut self, qh: &QueueHandle<Self>, event: &KeyEvent) {
        let notice_open = self.controller.current_notice().is_some();
        match key_action(event.keysym, event.utf8.as_deref(), notice_open, self.menu.is_visible()) {
            KeyAction::Exit => {
                info!("Exit key pressed");
                self.should_exit = true;
            }
            KeyAction::DismissNotice => {
                if self.controller.dismiss_notice() {
                    self.draw(qh);
                }
            }
            KeyAction::CloseMenu => {
                self.menu.close();
                self.draw(qh);
            }
            KeyAction::Event(ui_event) => self.dispatch(qh, ui_event),
            KeyAction::Ignore => {}
        }
    }

    /// Ask for a frame callback so the loop wakes up while requests are pending
    fn request_frame(&mut self, qh: &QueueHandle<Self>) {
        if self.frame_pending {
            return;
        }
        if let Some(ref layer_surface) = self.layer_surface {
            let surface = layer_surface.wl_surface();
            surface.frame(qh, surface.clone());
            surface.commit();
            self.frame_pending = true;
        }
    }

    fn draw(&mut self, qh: &QueueHandle<Self>) {
        if !self.configured || self.layer_surface.is_none() {
            return;
        }
        self.draw_cpu();
        self.last_draw = Instant::now();
        if self.controller.is_busy() {
            self.request_frame(qh);
        }
    }

    fn draw_cpu(&mut self) {
        let width = self.width.max(MIN_WIDTH);
        let height = self.height.max(MIN_HEIGHT);

        let stride = width as i32 * 4;
        let buffer_size = (stride * height as i32) as usize;
        if buffer_size > MAX_BUFFER_SIZE {
            error!("Buffer size too large: {} bytes, max: {} bytes", buffer_size, MAX_BUFFER_SIZE);
            return;
        }

        if self.pool.is_none() {
            match SlotPool::new(buffer_size, &self.shm) {
                Ok(pool) => self.pool = Some(pool),
                Err(e) => {
                    error!("Failed to create slot pool: {}. Buffer size: {} bytes", e, buffer_size);
                    return;
                }
            }
        }
        let Some(pool) = self.pool.as_mut() else {
            return;
        };

        if pool.len() < buffer_size {
            if let Err(e) = pool.resize(buffer_size) {
                error!("Failed to resize pool to {} bytes: {}", buffer_size, e);
                self.pool = None;
                return;
            }
        }

        let (buffer, data) = match pool.create_buffer(width as i32, height as i32, stride, wl_shm::Format::Argb8888) {
            Ok(buf) => buf,
            Err(e) => {
                error!("Failed to create buffer {}x{}: {}", width, height, e);
                return;
            }
        };

        let mut frame = Frame::new(data, width, height);
        frame.fill_rect(Rect::new(0, 0, width, height), [0, 0, 0, 255]);
        frame.blit_canvas(self.controller.canvas().pixels(), TOOLBAR_HEIGHT);

        let swatch = self.controller.current_color().rgba;
        let view = ToolbarView {
            swatch: [swatch[0], swatch[1], swatch[2]],
            paint_mode_active: self.controller.paint_mode_active(),
            busy_phase: self
                .controller
                .is_busy()
                .then(|| (self.started.elapsed().as_secs_f32() / BUSY_CYCLE_SECS).fract()),
        };
        overlay::draw_toolbar(&mut frame, &mut self.text, &view);
        self.menu.draw(&mut frame, &mut self.text);
        self.notice_bounds = self
            .controller
            .current_notice()
            .map(|notice| overlay::draw_notice(&mut frame, &mut self.text, notice.message()));

        let Some(ref layer_surface) = self.layer_surface else {
            return;
        };
        let surface = layer_surface.wl_surface();
        if let Err(e) = buffer.attach_to(surface) {
            error!("Failed to attach buffer: {}", e);
            return;
        }
        surface.damage_buffer(0, 0, width as i32, height as i32);
        surface.commit();

        self.buffer = Some(buffer);
    }
}

impl CompositorHandler for WaylandApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
        debug!("Scale factor changed");
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
        debug!("Transform changed");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        self.frame_pending = false;
        let changed = self.controller.poll();
        if changed {
            self.draw(qh);
        } else if self.controller.is_busy() {
            // Animate the busy indicator at a reduced rate, keep polling every frame
            if self.last_draw.elapsed() >= BUSY_REDRAW_INTERVAL {
                self.draw(qh);
            } else {
                self.request_frame(qh);
            }
        }
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for WaylandApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("New output detected");
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output updated");
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        debug!("Output destroyed");
    }
}

impl LayerShellHandler for WaylandApp {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        info!("Layer surface closed");
        self.should_exit = true;
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        debug!("Layer surface configured: {:?}", configure);

        let (mut width, mut height) = configure.new_size;
        if width == 0 || height == 0 {
            (width, height) = get_display_dimensions(&self.output_state);
        }
        self.width = width.max(MIN_WIDTH);
        self.height = height.max(MIN_HEIGHT);

        let size = (self.width, self.canvas_height());
        let event = if self.controller.is_ready() {
            UiEvent::Resize { width: size.0, height: size.1 }
        } else {
            UiEvent::Ready { width: size.0, height: size.1 }
        };
        self.configured = true;
        self.menu.close();
        self.controller.handle(event);
        self.draw(qh);
    }
}

impl SeatHandler for WaylandApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("New seat");
    }

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        debug!("New capability: {:?}", capability);

        if capability == Capability::Keyboard {
            if let Err(e) = self.seat_state.get_keyboard(qh, &seat, None) {
                error!("Failed to get keyboard: {}", e);
            }
        }
        if capability == Capability::Pointer {
            if let Err(e) = self.seat_state.get_pointer(qh, &seat) {
                error!("Failed to get pointer: {}", e);
            }
        }
        if capability == Capability::Touch {
            if let Err(e) = self.seat_state.get_touch(qh, &seat) {
                error!("Failed to get touch: {}", e);
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        _capability: Capability,
    ) {
        debug!("Capability removed");
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
        debug!("Seat removed");
    }
}

impl KeyboardHandler for WaylandApp {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
        debug!("Keyboard entered surface");
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
    ) {
        debug!("Keyboard left surface");
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        debug!("Key pressed: {:?}", event.keysym);
        self.handle_key(qh, &event);
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _event: KeyEvent,
    ) {
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _modifiers: Modifiers,
        _layout: u32,
    ) {
    }
}

impl PointerHandler for WaylandApp {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            let (x, y) = event.position;
            match event.kind {
                PointerEventKind::Enter { .. } => {
                    debug!("Pointer entered");
                    self.pointer_pos = (x, y);
                }
                PointerEventKind::Leave { .. } => {
                    debug!("Pointer left");
                    if self.pointer_dragging {
                        self.pointer_dragging = false;
                        self.dispatch(qh, UiEvent::DragEnd);
                    }
                }
                PointerEventKind::Motion { .. } => {
                    self.pointer_pos = (x, y);
                    if self.menu.is_visible() && self.menu.hover(x, y) {
                        self.draw(qh);
                    }
                    if self.pointer_dragging {
                        self.dispatch(qh, UiEvent::DragMove(Self::canvas_point(x, y)));
                    }
                }
                PointerEventKind::Press { button, .. } => {
                    self.pointer_pos = (x, y);
                    match button {
                        BTN_LEFT => {
                            self.pointer_dragging = self.press(qh, x, y);
                        }
                        BTN_RIGHT => {
                            if self.controller.current_notice().is_none() {
                                self.menu.open_at(x, y, self.width, self.height);
                                self.draw(qh);
                            }
                        }
                        _ => {}
                    }
                }
                PointerEventKind::Release { button, .. } => {
                    if button == BTN_LEFT && self.pointer_dragging {
                        self.pointer_dragging = false;
                        self.dispatch(qh, UiEvent::DragEnd);
                    }
                }
                PointerEventKind::Axis { .. } => {}
            }
        }
    }
}

impl TouchHandler for WaylandApp {
    fn down(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _touch: &wl_touch::WlTouch,
        _serial: u32,
        _time: u32,
        _surface: wl_surface::WlSurface,
        id: i32,
        position: (f64, f64),
    ) {
        if !self.touches.down(id) {
            return;
        }
        let (x, y) = position;
        if !self.press(qh, x, y) {
            // Only canvas touches start a stroke
            self.touches.up(id);
        }
    }

    fn up(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _touch: &wl_touch::WlTouch,
        _serial: u32,
        _time: u32,
        id: i32,
    ) {
        if self.touches.up(id) {
            self.dispatch(qh, UiEvent::DragEnd);
        }
    }

    fn motion(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _touch: &wl_touch::WlTouch,
        _time: u32,
        id: i32,
        position: (f64, f64),
    ) {
        if self.touches.motion(id) {
            let (x, y) = position;
            self.dispatch(qh, UiEvent::DragMove(Self::canvas_point(x, y)));
        }
    }

    fn shape(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _touch: &wl_touch::WlTouch,
        _id: i32,
        _major: f64,
        _minor: f64,
    ) {
    }

    fn orientation(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _touch: &wl_touch::WlTouch,
        _id: i32,
        _orientation: f64,
    ) {
    }

    fn cancel(&mut self, _conn: &Connection, qh: &QueueHandle<Self>, _touch: &wl_touch::WlTouch) {
        if self.touches.cancel() {
            warn!("Touch sequence cancelled by compositor");
            self.dispatch(qh, UiEvent::DragEnd);
        }
    }
}

impl ShmHandler for WaylandApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm
    }
}

impl ProvidesRegistryState for WaylandApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}

// Delegate macros
delegate_compositor!(WaylandApp);
delegate_output!(WaylandApp);
delegate_layer!(WaylandApp);
delegate_seat!(WaylandApp);
delegate_keyboard!(WaylandApp);
delegate_pointer!(WaylandApp);
delegate_touch!(WaylandApp);
delegate_shm!(WaylandApp);
delegate_registry!(WaylandApp);

/// Run the editing screen until the user exits
pub fn run(controller: Controller) -> Result<()> {
    info!("Connecting to Wayland display");

    let conn = Connection::connect_to_env().context("Failed to connect to Wayland display")?;

    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("Failed to initialize registry")?;
    let qh = event_queue.handle();

    let compositor_state =
        CompositorState::bind(&globals, &qh).context("Failed to bind compositor")?;
    let layer_shell = LayerShell::bind(&globals, &qh).context("Failed to bind layer shell")?;
    let shm = Shm::bind(&globals, &qh).context("Failed to bind shm")?;

    let mut app = WaylandApp::new(
        RegistryState::new(&globals),
        SeatState::new(&globals, &qh),
        OutputState::new(&globals, &qh),
        shm,
        layer_shell,
        compositor_state,
        controller,
    );

    // Dispatch once to get output info
    event_queue.roundtrip(&mut app)?;
    let (display_width, display_height) = get_display_dimensions(&app.output_state);
    info!("Display dimensions: {}x{}", display_width, display_height);

    let surface = app.compositor_state.create_surface(&qh);
    let layer_surface = app.layer_shell.create_layer_surface(
        &qh,
        surface,
        Layer::Overlay,
        Some("snapaint"),
        None,
    );

    // Cover the whole output; the compositor picks the size
    layer_surface.set_anchor(Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT);
    layer_surface.set_size(0, 0);
    layer_surface.set_exclusive_zone(-1);
    layer_surface.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);
    layer_surface.commit();

    app.layer_surface = Some(layer_surface);

    info!("Starting event loop");
    info!("Controls: toolbar buttons, right-click for presets, Escape to quit");
    info!("Keys: c color, p paint, r reset, t photo, s save, o original, 1-9 presets");

    loop {
        event_queue.blocking_dispatch(&mut app)?;

        if app.should_exit {
            info!("Exiting application");
            break;
        }
    }

    Ok(())
}

/// Get display dimensions from the output state
fn get_display_dimensions(output_state: &OutputState) -> (u32, u32) {
    for output in output_state.outputs() {
        if let Some(info) = output_state.info(&output) {
            if let Some(mode) = info.modes.iter().find(|m| m.current) {
                return (mode.dimensions.0 as u32, mode.dimensions.1 as u32);
            }
            if let Some(mode) = info.modes.first() {
                return (mode.dimensions.0 as u32, mode.dimensions.1 as u32);
            }
        }
    }
    (1920, 1080)
}

// Paint tool module
// Turns drag input into dots and stroke segments on the canvas

use crate::canvas::Point;

/// Drawing produced by a drag event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeOp {
    Dot(Point),
    Segment { from: Point, to: Point },
}

/// Drag state of the paint tool
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { last: Point },
}

/// Tracks the current drag. Drawing only happens while paint mode is active;
/// otherwise events are swallowed without output.
#[derive(Debug, Default)]
pub struct PaintTool {
    state: DragState,
}

impl PaintTool {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn drag_start(&mut self, paint_mode_active: bool, at: Point) -> Option<StrokeOp> {
        if !paint_mode_active {
            self.state = DragState::Idle;
            return None;
        }
        self.state = DragState::Dragging { last: at };
        Some(StrokeOp::Dot(at))
    }

    pub fn drag_move(&mut self, paint_mode_active: bool, to: Point) -> Option<StrokeOp> {
        match self.state {
            DragState::Dragging { last } if paint_mode_active => {
                self.state = DragState::Dragging { last: to };
                Some(StrokeOp::Segment { from: last, to })
            }
            _ => None,
        }
    }

    pub fn drag_end(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Picks the first touch point out of multi-touch input.
/// Other touch ids are ignored until the primary one lifts.
#[derive(Debug, Default)]
pub struct TouchTracker {
    primary: Option<i32>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A finger went down; true when it becomes the tracked touch
    pub fn down(&mut self, id: i32) -> bool {
        if self.primary.is_some() {
            return false;
        }
        self.primary = Some(id);
        true
    }

    /// True when `id` is the tracked touch
    pub fn motion(&self, id: i32) -> bool {
        self.primary == Some(id)
    }

    /// A finger lifted; true when it was the tracked touch
    pub fn up(&mut self, id: i32) -> bool {
        if self.primary == Some(id) {
            self.primary = None;
            true
        } else {
            false
        }
    }

    /// Compositor cancelled the touch sequence
    pub fn cancel(&mut self) -> bool {
        self.primary.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn drag_produces_dot_then_connected_segments() {
        let mut tool = PaintTool::new();
        assert_eq!(tool.drag_start(true, p(10.0, 10.0)), Some(StrokeOp::Dot(p(10.0, 10.0))));
        assert_eq!(
            tool.drag_move(true, p(10.0, 10.0)),
            Some(StrokeOp::Segment { from: p(10.0, 10.0), to: p(10.0, 10.0) })
        );
        assert_eq!(
            tool.drag_move(true, p(50.0, 10.0)),
            Some(StrokeOp::Segment { from: p(10.0, 10.0), to: p(50.0, 10.0) })
        );
        tool.drag_end();
        assert_eq!(tool.state(), DragState::Idle);
    }

    #[test]
    fn inactive_paint_mode_draws_nothing() {
        let mut tool = PaintTool::new();
        assert_eq!(tool.drag_start(false, p(1.0, 1.0)), None);
        assert_eq!(tool.drag_move(false, p(2.0, 2.0)), None);
        assert_eq!(tool.drag_move(true, p(3.0, 3.0)), None);
        assert_eq!(tool.state(), DragState::Idle);
    }

    #[test]
    fn disabling_mid_drag_stops_segments() {
        let mut tool = PaintTool::new();
        tool.drag_start(true, p(0.0, 0.0));
        assert_eq!(tool.drag_move(false, p(5.0, 5.0)), None);
    }

    #[test]
    fn move_after_end_is_ignored() {
        let mut tool = PaintTool::new();
        tool.drag_start(true, p(0.0, 0.0));
        tool.drag_end();
        assert_eq!(tool.drag_move(true, p(9.0, 9.0)), None);
    }

    #[test]
    fn only_first_touch_is_tracked() {
        let mut touches = TouchTracker::new();
        assert!(touches.down(3));
        assert!(!touches.down(4));
        assert!(touches.motion(3));
        assert!(!touches.motion(4));
        assert!(!touches.up(4));
        assert!(touches.up(3));
        assert!(touches.down(4));
        assert!(touches.cancel());
        assert!(!touches.motion(4));
    }
}

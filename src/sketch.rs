//! Interactive polyline sketcher driven by backend-neutral input events.
//!
//! Left click adds a vertex to the current line, right click finishes it.

use tracing::{debug, info};

use crate::geometry::{BoundingBox, Point};
use crate::input::{InputEvent, Key, MouseButtonKind, Overlay};
use crate::pixel::Pixel;
use crate::renderer::Frame;

/// Stroke colour before any cycling
const BASE_RED: u8 = 100;
const STROKE_BLUE: u8 = 255;

#[derive(Debug, Default)]
pub struct Sketch {
    lines: Vec<Vec<Point>>,
    in_progress: bool,
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Vec<Point>] {
        &self.lines
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Extend the current line, starting a new one if none is open
    pub fn add_vertex(&mut self, p: Point) {
        if !self.in_progress || self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        if let Some(line) = self.lines.last_mut() {
            line.push(p);
        }
        self.in_progress = true;
    }

    /// Close the current line; a lone vertex is discarded
    pub fn end_line(&mut self) {
        self.in_progress = false;
        if self.lines.last().is_some_and(|l| l.len() == 1) {
            self.lines.pop();
        }
        debug!(lines = self.lines.len(), "line finished");
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.in_progress = false;
    }

    /// Apply one event; returns false when the event asks to quit
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => return false,
            InputEvent::KeyDown(Key::Backspace) => self.clear(),
            InputEvent::MouseDown {
                x,
                y,
                button: MouseButtonKind::Left,
            } => self.add_vertex(Point::new(x as f32, y as f32)),
            InputEvent::MouseDown {
                button: MouseButtonKind::Right,
                ..
            } => self.end_line(),
            _ => {},
        }
        true
    }

    /// Draw every line as anti-aliased segments. The red channel steps
    /// further for each later line, so neighbouring lines differ in colour.
    pub fn draw(&self, frame: &mut Frame<'_>) {
        let mut red = BASE_RED;
        for (group, line) in self.lines.iter().enumerate() {
            for seg in line.windows(2) {
                red = ((red as usize + 20 * group) % 256) as u8;
                let color = Pixel::rgb(red, 255 - red, STROKE_BLUE);
                let (x0, y0) = seg[0].to_pixel();
                let (x1, y1) = seg[1].to_pixel();
                frame.draw_line_aa(x0, y0, x1, y1, color);
            }
        }
    }
}

// ============================================================================
// Help panel
// ============================================================================

/// Toggleable panel in the top-left corner. While shown it swallows clicks
/// that land on it.
pub struct HelpPanel {
    bounds: BoundingBox,
    visible: bool,
}

impl HelpPanel {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: BoundingBox::from_coords(0.0, 0.0, width, height),
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        if !self.visible {
            return;
        }
        let (x0, y0) = self.bounds.min().to_pixel();
        let (x1, y1) = self.bounds.max().to_pixel();
        frame.draw_rectangle(x0, y0, x1, y1, Pixel::from_straight(20, 20, 40, 192));
        frame.draw_line(x0, y1, x1, y1, Pixel::WHITE);
        frame.draw_line(x1, y0, x1, y1, Pixel::WHITE);
    }
}

impl Overlay for HelpPanel {
    fn claims(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyDown(Key::Char('h')) => {
                self.visible = !self.visible;
                if self.visible {
                    info!(
                        "left click: add vertex | right click: end line | \
                         backspace: clear | s: screenshot | esc: quit"
                    );
                }
                true
            },
            InputEvent::MouseDown { x, y, .. } | InputEvent::MouseUp { x, y, .. } => {
                self.visible && self.bounds.contains_point(Point::new(x as f32, y as f32))
            },
            _ => false,
        }
    }
}

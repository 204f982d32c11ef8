use serde::{Deserialize, Serialize};

use crate::game::{DIR_DOWN, DIR_LEFT, DIR_RIGHT, DIR_UP};

pub const TAB_START: f32 = 0.35;
pub const TAB_END: f32 = 0.65;
pub const TAB_CONTROL_NEAR: f32 = 0.15;
pub const TAB_CONTROL_FAR: f32 = 0.85;

pub const TAB_RATIO_DEFAULT: f32 = 0.2;
pub const TAB_RATIO_MIN: f32 = 0.05;
pub const TAB_RATIO_MAX: f32 = 0.35;

pub const CURVE_STEPS_MIN: usize = 8;
const CURVE_STEP_PX: f32 = 3.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeStyle {
    #[default]
    Tabbed,
    Rectangular,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOrientation {
    Top,
    Right,
    Bottom,
    Left,
}

impl EdgeOrientation {
    pub fn from_dir(dir: usize) -> Self {
        match dir {
            DIR_RIGHT => EdgeOrientation::Right,
            DIR_DOWN => EdgeOrientation::Bottom,
            DIR_LEFT => EdgeOrientation::Left,
            _ => EdgeOrientation::Top,
        }
    }
}

pub fn fmt_f32(value: f32) -> String {
    format!("{:.3}", value)
}

pub fn cubic_point(
    p0: (f32, f32),
    p1: (f32, f32),
    p2: (f32, f32),
    p3: (f32, f32),
    t: f32,
) -> (f32, f32) {
    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;
    let uuu = uu * u;
    let ttt = tt * t;
    (
        uuu * p0.0 + 3.0 * uu * t * p1.0 + 3.0 * u * tt * p2.0 + ttt * p3.0,
        uuu * p0.1 + 3.0 * uu * t * p1.1 + 3.0 * u * tt * p2.1 + ttt * p3.1,
    )
}

fn curve_steps(span: f32) -> usize {
    ((span / CURVE_STEP_PX).ceil() as usize).max(CURVE_STEPS_MIN)
}

/// Points of one side in its own frame: x runs along the side from 0 to
/// `len`, y is the outward displacement. The start point is not included.
pub fn edge_points(len: f32, depth: f32, sign: i8) -> Vec<(f32, f32)> {
    if sign == 0 || depth <= 0.0 {
        return vec![(len, 0.0)];
    }
    let d = depth * sign as f32;
    let p0 = (len * TAB_START, 0.0);
    let p1 = (len * TAB_CONTROL_NEAR, d);
    let p2 = (len * TAB_CONTROL_FAR, d);
    let p3 = (len * TAB_END, 0.0);
    let steps = curve_steps(len * (TAB_END - TAB_START) + depth * 2.0);

    let mut points = Vec::with_capacity(steps + 2);
    points.push(p0);
    for step in 1..steps {
        let t = step as f32 / steps as f32;
        points.push(cubic_point(p0, p1, p2, p3, t));
    }
    points.push(p3);
    points.push((len, 0.0));
    points
}

/// Maps a side-frame point into piece-local coordinates for a clockwise walk
/// starting at `origin`, the corner the side begins at.
pub fn map_point(orientation: EdgeOrientation, origin: (f32, f32), x: f32, y: f32) -> (f32, f32) {
    let (ox, oy) = origin;
    match orientation {
        EdgeOrientation::Top => (ox + x, oy - y),
        EdgeOrientation::Right => (ox + y, oy + x),
        EdgeOrientation::Bottom => (ox - x, oy + y),
        EdgeOrientation::Left => (ox - y, oy - x),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PiecePath {
    /// Closed polygon in piece-local space; first and last points are (0, 0).
    pub points: Vec<(f32, f32)>,
    pub min: (f32, f32),
    pub max: (f32, f32),
}

impl PiecePath {
    pub fn rect(width: f32, height: f32) -> Self {
        build_piece_path(width, height, [0; 4], 0.0)
    }

    /// Even-odd test against the flattened outline.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        if x < self.min.0 || x > self.max.0 || y < self.min.1 || y > self.max.1 {
            return false;
        }
        let mut inside = false;
        for pair in self.points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if (y0 > y) != (y1 > y) {
                let cross_x = x0 + (y - y0) / (y1 - y0) * (x1 - x0);
                if x < cross_x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first == last && self.points.len() > 3,
            _ => false,
        }
    }

    pub fn to_svg(&self) -> String {
        let mut path = String::new();
        for (index, (x, y)) in self.points.iter().enumerate() {
            if index + 1 == self.points.len() && index > 0 {
                break;
            }
            let command = if index == 0 { "M" } else { "L" };
            if !path.is_empty() {
                path.push(' ');
            }
            path.push_str(&format!("{} {} {}", command, fmt_f32(*x), fmt_f32(*y)));
        }
        path.push_str(" Z");
        path
    }
}

pub fn tab_depth(width: f32, height: f32, tab_ratio: f32) -> f32 {
    width.min(height) * tab_ratio.clamp(0.0, TAB_RATIO_MAX)
}

/// Outline for a piece of `width` x `height` with polarities indexed
/// up/right/down/left. Positive tabs protrude, negative tabs indent.
pub fn build_piece_path(width: f32, height: f32, tabs: [i8; 4], tab_ratio: f32) -> PiecePath {
    let depth = tab_depth(width, height, tab_ratio);
    let mut points = vec![(0.0, 0.0)];
    for dir in [DIR_UP, DIR_RIGHT, DIR_DOWN, DIR_LEFT] {
        let orientation = EdgeOrientation::from_dir(dir);
        let (len, origin) = match orientation {
            EdgeOrientation::Top => (width, (0.0, 0.0)),
            EdgeOrientation::Right => (height, (width, 0.0)),
            EdgeOrientation::Bottom => (width, (width, height)),
            EdgeOrientation::Left => (height, (0.0, height)),
        };
        for (x, y) in edge_points(len, depth, tabs[dir]) {
            points.push(map_point(orientation, origin, x, y));
        }
    }
    if let Some(last) = points.last_mut() {
        *last = (0.0, 0.0);
    }

    let mut min = (f32::INFINITY, f32::INFINITY);
    let mut max = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for &(x, y) in &points {
        min = (min.0.min(x), min.1.min(y));
        max = (max.0.max(x), max.1.max(y));
    }
    PiecePath { points, min, max }
}

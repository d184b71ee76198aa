//! Crop-rectangle resize engine.
//!
//! Turns a drag on one of the crop frame's handles into a new frame. The
//! geometry lives in [`resize_rect`], a pure function of the frame at drag
//! start and the cumulative translation; [`ResizeEngine`] adds the per-drag
//! session, handle hit testing and change notification.
//!
//! # Modes
//!
//! - **Free**: every active edge follows the pointer on its own axis, the
//!   opposite edge stays where it was.
//! - **Locked edge**: the dragged edge sets one dimension, the other is derived
//!   from the ratio and grows or shrinks evenly around the drag axis.
//! - **Locked corner**: the two translation components are averaged along the
//!   corner diagonal, the opposite corner stays pinned.
//!
//! Every mode keeps the frame inside the bounding frame and its sides at or
//! above the minimum side, with the bounding frame winning when both cannot
//! hold.

use std::fmt;

use crate::geometry::{Edges, Point, Rect, Size};

/// State of one drag, created on drag begin and dropped on drag end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub active_edges: Edges,
    pub start_frame: Rect,
    pub start_point: Point,
    pub locked_ratio: Option<f64>,
}

/// Finds the handles under `point` for a crop `frame`.
///
/// Each edge owns a band `touch_area` wide centered on it; a point in the
/// band of two adjacent edges hits the corner. Points well inside the frame or
/// outside the outer band hit nothing. A frame smaller than one touch target
/// is grown to it first, keeping its origin.
pub fn hit_test(point: Point, frame: Rect, touch_area: f64) -> Edges {
    let frame = frame.extend_to(Size::new(touch_area, touch_area));
    let inset = touch_area / 2.0;
    let outer = frame.inset_by(-inset, -inset);
    let inner = frame.inset_by(inset, inset);

    let inside_inner = inner.width() > 0.0
        && inner.height() > 0.0
        && point.x > inner.min_x()
        && point.x < inner.max_x()
        && point.y > inner.min_y()
        && point.y < inner.max_y();
    if !outer.contains_point(point) || inside_inner {
        return Edges::NONE;
    }

    let mut edges = Edges::NONE;
    if point.x > outer.min_x() && point.x < inner.min_x() {
        edges.insert(Edges::LEFT);
    }
    if point.y > outer.min_y() && point.y < inner.min_y() {
        edges.insert(Edges::TOP);
    }
    if point.x > inner.max_x() && point.x < outer.max_x() {
        edges.insert(Edges::RIGHT);
    }
    if point.y > inner.max_y() && point.y < outer.max_y() {
        edges.insert(Edges::BOTTOM);
    }
    edges.without_opposites()
}

/// Largest rectangle with `ratio` (width / height) centered in `bounds`.
pub fn fit_ratio(bounds: Rect, ratio: f64) -> Rect {
    let height = bounds.width() / ratio;
    let size = if height <= bounds.height() {
        Size::new(bounds.width(), height)
    } else {
        Size::new(bounds.height() * ratio, bounds.height())
    };
    Rect::centered_in(bounds, size)
}

/// Computes the frame for a drag.
///
/// # Arguments
///
/// * `start` - Crop frame when the drag began
/// * `translation` - Pointer movement since the drag began
/// * `edges` - Active handles; two adjacent edges form a corner
/// * `bounds` - Area the frame must stay inside
/// * `min_side` - Smallest allowed side length
/// * `locked_ratio` - Width / height to preserve, if any
///
/// # Returns
///
/// The new frame, or `None` when the inputs produce non-finite or empty
/// geometry. Callers keep their last valid frame in that case.
pub fn resize_rect(
    start: Rect,
    translation: Point,
    edges: Edges,
    bounds: Rect,
    min_side: f64,
    locked_ratio: Option<f64>,
) -> Option<Rect> {
    if !translation.is_finite() || !start.is_finite() || !bounds.is_finite() {
        return None;
    }
    if !bounds.size.is_valid() {
        return None;
    }
    let start = bounds.intersection(&start)?;
    let edges = edges.without_opposites();
    if edges.is_empty() {
        return Some(start);
    }

    let ratio = locked_ratio.filter(|r| r.is_finite() && *r > 0.0);
    let frame = match ratio {
        None => resize_free(start, translation, edges, bounds, min_side),
        Some(ratio) if edges.is_corner() => {
            resize_locked_corner(start, translation, edges, bounds, min_side, ratio)
        }
        Some(ratio) => resize_locked_edge(start, translation, edges, bounds, min_side, ratio),
    };

    (frame.is_finite() && frame.size.is_valid()).then_some(frame)
}

/// Clamps into `[lo, hi]`, letting `hi` win when the range is empty.
#[inline]
fn clamp_to(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

fn resize_free(start: Rect, t: Point, edges: Edges, bounds: Rect, min_side: f64) -> Rect {
    let min_w = min_side.min(bounds.width());
    let min_h = min_side.min(bounds.height());

    let mut min_x = start.min_x();
    let mut min_y = start.min_y();
    let mut max_x = start.max_x();
    let mut max_y = start.max_y();

    // Near edges stop at the bounds; what is left of the delta shrinks the side.
    if edges.contains(Edges::TOP) {
        min_y = (start.min_y() + t.y).min(max_y - min_h).max(bounds.min_y());
    }
    if edges.contains(Edges::LEFT) {
        min_x = (start.min_x() + t.x).min(max_x - min_w).max(bounds.min_x());
    }
    if edges.contains(Edges::BOTTOM) {
        max_y = clamp_to(start.max_y() + t.y, min_y + min_h, bounds.max_y());
    }
    if edges.contains(Edges::RIGHT) {
        max_x = clamp_to(start.max_x() + t.x, min_x + min_w, bounds.max_x());
    }

    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

fn resize_locked_edge(
    start: Rect,
    t: Point,
    edges: Edges,
    bounds: Rect,
    min_side: f64,
    ratio: f64,
) -> Rect {
    if edges.has_horizontal() {
        let from_left = edges.contains(Edges::LEFT);
        let wanted = if from_left {
            start.width() - t.x
        } else {
            start.width() + t.x
        };
        let room = if from_left {
            start.max_x() - bounds.min_x()
        } else {
            bounds.max_x() - start.min_x()
        };
        let min_w = min_side.max(min_side * ratio);
        let max_w = room.min(bounds.height() * ratio);
        let width = clamp_to(wanted, min_w, max_w);
        let height = width / ratio;

        let x = if from_left {
            start.max_x() - width
        } else {
            start.min_x()
        };
        let y = clamp_to(
            start.mid_y() - height / 2.0,
            bounds.min_y(),
            bounds.max_y() - height,
        );
        Rect::new(x, y, width, height)
    } else {
        let from_top = edges.contains(Edges::TOP);
        let wanted = if from_top {
            start.height() - t.y
        } else {
            start.height() + t.y
        };
        let room = if from_top {
            start.max_y() - bounds.min_y()
        } else {
            bounds.max_y() - start.min_y()
        };
        let min_h = min_side.max(min_side / ratio);
        let max_h = room.min(bounds.width() / ratio);
        let height = clamp_to(wanted, min_h, max_h);
        let width = height * ratio;

        let y = if from_top {
            start.max_y() - height
        } else {
            start.min_y()
        };
        let x = clamp_to(
            start.mid_x() - width / 2.0,
            bounds.min_x(),
            bounds.max_x() - width,
        );
        Rect::new(x, y, width, height)
    }
}

fn resize_locked_corner(
    start: Rect,
    t: Point,
    edges: Edges,
    bounds: Rect,
    min_side: f64,
    ratio: f64,
) -> Rect {
    let from_left = edges.contains(Edges::LEFT);
    let from_top = edges.contains(Edges::TOP);
    let sx = if from_left { -1.0 } else { 1.0 };
    let sy = if from_top { -1.0 } else { 1.0 };

    // Outward motion along the diagonal, the vertical part in width units.
    let delta = (sx * t.x + sy * t.y * ratio) / 2.0;

    let room_x = if from_left {
        start.max_x() - bounds.min_x()
    } else {
        bounds.max_x() - start.min_x()
    };
    let room_y = if from_top {
        start.max_y() - bounds.min_y()
    } else {
        bounds.max_y() - start.min_y()
    };
    let min_w = min_side.max(min_side * ratio);
    let max_w = room_x.min(room_y * ratio);
    let width = clamp_to(start.width() + delta, min_w, max_w);

    let mut pinned = Edges::NONE;
    if from_left {
        pinned.insert(Edges::RIGHT);
    }
    if from_top {
        pinned.insert(Edges::BOTTOM);
    }
    start
        .with_width(width, pinned)
        .with_height(width / ratio, pinned)
}

type Subscriber = Box<dyn FnMut(Rect)>;

/// Stateful wrapper around [`resize_rect`] for one crop control.
pub struct ResizeEngine {
    frame: Rect,
    bounding_frame: Rect,
    min_side: f64,
    touch_area: f64,
    locked_ratio: Option<f64>,
    session: Option<ResizeSession>,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for ResizeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeEngine")
            .field("frame", &self.frame)
            .field("bounding_frame", &self.bounding_frame)
            .field("min_side", &self.min_side)
            .field("touch_area", &self.touch_area)
            .field("locked_ratio", &self.locked_ratio)
            .field("session", &self.session)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ResizeEngine {
    pub fn new(frame: Rect, bounding_frame: Rect, min_side: f64, touch_area: f64) -> Self {
        Self {
            frame: bounding_frame.intersection(&frame).unwrap_or(bounding_frame),
            bounding_frame,
            min_side,
            touch_area,
            locked_ratio: None,
            session: None,
            subscribers: Vec::new(),
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn bounding_frame(&self) -> Rect {
        self.bounding_frame
    }

    pub fn min_side(&self) -> f64 {
        self.min_side
    }

    pub fn locked_ratio(&self) -> Option<f64> {
        self.locked_ratio
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Registers a callback fired whenever a drag changes the frame.
    pub fn subscribe(&mut self, subscriber: impl FnMut(Rect) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Replaces the frame without notifying subscribers.
    pub fn set_frame(&mut self, frame: Rect) {
        if let Some(frame) = self.bounding_frame.intersection(&frame) {
            self.frame = frame;
        }
    }

    pub fn set_bounding_frame(&mut self, bounding_frame: Rect) {
        self.bounding_frame = bounding_frame;
        self.frame = bounding_frame
            .intersection(&self.frame)
            .unwrap_or(bounding_frame);
    }

    /// Locks (or unlocks) the ratio used by subsequent drags.
    pub fn set_locked_ratio(&mut self, ratio: Option<f64>) {
        self.locked_ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
    }

    pub fn hit_test(&self, point: Point) -> Edges {
        hit_test(point, self.frame, self.touch_area)
    }

    /// Starts a drag at `point`. Returns the grabbed handles; no session is
    /// opened when nothing was hit.
    pub fn begin(&mut self, point: Point) -> Edges {
        let edges = self.hit_test(point);
        if !edges.is_empty() {
            self.begin_with_edges(point, edges);
        }
        edges
    }

    /// Starts a drag on explicit handles.
    pub fn begin_with_edges(&mut self, point: Point, edges: Edges) {
        self.session = Some(ResizeSession {
            active_edges: edges,
            start_frame: self.frame,
            start_point: point,
            locked_ratio: self.locked_ratio,
        });
    }

    /// Applies the cumulative translation of the active drag.
    ///
    /// Returns the new frame when it differs from the current one.
    pub fn update(&mut self, translation: Point) -> Option<Rect> {
        let session = self.session?;
        let Some(frame) = resize_rect(
            session.start_frame,
            translation,
            session.active_edges,
            self.bounding_frame,
            self.min_side,
            session.locked_ratio,
        ) else {
            tracing::debug!(?translation, "discarding invalid crop geometry");
            return None;
        };

        if frame == self.frame {
            return None;
        }
        self.frame = frame;
        for subscriber in &mut self.subscribers {
            subscriber(frame);
        }
        Some(frame)
    }

    /// Finishes the drag and returns its session.
    pub fn end(&mut self) -> Option<ResizeSession> {
        self.session.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MIN_SIDE: f64 = 88.0;

    fn image_bounds() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn test_free_corner_drag() {
        let start = image_bounds();
        let r = resize_rect(
            start,
            Point::new(50.0, 30.0),
            Edges::TOP_LEFT,
            image_bounds(),
            MIN_SIDE,
            None,
        )
        .unwrap();
        assert!(r.approx_eq(&Rect::new(50.0, 30.0, 750.0, 570.0), 1e-9));
    }

    #[test]
    fn test_free_drag_respects_min_side() {
        let start = Rect::new(100.0, 100.0, 300.0, 200.0);
        let r = resize_rect(
            start,
            Point::new(1000.0, 0.0),
            Edges::LEFT,
            image_bounds(),
            MIN_SIDE,
            None,
        )
        .unwrap();
        assert!((r.width() - MIN_SIDE).abs() < 1e-9);
        assert!((r.max_x() - start.max_x()).abs() < 1e-9);
    }

    #[test]
    fn test_free_drag_stops_at_bounds() {
        let start = Rect::new(100.0, 100.0, 300.0, 200.0);
        let r = resize_rect(
            start,
            Point::new(-500.0, -500.0),
            Edges::TOP_LEFT,
            image_bounds(),
            MIN_SIDE,
            None,
        )
        .unwrap();
        assert_eq!(r, Rect::new(0.0, 0.0, 400.0, 300.0));

        let r = resize_rect(
            start,
            Point::new(900.0, 900.0),
            Edges::BOTTOM_RIGHT,
            image_bounds(),
            MIN_SIDE,
            None,
        )
        .unwrap();
        assert_eq!(r, Rect::new(100.0, 100.0, 700.0, 500.0));
    }

    #[test]
    fn test_free_single_edge_keeps_other_axis() {
        let start = Rect::new(100.0, 100.0, 300.0, 200.0);
        let r = resize_rect(
            start,
            Point::new(40.0, 70.0),
            Edges::RIGHT,
            image_bounds(),
            MIN_SIDE,
            None,
        )
        .unwrap();
        assert_eq!(r, Rect::new(100.0, 100.0, 340.0, 200.0));
    }

    #[test]
    fn test_locked_edge_grows_symmetrically() {
        let start = Rect::new(200.0, 200.0, 200.0, 200.0);
        let r = resize_rect(
            start,
            Point::new(40.0, 0.0),
            Edges::RIGHT,
            image_bounds(),
            MIN_SIDE,
            Some(1.0),
        )
        .unwrap();
        assert!(r.approx_eq(&Rect::new(200.0, 180.0, 240.0, 240.0), 1e-9));
        assert!((r.center().y - start.center().y).abs() < 1e-9);
    }

    #[test]
    fn test_locked_edge_shifts_inside_bounds() {
        // Touching the top: the derived height cannot grow upward, so the frame slides down.
        let start = Rect::new(200.0, 0.0, 200.0, 200.0);
        let r = resize_rect(
            start,
            Point::new(100.0, 0.0),
            Edges::RIGHT,
            image_bounds(),
            MIN_SIDE,
            Some(1.0),
        )
        .unwrap();
        assert!(r.approx_eq(&Rect::new(200.0, 0.0, 300.0, 300.0), 1e-9));
    }

    #[test]
    fn test_locked_vertical_edge() {
        let start = Rect::new(200.0, 150.0, 320.0, 180.0);
        let ratio = 16.0 / 9.0;
        let r = resize_rect(
            start,
            Point::new(0.0, -90.0),
            Edges::TOP,
            image_bounds(),
            MIN_SIDE,
            Some(ratio),
        )
        .unwrap();
        assert!((r.height() - 270.0).abs() < 1e-9);
        assert!((r.width() / r.height() - ratio).abs() < 1e-9);
        assert!((r.max_y() - start.max_y()).abs() < 1e-9);
    }

    #[test]
    fn test_locked_corner_pins_opposite_corner() {
        let start = Rect::new(200.0, 100.0, 400.0, 300.0);
        let ratio = 4.0 / 3.0;
        let r = resize_rect(
            start,
            Point::new(-60.0, -30.0),
            Edges::TOP_LEFT,
            image_bounds(),
            MIN_SIDE,
            Some(ratio),
        )
        .unwrap();
        // delta = (60 + 30 * 4/3) / 2 = 50
        assert!((r.width() - 450.0).abs() < 1e-9);
        assert!((r.width() / r.height() - ratio).abs() < 1e-9);
        assert!((r.max_x() - start.max_x()).abs() < 1e-9);
        assert!((r.max_y() - start.max_y()).abs() < 1e-9);
    }

    #[test]
    fn test_locked_corner_clamped_by_bounds() {
        let start = Rect::new(100.0, 100.0, 400.0, 400.0);
        let r = resize_rect(
            start,
            Point::new(1000.0, 1000.0),
            Edges::BOTTOM_RIGHT,
            image_bounds(),
            MIN_SIDE,
            Some(1.0),
        )
        .unwrap();
        assert!(r.approx_eq(&Rect::new(100.0, 100.0, 500.0, 500.0), 1e-9));
    }

    #[test]
    fn test_invalid_translation_rejected() {
        let start = Rect::new(100.0, 100.0, 300.0, 200.0);
        let r = resize_rect(
            start,
            Point::new(f64::NAN, 0.0),
            Edges::LEFT,
            image_bounds(),
            MIN_SIDE,
            None,
        );
        assert_eq!(r, None);

        let r = resize_rect(
            start,
            Point::new(10.0, 0.0),
            Edges::LEFT,
            Rect::new(0.0, 0.0, 0.0, 600.0),
            MIN_SIDE,
            None,
        );
        assert_eq!(r, None);
    }

    #[test]
    fn test_fit_ratio() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 800.0);
        assert_eq!(fit_ratio(bounds, 1.0), Rect::new(0.0, 200.0, 400.0, 400.0));
        assert_eq!(fit_ratio(bounds, 0.25), Rect::new(100.0, 0.0, 200.0, 800.0));
    }

    #[test]
    fn test_hit_test_edges_and_corners() {
        let frame = Rect::new(100.0, 100.0, 200.0, 200.0);
        assert_eq!(hit_test(Point::new(100.0, 200.0), frame, 44.0), Edges::LEFT);
        assert_eq!(
            hit_test(Point::new(300.0, 200.0), frame, 44.0),
            Edges::RIGHT
        );
        assert_eq!(hit_test(Point::new(200.0, 95.0), frame, 44.0), Edges::TOP);
        assert_eq!(
            hit_test(Point::new(200.0, 310.0), frame, 44.0),
            Edges::BOTTOM
        );
        assert_eq!(
            hit_test(Point::new(105.0, 105.0), frame, 44.0),
            Edges::TOP_LEFT
        );
        assert_eq!(
            hit_test(Point::new(295.0, 305.0), frame, 44.0),
            Edges::BOTTOM_RIGHT
        );
        assert_eq!(hit_test(Point::new(200.0, 200.0), frame, 44.0), Edges::NONE);
        assert_eq!(hit_test(Point::new(10.0, 10.0), frame, 44.0), Edges::NONE);
    }

    #[test]
    fn test_hit_test_grows_tiny_frame() {
        let frame = Rect::new(100.0, 100.0, 10.0, 10.0);
        // Past the real corner, but inside the band of a 44x44 target.
        assert_eq!(
            hit_test(Point::new(140.0, 140.0), frame, 44.0),
            Edges::BOTTOM_RIGHT
        );
        assert_eq!(
            hit_test(Point::new(140.0, 80.0), frame, 44.0),
            Edges::TOP_RIGHT
        );
    }

    #[test]
    fn test_engine_notifies_only_on_change() {
        let mut engine = ResizeEngine::new(image_bounds(), image_bounds(), MIN_SIDE, 44.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.subscribe(move |rect| sink.borrow_mut().push(rect));

        engine.begin_with_edges(Point::ZERO, Edges::TOP_LEFT);
        assert!(engine.update(Point::new(50.0, 30.0)).is_some());
        assert!(engine.update(Point::new(50.0, 30.0)).is_none());
        assert!(engine.update(Point::new(60.0, 30.0)).is_some());
        engine.end();

        assert_eq!(seen.borrow().len(), 2);
        assert!(!engine.is_active());
    }

    #[test]
    fn test_engine_keeps_last_valid_frame() {
        let mut engine = ResizeEngine::new(image_bounds(), image_bounds(), MIN_SIDE, 44.0);
        engine.begin_with_edges(Point::ZERO, Edges::RIGHT);
        engine.update(Point::new(-100.0, 0.0));
        let valid = engine.frame();

        assert_eq!(engine.update(Point::new(f64::NAN, f64::NAN)), None);
        assert_eq!(engine.frame(), valid);
    }

    #[test]
    fn test_engine_begin_outside_handles() {
        let mut engine = ResizeEngine::new(image_bounds(), image_bounds(), MIN_SIDE, 44.0);
        assert_eq!(engine.begin(Point::new(400.0, 300.0)), Edges::NONE);
        assert!(!engine.is_active());
        assert_eq!(engine.update(Point::new(10.0, 10.0)), None);

        assert_eq!(engine.begin(Point::new(2.0, 300.0)), Edges::LEFT);
        assert!(engine.is_active());
    }

    #[test]
    fn test_engine_session_captures_locked_ratio() {
        let mut engine = ResizeEngine::new(image_bounds(), image_bounds(), MIN_SIDE, 44.0);
        engine.set_locked_ratio(Some(1.5));
        engine.begin_with_edges(Point::ZERO, Edges::RIGHT);
        engine.set_locked_ratio(None);
        assert_eq!(engine.session().unwrap().locked_ratio, Some(1.5));

        engine.set_locked_ratio(Some(-1.0));
        assert_eq!(engine.locked_ratio(), None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

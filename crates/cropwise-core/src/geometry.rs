//! Plain geometry value types used throughout the crop engine.
//!
//! All coordinates are `f64`. Every helper returns a new value; nothing here
//! mutates its receiver.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downward
//! - A `Rect` with negative size is never produced by these helpers

use serde::{Deserialize, Serialize};

/// Tolerance used for geometric equality checks.
pub const EPSILON: f64 = 1e-9;

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Largest uniform factor that scales `self` to fit inside `target`.
    ///
    /// `Size::new(200.0, 100.0).scale_to_fit(Size::new(100.0, 100.0)) == 0.5`
    pub fn scale_to_fit(self, target: Size) -> f64 {
        (target.width / self.width).min(target.height / self.height)
    }

    /// Smallest uniform factor that scales `self` to cover `target`.
    pub fn scale_to_fill(self, target: Size) -> f64 {
        (target.width / self.width).max(target.height / self.height)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }

    pub fn rounded(self) -> Self {
        Self::new(self.width.round(), self.height.round())
    }

    /// Same dimensions with width and height exchanged.
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn approx_eq(self, other: Size, tolerance: f64) -> bool {
        (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// Padding on the four sides of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

/// A set of rectangle edges. Two adjacent edges describe a corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Edges(u8);

impl Edges {
    pub const NONE: Edges = Edges(0);
    pub const TOP: Edges = Edges(1);
    pub const LEFT: Edges = Edges(1 << 1);
    pub const BOTTOM: Edges = Edges(1 << 2);
    pub const RIGHT: Edges = Edges(1 << 3);
    pub const ALL: Edges = Edges(0b1111);

    pub const TOP_LEFT: Edges = Edges(Self::TOP.0 | Self::LEFT.0);
    pub const TOP_RIGHT: Edges = Edges(Self::TOP.0 | Self::RIGHT.0);
    pub const BOTTOM_LEFT: Edges = Edges(Self::BOTTOM.0 | Self::LEFT.0);
    pub const BOTTOM_RIGHT: Edges = Edges(Self::BOTTOM.0 | Self::RIGHT.0);

    pub const fn contains(self, other: Edges) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Edges) -> Edges {
        Edges(self.0 | other.0)
    }

    pub const fn difference(self, other: Edges) -> Edges {
        Edges(self.0 & !other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Edges) {
        self.0 |= other.0;
    }

    pub fn has_horizontal(self) -> bool {
        self.contains(Self::LEFT) || self.contains(Self::RIGHT)
    }

    /// True when exactly one horizontal and one vertical edge are set.
    pub fn is_corner(self) -> bool {
        let horizontal = self.contains(Self::LEFT) as u8 + self.contains(Self::RIGHT) as u8;
        let vertical = self.contains(Self::TOP) as u8 + self.contains(Self::BOTTOM) as u8;
        horizontal == 1 && vertical == 1
    }

    /// Drops an edge whose opposite is also present, keeping top and left.
    pub fn without_opposites(self) -> Edges {
        let mut edges = self;
        if edges.contains(Self::LEFT) && edges.contains(Self::RIGHT) {
            edges = edges.difference(Self::RIGHT);
        }
        if edges.contains(Self::TOP) && edges.contains(Self::BOTTOM) {
            edges = edges.difference(Self::BOTTOM);
        }
        edges
    }
}

impl std::ops::BitOr for Edges {
    type Output = Edges;

    fn bitor(self, rhs: Edges) -> Edges {
        self.union(rhs)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    /// Rectangle of `size` whose center is `center`.
    pub fn centered_at(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    /// Rectangle of `size` centered inside `container`.
    pub fn centered_in(container: Rect, size: Size) -> Self {
        Self::centered_at(container.center(), size)
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn mid_x(&self) -> f64 {
        self.origin.x + self.size.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.origin.y + self.size.height / 2.0
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// Shrinks (positive values) or grows (negative values) each side.
    pub fn inset_by(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.origin.x + dx,
            self.origin.y + dy,
            self.size.width - 2.0 * dx,
            self.size.height - 2.0 * dy,
        )
    }

    /// Applies `insets` to the rectangle, moving each side inward.
    pub fn inset_by_insets(&self, insets: EdgeInsets) -> Self {
        Self::new(
            self.origin.x + insets.left,
            self.origin.y + insets.top,
            self.size.width - insets.left - insets.right,
            self.size.height - insets.top - insets.bottom,
        )
    }

    /// Grows the rectangle so each side is at least `min_size`, keeping the origin.
    pub fn extend_to(&self, min_size: Size) -> Self {
        Self {
            origin: self.origin,
            size: Size::new(
                self.size.width.max(min_size.width),
                self.size.height.max(min_size.height),
            ),
        }
    }

    /// Replaces the width. With `Edges::RIGHT` the right edge stays put.
    pub fn with_width(&self, width: f64, anchor: Edges) -> Self {
        let mut r = *self;
        if anchor.contains(Edges::RIGHT) {
            r.origin.x += r.size.width - width;
        }
        r.size.width = width;
        r
    }

    /// Replaces the height. With `Edges::BOTTOM` the bottom edge stays put.
    pub fn with_height(&self, height: f64, anchor: Edges) -> Self {
        let mut r = *self;
        if anchor.contains(Edges::BOTTOM) {
            r.origin.y += r.size.height - height;
        }
        r.size.height = height;
        r
    }

    /// Removes a band of `side` from each listed edge.
    pub fn cropped_by(&self, side: f64, edges: Edges) -> Self {
        let mut r = *self;
        if edges.contains(Edges::TOP) {
            r.origin.y += side;
            r.size.height -= side;
        }
        if edges.contains(Edges::LEFT) {
            r.origin.x += side;
            r.size.width -= side;
        }
        if edges.contains(Edges::BOTTOM) {
            r.size.height -= side;
        }
        if edges.contains(Edges::RIGHT) {
            r.size.width -= side;
        }
        r
    }

    /// Overlap of two rectangles, or `None` when they do not intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min_x = self.min_x().max(other.min_x());
        let min_y = self.min_y().max(other.min_y());
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        if max_x <= min_x || max_y <= min_y {
            return None;
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// True when `other` lies inside `self`, allowing `tolerance` of slack.
    pub fn contains_rect(&self, other: &Rect, tolerance: f64) -> bool {
        other.min_x() >= self.min_x() - tolerance
            && other.min_y() >= self.min_y() - tolerance
            && other.max_x() <= self.max_x() + tolerance
            && other.max_y() <= self.max_y() + tolerance
    }

    pub fn is_finite(&self) -> bool {
        self.origin.is_finite() && self.size.width.is_finite() && self.size.height.is_finite()
    }

    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        self.origin.approx_eq(other.origin, tolerance) && self.size.approx_eq(other.size, tolerance)
    }
}

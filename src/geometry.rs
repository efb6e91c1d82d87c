// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Integer geometry in client coordinates.
//!
//! Native window systems report positions and sizes in whole pixels, and the reconciler
//! compares them for exact equality, so these types are integral.

/// A point in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Point {
        Point::new(x, y)
    }
}

/// A size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    pub const fn new(width: u32, height: u32) -> Size {
        Size { width, height }
    }

    /// Returns `true` if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Size {
        Size::new(width, height)
    }
}

/// An axis-aligned rectangle, used for repaint regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Rect {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }
}

/// The stored geometry of a window: position plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Geometry {
        Geometry {
            x,
            y,
            width,
            height,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Translate a point in screen coordinates into this window's client coordinates.
    pub fn to_client(&self, screen: Point) -> Point {
        Point::new(
            screen.x.saturating_sub(self.x),
            screen.y.saturating_sub(self.y),
        )
    }
}

/// Window decoration insets.
///
/// The fields are either all non-negative or all `-1`, which means the
/// window manager has not told us yet. Use [`Insets::new`] to build a
/// value from a native query; it refuses partially known input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Insets {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Insets {
    /// The "not known yet" sentinel.
    pub const UNKNOWN: Insets = Insets {
        left: -1,
        right: -1,
        top: -1,
        bottom: -1,
    };

    pub const ZERO: Insets = Insets {
        left: 0,
        right: 0,
        top: 0,
        bottom: 0,
    };

    /// Build insets from four native values.
    ///
    /// Returns `None` if any of them is negative, unless all four are `-1`
    /// (in which case the result is [`Insets::UNKNOWN`]).
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Option<Insets> {
        let insets = Insets {
            left,
            right,
            top,
            bottom,
        };
        if insets == Insets::UNKNOWN || insets.is_known() {
            Some(insets)
        } else {
            None
        }
    }

    /// `true` if all four fields are non-negative.
    pub fn is_known(&self) -> bool {
        self.left >= 0 && self.right >= 0 && self.top >= 0 && self.bottom >= 0
    }
}

impl Default for Insets {
    fn default() -> Insets {
        Insets::UNKNOWN
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn insets_refuse_partial() {
        assert_eq!(Insets::new(-1, -1, -1, -1), Some(Insets::UNKNOWN));
        assert_eq!(Insets::new(1, 2, 3, 4).map(|i| i.top), Some(3));
        assert_eq!(Insets::new(-1, 0, 0, 0), None);
        assert!(!Insets::UNKNOWN.is_known());
        assert!(Insets::ZERO.is_known());
    }

    #[test]
    fn screen_to_client() {
        let geom = Geometry::new(100, 50, 640, 480);
        assert_eq!(geom.to_client(Point::new(110, 60)), Point::new(10, 10));
    }
}

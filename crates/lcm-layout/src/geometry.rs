//! Pixel rectangles

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Axis-aligned rectangle; `right`/`bottom` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Rect {
    /// Create rectangle
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Exclusive right edge
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Exclusive bottom edge
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Area in square pixels
    #[inline]
    #[must_use]
    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Overlap with positive area
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the vertical extents share at least one pixel row
    #[inline]
    #[must_use]
    pub fn rows_overlap(&self, other: &Self) -> bool {
        self.top < other.bottom() && other.top < self.bottom()
    }

    /// Shifted copy
    #[inline]
    #[must_use]
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    /// Copy with width and height of at least one pixel
    #[inline]
    #[must_use]
    pub fn at_least_one_pixel(&self) -> Self {
        Self::new(self.left, self.top, self.width.max(1), self.height.max(1))
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.left, self.top, self.width, self.height)
    }
}

/// Smallest rectangle covering every input; `None` when empty
#[must_use]
pub fn bounding_box<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    rects.into_iter().fold(None, |acc, r| {
        Some(match acc {
            None => *r,
            Some(b) => {
                let left = b.left.min(r.left);
                let top = b.top.min(r.top);
                let right = b.right().max(r.right());
                let bottom = b.bottom().max(r.bottom());
                Rect::new(left, top, right - left, bottom - top)
            }
        })
    })
}

/// Index pairs `(i, j)`, `i < j`, whose rectangles intersect
#[must_use]
pub fn overlapping_pairs(rects: &[Rect]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in rects.iter().enumerate() {
        for (j, b) in rects.iter().enumerate().skip(i + 1) {
            if a.intersects(b) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

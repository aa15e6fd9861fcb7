//! Axis-aligned rectangles used by the labeler
//!
//! All coordinates are screen-like: `top <= bottom`, y grows downwards.

use geo::{Coord, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The rectangle all labels must be placed in
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelArea {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl LabelArea {
    /// Create an area from its bounds given in any corner order
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left: left.min(right),
            right: left.max(right),
            top: top.min(bottom),
            bottom: top.max(bottom),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Closed containment test for a point
    #[inline]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// True when the whole box lies inside the area (boundaries included)
    #[inline]
    pub fn contains(&self, label_box: &LabelBox) -> bool {
        label_box.left >= self.left
            && label_box.right <= self.right
            && label_box.top >= self.top
            && label_box.bottom <= self.bottom
    }

    /// Part of `[left, right] × [top, bottom]` inside the area, `None` if disjoint or non-finite
    pub(crate) fn clip_box(&self, left: f32, right: f32, top: f32, bottom: f32) -> Option<LabelBox> {
        if !(left.is_finite() && right.is_finite() && top.is_finite() && bottom.is_finite()) {
            return None;
        }
        let clipped = LabelBox::new(
            left.max(self.left),
            right.min(self.right),
            top.max(self.top),
            bottom.min(self.bottom),
        );
        (clipped.left <= clipped.right && clipped.top <= clipped.bottom).then_some(clipped)
    }

    /// Part of the segment `(x1, y1)-(x2, y2)` inside the area (Liang-Barsky)
    pub(crate) fn clip_segment(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> Option<[f32; 4]> {
        if !(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite()) {
            return None;
        }
        let (x1, y1) = (f64::from(x1), f64::from(y1));
        let dx = f64::from(x2) - x1;
        let dy = f64::from(y2) - y1;

        let mut enter = 0.0f64;
        let mut exit = 1.0f64;
        for (p, q) in [
            (-dx, x1 - f64::from(self.left)),
            (dx, f64::from(self.right) - x1),
            (-dy, y1 - f64::from(self.top)),
            (dy, f64::from(self.bottom) - y1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                enter = enter.max(t);
            } else {
                exit = exit.min(t);
            }
        }
        if enter > exit {
            return None;
        }

        Some([
            (x1 + enter * dx) as f32,
            (y1 + enter * dy) as f32,
            (x1 + exit * dx) as f32,
            (y1 + exit * dy) as f32,
        ])
    }
}

impl From<Rect<f32>> for LabelArea {
    fn from(rect: Rect<f32>) -> Self {
        Self {
            left: rect.min().x,
            right: rect.max().x,
            top: rect.min().y,
            bottom: rect.max().y,
        }
    }
}

impl From<LabelArea> for Rect<f32> {
    fn from(area: LabelArea) -> Self {
        Rect::new(
            Coord {
                x: area.left,
                y: area.top,
            },
            Coord {
                x: area.right,
                y: area.bottom,
            },
        )
    }
}

/// A label rectangle `[left, right] × [top, bottom]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelBox {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl LabelBox {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Closed containment test: points on the border count as inside
    #[inline]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y <= self.bottom && y >= self.top
    }

    /// True when one of this box's corners lies inside `other` (closed test)
    pub fn has_corner_in(&self, other: &LabelBox) -> bool {
        let left_in = self.left >= other.left && self.left <= other.right;
        let right_in = self.right >= other.left && self.right <= other.right;
        let top_in = self.top >= other.top && self.top <= other.bottom;
        let bottom_in = self.bottom >= other.top && self.bottom <= other.bottom;

        (left_in || right_in) && (top_in || bottom_in)
    }

    /// True when the open interiors of both boxes overlap; touching borders do not count
    pub fn overlaps_interior(&self, other: &LabelBox) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// The four corners in blocking order: bottom-left, top-left, top-right, bottom-right
    #[inline]
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.left, self.bottom),
            (self.left, self.top),
            (self.right, self.top),
            (self.right, self.bottom),
        ]
    }

    #[inline]
    pub(crate) fn translate(&mut self, dx: f32, dy: f32) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }
}

impl From<LabelBox> for Rect<f32> {
    fn from(label_box: LabelBox) -> Self {
        Rect::new(
            Coord {
                x: label_box.left,
                y: label_box.top,
            },
            Coord {
                x: label_box.right,
                y: label_box.bottom,
            },
        )
    }
}

/// Axis-aligned geometry in world pixels.
///
/// Every entity is described by its center and a size; the bounding box
/// is always derived, never stored. `y` grows downward, so a box's `top`
/// is numerically smaller than its `bottom`.

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// Box of `size` centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, size: Size) -> Self {
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;
        Rect { left: cx - hw, top: cy - hh, right: cx + hw, bottom: cy + hh }
    }

    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    #[cfg(test)]
    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// Is `x` within `[left, right]`?
    #[inline]
    pub fn spans_x(&self, x: f64) -> bool {
        x >= self.left && x <= self.right
    }

    #[inline]
    pub fn spans_y(&self, y: f64) -> bool {
        y >= self.top && y <= self.bottom
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.spans_x(x) && self.spans_y(y)
    }

    /// Strict overlap: boxes that merely share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

/// The single overlap primitive used by every contact check in the game.
#[inline]
pub fn boxes_intersect(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

//! # Geometry Types
//!
//! Percentage-plus-offset positions and the rectangles they resolve to.
//! A [`Position`] is resolved against a container size, four of them
//! ([`RegionPositions`]) describe the edges of a region, and the result of
//! resolving those edges is a [`Rect`] in terminal cells.

/// One edge coordinate expressed as `fraction * size + offset`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub fraction: f32,
    pub offset: i32,
}

impl Position {
    /// Create a new position
    pub const fn new(fraction: f32, offset: i32) -> Self {
        Self { fraction, offset }
    }

    /// A position made only of a fixed offset from the container origin
    pub const fn absolute(offset: i32) -> Self {
        Self::new(0.0, offset)
    }

    /// Resolve against a container size
    ///
    /// The fractional part is truncated toward negative infinity before the
    /// offset is added, so the same inputs always produce the same cell.
    pub fn resolve(self, size: u16) -> i32 {
        (self.fraction * f32::from(size)).floor() as i32 + self.offset
    }
}

/// The four edges of a region
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionPositions {
    pub left: Position,
    pub top: Position,
    pub right: Position,
    pub bottom: Position,
}

impl RegionPositions {
    pub const fn new(left: Position, top: Position, right: Position, bottom: Position) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Edges given as plain cell coordinates
    pub const fn absolute(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(
            Position::absolute(left),
            Position::absolute(top),
            Position::absolute(right),
            Position::absolute(bottom),
        )
    }

    /// A box of `width` x `height` content cells centred on the container
    pub fn centered(width: u16, height: u16) -> Self {
        let half_w = i32::from(width) / 2;
        let half_h = i32::from(height) / 2;
        Self::new(
            Position::new(0.5, -half_w - 1),
            Position::new(0.5, -half_h - 1),
            Position::new(0.5, i32::from(width) - half_w),
            Position::new(0.5, i32::from(height) - half_h),
        )
    }

    /// Resolve all four edges against the container
    ///
    /// Edges are clamped to one cell beyond the container on each side so
    /// that the content of an unframed region can reach column and row zero.
    /// Returns `None` when the result is degenerate.
    pub fn resolve(&self, dims: Dimensions) -> Option<Rect> {
        let width = dims.width.saturating_add(1);
        let height = dims.height.saturating_add(1);
        let max_x = i32::from(dims.width);
        let max_y = i32::from(dims.height);

        let rect = Rect {
            x0: self.left.resolve(width).clamp(-1, max_x),
            y0: self.top.resolve(height).clamp(-1, max_y),
            x1: self.right.resolve(width).clamp(-1, max_x),
            y1: self.bottom.resolve(height).clamp(-1, max_y),
        };

        if rect.is_degenerate() {
            None
        } else {
            Some(rect)
        }
    }
}

/// A resolved region in terminal cells
///
/// The edges are inclusive frame positions; content is drawn inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub const fn is_degenerate(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Width of the content area
    pub fn inner_width(&self) -> usize {
        (self.x1 - self.x0 - 1).max(0) as usize
    }

    /// Height of the content area
    pub fn inner_height(&self) -> usize {
        (self.y1 - self.y0 - 1).max(0) as usize
    }

    /// Top-left cell of the content area
    pub const fn inner_origin(&self) -> (i32, i32) {
        (self.x0 + 1, self.y0 + 1)
    }
}

/// Dimensions representing width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Check if dimensions are empty (width or height is 0)
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

//! Bounding boxes and translations
//!
//! All coordinates are in inches, with y increasing downwards.

/// Axis-aligned bounding box that may be unset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unset()
    }
}

impl Bounds {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// A box that contains nothing; merging anything into it yields that thing
    pub fn unset() -> Self {
        Self {
            x0: f64::INFINITY,
            y0: f64::INFINITY,
            x1: f64::NEG_INFINITY,
            y1: f64::NEG_INFINITY,
        }
    }

    pub fn is_set(&self) -> bool {
        self.x0 <= self.x1 && self.y0 <= self.y1
    }

    pub fn width(&self) -> f64 {
        if self.is_set() {
            self.x1 - self.x0
        } else {
            0.0
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_set() {
            self.y1 - self.y0
        } else {
            0.0
        }
    }

    pub fn merge(&mut self, other: &Bounds) -> &mut Self {
        if other.is_set() {
            self.x0 = self.x0.min(other.x0);
            self.y0 = self.y0.min(other.y0);
            self.x1 = self.x1.max(other.x1);
            self.y1 = self.y1.max(other.y1);
        }
        self
    }

    pub fn merge_point(&mut self, x: f64, y: f64) -> &mut Self {
        self.x0 = self.x0.min(x);
        self.y0 = self.y0.min(y);
        self.x1 = self.x1.max(x);
        self.y1 = self.y1.max(y);
        self
    }

    /// Grow the box by `amount` on every side
    pub fn padded(&self, amount: f64) -> Bounds {
        if !self.is_set() {
            return *self;
        }
        Bounds::new(
            self.x0 - amount,
            self.y0 - amount,
            self.x1 + amount,
            self.y1 + amount,
        )
    }

    pub fn translated(&self, by: Translate) -> Bounds {
        if !self.is_set() {
            return *self;
        }
        Bounds::new(self.x0 + by.dx, self.y0 + by.dy, self.x1 + by.dx, self.y1 + by.dy)
    }
}

/// A translation applied to an element and its children
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translate {
    pub dx: f64,
    pub dy: f64,
}

impl Translate {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn is_identity(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

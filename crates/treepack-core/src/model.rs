use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn x2(&self) -> u64 {
        self.x as u64 + self.w as u64
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn y2(&self) -> u64 {
        self.y as u64 + self.h as u64
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// True if a `w x h` rectangle fits inside this one without rotation.
    pub fn can_hold(&self, w: u32, h: u32) -> bool {
        w <= self.w && h <= self.h
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.x2() <= self.x2() && r.y2() <= self.y2()
    }
    /// Returns true if the two rectangles share a positive area.
    pub fn overlaps(&self, r: &Rect) -> bool {
        (self.x as u64) < r.x2()
            && (r.x as u64) < self.x2()
            && (self.y as u64) < r.y2()
            && (r.y as u64) < self.y2()
    }
}

/// Placement origin attached to a block once it has been packed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Fit {
    pub x: u32,
    pub y: u32,
}

impl Fit {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A rectangle request that a packer can decorate with a [`Fit`].
///
/// Packers only read the size and write the fit; any other data the
/// implementing type carries is left untouched.
pub trait Block {
    /// Requested `(w, h)`.
    fn size(&self) -> (u32, u32);
    /// Called once per `fit` pass: `Some` on placement, `None` when the block did not fit.
    fn set_fit(&mut self, fit: Option<Fit>);
}

impl<B: Block + ?Sized> Block for &mut B {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }
    fn set_fit(&mut self, fit: Option<Fit>) {
        (**self).set_fit(fit)
    }
}

/// Ready-made keyed block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sprite<K = String> {
    pub key: K,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<Fit>,
}

impl<K> Sprite<K> {
    pub fn new(key: K, w: u32, h: u32) -> Self {
        Self { key, w, h, fit: None }
    }

    /// Placed rectangle, if the sprite was packed.
    pub fn placed(&self) -> Option<Rect> {
        self.fit.map(|f| Rect::new(f.x, f.y, self.w, self.h))
    }
}

impl<K> Block for Sprite<K> {
    fn size(&self) -> (u32, u32) {
        (self.w, self.h)
    }
    fn set_fit(&mut self, fit: Option<Fit>) {
        self.fit = fit;
    }
}

/// A placed block within the bin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement<K = String> {
    /// User-specified key (e.g., filename or block label).
    pub key: K,
    /// Placed rectangle within the bin.
    pub frame: Rect,
}

/// Result of a pipeline run: bin size, placements and the keys that did not fit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layout<K = String> {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement<K>>,
    pub unplaced: Vec<K>,
}

impl<K> Default for Layout<K> {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            placements: Vec::new(),
            unplaced: Vec::new(),
        }
    }
}

/// Statistics about packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PackStats {
    /// Blocks given to the packer.
    pub num_blocks: usize,
    pub num_placed: usize,
    pub num_unplaced: usize,
    /// `width * height` of the bin.
    pub bin_area: u64,
    /// Sum of placed block areas.
    pub used_area: u64,
    /// used_area / bin_area (0.0 to 1.0). Higher is better.
    pub occupancy: f64,
}

impl<K> Layout<K> {
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Computes packing statistics for this layout.
    pub fn stats(&self) -> PackStats {
        let num_placed = self.placements.len();
        let num_unplaced = self.unplaced.len();
        let bin_area = self.bounds().area();
        let used_area: u64 = self.placements.iter().map(|p| p.frame.area()).sum();
        let occupancy = if bin_area > 0 {
            used_area as f64 / bin_area as f64
        } else {
            0.0
        };
        PackStats {
            num_blocks: num_placed + num_unplaced,
            num_placed,
            num_unplaced,
            bin_area,
            used_area,
            occupancy,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Placed: {}/{}, Coverage: {:.2}%, Bin Area: {} px², Used Area: {} px²",
            self.num_placed,
            self.num_blocks,
            self.occupancy * 100.0,
            self.bin_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.bin_area.saturating_sub(self.used_area)
    }
}

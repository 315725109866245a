use super::{Packer, fit_in_order};
use crate::model::{Block, Fit, Rect};
use crate::tree::FreeSpaceTree;
use tracing::debug;

/// Direction in which the bin is extended when nothing fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowDirection {
    Right,
    Down,
}

/// Decides how a `bin` that cannot hold `w x h` should grow.
///
/// Growing down keeps the bin width, so it needs `w <= bin.w`; growing right needs
/// `h <= bin.h`. When both are possible the bin grows along its short side if it is
/// already out of proportion by more than the block, and prefers right otherwise.
/// Returns `None` when the block is both wider and taller than the bin, or when the
/// only viable directions would overflow `u32`.
pub fn choose_growth(bin: Rect, w: u32, h: u32) -> Option<GrowDirection> {
    let can_grow_down = w <= bin.w && bin.h.checked_add(h).is_some();
    let can_grow_right = h <= bin.h && bin.w.checked_add(w).is_some();

    let should_grow_right = can_grow_right && bin.h as u64 >= bin.w as u64 + w as u64;
    let should_grow_down = can_grow_down && bin.w as u64 >= bin.h as u64 + h as u64;

    if should_grow_right {
        Some(GrowDirection::Right)
    } else if should_grow_down {
        Some(GrowDirection::Down)
    } else if can_grow_right {
        Some(GrowDirection::Right)
    } else if can_grow_down {
        Some(GrowDirection::Down)
    } else {
        None
    }
}

/// Packs into a bin seeded from the first block and enlarged on demand.
///
/// Each `fit` call starts from scratch. `place` can be used to add blocks one at a
/// time; the first block placed into an empty packer becomes the seed.
#[derive(Debug, Clone)]
pub struct GrowingPacker {
    tree: FreeSpaceTree,
}

impl Default for GrowingPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowingPacker {
    pub fn new() -> Self {
        Self {
            tree: FreeSpaceTree::new(0, 0),
        }
    }

    pub fn tree(&self) -> &FreeSpaceTree {
        &self.tree
    }

    /// Forgets every placement and returns to a `0x0` bin.
    pub fn reset(&mut self) {
        self.tree.reset(0, 0);
    }

    fn grow(&mut self, w: u32, h: u32) -> Option<Fit> {
        let bin = self.tree.bounds();
        match choose_growth(bin, w, h) {
            Some(GrowDirection::Right) => self.grow_right(w, h),
            Some(GrowDirection::Down) => self.grow_down(w, h),
            None => {
                debug!(bin_w = bin.w, bin_h = bin.h, w, h, "bin cannot grow to fit block");
                None
            }
        }
    }

    fn grow_right(&mut self, w: u32, h: u32) -> Option<Fit> {
        if !self.tree.extend_right(w) {
            return None;
        }
        debug!(width = self.tree.bounds().w, "grew bin right");
        self.tree.insert(w, h)
    }

    fn grow_down(&mut self, w: u32, h: u32) -> Option<Fit> {
        if !self.tree.extend_down(h) {
            return None;
        }
        debug!(height = self.tree.bounds().h, "grew bin down");
        self.tree.insert(w, h)
    }
}

impl Packer for GrowingPacker {
    fn bounds(&self) -> Rect {
        self.tree.bounds()
    }

    fn can_fit(&self, w: u32, h: u32) -> bool {
        self.tree.placed() == 0
            || self.tree.find(w, h).is_some()
            || choose_growth(self.tree.bounds(), w, h).is_some()
    }

    fn place(&mut self, w: u32, h: u32) -> Option<Fit> {
        if self.tree.placed() == 0 {
            self.tree.reset(w, h);
        }
        self.tree.insert(w, h).or_else(|| self.grow(w, h))
    }

    /// Resets the bin, seeds it from the first block and grows as needed.
    /// An empty slice leaves a `0x0` bin.
    fn fit<B: Block>(&mut self, blocks: &mut [B]) -> usize
    where
        Self: Sized,
    {
        self.reset();
        fit_in_order(self, blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_right_when_bin_is_tall() {
        let bin = Rect::new(0, 0, 10, 40);
        assert_eq!(choose_growth(bin, 10, 10), Some(GrowDirection::Right));
    }

    #[test]
    fn prefers_down_when_bin_is_wide() {
        let bin = Rect::new(0, 0, 40, 10);
        assert_eq!(choose_growth(bin, 10, 10), Some(GrowDirection::Down));
    }

    #[test]
    fn falls_back_to_right_then_down() {
        let bin = Rect::new(0, 0, 100, 100);
        // Both viable, neither preferred.
        assert_eq!(choose_growth(bin, 100, 50), Some(GrowDirection::Right));
        // Too tall to grow right.
        assert_eq!(choose_growth(bin, 50, 150), Some(GrowDirection::Down));
    }

    #[test]
    fn refuses_two_dimensional_growth() {
        let bin = Rect::new(0, 0, 100, 100);
        assert_eq!(choose_growth(bin, 101, 101), None);
    }

    #[test]
    fn overflowing_direction_is_not_viable() {
        let bin = Rect::new(0, 0, u32::MAX, 10);
        assert_eq!(choose_growth(bin, 5, 5), Some(GrowDirection::Down));
        let bin = Rect::new(0, 0, u32::MAX, u32::MAX);
        assert_eq!(choose_growth(bin, 1, 1), None);
    }
}

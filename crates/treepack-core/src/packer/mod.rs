use crate::model::{Block, Fit, Rect};
use tracing::trace;

pub mod fixed;
pub mod growing;

pub use fixed::FixedPacker;
pub use growing::{GrowDirection, GrowingPacker, choose_growth};

/// A packer places rectangles into a single bin.
///
/// Implementations must ensure no overlaps and keep every placement inside `bounds()`.
/// `place` returns `None` if the rectangle cannot be placed; that is an ordinary outcome.
pub trait Packer {
    /// Current bin rectangle (always anchored at the origin).
    fn bounds(&self) -> Rect;
    /// True if `place(w, h)` would succeed, without modifying the packer.
    fn can_fit(&self, w: u32, h: u32) -> bool;
    fn place(&mut self, w: u32, h: u32) -> Option<Fit>;

    /// Places `blocks` in the given order and records each outcome on the block.
    /// Returns the number of placed blocks. The packer never reorders its input.
    fn fit<B: Block>(&mut self, blocks: &mut [B]) -> usize
    where
        Self: Sized,
    {
        fit_in_order(self, blocks)
    }
}

pub(crate) fn fit_in_order<P: Packer, B: Block>(packer: &mut P, blocks: &mut [B]) -> usize {
    let mut placed = 0;
    for (index, block) in blocks.iter_mut().enumerate() {
        let (w, h) = block.size();
        let fit = packer.place(w, h);
        match fit {
            Some(_) => placed += 1,
            None => trace!(index, w, h, "block left unplaced"),
        }
        block.set_fit(fit);
    }
    placed
}

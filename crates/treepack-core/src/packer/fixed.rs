use super::Packer;
use crate::model::{Fit, Rect};
use crate::tree::FreeSpaceTree;

/// Packs into a bin whose size never changes.
///
/// Calling `fit` again keeps packing into whatever space the previous calls left free.
#[derive(Debug, Clone)]
pub struct FixedPacker {
    tree: FreeSpaceTree,
}

impl FixedPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            tree: FreeSpaceTree::new(width, height),
        }
    }

    pub fn tree(&self) -> &FreeSpaceTree {
        &self.tree
    }
}

impl Packer for FixedPacker {
    fn bounds(&self) -> Rect {
        self.tree.bounds()
    }

    fn can_fit(&self, w: u32, h: u32) -> bool {
        self.tree.find(w, h).is_some()
    }

    fn place(&mut self, w: u32, h: u32) -> Option<Fit> {
        self.tree.insert(w, h)
    }
}

//! Binary free-space tree shared by the fixed and growing packers.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. A node is
//! either a free leaf or a used node owning two children: `right` (the strip
//! beside the placed block, as tall as the block) and `down` (everything below
//! the block, as wide as the node). A node is split at most once.

use crate::model::{Fit, Rect};

/// Index of a node inside a [`FreeSpaceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Free,
    Used { right: NodeId, down: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub rect: Rect,
    pub state: NodeState,
}

impl Node {
    fn free(rect: Rect) -> Self {
        Self {
            rect,
            state: NodeState::Free,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FreeSpaceTree {
    nodes: Vec<Node>,
    root: NodeId,
    placed: usize,
    // Reused traversal stack for `insert`.
    scratch: Vec<NodeId>,
}

impl FreeSpaceTree {
    /// Creates a tree whose root is a single free leaf at `(0, 0)`.
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            nodes: vec![Node::free(Rect::new(0, 0, w, h))],
            root: NodeId(0),
            placed: 0,
            scratch: Vec::new(),
        }
    }

    /// Drops every node and starts over from a free `w x h` root.
    pub fn reset(&mut self, w: u32, h: u32) {
        self.nodes.clear();
        self.nodes.push(Node::free(Rect::new(0, 0, w, h)));
        self.root = NodeId(0);
        self.placed = 0;
    }

    /// Rectangle covered by the current root (the bin).
    pub fn bounds(&self) -> Rect {
        self.node(self.root).rect
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of blocks placed since construction or the last reset.
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Free leaves reachable from the root, in search order.
    pub fn free_rects(&self) -> Vec<Rect> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            match node.state {
                NodeState::Used { right, down } => {
                    stack.push(down);
                    stack.push(right);
                }
                NodeState::Free => out.push(node.rect),
            }
        }
        out
    }

    /// Looks for a free leaf able to hold `w x h` without modifying the tree.
    pub fn find(&self, w: u32, h: u32) -> Option<Rect> {
        let mut stack = Vec::new();
        self.find_leaf(w, h, &mut stack).map(|id| self.node(id).rect)
    }

    /// Finds a free leaf for `w x h` and splits it. Returns the placement origin.
    pub fn insert(&mut self, w: u32, h: u32) -> Option<Fit> {
        let mut stack = std::mem::take(&mut self.scratch);
        let found = self.find_leaf(w, h, &mut stack);
        self.scratch = stack;
        found.map(|id| self.split(id, w, h))
    }

    /// Replaces the root with a used node `w` wider than the current bin.
    /// The old root becomes its `down` child and a free `w x H` strip its `right` child.
    /// Returns false, leaving the tree untouched, if the new width overflows.
    pub fn extend_right(&mut self, w: u32) -> bool {
        let old = self.root;
        let bin = self.bounds();
        let Some(width) = bin.w.checked_add(w) else {
            return false;
        };
        let right = self.push(Node::free(Rect::new(bin.w, 0, w, bin.h)));
        self.root = self.push(Node {
            rect: Rect::new(0, 0, width, bin.h),
            state: NodeState::Used { right, down: old },
        });
        true
    }

    /// Replaces the root with a used node `h` taller than the current bin.
    /// The old root becomes its `right` child and a free `W x h` strip its `down` child.
    /// Returns false, leaving the tree untouched, if the new height overflows.
    pub fn extend_down(&mut self, h: u32) -> bool {
        let old = self.root;
        let bin = self.bounds();
        let Some(height) = bin.h.checked_add(h) else {
            return false;
        };
        let down = self.push(Node::free(Rect::new(0, bin.h, bin.w, h)));
        self.root = self.push(Node {
            rect: Rect::new(0, 0, bin.w, height),
            state: NodeState::Used { right: old, down },
        });
        true
    }

    // Depth-first, right subtree before down subtree.
    fn find_leaf(&self, w: u32, h: u32, stack: &mut Vec<NodeId>) -> Option<NodeId> {
        stack.clear();
        stack.push(self.root);
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            match node.state {
                NodeState::Used { right, down } => {
                    stack.push(down);
                    stack.push(right);
                }
                NodeState::Free if node.rect.can_hold(w, h) => return Some(id),
                NodeState::Free => {}
            }
        }
        None
    }

    // Only called with a leaf just returned by `find_leaf` for the same size.
    fn split(&mut self, id: NodeId, w: u32, h: u32) -> Fit {
        let rect = self.node(id).rect;
        debug_assert_eq!(self.node(id).state, NodeState::Free);
        debug_assert!(rect.can_hold(w, h));
        let right = self.push(Node::free(Rect::new(rect.x + w, rect.y, rect.w - w, h)));
        let down = self.push(Node::free(Rect::new(rect.x, rect.y + h, rect.w, rect.h - h)));
        self.nodes[id.0].state = NodeState::Used { right, down };
        self.placed += 1;
        Fit::new(rect.x, rect.y)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_produces_right_and_down_children() {
        let mut tree = FreeSpaceTree::new(100, 80);
        assert_eq!(tree.insert(30, 20), Some(Fit::new(0, 0)));

        let root = tree.node(tree.root());
        let NodeState::Used { right, down } = root.state else {
            panic!("root should be used after a placement");
        };
        assert_eq!(tree.node(right).rect, Rect::new(30, 0, 70, 20));
        assert_eq!(tree.node(down).rect, Rect::new(0, 20, 100, 60));
        assert_eq!(tree.placed(), 1);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn find_prefers_right_subtree() {
        let mut tree = FreeSpaceTree::new(100, 100);
        tree.insert(50, 50);
        // Both the right strip (50x50) and the down strip (100x50) can hold 10x10.
        assert_eq!(tree.find(10, 10), Some(Rect::new(50, 0, 50, 50)));
        // Only the down strip is wide enough for 60x10.
        assert_eq!(tree.find(60, 10), Some(Rect::new(0, 50, 100, 50)));
        assert_eq!(tree.find(60, 60), None);
    }

    #[test]
    fn find_is_read_only() {
        let tree = FreeSpaceTree::new(10, 10);
        assert!(tree.find(5, 5).is_some());
        assert!(tree.find(5, 5).is_some());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.placed(), 0);
    }

    #[test]
    fn zero_area_leaf_rejects_non_empty_blocks() {
        let mut tree = FreeSpaceTree::new(0, 0);
        assert_eq!(tree.insert(1, 1), None);
        assert_eq!(tree.insert(0, 0), Some(Fit::new(0, 0)));
    }

    #[test]
    fn extend_right_keeps_old_root_as_down_child() {
        let mut tree = FreeSpaceTree::new(10, 10);
        tree.insert(10, 10);
        let old = tree.root();
        assert!(tree.extend_right(5));
        assert_eq!(tree.bounds(), Rect::new(0, 0, 15, 10));
        let NodeState::Used { right, down } = tree.node(tree.root()).state else {
            panic!("grown root must be used");
        };
        assert_eq!(down, old);
        assert_eq!(tree.node(right).rect, Rect::new(10, 0, 5, 10));
        assert_eq!(tree.insert(5, 10), Some(Fit::new(10, 0)));
    }

    #[test]
    fn extend_down_keeps_old_root_as_right_child() {
        let mut tree = FreeSpaceTree::new(10, 10);
        tree.insert(10, 10);
        let old = tree.root();
        assert!(tree.extend_down(4));
        assert_eq!(tree.bounds(), Rect::new(0, 0, 10, 14));
        let NodeState::Used { right, down } = tree.node(tree.root()).state else {
            panic!("grown root must be used");
        };
        assert_eq!(right, old);
        assert_eq!(tree.node(down).rect, Rect::new(0, 10, 10, 4));
    }

    #[test]
    fn extend_refuses_to_overflow() {
        let mut tree = FreeSpaceTree::new(u32::MAX, 1);
        assert!(!tree.extend_right(1));
        assert_eq!(tree.bounds(), Rect::new(0, 0, u32::MAX, 1));
        assert!(tree.extend_down(1));
    }

    #[test]
    fn reset_discards_placements() {
        let mut tree = FreeSpaceTree::new(10, 10);
        tree.insert(4, 4);
        tree.reset(3, 7);
        assert_eq!(tree.placed(), 0);
        assert_eq!(tree.free_rects(), vec![Rect::new(0, 0, 3, 7)]);
    }
}

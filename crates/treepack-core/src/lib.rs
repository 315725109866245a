//! Core library for binary-tree rectangle packing (sprite-sheet layouts).
//!
//! - Tree: a free-space binary tree where each placement splits a free leaf into a
//!   `right` and a `down` remainder
//! - Packers: `FixedPacker` (fixed bin) and `GrowingPacker` (bin seeded from the first
//!   block and grown right or down to stay roughly square)
//! - Pipeline: `pack_layout` sorts keyed sizes, packs them and returns a `Layout`
//! - Data model is serde-serializable; JSON exporters are provided here, PNG output in the CLI crate.
//!
//! Quick example:
//! ```
//! use treepack_core::prelude::*;
//!
//! let mut blocks = vec![Sprite::new("a", 100, 100), Sprite::new("b", 100, 50)];
//! let mut packer = GrowingPacker::new();
//! packer.fit(&mut blocks);
//! assert_eq!(blocks[1].fit, Some(Fit::new(100, 0)));
//! assert_eq!(packer.bounds().w, 200);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod parse;
pub mod pipeline;
pub mod tree;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use parse::*;
pub use pipeline::*;
pub use tree::FreeSpaceTree;

/// Convenience prelude for common types and functions.
/// Importing `treepack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackMode, PackerConfig, PackerConfigBuilder, SortOrder};
    pub use crate::model::{Block, Fit, Layout, PackStats, Placement, Rect, Sprite};
    pub use crate::packer::{FixedPacker, GrowDirection, GrowingPacker, Packer, choose_growth};
    pub use crate::pipeline::{LayoutItem, pack_batches, pack_layout, pack_layout_items, sort_items};
    pub use crate::tree::FreeSpaceTree;
}

use crate::config::{PackMode, PackerConfig, SortOrder};
use crate::error::{Result, TreePackError};
use crate::model::{Layout, Placement, Sprite};
use crate::packer::{FixedPacker, GrowingPacker, Packer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A keyed size to lay out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutItem<K = String> {
    pub key: K,
    pub w: u32,
    pub h: u32,
}

impl<K> LayoutItem<K> {
    pub fn new(key: K, w: u32, h: u32) -> Self {
        Self { key, w, h }
    }
}

/// Packs `(key, width, height)` triples into a single bin.
pub fn pack_layout<K: Into<String>>(inputs: Vec<(K, u32, u32)>, cfg: PackerConfig) -> Result<Layout> {
    let items = inputs
        .into_iter()
        .map(|(k, w, h)| LayoutItem::new(k.into(), w, h))
        .collect();
    pack_layout_items(items, cfg)
}

#[instrument(skip_all)]
/// Packs `items` into a single bin using configuration `cfg`.
///
/// Notes:
/// - Keys must be unique; the whole call fails before packing otherwise.
/// - Sorting is stable and key-tiebroken for deterministic results.
/// - With `auto`, each order in `SortOrder::CANDIDATES` is tried and the best layout
///   wins (most blocks placed, then smallest bin, then most square).
/// - An empty input yields an empty layout.
pub fn pack_layout_items(items: Vec<LayoutItem>, cfg: PackerConfig) -> Result<Layout> {
    cfg.validate()?;
    ensure_unique_keys(&items)?;

    let layout = if cfg.auto {
        pack_auto(&items, &cfg)
    } else {
        pack_sorted(&items, &cfg, cfg.sort_order)
    };
    debug!(
        width = layout.width,
        height = layout.height,
        placed = layout.placements.len(),
        unplaced = layout.unplaced.len(),
        "layout packed"
    );
    Ok(layout)
}

#[instrument(skip_all, fields(sets = sets.len()))]
/// Packs independent item sets, each with its own packer.
/// Every set is validated before any of them is packed.
pub fn pack_batches(sets: Vec<Vec<LayoutItem>>, cfg: PackerConfig) -> Result<Vec<Layout>> {
    cfg.validate()?;
    for items in &sets {
        ensure_unique_keys(items)?;
    }
    let pack_one = |items: &Vec<LayoutItem>| {
        if cfg.auto {
            pack_auto(items, &cfg)
        } else {
            pack_sorted(items, &cfg, cfg.sort_order)
        }
    };

    #[cfg(feature = "parallel")]
    if cfg.parallel {
        return Ok(sets.par_iter().map(pack_one).collect());
    }

    Ok(sets.iter().map(pack_one).collect())
}

/// Stable sort of `items` by `order`, ties broken by key.
pub fn sort_items<K: Ord>(items: &mut [LayoutItem<K>], order: SortOrder) {
    if order == SortOrder::None {
        return;
    }
    items.sort_by(|a, b| compare(a, b, order));
}

fn compare<K: Ord>(a: &LayoutItem<K>, b: &LayoutItem<K>, order: SortOrder) -> Ordering {
    fn desc(a: u64, b: u64) -> Ordering {
        b.cmp(&a)
    }
    let (aw, ah, bw, bh) = (a.w as u64, a.h as u64, b.w as u64, b.h as u64);
    let primary = match order {
        SortOrder::None | SortOrder::Name => Ordering::Equal,
        SortOrder::Width => desc(aw, bw).then(desc(ah, bh)),
        SortOrder::Height => desc(ah, bh).then(desc(aw, bw)),
        SortOrder::Area => desc(aw * ah, bw * bh)
            .then(desc(ah, bh))
            .then(desc(aw, bw)),
        SortOrder::MaxSide => desc(aw.max(ah), bw.max(bh))
            .then(desc(aw.min(ah), bw.min(bh)))
            .then(desc(ah, bh))
            .then(desc(aw, bw)),
    };
    primary.then_with(|| a.key.cmp(&b.key))
}

fn ensure_unique_keys(items: &[LayoutItem]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.key.as_str()) {
            return Err(TreePackError::InvalidInput(format!(
                "duplicate key: {}",
                item.key
            )));
        }
    }
    Ok(())
}

fn pack_sorted(items: &[LayoutItem], cfg: &PackerConfig, order: SortOrder) -> Layout {
    let mut sorted = items.to_vec();
    sort_items(&mut sorted, order);
    let mut sprites: Vec<Sprite> = sorted
        .into_iter()
        .map(|it| Sprite::new(it.key, it.w, it.h))
        .collect();

    let bounds = match cfg.mode {
        PackMode::Fixed => {
            let mut packer = FixedPacker::new(cfg.width, cfg.height);
            packer.fit(&mut sprites);
            packer.bounds()
        }
        PackMode::Growing => {
            let mut packer = GrowingPacker::new();
            packer.fit(&mut sprites);
            packer.bounds()
        }
    };

    let mut layout = Layout {
        width: bounds.w,
        height: bounds.h,
        ..Default::default()
    };
    for sprite in sprites {
        match sprite.placed() {
            Some(frame) => layout.placements.push(Placement {
                key: sprite.key,
                frame,
            }),
            None => layout.unplaced.push(sprite.key),
        }
    }
    layout
}

fn pack_auto(items: &[LayoutItem], cfg: &PackerConfig) -> Layout {
    #[cfg(feature = "parallel")]
    let candidates: Vec<(SortOrder, Layout)> = if cfg.parallel {
        SortOrder::CANDIDATES
            .par_iter()
            .map(|&order| (order, pack_sorted(items, cfg, order)))
            .collect()
    } else {
        SortOrder::CANDIDATES
            .iter()
            .map(|&order| (order, pack_sorted(items, cfg, order)))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let candidates: Vec<(SortOrder, Layout)> = SortOrder::CANDIDATES
        .iter()
        .map(|&order| (order, pack_sorted(items, cfg, order)))
        .collect();

    // Candidates stay in CANDIDATES order, so ties resolve the same way with or without rayon.
    let mut best: Option<(SortOrder, Layout)> = None;
    for (order, layout) in candidates {
        debug!(
            ?order,
            placed = layout.placements.len(),
            width = layout.width,
            height = layout.height,
            "auto candidate"
        );
        let replace = match &best {
            None => true,
            Some((_, current)) => is_better(&layout, current),
        };
        if replace {
            best = Some((order, layout));
        }
    }
    match best {
        Some((order, layout)) => {
            debug!(?order, "auto picked sort order");
            layout
        }
        None => Layout::default(),
    }
}

fn is_better(a: &Layout, b: &Layout) -> bool {
    let key = |l: &Layout| {
        (
            std::cmp::Reverse(l.placements.len()),
            l.bounds().area(),
            l.width.max(l.height),
        )
    };
    key(a) < key(b)
}

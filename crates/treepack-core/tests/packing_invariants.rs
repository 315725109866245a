use rand::{Rng, SeedableRng};
use treepack_core::prelude::*;

fn random_blocks(seed: u64, count: usize) -> Vec<Sprite<usize>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| Sprite::new(i, rng.gen_range(1..=64), rng.gen_range(1..=64)))
        .collect()
}

fn sorted_by_max_side(mut blocks: Vec<Sprite<usize>>) -> Vec<Sprite<usize>> {
    blocks.sort_by(|a, b| b.w.max(b.h).cmp(&a.w.max(a.h)).then(a.key.cmp(&b.key)));
    blocks
}

fn disjoint(rects: &[Rect]) -> bool {
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].overlaps(&rects[j]) {
                return false;
            }
        }
    }
    true
}

fn placed(blocks: &[Sprite<usize>]) -> Vec<Rect> {
    blocks.iter().filter_map(|b| b.placed()).collect()
}

#[test]
fn fixed_placements_are_disjoint_and_contained() {
    for seed in 0..8 {
        let mut blocks = random_blocks(seed, 150);
        let mut packer = FixedPacker::new(256, 256);
        let count = packer.fit(&mut blocks);

        let rects = placed(&blocks);
        assert_eq!(rects.len(), count);
        assert!(count > 0);
        assert!(disjoint(&rects), "overlap with seed {seed}");
        let bin = Rect::new(0, 0, 256, 256);
        assert!(rects.iter().all(|r| bin.contains(r)));
    }
}

#[test]
fn growing_placements_are_disjoint_and_contained() {
    for seed in 0..8 {
        let mut blocks = sorted_by_max_side(random_blocks(seed, 150));
        let mut packer = GrowingPacker::new();
        packer.fit(&mut blocks);

        // Sorted by longest side, every block fits within the seed in one dimension.
        assert!(blocks.iter().all(|b| b.fit.is_some()), "seed {seed}");
        let rects = placed(&blocks);
        assert!(disjoint(&rects), "overlap with seed {seed}");
        let bin = packer.bounds();
        assert!(rects.iter().all(|r| bin.contains(r)));
        let used: u64 = rects.iter().map(|r| r.area()).sum();
        assert!(used <= bin.area());
    }
}

#[test]
fn packing_is_deterministic() {
    let input = random_blocks(42, 120);

    let mut a = input.clone();
    let mut b = input.clone();
    FixedPacker::new(300, 300).fit(&mut a);
    FixedPacker::new(300, 300).fit(&mut b);
    assert_eq!(a, b);

    let mut c = input.clone();
    let mut d = input;
    let mut pc = GrowingPacker::new();
    let mut pd = GrowingPacker::new();
    pc.fit(&mut c);
    pd.fit(&mut d);
    assert_eq!(c, d);
    assert_eq!(pc.bounds(), pd.bounds());
}

#[test]
fn free_space_plus_used_space_covers_fixed_bin() {
    let mut blocks = random_blocks(7, 60);
    let mut packer = FixedPacker::new(200, 120);
    packer.fit(&mut blocks);

    let used: u64 = placed(&blocks).iter().map(|r| r.area()).sum();
    let free: u64 = packer.tree().free_rects().iter().map(|r| r.area()).sum();
    assert_eq!(used + free, 200 * 120);
}

#[test]
fn deep_trees_do_not_overflow_the_stack() {
    // A long thin column: every placement nests one level deeper.
    let mut blocks: Vec<Sprite<usize>> = (0..5_000).map(|i| Sprite::new(i, 1, 1)).collect();
    let mut packer = FixedPacker::new(1, 5_000);
    assert_eq!(packer.fit(&mut blocks), 5_000);
    assert_eq!(blocks[4_999].fit, Some(Fit::new(0, 4_999)));
}

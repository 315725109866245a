use treepack_core::prelude::*;

#[test]
fn seed_then_grow_right() {
    let mut packer = GrowingPacker::new();
    let mut blocks = vec![Sprite::new("a", 100, 100), Sprite::new("b", 100, 50)];
    assert_eq!(packer.fit(&mut blocks), 2);

    assert_eq!(blocks[0].fit, Some(Fit::new(0, 0)));
    assert_eq!(blocks[1].fit, Some(Fit::new(100, 0)));
    assert_eq!(packer.bounds(), Rect::new(0, 0, 200, 100));
}

#[test]
fn wide_bin_grows_down() {
    let mut packer = GrowingPacker::new();
    let mut blocks = vec![Sprite::new("a", 100, 20), Sprite::new("b", 50, 20)];
    packer.fit(&mut blocks);

    // Nothing is left beside the seed, and a 100x20 bin is wider than 20 + 20.
    assert_eq!(blocks[1].fit, Some(Fit::new(0, 20)));
    assert_eq!(packer.bounds(), Rect::new(0, 0, 100, 40));
}

#[test]
fn tall_bin_grows_right() {
    let mut packer = GrowingPacker::new();
    let mut blocks = vec![Sprite::new("a", 20, 100), Sprite::new("b", 20, 50)];
    packer.fit(&mut blocks);

    assert_eq!(blocks[1].fit, Some(Fit::new(20, 0)));
    assert_eq!(packer.bounds(), Rect::new(0, 0, 40, 100));
}

#[test]
fn block_larger_in_both_dimensions_is_unplaced() {
    let mut packer = GrowingPacker::new();
    let mut blocks = vec![Sprite::new("small", 10, 10), Sprite::new("big", 20, 20)];
    assert_eq!(packer.fit(&mut blocks), 1);
    assert_eq!(blocks[1].fit, None);
    assert_eq!(packer.bounds(), Rect::new(0, 0, 10, 10));
}

#[test]
fn empty_input_leaves_degenerate_bin() {
    let mut packer = GrowingPacker::new();
    let mut blocks = vec![Sprite::new("a", 10, 10)];
    packer.fit(&mut blocks);

    let mut none: Vec<Sprite> = Vec::new();
    assert_eq!(packer.fit(&mut none), 0);
    assert_eq!(packer.bounds(), Rect::new(0, 0, 0, 0));
    assert_eq!(packer.tree().placed(), 0);
}

#[test]
fn each_fit_starts_from_the_new_seed() {
    let mut packer = GrowingPacker::new();
    let mut first = vec![Sprite::new("a", 300, 300)];
    packer.fit(&mut first);

    let mut second = vec![Sprite::new("b", 10, 20), Sprite::new("c", 10, 20)];
    packer.fit(&mut second);
    assert_eq!(second[0].fit, Some(Fit::new(0, 0)));
    assert_eq!(second[1].fit, Some(Fit::new(10, 0)));
    assert_eq!(packer.bounds(), Rect::new(0, 0, 20, 20));
}

#[test]
fn incremental_place_matches_fit() {
    let sizes = [(64, 64), (32, 64), (64, 32), (16, 16), (48, 8), (8, 48)];

    let mut by_fit: Vec<Sprite<usize>> = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| Sprite::new(i, w, h))
        .collect();
    let mut a = GrowingPacker::new();
    a.fit(&mut by_fit);

    let mut b = GrowingPacker::new();
    for (sprite, &(w, h)) in by_fit.iter().zip(sizes.iter()) {
        assert!(b.can_fit(w, h));
        assert_eq!(b.place(w, h), sprite.fit);
    }
    assert_eq!(a.bounds(), b.bounds());
}

#[test]
fn zero_sized_seed_cannot_grow() {
    let mut packer = GrowingPacker::new();
    let mut blocks = vec![Sprite::new("empty", 0, 0), Sprite::new("a", 5, 5)];
    assert_eq!(packer.fit(&mut blocks), 1);
    assert_eq!(blocks[0].fit, Some(Fit::new(0, 0)));
    assert_eq!(blocks[1].fit, None);
}

#[test]
fn sorted_squares_fill_a_square_bin() {
    let mut blocks: Vec<Sprite<usize>> = (0..16).map(|i| Sprite::new(i, 10, 10)).collect();
    let mut packer = GrowingPacker::new();
    assert_eq!(packer.fit(&mut blocks), 16);
    assert_eq!(packer.bounds(), Rect::new(0, 0, 40, 40));
}

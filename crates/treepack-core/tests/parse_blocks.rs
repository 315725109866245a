use treepack_core::error::TreePackError;
use treepack_core::parse_blocks;

#[test]
fn parses_sizes_and_repeats() {
    let items = parse_blocks("500x200\n250x200\n50x50x3\n").expect("parse");
    let keys: Vec<&str> = items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["b1", "b2", "b3_0", "b3_1", "b3_2"]);
    assert_eq!((items[0].w, items[0].h), (500, 200));
    assert!(items[2..].iter().all(|i| (i.w, i.h) == (50, 50)));
}

#[test]
fn keys_comments_and_blank_lines() {
    let text = "# heroes\nhero 32x48\n\n  coin 8X8x2  # spinning\nwall 16*16\n";
    let items = parse_blocks(text).expect("parse");
    let got: Vec<(&str, u32, u32)> = items.iter().map(|i| (i.key.as_str(), i.w, i.h)).collect();
    assert_eq!(
        got,
        vec![
            ("hero", 32, 48),
            ("coin_0", 8, 8),
            ("coin_1", 8, 8),
            ("wall", 16, 16)
        ]
    );
}

#[test]
fn zero_sizes_are_allowed() {
    let items = parse_blocks("0x0").expect("parse");
    assert_eq!((items[0].w, items[0].h), (0, 0));
}

#[test]
fn reports_the_offending_line() {
    for (text, bad_line) in [
        ("10x10\n-5x10", 2),
        ("10x", 1),
        ("1x1\n\n10x10x0", 3),
        ("abc", 1),
        ("1x2x3x4", 1),
        ("99999999999x1", 1),
        ("1x1x18446744073709551615", 1),
        ("2x2\n1x1x2000000000", 2),
    ] {
        match parse_blocks(text) {
            Err(TreePackError::InvalidBlockSpec { line, .. }) => assert_eq!(line, bad_line, "{text:?}"),
            other => panic!("Expected InvalidBlockSpec for {text:?}, got {other:?}"),
        }
    }
}

#[test]
fn repeat_count_limit_is_inclusive() {
    let text = format!("1x1x{}", treepack_core::MAX_REPEAT);
    let items = parse_blocks(&text).expect("parse");
    assert_eq!(items.len(), treepack_core::MAX_REPEAT);

    let text = format!("1x1x{}", treepack_core::MAX_REPEAT + 1);
    assert!(matches!(
        parse_blocks(&text),
        Err(TreePackError::InvalidBlockSpec { line: 1, .. })
    ));
}

#[test]
fn generated_names_collide_with_explicit_keys() {
    for (text, bad_line) in [
        ("coin 8x8x2\ncoin_1 4x4", 2),
        ("b3_0 1x1\n\n5x5x2", 3),
        ("hero 1x1\nhero 2x2", 2),
    ] {
        match parse_blocks(text) {
            Err(TreePackError::InvalidBlockSpec { line, reason }) => {
                assert_eq!(line, bad_line, "{text:?}");
                assert!(reason.contains("duplicate key"), "{reason}");
            }
            other => panic!("Expected duplicate-key error for {text:?}, got {other:?}"),
        }
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let result = treepack_core::read_blocks("definitely/not/here.txt");
    assert!(matches!(result, Err(TreePackError::Io(_))));
}

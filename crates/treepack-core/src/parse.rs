//! Plain-text block lists.
//!
//! One block per line: `WxH`, `WxHxN` (N copies) or either form preceded by a key
//! and whitespace (`hero 32x48`). Blank lines and `#` comments are ignored.
//! Unkeyed blocks are named `b{line}`; copies get a `_{index}` suffix. Generated
//! names share one namespace with explicit keys and must not collide with them.

use crate::error::{Result, TreePackError};
use crate::pipeline::LayoutItem;
use std::collections::HashMap;
use std::path::Path;

/// Largest repeat count accepted for a single line.
pub const MAX_REPEAT: usize = 65_536;

/// Parses a block list. Fails on the first malformed line without returning partial output.
pub fn parse_blocks(text: &str) -> Result<Vec<LayoutItem>> {
    let mut out: Vec<LayoutItem> = Vec::new();
    // key -> line that introduced it
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let (key, dims) = match content.rsplit_once(char::is_whitespace) {
            Some((k, d)) => (k.trim().to_string(), d),
            None => (format!("b{line}"), content),
        };
        let (w, h, num) = parse_dims(dims).map_err(|reason| TreePackError::InvalidBlockSpec {
            line,
            reason,
        })?;
        let keys: Vec<String> = if num == 1 {
            vec![key]
        } else {
            (0..num).map(|i| format!("{key}_{i}")).collect()
        };
        for key in keys {
            if let Some(first) = seen.insert(key.clone(), line) {
                return Err(TreePackError::InvalidBlockSpec {
                    line,
                    reason: format!("duplicate key {key:?} (first used on line {first})"),
                });
            }
            out.push(LayoutItem::new(key, w, h));
        }
    }
    Ok(out)
}

/// Reads and parses a block list file.
pub fn read_blocks(path: impl AsRef<Path>) -> Result<Vec<LayoutItem>> {
    let text = std::fs::read_to_string(path)?;
    parse_blocks(&text)
}

fn parse_dims(s: &str) -> std::result::Result<(u32, u32, usize), String> {
    let parts: Vec<&str> = s.split(['x', 'X', '*']).collect();
    let num = |p: &str, what: &str| -> std::result::Result<u64, String> {
        p.trim()
            .parse::<u64>()
            .map_err(|_| format!("{what} must be a non-negative integer, got {p:?}"))
    };
    let (w, h, n) = match parts.as_slice() {
        [w, h] => (num(w, "width")?, num(h, "height")?, 1),
        [w, h, n] => (num(w, "width")?, num(h, "height")?, num(n, "count")?),
        _ => return Err(format!("expected WxH or WxHxN, got {s:?}")),
    };
    let w = u32::try_from(w).map_err(|_| format!("width {w} is too large"))?;
    let h = u32::try_from(h).map_err(|_| format!("height {h} is too large"))?;
    if n == 0 {
        return Err("count must be at least 1".into());
    }
    let n = usize::try_from(n)
        .ok()
        .filter(|&n| n <= MAX_REPEAT)
        .ok_or_else(|| format!("count {n} is too large (at most {MAX_REPEAT})"))?;
    Ok((w, h, n))
}

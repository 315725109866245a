use crate::model::Layout;
use serde_json::{Value, json};

fn meta<K: ToString>(layout: &Layout<K>) -> Value {
    let stats = layout.stats();
    json!({
        "app": "treepack",
        "version": env!("CARGO_PKG_VERSION"),
        "size": {"w": layout.width, "h": layout.height},
        "placed": stats.num_placed,
        "unplaced": layout.unplaced.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
        "occupancy": stats.occupancy,
    })
}

/// Serialize a `Layout` as `{ frames: [...], meta }` (array style).
/// Frames keep packing order; suitable for generic tooling and simple consumption.
pub fn to_json_array<K: ToString>(layout: &Layout<K>) -> Value {
    let frames: Vec<Value> = layout
        .placements
        .iter()
        .map(|p| {
            json!({
                "key": p.key.to_string(),
                "frame": {"x": p.frame.x, "y": p.frame.y, "w": p.frame.w, "h": p.frame.h},
            })
        })
        .collect();
    json!({"frames": frames, "meta": meta(layout)})
}

/// Frames keyed by name.
/// Shape: `{ frames: { name: { frame, sourceSize } }, meta }`, close to the
/// TexturePacker-style JSON hash many engines read.
pub fn to_json_hash<K: ToString>(layout: &Layout<K>) -> Value {
    let mut frames = serde_json::Map::new();
    for p in &layout.placements {
        frames.insert(
            p.key.to_string(),
            json!({
                "frame": {"x": p.frame.x, "y": p.frame.y, "w": p.frame.w, "h": p.frame.h},
                "sourceSize": {"w": p.frame.w, "h": p.frame.h},
            }),
        );
    }
    json!({"frames": frames, "meta": meta(layout)})
}

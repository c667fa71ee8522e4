use serde_json::{Value, json};

use crate::export::ExportedTile;
use crate::model::{Placement, TilePlan};

fn placement_json(p: &Placement) -> Value {
    let (x, y) = p.pixel_origin();
    json!({
        "ct": p.canvas.code,
        "frame": {"x": x, "y": y, "w": p.canvas.px_w, "h": p.canvas.px_h},
        "cell": {"row": p.row, "col": p.col},
        "rowIndex": p.row_index,
        "tileIndex": p.tile_index,
    })
}

/// Plan as JSON: `{ grid, tiles: [{ file, ct, frame, cell, rowIndex, tileIndex }], stats }`.
pub fn plan_to_json(plan: &TilePlan) -> Value {
    let tiles: Vec<Value> = plan
        .tiles
        .iter()
        .map(|t| {
            let mut v = placement_json(&t.placement);
            v["file"] = json!(t.file_base);
            v
        })
        .collect();
    json!({
        "name": plan.name_root,
        "grid": {"rows": plan.rows, "cols": plan.cols},
        "tiles": tiles,
        "stats": plan.stats(),
    })
}

/// Export manifest, same shape as [`plan_to_json`] plus each tile's identity and written paths.
pub fn export_to_json(plan: &TilePlan, exported: &[ExportedTile]) -> Value {
    let tiles: Vec<Value> = exported
        .iter()
        .map(|e| {
            let mut v = placement_json(&e.placement);
            v["file"] = json!(e.file_base);
            v["name"] = json!(e.identity.as_str());
            v["raster"] = json!(e.raster_path.to_string_lossy());
            v["descriptor"] = json!(e.descriptor_path.to_string_lossy());
            v
        })
        .collect();
    json!({
        "name": plan.name_root,
        "grid": {"rows": plan.rows, "cols": plan.cols},
        "tiles": tiles,
        "stats": plan.stats(),
        "meta": {
            "app": "paint-tiler",
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

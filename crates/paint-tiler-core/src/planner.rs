use image::{DynamicImage, GenericImageView};
use tracing::{debug, instrument};

use crate::compositing::{crop_premultiplied, crop_truncate};
use crate::config::TilerConfig;
use crate::error::{Result, TilerError};
use crate::grid::OccupancyGrid;
use crate::identity::file_base_name;
use crate::model::{CANVAS_TYPES, PlacedTile, Placement, TilePlan, UNIT_PX};

/// Checks that a `width x height` image can be tiled and returns its grid size as `(rows, cols)`.
///
/// Both sides must be non-zero multiples of 16 and, when `max_dimension` is set, no larger than it.
pub fn validate_dimensions(width: u32, height: u32, max_dimension: Option<u32>) -> Result<(u32, u32)> {
    let reject = |reason: String| TilerError::Dimension {
        width,
        height,
        reason,
    };
    if width == 0 || height == 0 {
        return Err(reject("image is empty".into()));
    }
    if width % UNIT_PX != 0 || height % UNIT_PX != 0 {
        return Err(reject(format!("both sides must be multiples of {UNIT_PX}")));
    }
    if let Some(max) = max_dimension {
        if width > max || height > max {
            return Err(reject(format!("exceeds maximum of {max}x{max}")));
        }
    }
    Ok((height / UNIT_PX, width / UNIT_PX))
}

/// Greedy largest-fit tiling of a `rows x cols` grid.
///
/// Cells are scanned row-major. At each free cell the first catalog entry that
/// stays in bounds and covers only free cells is placed. `row_index` advances
/// after a scan row that started at least one tile, so a row entirely covered by
/// tall tiles from the row above does not consume a row-group; `tile_index`
/// counts placements within the scan row.
pub fn plan_layout(rows: u32, cols: u32) -> Result<Vec<Placement>> {
    let mut occ = OccupancyGrid::new(rows, cols);
    let mut placements = Vec::new();

    let mut row_index = 0u32;
    for row in 0..rows {
        let mut tile_index = 0u32;
        let mut placed_in_row = false;
        for col in 0..cols {
            if occ.is_occupied(row, col) {
                continue;
            }
            let canvas = CANVAS_TYPES
                .iter()
                .find(|c| occ.fits(row, col, c))
                .copied()
                .ok_or(TilerError::NoFit { row, col })?;
            occ.mark(row, col, canvas.units_h, canvas.units_w);
            placements.push(Placement {
                canvas,
                row,
                col,
                row_index,
                tile_index,
            });
            placed_in_row = true;
            tile_index += 1;
        }
        if placed_in_row {
            row_index += 1;
        }
    }

    debug_assert!(occ.is_full());
    Ok(placements)
}

/// Plans the tiles of `image` and crops each one.
///
/// Validation runs first, so dimension problems surface as
/// [`TilerError::Dimension`] before any placement is attempted.
#[instrument(skip_all, fields(name_root = %name_root))]
pub fn plan_tiles(image: &DynamicImage, name_root: &str, cfg: &TilerConfig) -> Result<TilePlan> {
    cfg.validate()?;
    if name_root.is_empty() {
        return Err(TilerError::InvalidConfig("name root is empty".into()));
    }

    let (width, height) = image.dimensions();
    let (rows, cols) = validate_dimensions(width, height, cfg.max_dimension)?;
    let placements = plan_layout(rows, cols)?;
    debug!(rows, cols, tiles = placements.len(), "layout planned");

    let source = image.to_rgba16();
    let tiles = placements
        .into_iter()
        .map(|placement| {
            let (x, y) = placement.pixel_origin();
            let canvas = placement.canvas;
            PlacedTile {
                image: crop_truncate(&source, x, y, canvas.px_w, canvas.px_h),
                premultiplied: crop_premultiplied(&source, x, y, canvas.px_w, canvas.px_h),
                file_base: file_base_name(name_root, placement.row_index, placement.tile_index),
                placement,
            }
        })
        .collect();

    Ok(TilePlan {
        rows,
        cols,
        name_root: name_root.to_string(),
        tiles,
    })
}

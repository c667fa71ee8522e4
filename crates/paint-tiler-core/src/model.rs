use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Side length in pixels of one alignment cell.
pub const UNIT_PX: u32 = 16;

/// One of the fixed canvas footprints the renderer can display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CanvasType {
    pub px_w: u32,
    pub px_h: u32,
    pub units_w: u32,
    pub units_h: u32,
    /// Canvas type code written into the `ct` descriptor field.
    pub code: u8,
}

/// Canvas catalog, largest area first. The planner tries entries in this order.
pub const CANVAS_TYPES: [CanvasType; 4] = [
    CanvasType {
        px_w: 32,
        px_h: 32,
        units_w: 2,
        units_h: 2,
        code: 1,
    },
    CanvasType {
        px_w: 32,
        px_h: 16,
        units_w: 2,
        units_h: 1,
        code: 2,
    },
    CanvasType {
        px_w: 16,
        px_h: 32,
        units_w: 1,
        units_h: 2,
        code: 3,
    },
    CanvasType {
        px_w: 16,
        px_h: 16,
        units_w: 1,
        units_h: 1,
        code: 0,
    },
];

impl CanvasType {
    /// Pixel area (`px_w * px_h`).
    pub fn area(&self) -> u32 {
        self.px_w * self.px_h
    }
    /// Number of grid cells covered.
    pub fn cells(&self) -> u32 {
        self.units_w * self.units_h
    }
    pub fn from_code(code: u8) -> Option<CanvasType> {
        CANVAS_TYPES.iter().copied().find(|c| c.code == code)
    }
    pub fn for_pixel_size(w: u32, h: u32) -> Option<CanvasType> {
        CANVAS_TYPES
            .iter()
            .copied()
            .find(|c| c.px_w == w && c.px_h == h)
    }
}

/// Geometry of one planning decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub canvas: CanvasType,
    /// Top-left grid row.
    pub row: u32,
    /// Top-left grid column.
    pub col: u32,
    /// Row-group index. Advances only after a scan row that started at least one tile.
    pub row_index: u32,
    /// Index within the row-group.
    pub tile_index: u32,
}

impl Placement {
    /// Pixel offset of the tile's top-left corner in the source image.
    pub fn pixel_origin(&self) -> (u32, u32) {
        (self.col * UNIT_PX, self.row * UNIT_PX)
    }
}

/// A planned tile with its cropped pixels, ready for export.
#[derive(Debug, Clone)]
pub struct PlacedTile {
    pub placement: Placement,
    /// Cropped region, 8 bits per channel, straight alpha. Written to the raster.
    pub image: RgbaImage,
    /// Same region with color premultiplied by alpha. Packed into the descriptor.
    pub premultiplied: RgbaImage,
    /// `<name_root>_<row_index>_<tile_index>`, shared by both artifacts.
    pub file_base: String,
}

/// Ordered output of the planner.
#[derive(Debug, Clone)]
pub struct TilePlan {
    pub rows: u32,
    pub cols: u32,
    pub name_root: String,
    pub tiles: Vec<PlacedTile>,
}

impl TilePlan {
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.tiles.iter().map(|t| &t.placement)
    }

    pub fn stats(&self) -> PlanStats {
        PlanStats::from_placements(self.rows, self.cols, self.placements())
    }
}

/// Statistics about a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanStats {
    pub rows: u32,
    pub cols: u32,
    pub num_tiles: usize,
    /// Tile count indexed by canvas code.
    pub by_code: [usize; 4],
    /// Grid cells covered by all tiles; equals `rows * cols` for a complete plan.
    pub cells_covered: u64,
    /// Number of distinct row-groups.
    pub row_groups: u32,
}

impl PlanStats {
    pub fn from_placements<'a>(
        rows: u32,
        cols: u32,
        placements: impl IntoIterator<Item = &'a Placement>,
    ) -> Self {
        let mut by_code = [0usize; 4];
        let mut num_tiles = 0;
        let mut cells_covered = 0u64;
        let mut row_groups = 0u32;
        for p in placements {
            num_tiles += 1;
            by_code[p.canvas.code as usize] += 1;
            cells_covered += p.canvas.cells() as u64;
            row_groups = row_groups.max(p.row_index + 1);
        }
        Self {
            rows,
            cols,
            num_tiles,
            by_code,
            cells_covered,
            row_groups,
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Grid: {}x{} cells, Tiles: {} (32x32: {}, 32x16: {}, 16x32: {}, 16x16: {}), Row groups: {}, Cells covered: {}",
            self.cols,
            self.rows,
            self.num_tiles,
            self.by_code[1],
            self.by_code[2],
            self.by_code[3],
            self.by_code[0],
            self.row_groups,
            self.cells_covered,
        )
    }

    /// True when every grid cell is covered.
    pub fn is_complete(&self) -> bool {
        self.cells_covered == (self.rows as u64) * (self.cols as u64)
    }
}

//! Core library for splitting images into fixed-size painting canvases.
//!
//! - Catalog: four canvas footprints (32x32, 32x16, 16x32, 16x16) on a 16px grid
//! - Planner: greedy largest-fit placement over an occupancy grid, row-major
//! - Export: per tile an uncompressed BMP and a gzip-compressed NBT `.paint` descriptor
//!
//! Quick example:
//! ```ignore
//! use paint_tiler_core::prelude::*;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("mural.png")?;
//! let cfg = TilerConfig::builder().author("Bob").title("Mural").build();
//! let plan = plan_tiles(&img, "mural", &cfg)?;
//! let ctx = RunContext::new(&cfg, "mural");
//! let exported = export_plan(&ctx, &plan, &mut ctx.identity_assigner())?;
//! println!("tiles: {}", exported.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod grid;
pub mod identity;
pub mod manifest;
pub mod model;
pub mod planner;

pub use config::*;
pub use context::*;
pub use error::*;
pub use export::*;
pub use grid::*;
pub use identity::*;
pub use manifest::*;
pub use model::*;
pub use planner::*;

/// Convenience prelude for common types and functions.
/// Importing `paint_tiler_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{DEFAULT_MAX_DIMENSION, TilerConfig, TilerConfigBuilder};
    pub use crate::context::RunContext;
    pub use crate::error::TilerError;
    pub use crate::export::{
        ExportedTile, PaintDescriptor, export_plan, export_plan_with, export_tile,
        read_descriptor,
    };
    pub use crate::grid::OccupancyGrid;
    pub use crate::identity::{IdentityAssigner, PAINTING_NAMESPACE, TileIdentity};
    pub use crate::model::{
        CANVAS_TYPES, CanvasType, PlacedTile, Placement, PlanStats, TilePlan, UNIT_PX,
    };
    pub use crate::planner::{plan_layout, plan_tiles, validate_dimensions};
}

//! Tile export: BMP raster plus gzip-compressed NBT descriptor (`.paint`).

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use fastnbt::IntArray;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::compositing::is_opaque;
use crate::context::RunContext;
use crate::error::{Result, TilerError};
use crate::identity::{IdentityAssigner, TileIdentity};
use crate::model::{PlacedTile, Placement, TilePlan};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const RASTER_EXT: &str = "bmp";
pub const DESCRIPTOR_EXT: &str = "paint";

/// Value of the `generation` field.
pub const DESCRIPTOR_GENERATION: i32 = 1;
/// Value of the `v` field (descriptor schema version).
pub const DESCRIPTOR_VERSION: i32 = 2;

const OPAQUE_ALPHA: u32 = 0xFF << 24;

/// Packs the tile's pixels row-major as `0xFFRRGGBB`; source alpha is ignored.
pub fn pack_pixels(img: &RgbaImage) -> Vec<u32> {
    let (w, h) = img.dimensions();
    let mut out = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            let [r, g, b, _] = img.get_pixel(x, y).0;
            out.push(OPAQUE_ALPHA | (r as u32) << 16 | (g as u32) << 8 | b as u32);
        }
    }
    out
}

/// Root compound of a `.paint` file. Field order is the on-disk order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaintDescriptor {
    pub generation: i32,
    /// Canvas type code.
    pub ct: i8,
    /// Packed ARGB, one entry per pixel, row-major.
    pub pixels: IntArray,
    pub v: i32,
    pub author: String,
    pub title: String,
    pub name: String,
}

impl PaintDescriptor {
    pub fn new(ctx: &RunContext, tile: &PlacedTile, identity: &TileIdentity) -> Self {
        let pixels = pack_pixels(&tile.premultiplied)
            .into_iter()
            .map(|p| p as i32)
            .collect();
        Self {
            generation: DESCRIPTOR_GENERATION,
            ct: tile.placement.canvas.code as i8,
            pixels: IntArray::new(pixels),
            v: DESCRIPTOR_VERSION,
            author: ctx.author.clone(),
            title: ctx.title.clone(),
            name: identity.to_string(),
        }
    }

    /// Pixel values reinterpreted as unsigned ARGB.
    pub fn pixels_argb(&self) -> Vec<u32> {
        self.pixels.iter().map(|p| *p as u32).collect()
    }
}

/// Serializes `desc` as uncompressed NBT with an unnamed root compound.
pub fn descriptor_to_nbt(desc: &PaintDescriptor) -> Result<Vec<u8>> {
    fastnbt::to_bytes(desc).map_err(|e| TilerError::Nbt(e.to_string()))
}

pub fn decode_descriptor<R: Read>(reader: R) -> Result<PaintDescriptor> {
    let mut bytes = Vec::new();
    GzDecoder::new(reader)
        .read_to_end(&mut bytes)
        .map_err(|e| TilerError::Nbt(format!("gzip: {e}")))?;
    fastnbt::from_bytes(&bytes).map_err(|e| TilerError::Nbt(e.to_string()))
}

/// Writes `desc` to `path` as gzip-compressed NBT.
pub fn write_descriptor(path: &Path, desc: &PaintDescriptor) -> Result<()> {
    let bytes = descriptor_to_nbt(desc)?;
    let file = File::create(path).map_err(|e| TilerError::io(path, e))?;
    let mut gz = GzEncoder::new(BufWriter::new(file), Compression::default());
    gz.write_all(&bytes).map_err(|e| TilerError::io(path, e))?;
    let mut writer = gz.finish().map_err(|e| TilerError::io(path, e))?;
    writer.flush().map_err(|e| TilerError::io(path, e))
}

pub fn read_descriptor(path: &Path) -> Result<PaintDescriptor> {
    let bytes = fs::read(path).map_err(|e| TilerError::io(path, e))?;
    decode_descriptor(&bytes[..])
}

/// Writes `img` as an uncompressed BMP: 24-bit when fully opaque, 32-bit otherwise.
pub fn write_raster(path: &Path, img: &RgbaImage) -> Result<()> {
    let file = File::create(path).map_err(|e| TilerError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let dynamic = if is_opaque(img) {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img.clone()).to_rgb8())
    } else {
        DynamicImage::ImageRgba8(img.clone())
    };
    dynamic
        .write_to(&mut writer, ImageFormat::Bmp)
        .map_err(|e| TilerError::image(path, e))?;
    writer.flush().map_err(|e| TilerError::io(path, e))
}

/// Files written for one tile.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedTile {
    pub file_base: String,
    pub placement: Placement,
    pub identity: TileIdentity,
    pub raster_path: PathBuf,
    pub descriptor_path: PathBuf,
}

/// Writes the raster and descriptor of `tile`, overwriting existing files.
pub fn export_tile(
    ctx: &RunContext,
    tile: &PlacedTile,
    identity: &TileIdentity,
) -> Result<ExportedTile> {
    let raster_path = ctx.raster_path(&tile.file_base);
    write_raster(&raster_path, &tile.image)?;

    let descriptor_path = ctx.descriptor_path(&tile.file_base);
    write_descriptor(&descriptor_path, &PaintDescriptor::new(ctx, tile, identity))?;

    info!(
        "Exported {} (\"{} X {} Y {}\" by {})",
        tile.file_base,
        ctx.title,
        tile.placement.row_index,
        tile.placement.tile_index,
        ctx.author
    );
    Ok(ExportedTile {
        file_base: tile.file_base.clone(),
        placement: tile.placement,
        identity: identity.clone(),
        raster_path,
        descriptor_path,
    })
}

/// Exports every tile of `plan` in planning order, one at a time.
///
/// Stops at the first failure; files of earlier tiles stay on disk.
#[instrument(skip_all, fields(tiles = plan.tiles.len()))]
pub fn export_plan(
    ctx: &RunContext,
    plan: &TilePlan,
    assigner: &mut IdentityAssigner,
) -> Result<Vec<ExportedTile>> {
    export_plan_with(ctx, plan, assigner, |_| {})
}

/// Like [`export_plan`], calling `on_exported` after each tile.
pub fn export_plan_with<F>(
    ctx: &RunContext,
    plan: &TilePlan,
    assigner: &mut IdentityAssigner,
    mut on_exported: F,
) -> Result<Vec<ExportedTile>>
where
    F: FnMut(&ExportedTile),
{
    let mut out = Vec::with_capacity(plan.tiles.len());
    for tile in &plan.tiles {
        let identity = assigner.next_identity();
        let exported = export_tile(ctx, tile, &identity)?;
        on_exported(&exported);
        out.push(exported);
    }
    Ok(out)
}

/// Exports tiles concurrently. Identities are assigned in planning order
/// before any file is written, so they match a sequential run.
#[cfg(feature = "parallel")]
#[instrument(skip_all, fields(tiles = plan.tiles.len()))]
pub fn export_plan_parallel(
    ctx: &RunContext,
    plan: &TilePlan,
    assigner: &mut IdentityAssigner,
) -> Result<Vec<ExportedTile>> {
    let identities = assigner.assign_all(plan.tiles.len());
    plan.tiles
        .par_iter()
        .zip(identities.par_iter())
        .map(|(tile, identity)| export_tile(ctx, tile, identity))
        .collect()
}

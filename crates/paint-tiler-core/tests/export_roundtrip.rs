use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage};
use paint_tiler_core::export::{write_descriptor, write_raster};
use paint_tiler_core::prelude::*;

fn gradient(w: u32, h: u32) -> RgbaImage {
    let mut img = RgbaImage::new(w, h);
    for (x, y, p) in img.enumerate_pixels_mut() {
        *p = Rgba([(x * 5) as u8, (y * 3) as u8, (x ^ y) as u8, 255]);
    }
    img
}

fn setup(w: u32, h: u32) -> (tempfile::TempDir, RunContext, TilePlan, RgbaImage) {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = TilerConfig::builder()
        .author("Bob Ross")
        .title("Happy Trees")
        .out_dir(dir.path())
        .build();
    let src = gradient(w, h);
    let plan = plan_tiles(&DynamicImage::ImageRgba8(src.clone()), "trees", &cfg).expect("plan");
    let ctx = RunContext::with_base_id(&cfg, "trees", 1_700_000_000_000_000_000);
    (dir, ctx, plan, src)
}

#[test]
fn writes_two_files_per_tile() {
    let (dir, ctx, plan, _) = setup(48, 48);
    let exported = export_plan(&ctx, &plan, &mut ctx.identity_assigner()).expect("export");
    assert_eq!(exported.len(), plan.tiles.len());

    let names: HashSet<String> = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2 * plan.tiles.len());
    for tile in &plan.tiles {
        assert!(names.contains(&format!("{}.bmp", tile.file_base)));
        assert!(names.contains(&format!("{}.paint", tile.file_base)));
    }
}

#[test]
fn descriptor_fields_and_pixels_round_trip() {
    let (_dir, ctx, plan, src) = setup(32, 48);
    let exported = export_plan(&ctx, &plan, &mut ctx.identity_assigner()).expect("export");

    for (tile, out) in plan.tiles.iter().zip(&exported) {
        let desc = read_descriptor(&out.descriptor_path).expect("read descriptor");
        let canvas = tile.placement.canvas;
        assert_eq!(desc.generation, 1);
        assert_eq!(desc.v, 2);
        assert_eq!(desc.ct, canvas.code as i8);
        assert_eq!(desc.author, "Bob Ross");
        assert_eq!(desc.title, "Happy Trees");
        assert_eq!(desc.name, out.identity.as_str());

        let pixels = desc.pixels_argb();
        assert_eq!(pixels.len(), (canvas.px_w * canvas.px_h) as usize);
        let (ox, oy) = tile.placement.pixel_origin();
        for y in 0..canvas.px_h {
            for x in 0..canvas.px_w {
                let [r, g, b, _] = src.get_pixel(ox + x, oy + y).0;
                let expected = 0xff00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32;
                assert_eq!(pixels[(y * canvas.px_w + x) as usize], expected);
            }
        }
    }
}

#[test]
fn identities_increase_by_one_in_planning_order() {
    let (_dir, ctx, plan, _) = setup(64, 48);
    let mut assigner = ctx.identity_assigner();
    let exported = export_plan(&ctx, &plan, &mut assigner).expect("export");
    assert_eq!(assigner.counter(), exported.len() as i64);

    for (i, out) in exported.iter().enumerate() {
        let expected = format!("{}_{}", PAINTING_NAMESPACE, ctx.base_id + i as i64);
        assert_eq!(out.identity.as_str(), expected);
    }
    let unique: HashSet<_> = exported.iter().map(|e| e.identity.clone()).collect();
    assert_eq!(unique.len(), exported.len());
}

#[test]
fn descriptor_is_gzip_wrapped_unnamed_compound() {
    let (_dir, ctx, plan, _) = setup(16, 16);
    let exported = export_plan(&ctx, &plan, &mut ctx.identity_assigner()).expect("export");
    let raw = std::fs::read(&exported[0].descriptor_path).expect("read");
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    let mut nbt = Vec::new();
    flate2::read::GzDecoder::new(&raw[..])
        .read_to_end(&mut nbt)
        .expect("gunzip");
    // TAG_Compound, zero-length name, then the first field: TAG_Int "generation"
    assert_eq!(&nbt[..4], &[0x0a, 0x00, 0x00, 0x03]);
    assert_eq!(&nbt[4..6], &[0x00, 10]);
    assert_eq!(&nbt[6..16], b"generation");
}

#[test]
fn raster_matches_cropped_tile() {
    let (_dir, ctx, plan, _) = setup(32, 48);
    let exported = export_plan(&ctx, &plan, &mut ctx.identity_assigner()).expect("export");
    for (tile, out) in plan.tiles.iter().zip(&exported) {
        let decoded = image::open(&out.raster_path).expect("decode bmp").to_rgba8();
        assert_eq!(decoded.dimensions(), tile.image.dimensions());
        assert_eq!(decoded.as_raw(), tile.image.as_raw());
    }
}

#[test]
fn descriptor_premultiplies_and_forces_opaque_alpha() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = TilerConfig::builder().out_dir(dir.path()).build();
    let mut src = RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 255]));
    src.put_pixel(5, 5, Rgba([200, 100, 50, 64]));
    src.put_pixel(6, 5, Rgba([255, 0, 0, 0]));
    let plan = plan_tiles(&DynamicImage::ImageRgba8(src), "ghost", &cfg).expect("plan");
    let ctx = RunContext::with_base_id(&cfg, "ghost", 42);
    let exported = export_plan(&ctx, &plan, &mut ctx.identity_assigner()).expect("export");

    let desc = read_descriptor(&exported[0].descriptor_path).expect("read");
    let pixels = desc.pixels_argb();
    assert_eq!(pixels[5 * 16 + 5], 0xff32190c);
    assert_eq!(pixels[5 * 16 + 6], 0xff000000);
    assert_eq!(pixels[0], 0xff0a141e);
    assert_eq!(desc.author, "Unknown");
    assert_eq!(desc.title, "Untitled");

    // The raster keeps straight alpha.
    assert_eq!(plan.tiles[0].image.get_pixel(5, 5).0, [200, 100, 50, 64]);
    let decoded = image::open(&exported[0].raster_path).expect("decode").to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 16));
    assert_eq!(decoded.get_pixel(0, 0).0[..3], [10, 20, 30]);
}

#[test]
fn existing_files_are_overwritten() {
    let (_dir, ctx, plan, _) = setup(16, 16);
    let first = export_plan(&ctx, &plan, &mut ctx.identity_assigner()).expect("export");
    let rerun = RunContext { base_id: ctx.base_id + 1_000, ..ctx.clone() };
    let second = export_plan(&rerun, &plan, &mut rerun.identity_assigner()).expect("export");
    assert_eq!(first[0].descriptor_path, second[0].descriptor_path);
    let desc = read_descriptor(&second[0].descriptor_path).expect("read");
    assert_eq!(desc.name, second[0].identity.as_str());
    assert_ne!(desc.name, first[0].identity.as_str());
}

#[test]
fn missing_output_directory_reports_path() {
    let (dir, ctx, plan, _) = setup(16, 16);
    let ctx = RunContext { out_dir: dir.path().join("absent"), ..ctx };
    let err = export_plan(&ctx, &plan, &mut ctx.identity_assigner()).unwrap_err();
    match err {
        TilerError::Io { path, .. } => assert!(path.ends_with("trees_0_0.bmp")),
        other => panic!("Expected Io error, got {other:?}"),
    }
}

#[cfg(target_os = "linux")]
#[test]
fn full_device_write_failures_report_path() {
    let full = Path::new("/dev/full");
    if !full.exists() {
        return;
    }
    let (_dir, ctx, plan, _) = setup(16, 16);
    let tile = &plan.tiles[0];
    let identity = ctx.identity_assigner().next_identity();

    let err = write_descriptor(full, &PaintDescriptor::new(&ctx, tile, &identity)).unwrap_err();
    match err {
        TilerError::Io { path, .. } => assert_eq!(path, full),
        other => panic!("Expected Io error, got {other:?}"),
    }

    let err = write_raster(full, &tile.image).unwrap_err();
    match err {
        TilerError::Io { path, .. } | TilerError::Image { path, .. } => assert_eq!(path, full),
        other => panic!("Expected Io or Image error, got {other:?}"),
    }
}
